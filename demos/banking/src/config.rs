//! Configuration for the banking demo.
//!
//! Every setting comes from a `BANK_*` environment variable with a default:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BANK_OVERDRAFT_LIMIT` | `-500` | Overdraft floor for new accounts, as a money string |
//! | `BANK_HISTORY_DEPTH` | `100` | Commands the invoker remembers for undo |
//! | `BANK_LOG_FILTER` | `banking=info,undo_ledger_runtime=debug` | `tracing` filter directives |
//!
//! # Example
//!
//! ```no_run
//! use banking::BankConfig;
//!
//! # fn main() -> Result<(), banking::ConfigError> {
//! let config = BankConfig::try_from_env()?;
//! let ledger = config.ledger();
//!
//! println!("Overdraft limit: {}", ledger.overdraft_limit());
//! # Ok(())
//! # }
//! ```

use crate::types::{DEFAULT_OVERDRAFT_LIMIT, Ledger, Money, ParseMoneyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use undo_ledger_runtime::{DEFAULT_MAX_DEPTH, HistoryConfig};

/// Environment variable for the overdraft limit
pub const OVERDRAFT_LIMIT_VAR: &str = "BANK_OVERDRAFT_LIMIT";

/// Environment variable for the undo history depth
pub const HISTORY_DEPTH_VAR: &str = "BANK_HISTORY_DEPTH";

/// Environment variable for the log filter
pub const LOG_FILTER_VAR: &str = "BANK_LOG_FILTER";

/// Log filter used when `BANK_LOG_FILTER` is not set
pub const DEFAULT_LOG_FILTER: &str = "banking=info,undo_ledger_runtime=debug";

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The overdraft limit is not a money amount
    #[error("Invalid BANK_OVERDRAFT_LIMIT: {0}")]
    InvalidOverdraftLimit(#[from] ParseMoneyError),

    /// The overdraft limit would require a positive minimum balance
    #[error("BANK_OVERDRAFT_LIMIT must not be positive, got {0}")]
    PositiveOverdraftLimit(Money),

    /// The history depth is not a non-negative integer
    #[error("Invalid BANK_HISTORY_DEPTH: {0:?}")]
    InvalidHistoryDepth(String),
}

/// Banking demo configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankConfig {
    /// Overdraft floor given to newly opened accounts
    pub overdraft_limit: Money,
    /// Maximum number of commands kept for undo
    pub history_depth: usize,
    /// `tracing` filter directives
    pub log_filter: String,
}

impl BankConfig {
    /// Load configuration from the environment
    ///
    /// Falls back to [`BankConfig::default`] if any variable is invalid.
    /// Use [`BankConfig::try_from_env`] to see why.
    #[must_use]
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_default()
    }

    /// Load configuration from the environment, rejecting invalid values
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set but cannot be parsed.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any name-to-value source
    ///
    /// Unset names take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is set but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let overdraft_limit = match lookup(OVERDRAFT_LIMIT_VAR) {
            Some(value) => value.parse::<Money>()?,
            None => defaults.overdraft_limit,
        };

        let history_depth = match lookup(HISTORY_DEPTH_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHistoryDepth(value))?,
            None => defaults.history_depth,
        };

        let log_filter = lookup(LOG_FILTER_VAR).unwrap_or(defaults.log_filter);

        let config = Self {
            overdraft_limit,
            history_depth,
            log_filter,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overdraft_limit > Money::ZERO {
            return Err(ConfigError::PositiveOverdraftLimit(self.overdraft_limit));
        }
        Ok(())
    }

    /// Empty ledger whose accounts get the configured overdraft limit
    #[must_use]
    pub fn ledger(&self) -> Ledger {
        Ledger::with_overdraft_limit(self.overdraft_limit)
    }

    /// Undo history settings for an invoker
    #[must_use]
    pub const fn history(&self) -> HistoryConfig {
        HistoryConfig::new(self.history_depth)
    }
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            overdraft_limit: DEFAULT_OVERDRAFT_LIMIT,
            history_depth: DEFAULT_MAX_DEPTH,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
