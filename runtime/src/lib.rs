//! # Undo Ledger Runtime
//!
//! Runtime for executing undoable commands.
//!
//! This crate provides the [`Invoker`]: the component that runs commands
//! against a state and remembers them so they can be undone later, most
//! recent first.
//!
//! ## Core Components
//!
//! - **Invoker**: Executes commands and keeps a bounded undo history
//! - **`HistoryConfig`**: How many executed commands to remember
//! - **Metrics**: Counters for invoked and undone commands
//!
//! ## Example
//!
//! ```
//! use undo_ledger_runtime::{HistoryConfig, Invoker};
//! # use undo_ledger_core::Command;
//! # #[derive(Debug)]
//! # struct Add(i64, bool);
//! # impl Command<i64> for Add {
//! #     fn invoke(&mut self, s: &mut i64) { *s += self.0; self.1 = true; }
//! #     fn undo(&mut self, s: &mut i64) { if std::mem::take(&mut self.1) { *s -= self.0; } }
//! #     fn success(&self) -> bool { self.1 }
//! #     fn can_undo(&self) -> bool { self.1 }
//! #     fn skip(&mut self) { self.1 = false; }
//! # }
//!
//! let mut total = 0;
//! let mut invoker = Invoker::new(HistoryConfig::default());
//!
//! assert!(invoker.execute(&mut total, Add(5, false)));
//! assert!(invoker.execute(&mut total, Add(7, false)));
//! assert_eq!(total, 12);
//!
//! invoker.undo_last(&mut total)?;
//! assert_eq!(total, 5);
//! # Ok::<(), undo_ledger_runtime::error::InvokerError>(())
//! ```

use std::collections::VecDeque;
use std::fmt;
use undo_ledger_core::Command;

/// Counters for command execution
pub mod metrics;

/// Error types for the Invoker runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Invoker operations
    #[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
    pub enum InvokerError {
        /// The history is empty
        ///
        /// Either nothing was executed yet, everything has already been
        /// undone, or the history depth is zero.
        #[error("Nothing to undo")]
        NothingToUndo,

        /// The most recent command could not reverse its effect
        ///
        /// The command stays at the top of the history so the undo can be
        /// retried once whatever blocked it has changed.
        #[error("Command refused to undo")]
        UndoRefused,
    }
}

pub use error::InvokerError;

/// Default number of commands an [`Invoker`] remembers
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration for an [`Invoker`]'s undo history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of commands kept for undo; the oldest are dropped first
    pub max_depth: usize,
}

impl HistoryConfig {
    /// Creates a configuration that remembers at most `max_depth` commands
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Executes commands and keeps them for undo.
///
/// Every executed command is recorded, whether it succeeded or not: undoing
/// a failed command is a guarded no-op, so the history stays a faithful
/// record of what the caller asked for. Undo pops the most recent entry,
/// unless the command still holds an effect after undoing, in which case it
/// stays on top.
///
/// # Type Parameters
///
/// - `S`: The state every command in this history operates on
pub struct Invoker<S> {
    config: HistoryConfig,
    history: VecDeque<Box<dyn Command<S>>>,
}

impl<S> Invoker<S> {
    /// Creates an invoker with an empty history
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
        }
    }

    /// Returns the history configuration
    #[must_use]
    pub const fn config(&self) -> HistoryConfig {
        self.config
    }

    /// Invokes `command` against `state` and records it for undo.
    ///
    /// Returns the command's success flag.
    #[tracing::instrument(skip_all, name = "invoker_execute")]
    pub fn execute<C>(&mut self, state: &mut S, command: C) -> bool
    where
        C: Command<S> + 'static,
    {
        let mut command = command;
        command.invoke(state);

        let success = command.success();
        metrics::record_invoked(success);
        tracing::debug!(success, "Command invoked");

        self.record(Box::new(command));
        success
    }

    /// Undoes the most recently executed command.
    ///
    /// # Errors
    ///
    /// - [`InvokerError::NothingToUndo`] if the history is empty
    /// - [`InvokerError::UndoRefused`] if the command kept its effect; it is
    ///   left in the history
    #[tracing::instrument(skip_all, name = "invoker_undo")]
    pub fn undo_last(&mut self, state: &mut S) -> Result<(), InvokerError> {
        let Some(mut command) = self.history.pop_back() else {
            tracing::debug!("Undo requested with empty history");
            return Err(InvokerError::NothingToUndo);
        };

        command.undo(state);
        if command.can_undo() {
            tracing::warn!(remaining = self.history.len() + 1, "Command refused to undo");
            self.history.push_back(command);
            return Err(InvokerError::UndoRefused);
        }

        metrics::record_undone();
        tracing::debug!(remaining = self.history.len(), "Command undone");
        Ok(())
    }

    /// Undoes every remembered command, newest first.
    ///
    /// Stops early at a command that refuses to undo. Returns how many
    /// commands were undone.
    pub fn undo_all(&mut self, state: &mut S) -> usize {
        let mut undone = 0;
        while self.undo_last(state).is_ok() {
            undone += 1;
        }
        undone
    }

    /// Returns the number of remembered commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Checks if the history is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Checks if there is anything to undo
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Returns the most recently executed command
    #[must_use]
    pub fn last(&self) -> Option<&dyn Command<S>> {
        self.history.back().map(|command| &**command)
    }

    /// Iterates over the history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &dyn Command<S>> {
        self.history.iter().map(|command| &**command)
    }

    fn record(&mut self, command: Box<dyn Command<S>>) {
        if self.config.max_depth == 0 {
            return;
        }

        while self.history.len() >= self.config.max_depth {
            self.history.pop_front();
            metrics::record_eviction();
            tracing::debug!(max_depth = self.config.max_depth, "History full, dropped oldest command");
        }

        self.history.push_back(command);
    }
}

impl<S> Default for Invoker<S> {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl<S> fmt::Debug for Invoker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoker")
            .field("config", &self.config)
            .field("history", &self.history)
            .finish()
    }
}
