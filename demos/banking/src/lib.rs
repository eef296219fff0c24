//! Banking example demonstrating undoable commands and safe transfers.
//!
//! Bank accounts live in a [`Ledger`]. Every change to a balance goes
//! through a command, so it can be undone. It demonstrates:
//!
//! - Leaf commands (deposit, withdraw) with an overdraft floor
//! - A plain composite transfer, which can leave accounts inconsistent
//! - An all-or-nothing [`TransferCommand`] that never creates money
//! - An invoker that remembers commands and undoes them newest first
//!
//! # Architecture
//!
//! ```text
//! TransferCommand
//!   ├─► Withdraw from source ──► Ledger ──► Account::withdraw
//!   │        │
//!   │        └── refused? ──► deposit skipped, transfer failed
//!   │
//!   └─► Deposit to destination ──► Ledger ──► Account::deposit
//!
//! undo(): deposit reversed first, then withdrawal
//! ```
//!
//! # Quick Start
//!
//! ```
//! use banking::{Ledger, Money, TransferCommand};
//! use undo_ledger_core::Command;
//!
//! let mut ledger = Ledger::new();
//! let alice = ledger.open(Money::from_dollars(1000));
//! let bob = ledger.open(Money::ZERO);
//!
//! let mut transfer = TransferCommand::new(alice, bob, Money::from_dollars(1000));
//! transfer.invoke(&mut ledger);
//! assert!(transfer.success());
//! assert_eq!(ledger.balance(&bob), Some(Money::from_dollars(1000)));
//!
//! transfer.undo(&mut ledger);
//! assert_eq!(ledger.balance(&alice), Some(Money::from_dollars(1000)));
//! assert_eq!(ledger.balance(&bob), Some(Money::ZERO));
//! ```

pub mod account;
pub mod config;
pub mod transfer;
pub mod types;

// Re-export commonly used types
pub use account::{AccountCommand, Action};
pub use config::{BankConfig, ConfigError};
pub use transfer::TransferCommand;
pub use types::{
    Account, AccountId, DEFAULT_OVERDRAFT_LIMIT, Ledger, LedgerError, Money, ParseMoneyError,
};
