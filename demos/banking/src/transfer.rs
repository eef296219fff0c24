//! All-or-nothing money transfer.
//!
//! A [`TransferCommand`] withdraws from one account and deposits into
//! another. The deposit only runs if the withdrawal succeeded, so a failed
//! transfer never creates money.

use crate::account::AccountCommand;
use crate::types::{AccountId, Ledger, Money};
use undo_ledger_core::{Command, invoke_all_or_nothing, undo_in_reverse};

/// Transfer between two accounts
///
/// Undo reverses the deposit, then the withdrawal. Skipped or failed steps
/// are never reversed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferCommand {
    steps: [AccountCommand; 2],
    success: bool,
}

impl TransferCommand {
    /// Creates a transfer of `amount` from `from` to `to`
    #[must_use]
    pub const fn new(from: AccountId, to: AccountId, amount: Money) -> Self {
        Self {
            steps: [
                AccountCommand::withdraw(from, amount),
                AccountCommand::deposit(to, amount),
            ],
            success: false,
        }
    }

    /// Amount being transferred
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.steps[0].action().amount()
    }

    /// The withdrawal from the source account
    #[must_use]
    pub const fn withdrawal(&self) -> &AccountCommand {
        &self.steps[0]
    }

    /// The deposit into the destination account
    #[must_use]
    pub const fn deposit(&self) -> &AccountCommand {
        &self.steps[1]
    }
}

impl Command<Ledger> for TransferCommand {
    #[tracing::instrument(skip_all, name = "transfer", fields(amount = %self.amount()))]
    fn invoke(&mut self, ledger: &mut Ledger) {
        self.success = invoke_all_or_nothing(&mut self.steps, ledger);
        if !self.success {
            tracing::info!(
                from = %self.withdrawal().account(),
                to = %self.deposit().account(),
                "Transfer failed, no money moved"
            );
        }
    }

    fn undo(&mut self, ledger: &mut Ledger) {
        undo_in_reverse(&mut self.steps, ledger);
    }

    fn success(&self) -> bool {
        self.success
    }

    fn can_undo(&self) -> bool {
        self.steps.iter().any(AccountCommand::can_undo)
    }

    fn skip(&mut self) {
        for step in &mut self.steps {
            step.skip();
        }
        self.success = false;
    }
}
