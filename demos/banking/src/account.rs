//! Leaf commands on a single account.
//!
//! An [`AccountCommand`] deposits into or withdraws from one account in a
//! [`Ledger`]. Undo performs the opposite primitive with the same amount.

use crate::types::{AccountId, Ledger, LedgerError, Money};
use undo_ledger_core::{Command, Status};

/// What an [`AccountCommand`] does to its account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Add money; only refused if the balance would overflow
    Deposit(Money),
    /// Remove money; refused below the overdraft limit
    Withdraw(Money),
}

impl Action {
    /// Amount moved by this action
    #[must_use]
    pub const fn amount(self) -> Money {
        match self {
            Self::Deposit(amount) | Self::Withdraw(amount) => amount,
        }
    }

    /// The action that reverses this one's balance arithmetic
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Deposit(amount) => Self::Withdraw(amount),
            Self::Withdraw(amount) => Self::Deposit(amount),
        }
    }

    /// Applies the action to `account`, returning whether it went through
    fn apply(self, ledger: &mut Ledger, account: &AccountId) -> Result<bool, LedgerError> {
        match self {
            Self::Deposit(amount) => ledger.deposit(account, amount),
            Self::Withdraw(amount) => ledger.withdraw(account, amount),
        }
    }
}

/// Deposit or withdrawal on one account
///
/// The command holds the account's ID, not the account: the ledger is
/// passed in on every `invoke` and `undo`. Amounts are not validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountCommand {
    account: AccountId,
    action: Action,
    status: Status,
}

impl AccountCommand {
    /// Creates a pending command
    #[must_use]
    pub const fn new(account: AccountId, action: Action) -> Self {
        Self {
            account,
            action,
            status: Status::Pending,
        }
    }

    /// Command that deposits `amount` into `account`
    #[must_use]
    pub const fn deposit(account: AccountId, amount: Money) -> Self {
        Self::new(account, Action::Deposit(amount))
    }

    /// Command that withdraws `amount` from `account`
    #[must_use]
    pub const fn withdraw(account: AccountId, amount: Money) -> Self {
        Self::new(account, Action::Withdraw(amount))
    }

    /// Target account
    #[must_use]
    pub const fn account(&self) -> AccountId {
        self.account
    }

    /// The action performed on invoke
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Current lifecycle status
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }
}

impl Command<Ledger> for AccountCommand {
    fn invoke(&mut self, ledger: &mut Ledger) {
        let succeeded = match self.action.apply(ledger, &self.account) {
            Ok(succeeded) => succeeded,
            Err(error) => {
                tracing::warn!(%error, action = ?self.action, "Account command failed");
                false
            }
        };

        self.status = if succeeded {
            Status::Succeeded
        } else {
            Status::Failed
        };
    }

    fn undo(&mut self, ledger: &mut Ledger) {
        if !self.status.can_undo() {
            return;
        }

        match self.action.inverse().apply(ledger, &self.account) {
            Ok(true) => self.status = Status::Undone,
            Ok(false) => {
                tracing::warn!(
                    account = %self.account,
                    action = ?self.action,
                    "Reversal refused by the account, command left applied"
                );
            }
            Err(error) => {
                tracing::warn!(%error, action = ?self.action, "Account command could not be undone");
            }
        }
    }

    fn success(&self) -> bool {
        self.status.is_success()
    }

    fn can_undo(&self) -> bool {
        self.status.can_undo()
    }

    fn skip(&mut self) {
        self.status = Status::Skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use undo_ledger_testing::CommandTest;

    fn ledger_with(balance: Money) -> (Ledger, AccountId) {
        let mut ledger = Ledger::new();
        let id = ledger.open(balance);
        (ledger, id)
    }

    #[test]
    fn test_action_inverse() {
        let amount = Money::from_dollars(10);
        assert_eq!(Action::Deposit(amount).inverse(), Action::Withdraw(amount));
        assert_eq!(Action::Withdraw(amount).inverse(), Action::Deposit(amount));
        assert_eq!(Action::Withdraw(amount).amount(), amount);
    }

    #[test]
    fn test_deposit_then_undo() {
        let (ledger, id) = ledger_with(Money::ZERO);

        CommandTest::new(AccountCommand::deposit(id, Money::from_dollars(1000)))
            .given_state(ledger)
            .when_invoked()
            .then_success()
            .then_state(move |ledger| {
                assert_eq!(ledger.balance(&id), Some(Money::from_dollars(1000)));
            })
            .when_undone()
            .then_command(|command| assert_eq!(command.status(), Status::Undone))
            .then_state(move |ledger| assert_eq!(ledger.balance(&id), Some(Money::ZERO)))
            .run();
    }

    #[test]
    fn test_refused_withdrawal_is_never_undone() {
        let (ledger, id) = ledger_with(Money::ZERO);

        CommandTest::new(AccountCommand::withdraw(id, Money::from_dollars(700)))
            .given_state(ledger)
            .when_invoked()
            .then_failure()
            .then_command(|command| assert_eq!(command.status(), Status::Failed))
            .when_undone()
            .then_state(move |ledger| assert_eq!(ledger.balance(&id), Some(Money::ZERO)))
            .run();
    }

    #[test]
    fn test_withdrawal_into_overdraft() {
        let (ledger, id) = ledger_with(Money::ZERO);

        CommandTest::new(AccountCommand::withdraw(id, Money::from_dollars(500)))
            .given_state(ledger)
            .when_invoked()
            .then_success()
            .then_state(move |ledger| {
                assert_eq!(ledger.balance(&id), Some(Money::from_dollars(-500)));
            })
            .when_undone()
            .then_state(move |ledger| assert_eq!(ledger.balance(&id), Some(Money::ZERO)))
            .run();
    }

    #[test]
    fn test_double_undo_reverses_once() {
        let (ledger, id) = ledger_with(Money::from_dollars(100));

        CommandTest::new(AccountCommand::deposit(id, Money::from_dollars(50)))
            .given_state(ledger)
            .when_invoked()
            .when_undone()
            .when_undone()
            .then_success()
            .then_state(move |ledger| {
                assert_eq!(ledger.balance(&id), Some(Money::from_dollars(100)));
            })
            .run();
    }

    #[test]
    fn test_unknown_account_fails() {
        let mut ledger = Ledger::new();
        let mut command = AccountCommand::deposit(AccountId::new(), Money::from_dollars(5));

        command.invoke(&mut ledger);

        assert!(!command.success());
        assert_eq!(command.status(), Status::Failed);
    }

    #[test]
    fn test_refused_reversal_stays_applied() {
        let (mut ledger, id) = ledger_with(Money::ZERO);
        let mut deposit = AccountCommand::deposit(id, Money::from_dollars(100));
        deposit.invoke(&mut ledger);

        // Spend the deposit and the whole overdraft so the reversal cannot go through
        assert_eq!(ledger.withdraw(&id, Money::from_dollars(600)), Ok(true));
        deposit.undo(&mut ledger);

        assert_eq!(deposit.status(), Status::Succeeded);
        assert_eq!(ledger.balance(&id), Some(Money::from_dollars(-500)));

        assert_eq!(ledger.deposit(&id, Money::from_dollars(100)), Ok(true));
        deposit.undo(&mut ledger);
        assert_eq!(deposit.status(), Status::Undone);
        assert_eq!(ledger.balance(&id), Some(Money::from_dollars(-500)));
    }

    #[test]
    fn test_overflowing_deposit_fails_and_leaves_balance() {
        let (ledger, id) = ledger_with(Money::from_cents(1));

        CommandTest::new(AccountCommand::deposit(id, Money::from_cents(i64::MAX)))
            .given_state(ledger)
            .when_invoked()
            .then_failure()
            .then_command(|command| {
                assert_eq!(command.status(), Status::Failed);
                assert!(!command.can_undo());
            })
            .when_undone()
            .then_state(move |ledger| assert_eq!(ledger.balance(&id), Some(Money::from_cents(1))))
            .run();
    }

    #[test]
    fn test_reversal_that_would_overflow_is_refused() {
        let (mut ledger, id) = ledger_with(Money::ZERO);
        let mut deposit = AccountCommand::deposit(id, Money::from_cents(i64::MIN));
        deposit.invoke(&mut ledger);
        assert!(deposit.success());

        assert_eq!(ledger.deposit(&id, Money::from_cents(i64::MAX)), Ok(true));
        assert_eq!(ledger.deposit(&id, Money::from_cents(1)), Ok(true));

        // Taking i64::MIN back out of a zero balance does not fit in cents
        deposit.undo(&mut ledger);
        assert!(deposit.can_undo());
        assert_eq!(ledger.balance(&id), Some(Money::ZERO));

        assert_eq!(ledger.withdraw(&id, Money::from_cents(1)), Ok(true));
        deposit.undo(&mut ledger);
        assert_eq!(deposit.status(), Status::Undone);
        assert_eq!(ledger.balance(&id), Some(Money::from_cents(i64::MAX)));
    }

    #[test]
    fn test_skip_forces_failure() {
        let (mut ledger, id) = ledger_with(Money::ZERO);
        let mut command = AccountCommand::deposit(id, Money::from_dollars(1));

        command.skip();
        command.undo(&mut ledger);

        assert!(!command.success());
        assert_eq!(command.status(), Status::Skipped);
        assert_eq!(ledger.balance(&id), Some(Money::ZERO));
    }
}
