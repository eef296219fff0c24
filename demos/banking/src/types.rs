//! Domain types for the banking example.
//!
//! - Money as signed fixed-point cents
//! - Bank accounts with an overdraft floor
//! - A ledger of accounts that commands operate on

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a bank account
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Creates a new random `AccountId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Money amount in cents (avoids floating point issues)
///
/// Signed, so balances can dip below zero down to an overdraft limit.
/// Arithmetic is checked: a sum that leaves the `i64` range is `None`, and
/// accounts refuse the operation instead of rounding the balance.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// No money
    pub const ZERO: Self = Self(0);

    /// Creates a new `Money` amount from cents
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Creates a `Money` amount from dollars, clamped to the `i64` range of cents
    #[must_use]
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars.saturating_mul(100))
    }

    /// Adds two amounts, or `None` on overflow
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Subtracts `rhs`, or `None` on overflow
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Checks if this amount is below zero
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

/// Errors from parsing a [`Money`] amount
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseMoneyError {
    /// Nothing to parse
    #[error("Money amount is empty")]
    Empty,

    /// Not a decimal number
    #[error("Invalid money amount: {0:?}")]
    Invalid(String),

    /// More than two digits after the decimal point
    #[error("Money amount has more than two decimal places: {0:?}")]
    TooPrecise(String),

    /// Does not fit in cents
    #[error("Money amount out of range: {0:?}")]
    OutOfRange(String),
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    /// Parses `"1000"`, `"-500"`, `"12.5"`, `"$12.50"` or `"-$0.75"`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseMoneyError::Empty);
        }

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let rest = rest.strip_prefix('$').unwrap_or(rest);

        let (whole, fraction) = rest.split_once('.').unwrap_or((rest, ""));
        let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(ParseMoneyError::Invalid(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(ParseMoneyError::TooPrecise(input.to_string()));
        }

        let out_of_range = || ParseMoneyError::OutOfRange(input.to_string());
        let dollars: i64 = whole.parse().map_err(|_| out_of_range())?;
        let cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| out_of_range())? * 10,
            _ => fraction.parse().map_err(|_| out_of_range())?,
        };

        let total = dollars
            .checked_mul(100)
            .and_then(|value| value.checked_add(cents))
            .ok_or_else(out_of_range)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

/// Default overdraft floor for new accounts: balances may go down to -$500.00
pub const DEFAULT_OVERDRAFT_LIMIT: Money = Money::from_dollars(-500);

/// A single bank account
///
/// Mutated only through [`Account::deposit`] and [`Account::withdraw`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    balance: Money,
    overdraft_limit: Money,
}

impl Account {
    /// Creates a new account with the default overdraft limit
    #[must_use]
    pub fn new(initial_balance: Money) -> Self {
        Self::with_overdraft_limit(initial_balance, DEFAULT_OVERDRAFT_LIMIT)
    }

    /// Creates a new account with its own overdraft limit
    #[must_use]
    pub fn with_overdraft_limit(initial_balance: Money, overdraft_limit: Money) -> Self {
        Self {
            id: AccountId::new(),
            balance: initial_balance,
            overdraft_limit,
        }
    }

    /// Account identifier
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// Current balance
    #[must_use]
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Lowest balance a withdrawal may leave behind
    #[must_use]
    pub const fn overdraft_limit(&self) -> Money {
        self.overdraft_limit
    }

    /// Adds `amount` to the balance.
    ///
    /// No business rule limits deposits; the only refusal is a balance that
    /// would overflow, in which case it returns `false` and the balance is
    /// untouched.
    pub fn deposit(&mut self, amount: Money) -> bool {
        let Some(balance) = self.balance.checked_add(amount) else {
            tracing::warn!(account = %self.id, %amount, "Deposit refused, balance would overflow");
            return false;
        };

        self.balance = balance;
        tracing::info!(account = %self.id, %amount, balance = %self.balance, "Deposited");
        true
    }

    /// Subtracts `amount` if the result stays at or above the overdraft limit.
    ///
    /// Returns whether the withdrawal happened; the balance is untouched
    /// when it returns `false`.
    pub fn withdraw(&mut self, amount: Money) -> bool {
        let Some(remaining) = self.balance.checked_sub(amount) else {
            tracing::warn!(account = %self.id, %amount, "Withdrawal refused, balance would overflow");
            return false;
        };

        if remaining < self.overdraft_limit {
            tracing::debug!(
                account = %self.id,
                %amount,
                balance = %self.balance,
                limit = %self.overdraft_limit,
                "Withdrawal refused by overdraft limit"
            );
            return false;
        }

        self.balance = remaining;
        tracing::info!(account = %self.id, %amount, balance = %self.balance, "Withdrew");
        true
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(Money::ZERO)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance: {}", self.balance)
    }
}

/// Errors from ledger lookups
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// No account with this ID is open in the ledger
    #[error("Account with ID {0} not found")]
    UnknownAccount(AccountId),
}

/// All bank accounts, indexed by ID
///
/// The state every bank command is invoked against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
    overdraft_limit: Money,
}

impl Ledger {
    /// Creates an empty ledger whose new accounts get the default overdraft limit
    #[must_use]
    pub fn new() -> Self {
        Self::with_overdraft_limit(DEFAULT_OVERDRAFT_LIMIT)
    }

    /// Creates an empty ledger whose new accounts get `overdraft_limit`
    #[must_use]
    pub fn with_overdraft_limit(overdraft_limit: Money) -> Self {
        Self {
            accounts: HashMap::new(),
            overdraft_limit,
        }
    }

    /// Overdraft limit given to accounts opened with [`Ledger::open`]
    #[must_use]
    pub const fn overdraft_limit(&self) -> Money {
        self.overdraft_limit
    }

    /// Opens an account with the ledger's overdraft limit
    pub fn open(&mut self, initial_balance: Money) -> AccountId {
        self.insert(Account::with_overdraft_limit(
            initial_balance,
            self.overdraft_limit,
        ))
    }

    /// Opens an account with its own overdraft limit
    pub fn open_with_limit(&mut self, initial_balance: Money, overdraft_limit: Money) -> AccountId {
        self.insert(Account::with_overdraft_limit(initial_balance, overdraft_limit))
    }

    /// Adds an existing account to the ledger
    pub fn insert(&mut self, account: Account) -> AccountId {
        let id = account.id();
        self.accounts.insert(id, account);
        id
    }

    /// Returns the number of accounts
    #[must_use]
    pub fn count(&self) -> usize {
        self.accounts.len()
    }

    /// Returns an account by ID
    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Checks if an account exists
    #[must_use]
    pub fn exists(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    /// Returns the balance for an account
    #[must_use]
    pub fn balance(&self, id: &AccountId) -> Option<Money> {
        self.accounts.get(id).map(Account::balance)
    }

    /// Iterates over all accounts in no particular order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Deposits into an account, returning whether the balance changed
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAccount`] if the account does not exist.
    pub fn deposit(&mut self, id: &AccountId, amount: Money) -> Result<bool, LedgerError> {
        Ok(self.account_mut(id)?.deposit(amount))
    }

    /// Withdraws from an account, subject to its overdraft limit
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownAccount`] if the account does not exist.
    pub fn withdraw(&mut self, id: &AccountId, amount: Money) -> Result<bool, LedgerError> {
        Ok(self.account_mut(id)?.withdraw(amount))
    }

    fn account_mut(&mut self, id: &AccountId) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(id)
            .ok_or(LedgerError::UnknownAccount(*id))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
