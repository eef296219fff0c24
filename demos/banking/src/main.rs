//! Simple CLI demo for the banking example.
//!
//! Replays deposits, refused withdrawals, an unsafe composite transfer, a
//! safe transfer, and undo through the invoker.

use banking::{AccountCommand, AccountId, BankConfig, Ledger, Money, TransferCommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use undo_ledger_core::{Command, CompositeCommand, Transaction};
use undo_ledger_runtime::Invoker;

fn balance(ledger: &Ledger, id: &AccountId) -> String {
    ledger
        .get(id)
        .map_or_else(|| "closed".to_string(), ToString::to_string)
}

fn main() -> anyhow::Result<()> {
    let config = BankConfig::try_from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    undo_ledger_runtime::metrics::register_metrics();

    println!("=== Banking Example: Undoable Commands ===\n");
    println!("Overdraft limit for new accounts: {}", config.overdraft_limit);

    let mut ledger = config.ledger();

    // Deposit and undo
    println!("\n=== Deposit and Undo ===");
    let account = ledger.open(Money::ZERO);
    let mut deposit = AccountCommand::deposit(account, Money::from_dollars(1000));
    deposit.invoke(&mut ledger);
    println!("After deposit: {}", balance(&ledger, &account));
    deposit.undo(&mut ledger);
    println!("After undo:    {}", balance(&ledger, &account));

    // Withdrawal past the overdraft limit
    println!("\n=== Impossible Withdrawal ===");
    let mut withdraw = AccountCommand::withdraw(account, Money::from_dollars(700));
    withdraw.invoke(&mut ledger);
    println!("Withdraw $700 succeeded: {}", withdraw.success());
    withdraw.undo(&mut ledger);
    println!("After undo:    {}", balance(&ledger, &account));

    // Plain composite: each step runs on its own
    println!("\n=== Composite Transfer (unsafe) ===");
    let poor = ledger.open(Money::from_dollars(100));
    let rich = ledger.open(Money::ZERO);
    let mut composite = CompositeCommand::new()
        .with(AccountCommand::withdraw(poor, Money::from_dollars(1000)))
        .with(AccountCommand::deposit(rich, Money::from_dollars(1000)));
    composite.invoke(&mut ledger);
    println!("All steps succeeded: {}", composite.all_succeeded());
    println!("Source:      {}", balance(&ledger, &poor));
    println!("Destination: {}", balance(&ledger, &rich));
    println!("Money was created out of nothing.");

    // Transfer: deposit only after a successful withdrawal
    println!("\n=== Transfer Command (safe) ===");
    let source = ledger.open(Money::from_dollars(100));
    let destination = ledger.open(Money::ZERO);
    let mut transfer = TransferCommand::new(source, destination, Money::from_dollars(1000));
    transfer.invoke(&mut ledger);
    println!("Transfer succeeded: {}", transfer.success());
    println!("Source:      {}", balance(&ledger, &source));
    println!("Destination: {}", balance(&ledger, &destination));

    println!("\n=== Transfer with Sufficient Funds ===");
    let alice = ledger.open(Money::from_dollars(1000));
    let bob = ledger.open(Money::ZERO);
    let mut transfer = TransferCommand::new(alice, bob, Money::from_dollars(1000));
    transfer.invoke(&mut ledger);
    println!("Transfer succeeded: {}", transfer.success());
    println!("Alice: {}", balance(&ledger, &alice));
    println!("Bob:   {}", balance(&ledger, &bob));
    transfer.undo(&mut ledger);
    println!("After undo:");
    println!("Alice: {}", balance(&ledger, &alice));
    println!("Bob:   {}", balance(&ledger, &bob));

    // Invoker: history of commands, undone newest first
    println!("\n=== Invoker History ===");
    let mut invoker = Invoker::new(config.history());
    invoker.execute(&mut ledger, AccountCommand::deposit(bob, Money::from_dollars(250)));
    invoker.execute(
        &mut ledger,
        TransferCommand::new(bob, alice, Money::from_dollars(100)),
    );

    // The third payment would take Alice past the overdraft limit
    let payroll = Transaction::new()
        .with(TransferCommand::new(alice, bob, Money::from_dollars(600)))
        .with(TransferCommand::new(alice, bob, Money::from_dollars(600)))
        .with(TransferCommand::new(alice, bob, Money::from_dollars(600)));
    let paid = invoker.execute(&mut ledger, payroll);
    println!("Payroll batch succeeded: {paid}");
    println!("Alice: {}", balance(&ledger, &alice));
    println!("Bob:   {}", balance(&ledger, &bob));

    let undone = invoker.undo_all(&mut ledger);
    println!("Undid {undone} commands");
    println!("Alice: {}", balance(&ledger, &alice));
    println!("Bob:   {}", balance(&ledger, &bob));

    println!("\n=== Demo Complete ===");
    Ok(())
}
