//! Metrics for command execution.
//!
//! Counters are emitted through the [`metrics`] facade, so they are free
//! until the embedding application installs a recorder (for example a
//! Prometheus exporter).
//!
//! # Example
//!
//! ```
//! use undo_ledger_runtime::metrics;
//!
//! // Attach descriptions once at startup, after installing a recorder
//! metrics::register_metrics();
//! ```

use metrics::{counter, describe_counter};

/// Commands executed through an [`Invoker`](crate::Invoker), labelled by `outcome`
pub const COMMANDS_INVOKED_TOTAL: &str = "undo_ledger_commands_invoked_total";

/// Commands undone through an [`Invoker`](crate::Invoker)
pub const COMMANDS_UNDONE_TOTAL: &str = "undo_ledger_commands_undone_total";

/// Commands dropped from a full history
pub const HISTORY_EVICTIONS_TOTAL: &str = "undo_ledger_history_evictions_total";

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        COMMANDS_INVOKED_TOTAL,
        "Total number of commands invoked, by outcome"
    );
    describe_counter!(COMMANDS_UNDONE_TOTAL, "Total number of commands undone");
    describe_counter!(
        HISTORY_EVICTIONS_TOTAL,
        "Total number of commands evicted from a full undo history"
    );
}

pub(crate) fn record_invoked(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    counter!(COMMANDS_INVOKED_TOTAL, "outcome" => outcome).increment(1);
}

pub(crate) fn record_undone() {
    counter!(COMMANDS_UNDONE_TOTAL).increment(1);
}

pub(crate) fn record_eviction() {
    counter!(HISTORY_EVICTIONS_TOTAL).increment(1);
}
