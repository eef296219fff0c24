//! # Undo Ledger Testing
//!
//! Testing utilities and helpers for undoable commands.
//!
//! This crate provides:
//! - [`CommandTest`]: Given-When-Then builder for a single command
//! - [`mocks::RecordingCommand`]: A command that records every call in a shared [`mocks::CallLog`]
//! - [`properties`]: proptest strategies for amounts and outcome patterns
//! - [`helpers::init_test_tracing`]: Log capture for tests
//!
//! ## Example
//!
//! ```
//! use undo_ledger_core::{Command, CompositeCommand};
//! use undo_ledger_testing::mocks::{Call, CallLog, RecordingCommand};
//!
//! let log = CallLog::new();
//! let mut composite = CompositeCommand::<()>::new()
//!     .with(RecordingCommand::succeeding("c1", &log))
//!     .with(RecordingCommand::succeeding("c2", &log));
//!
//! composite.invoke(&mut ());
//! composite.undo(&mut ());
//!
//! assert_eq!(log.invoked(), ["c1", "c2"]);
//! assert_eq!(log.undone(), ["c2", "c1"]);
//! assert_eq!(log.calls()[0], Call::Invoke("c1"));
//! ```


pub use command_test::{CommandTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use std::cell::RefCell;
    use std::rc::Rc;
    use undo_ledger_core::{Command, Status};

    /// One recorded call on a [`RecordingCommand`]
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Call {
        /// `invoke` ran
        Invoke(&'static str),
        /// `undo` reversed a successful invocation
        Undo(&'static str),
        /// `skip` was called
        Skip(&'static str),
    }

    /// Shared, ordered record of calls across several commands
    ///
    /// Cloning the log shares it; every clone sees the same calls.
    #[derive(Clone, Debug, Default)]
    pub struct CallLog {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl CallLog {
        /// Create an empty log
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn record(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }

        /// All calls in the order they happened
        #[must_use]
        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        /// Names of invoked commands, in invocation order
        #[must_use]
        pub fn invoked(&self) -> Vec<&'static str> {
            self.filter(|call| match call {
                Call::Invoke(name) => Some(name),
                _ => None,
            })
        }

        /// Names of undone commands, in undo order
        #[must_use]
        pub fn undone(&self) -> Vec<&'static str> {
            self.filter(|call| match call {
                Call::Undo(name) => Some(name),
                _ => None,
            })
        }

        /// Names of skipped commands
        #[must_use]
        pub fn skipped(&self) -> Vec<&'static str> {
            self.filter(|call| match call {
                Call::Skip(name) => Some(name),
                _ => None,
            })
        }

        /// Forget every recorded call
        pub fn clear(&self) {
            self.calls.borrow_mut().clear();
        }

        fn filter(&self, pick: impl Fn(Call) -> Option<&'static str>) -> Vec<&'static str> {
            self.calls.borrow().iter().copied().filter_map(pick).collect()
        }
    }

    /// A command with a scripted outcome that records its calls
    ///
    /// Works against any state type and never touches it. Follows the
    /// command contract: `undo` is recorded only when it reverses a
    /// successful invocation, and only once.
    #[derive(Debug)]
    pub struct RecordingCommand {
        name: &'static str,
        succeeds: bool,
        status: Status,
        log: CallLog,
    }

    impl RecordingCommand {
        /// A command whose invocations always succeed
        #[must_use]
        pub fn succeeding(name: &'static str, log: &CallLog) -> Self {
            Self::new(name, true, log)
        }

        /// A command whose invocations always fail
        #[must_use]
        pub fn failing(name: &'static str, log: &CallLog) -> Self {
            Self::new(name, false, log)
        }

        /// A command with the given scripted outcome
        #[must_use]
        pub fn new(name: &'static str, succeeds: bool, log: &CallLog) -> Self {
            Self {
                name,
                succeeds,
                status: Status::Pending,
                log: log.clone(),
            }
        }

        /// Current lifecycle status
        #[must_use]
        pub const fn status(&self) -> Status {
            self.status
        }
    }

    impl<S> Command<S> for RecordingCommand {
        fn invoke(&mut self, _state: &mut S) {
            self.log.record(Call::Invoke(self.name));
            self.status = if self.succeeds {
                Status::Succeeded
            } else {
                Status::Failed
            };
        }

        fn undo(&mut self, _state: &mut S) {
            if self.status.can_undo() {
                self.log.record(Call::Undo(self.name));
                self.status = Status::Undone;
            }
        }

        fn success(&self) -> bool {
            self.status.is_success()
        }

        fn can_undo(&self) -> bool {
            self.status.can_undo()
        }

        fn skip(&mut self) {
            self.log.record(Call::Skip(self.name));
            self.status = Status::Skipped;
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    /// Route `tracing` output through the test harness.
    ///
    /// Honours `RUST_LOG`; safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
///
/// Amounts are expressed in cents so any fixed-point money type can build
/// on them.
pub mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Largest magnitude produced by the amount strategies: ten million dollars
    pub const MAX_CENTS: i64 = 1_000_000_000;

    /// Any amount in cents, including negative ones
    pub fn any_cents() -> impl Strategy<Value = i64> {
        -MAX_CENTS..=MAX_CENTS
    }

    /// Zero or positive amounts in cents
    pub fn non_negative_cents() -> impl Strategy<Value = i64> {
        0..=MAX_CENTS
    }

    /// Success/failure scripts for a sequence of up to `max_len` commands
    pub fn outcomes(max_len: usize) -> impl Strategy<Value = Vec<bool>> {
        vec(any::<bool>(), 0..=max_len)
    }
}
