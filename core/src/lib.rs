//! # Undo Ledger Core
//!
//! Core traits and types for undoable, composable commands.
//!
//! This crate provides the fundamental abstractions for building reversible
//! units of work with the Command pattern: a single [`Command`] contract,
//! plus two ways of grouping commands into a larger one.
//!
//! ## Core Concepts
//!
//! - **Command**: A reversible unit of work over some state `S`
//! - **Status**: Where a command is in its lifecycle (pending, succeeded, failed, skipped, undone)
//! - **`CompositeCommand`**: An ordered sequence of commands treated as one
//! - **Transaction**: A composite with all-or-nothing semantics
//!
//! ## Architecture Principles
//!
//! - The state a command acts on is passed in at `invoke`/`undo` time, never owned
//! - The success flag is the only failure signal; there is no error path
//! - Undo is always safe to call: it is a no-op after a failure and after a previous undo
//!
//! ## Example
//!
//! ```
//! use undo_ledger_core::{Command, CompositeCommand};
//!
//! #[derive(Debug)]
//! struct Add(i64, bool);
//!
//! impl Command<i64> for Add {
//!     fn invoke(&mut self, state: &mut i64) {
//!         *state += self.0;
//!         self.1 = true;
//!     }
//!
//!     fn undo(&mut self, state: &mut i64) {
//!         if self.1 {
//!             *state -= self.0;
//!             self.1 = false;
//!         }
//!     }
//!
//!     fn success(&self) -> bool {
//!         self.1
//!     }
//!
//!     fn can_undo(&self) -> bool {
//!         self.1
//!     }
//!
//!     fn skip(&mut self) {
//!         self.1 = false;
//!     }
//! }
//!
//! let mut total = 0;
//! let mut both = CompositeCommand::<i64>::new().with(Add(2, false)).with(Add(3, false));
//!
//! both.invoke(&mut total);
//! assert_eq!(total, 5);
//!
//! both.undo(&mut total);
//! assert_eq!(total, 0);
//! ```

/// Command module - The core trait for reversible units of work
///
/// Commands encapsulate a request against some state so that it can be
/// invoked, inspected and later reversed.
pub mod command {
    use std::fmt;

    /// Lifecycle of a single command.
    ///
    /// ```text
    /// Pending ──invoke──► Succeeded ──undo──► Undone
    ///    │
    ///    ├────invoke──► Failed
    ///    └────skip────► Skipped
    /// ```
    ///
    /// `invoke` may be called again from any state; it starts over.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub enum Status {
        /// Not invoked yet
        #[default]
        Pending,
        /// Last invocation succeeded and has not been reversed
        Succeeded,
        /// Last invocation failed; nothing to reverse
        Failed,
        /// Never ran because an earlier step of a transaction failed
        Skipped,
        /// Last invocation succeeded and has since been reversed
        Undone,
    }

    impl Status {
        /// Whether the last invocation succeeded.
        ///
        /// Stays `true` after the command is undone: the flag reports the
        /// outcome of the invocation, not whether its effect is still applied.
        #[must_use]
        pub const fn is_success(self) -> bool {
            matches!(self, Self::Succeeded | Self::Undone)
        }

        /// Whether an `undo` would reverse anything
        #[must_use]
        pub const fn can_undo(self) -> bool {
            matches!(self, Self::Succeeded)
        }
    }

    impl fmt::Display for Status {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Self::Pending => "pending",
                Self::Succeeded => "succeeded",
                Self::Failed => "failed",
                Self::Skipped => "skipped",
                Self::Undone => "undone",
            };
            f.write_str(name)
        }
    }

    /// The Command trait - a reversible unit of work over state `S`
    ///
    /// # Type Parameters
    ///
    /// - `S`: The state this command reads and mutates
    ///
    /// # Contract
    ///
    /// - `invoke` performs the work and records whether it succeeded
    /// - `undo` reverses a successful invocation, and does nothing otherwise
    /// - `undo` is one-shot: calling it twice must not reverse twice
    /// - `can_undo` reports whether an applied effect is still waiting to be
    ///   reversed; it stays `true` if a reversal was refused, so `undo` can
    ///   be retried later
    /// - `skip` records that the command was deliberately never run, forcing
    ///   `success()` to `false`
    ///
    /// # Example
    ///
    /// ```
    /// use undo_ledger_core::Command;
    ///
    /// #[derive(Debug, Default)]
    /// struct Toggle {
    ///     done: bool,
    /// }
    ///
    /// impl Command<bool> for Toggle {
    ///     fn invoke(&mut self, state: &mut bool) {
    ///         *state = !*state;
    ///         self.done = true;
    ///     }
    ///
    ///     fn undo(&mut self, state: &mut bool) {
    ///         if std::mem::take(&mut self.done) {
    ///             *state = !*state;
    ///         }
    ///     }
    ///
    ///     fn success(&self) -> bool {
    ///         self.done
    ///     }
    ///
    ///     fn can_undo(&self) -> bool {
    ///         self.done
    ///     }
    ///
    ///     fn skip(&mut self) {
    ///         self.done = false;
    ///     }
    /// }
    ///
    /// let mut light = false;
    /// let mut toggle = Toggle::default();
    /// toggle.invoke(&mut light);
    /// assert!(light);
    /// assert!(toggle.can_undo());
    /// toggle.undo(&mut light);
    /// toggle.undo(&mut light);
    /// assert!(!light);
    /// assert!(!toggle.can_undo());
    /// ```
    pub trait Command<S>: fmt::Debug {
        /// Perform the work against `state`
        fn invoke(&mut self, state: &mut S);

        /// Reverse the last successful invocation
        fn undo(&mut self, state: &mut S);

        /// Whether the last invocation succeeded
        fn success(&self) -> bool;

        /// Whether an effect of the last invocation is still applied
        fn can_undo(&self) -> bool;

        /// Mark the command as skipped without running it
        fn skip(&mut self);
    }

    impl<S, C> Command<S> for Box<C>
    where
        C: Command<S> + ?Sized,
    {
        fn invoke(&mut self, state: &mut S) {
            (**self).invoke(state);
        }

        fn undo(&mut self, state: &mut S) {
            (**self).undo(state);
        }

        fn success(&self) -> bool {
            (**self).success()
        }

        fn can_undo(&self) -> bool {
            (**self).can_undo()
        }

        fn skip(&mut self) {
            (**self).skip();
        }
    }
}

/// Composition module - Grouping commands into larger commands
pub mod composition;

pub use command::{Command, Status};
pub use composition::{CompositeCommand, Transaction, invoke_all_or_nothing, undo_in_reverse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_success_survives_undo() {
        assert!(Status::Succeeded.is_success());
        assert!(Status::Undone.is_success());
        assert!(!Status::Failed.is_success());
        assert!(!Status::Skipped.is_success());
        assert!(!Status::Pending.is_success());
    }

    #[test]
    fn only_succeeded_can_undo() {
        assert!(Status::Succeeded.can_undo());
        assert!(!Status::Undone.can_undo());
        assert!(!Status::Failed.can_undo());
        assert!(!Status::Skipped.can_undo());
        assert!(!Status::Pending.can_undo());
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Pending.to_string(), "pending");
        assert_eq!(Status::Undone.to_string(), "undone");
    }
}
