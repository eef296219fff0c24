//! Command composition utilities
//!
//! This module provides two ways of treating several commands as one:
//! - **[`CompositeCommand`]**: Run every child in order, undo in reverse order
//! - **[`Transaction`]**: Stop at the first failure, skip the rest, and
//!   compensate the steps that already succeeded
//!
//! # Examples
//!
//! ## Plain composite
//!
//! Children are independent: a failing child does not stop the ones after it.
//!
//! ```
//! use undo_ledger_core::{Command, CompositeCommand};
//!
//! #[derive(Debug)]
//! struct Push(&'static str, bool);
//!
//! impl Command<Vec<&'static str>> for Push {
//!     fn invoke(&mut self, log: &mut Vec<&'static str>) {
//!         log.push(self.0);
//!         self.1 = true;
//!     }
//!
//!     fn undo(&mut self, log: &mut Vec<&'static str>) {
//!         if std::mem::take(&mut self.1) {
//!             log.retain(|entry| *entry != self.0);
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
//! let mut log = Vec::new();
//! let mut composite = CompositeCommand::<Vec<&'static str>>::new()
//!     .with(Push("a", false))
//!     .with(Push("b", false));
//!
//! composite.invoke(&mut log);
//! assert_eq!(log, ["a", "b"]);
//! assert!(composite.all_succeeded());
//!
//! composite.undo(&mut log);
//! assert!(log.is_empty());
//! ```

use crate::command::Command;
use smallvec::SmallVec;
use std::fmt;

/// Inline capacity for child commands; transfers and most batches fit.
type Children<S> = SmallVec<[Box<dyn Command<S>>; 4]>;

/// Undoes `steps` from last to first.
///
/// Each step guards its own undo, so failed or skipped steps are left alone.
pub fn undo_in_reverse<S, C>(steps: &mut [C], state: &mut S)
where
    C: Command<S>,
{
    for step in steps.iter_mut().rev() {
        step.undo(state);
    }
}

/// Invokes `steps` in order with all-or-nothing semantics.
///
/// Keeps a running `ok` flag: while it holds, the next step is invoked and
/// `ok` becomes that step's success. Once a step fails, every later step is
/// skipped and the steps that had already succeeded are undone in reverse
/// order. Returns the final `ok`.
///
/// This is the engine behind [`Transaction`]; fixed-shape commands (such as
/// a two-step transfer) can call it on their own array of steps.
pub fn invoke_all_or_nothing<S, C>(steps: &mut [C], state: &mut S) -> bool
where
    C: Command<S>,
{
    let mut ok = true;
    let mut completed = 0;

    for (index, step) in steps.iter_mut().enumerate() {
        if ok {
            step.invoke(state);
            ok = step.success();
            if ok {
                completed = index + 1;
            } else {
                tracing::debug!(step = index, "Transaction step failed");
            }
        } else {
            step.skip();
        }
    }

    if !ok && completed > 0 {
        undo_in_reverse(&mut steps[..completed], state);
        tracing::debug!(compensated = completed, "Transaction rolled back");
    }

    ok
}

/// An ordered sequence of commands treated as a single command.
///
/// - `invoke` runs every child in insertion order, unconditionally
/// - `undo` reverses every child in reverse insertion order; each child
///   decides for itself whether it has anything to reverse
///
/// A child whose reversal is refused keeps its effect, and the composite
/// keeps reporting [`Command::can_undo`] until that child lets go. Calling
/// `undo` again only retries those children.
///
/// The composite does not fold its children's outcomes into its own
/// success flag: [`Command::success`] always reports `false`. Use
/// [`CompositeCommand::all_succeeded`] to ask whether every child succeeded.
/// This is the shape that can leave state half-applied; see [`Transaction`]
/// for the all-or-nothing variant.
///
/// Composites nest: a `CompositeCommand<S>` is itself a `Command<S>`.
pub struct CompositeCommand<S> {
    items: Children<S>,
    invoked: bool,
}

impl<S> CompositeCommand<S> {
    /// Creates an empty composite
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
            invoked: false,
        }
    }

    /// Creates a composite from already boxed commands, keeping their order
    #[must_use]
    pub fn from_commands<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Command<S>>>,
    {
        Self {
            items: commands.into_iter().collect(),
            invoked: false,
        }
    }

    /// Appends a command and returns the composite (builder style)
    #[must_use]
    pub fn with<C>(mut self, command: C) -> Self
    where
        C: Command<S> + 'static,
    {
        self.push(command);
        self
    }

    /// Appends a command to the end of the sequence
    pub fn push<C>(&mut self, command: C)
    where
        C: Command<S> + 'static,
    {
        self.items.push(Box::new(command));
    }

    /// Returns the number of child commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the composite has no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the child at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&dyn Command<S>> {
        self.items.get(index).map(|item| &**item)
    }

    /// Iterates over the children in invocation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command<S>> {
        self.items.iter().map(|item| &**item)
    }

    /// Whether the composite has been invoked and every child succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.invoked && self.items.iter().all(|item| item.success())
    }
}

impl<S> Default for CompositeCommand<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for CompositeCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeCommand")
            .field("items", &self.items)
            .field("invoked", &self.invoked)
            .finish()
    }
}

impl<S> Command<S> for CompositeCommand<S> {
    fn invoke(&mut self, state: &mut S) {
        tracing::trace!(children = self.items.len(), "Invoking composite");

        for item in &mut self.items {
            item.invoke(state);
        }

        self.invoked = true;
    }

    fn undo(&mut self, state: &mut S) {
        if !self.can_undo() {
            tracing::debug!("Composite has nothing to undo");
            return;
        }

        tracing::trace!(children = self.items.len(), "Undoing composite");
        undo_in_reverse(&mut self.items, state);

        if self.can_undo() {
            tracing::debug!("Composite partly undone, some children kept their effect");
        }
    }

    fn success(&self) -> bool {
        false
    }

    fn can_undo(&self) -> bool {
        self.invoked && self.items.iter().any(|item| item.can_undo())
    }

    fn skip(&mut self) {
        for item in &mut self.items {
            item.skip();
        }
        self.invoked = false;
    }
}

/// A composite with all-or-nothing semantics.
///
/// `invoke` walks the children in order while every step so far has
/// succeeded. The first failing step stops the walk:
///
/// 1. every later child is skipped, so its success flag is forced to `false`
/// 2. the children that already succeeded are undone in reverse order
/// 3. the transaction's own success flag is set to `false`
///
/// When all steps succeed the transaction succeeds, and `undo` reverses all
/// of them in reverse order. Since failed and skipped children guard their
/// own `undo`, undoing a failed transaction never reverses anything that
/// did not happen.
///
/// # Examples
///
/// ```
/// use undo_ledger_core::{Command, Transaction};
///
/// #[derive(Debug)]
/// struct Take(u32, bool);
///
/// impl Command<u32> for Take {
///     fn invoke(&mut self, stock: &mut u32) {
///         self.1 = match stock.checked_sub(self.0) {
///             Some(left) => {
///                 *stock = left;
///                 true
///             }
///             None => false,
///         };
///     }
///
///     fn undo(&mut self, stock: &mut u32) {
///         if std::mem::take(&mut self.1) {
///             *stock += self.0;
///         }
///     }
///
///     fn success(&self) -> bool {
///         self.1
///     }
///
///     fn can_undo(&self) -> bool {
///         self.1
///     }
///
///     fn skip(&mut self) {
///         self.1 = false;
///     }
/// }
///
/// let mut stock = 5;
/// let mut order = Transaction::<u32>::new().with(Take(3, false)).with(Take(4, false));
///
/// order.invoke(&mut stock);
/// assert!(!order.success());
/// assert_eq!(stock, 5); // the first take was compensated
/// ```
pub struct Transaction<S> {
    inner: CompositeCommand<S>,
    success: bool,
}

impl<S> Transaction<S> {
    /// Creates an empty transaction
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: CompositeCommand::new(),
            success: false,
        }
    }

    /// Creates a transaction from already boxed commands, keeping their order
    #[must_use]
    pub fn from_commands<I>(commands: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn Command<S>>>,
    {
        Self {
            inner: CompositeCommand::from_commands(commands),
            success: false,
        }
    }

    /// Appends a step and returns the transaction (builder style)
    #[must_use]
    pub fn with<C>(mut self, command: C) -> Self
    where
        C: Command<S> + 'static,
    {
        self.inner.push(command);
        self
    }

    /// Appends a step to the end of the transaction
    pub fn push<C>(&mut self, command: C)
    where
        C: Command<S> + 'static,
    {
        self.inner.push(command);
    }

    /// Returns the number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks if the transaction has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the step at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&dyn Command<S>> {
        self.inner.get(index)
    }

    /// Iterates over the steps in invocation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command<S>> {
        self.inner.iter()
    }
}

impl<S> Default for Transaction<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for Transaction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("steps", &self.inner.items)
            .field("success", &self.success)
            .finish()
    }
}

impl<S> Command<S> for Transaction<S> {
    fn invoke(&mut self, state: &mut S) {
        self.success = invoke_all_or_nothing(&mut self.inner.items, state);
        self.inner.invoked = true;
    }

    fn undo(&mut self, state: &mut S) {
        self.inner.undo(state);
    }

    fn success(&self) -> bool {
        self.success
    }

    fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    fn skip(&mut self) {
        self.inner.skip();
        self.success = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Appends its name to the log on invoke and `undo:<name>` on undo
    #[derive(Debug)]
    struct Step {
        name: &'static str,
        fails: bool,
        success: bool,
        undoable: bool,
        skipped: bool,
        refusals: u32,
    }

    impl Step {
        fn ok(name: &'static str) -> Self {
            Self {
                name,
                fails: false,
                success: false,
                undoable: false,
                skipped: false,
                refusals: 0,
            }
        }

        /// Refuses its first `refusals` undos, logging `refused:<name>`
        fn stubborn(name: &'static str, refusals: u32) -> Self {
            Self {
                refusals,
                ..Self::ok(name)
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                fails: true,
                ..Self::ok(name)
            }
        }
    }

    impl Command<Vec<String>> for Step {
        fn invoke(&mut self, log: &mut Vec<String>) {
            log.push(self.name.to_string());
            self.success = !self.fails;
            self.undoable = self.success;
            self.skipped = false;
        }

        fn undo(&mut self, log: &mut Vec<String>) {
            if !self.undoable {
                return;
            }
            if self.refusals > 0 {
                self.refusals -= 1;
                log.push(format!("refused:{}", self.name));
                return;
            }
            self.undoable = false;
            log.push(format!("undo:{}", self.name));
        }

        fn success(&self) -> bool {
            self.success
        }

        fn can_undo(&self) -> bool {
            self.undoable
        }

        fn skip(&mut self) {
            self.success = false;
            self.undoable = false;
            self.skipped = true;
        }
    }

    #[test]
    fn test_composite_invokes_in_order_and_undoes_in_reverse() {
        let mut log = Vec::new();
        let mut composite = CompositeCommand::<Vec<String>>::new()
            .with(Step::ok("c1"))
            .with(Step::ok("c2"))
            .with(Step::ok("c3"));

        composite.invoke(&mut log);
        assert_eq!(log, ["c1", "c2", "c3"]);

        log.clear();
        composite.undo(&mut log);
        assert_eq!(log, ["undo:c3", "undo:c2", "undo:c1"]);
    }

    #[test]
    fn test_composite_does_not_stop_on_failure() {
        let mut log = Vec::new();
        let mut composite = CompositeCommand::<Vec<String>>::new()
            .with(Step::failing("withdraw"))
            .with(Step::ok("deposit"));

        composite.invoke(&mut log);
        assert_eq!(log, ["withdraw", "deposit"]);
        assert!(!composite.all_succeeded());
        assert!(!composite.success());

        let outcomes: Vec<bool> = composite.iter().map(|step| step.success()).collect();
        assert_eq!(outcomes, [false, true]);

        // Only the successful child is reversed
        log.clear();
        composite.undo(&mut log);
        assert_eq!(log, ["undo:deposit"]);
    }

    #[test]
    fn test_composite_undo_is_one_shot() {
        let mut log = Vec::new();
        let mut composite = CompositeCommand::<Vec<String>>::new().with(Step::ok("a"));

        composite.invoke(&mut log);
        composite.undo(&mut log);
        composite.undo(&mut log);
        assert_eq!(log, ["a", "undo:a"]);
        assert!(!composite.can_undo());
    }

    #[test]
    fn test_composite_retries_refused_children_only() {
        let mut log = Vec::new();
        let mut composite = CompositeCommand::<Vec<String>>::new()
            .with(Step::ok("a"))
            .with(Step::stubborn("b", 1))
            .with(Step::ok("c"));

        composite.invoke(&mut log);
        log.clear();

        composite.undo(&mut log);
        assert_eq!(log, ["undo:c", "refused:b", "undo:a"]);
        assert!(composite.can_undo());

        log.clear();
        composite.undo(&mut log);
        assert_eq!(log, ["undo:b"]);
        assert!(!composite.can_undo());

        log.clear();
        composite.undo(&mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_composite_undo_before_invoke_is_noop() {
        let mut log = Vec::new();
        let mut composite = CompositeCommand::<Vec<String>>::new().with(Step::ok("a"));

        composite.undo(&mut log);
        assert!(log.is_empty());
        assert!(!composite.all_succeeded());
    }

    #[test]
    fn test_nested_composites() {
        let mut log = Vec::new();
        let inner = CompositeCommand::<Vec<String>>::new().with(Step::ok("b")).with(Step::ok("c"));
        let mut outer = CompositeCommand::<Vec<String>>::new()
            .with(Step::ok("a"))
            .with(inner)
            .with(Step::ok("d"));

        assert_eq!(outer.len(), 3);

        outer.invoke(&mut log);
        assert_eq!(log, ["a", "b", "c", "d"]);

        log.clear();
        outer.undo(&mut log);
        assert_eq!(log, ["undo:d", "undo:c", "undo:b", "undo:a"]);
    }

    #[test]
    fn test_fresh_children_per_instance() {
        let first = CompositeCommand::<Vec<String>>::new().with(Step::ok("a"));
        let second = CompositeCommand::<Vec<String>>::new();

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn test_from_commands_keeps_order() {
        let mut log = Vec::new();
        let commands: Vec<Box<dyn Command<Vec<String>>>> =
            vec![Box::new(Step::ok("x")), Box::new(Step::ok("y"))];
        let mut composite = CompositeCommand::from_commands(commands);

        composite.invoke(&mut log);
        assert_eq!(log, ["x", "y"]);
        assert!(composite.get(1).is_some_and(|step| step.success()));
        assert!(composite.get(2).is_none());
    }

    #[test]
    fn test_transaction_all_steps_succeed() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::new().with(Step::ok("a")).with(Step::ok("b"));

        transaction.invoke(&mut log);
        assert!(transaction.success());
        assert_eq!(log, ["a", "b"]);

        log.clear();
        transaction.undo(&mut log);
        assert_eq!(log, ["undo:b", "undo:a"]);
    }

    #[test]
    fn test_transaction_skips_after_first_failure() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::new()
            .with(Step::failing("withdraw"))
            .with(Step::ok("deposit"));

        transaction.invoke(&mut log);
        assert!(!transaction.success());
        assert_eq!(log, ["withdraw"]);
        assert!(transaction.iter().all(|step| !step.success()));

        log.clear();
        transaction.undo(&mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_transaction_compensates_succeeded_prefix() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::new()
            .with(Step::ok("a"))
            .with(Step::ok("b"))
            .with(Step::failing("c"))
            .with(Step::ok("d"));

        transaction.invoke(&mut log);
        assert!(!transaction.success());
        assert_eq!(log, ["a", "b", "c", "undo:b", "undo:a"]);
        assert!(!transaction.can_undo());

        // Already rolled back; nothing more to reverse
        log.clear();
        transaction.undo(&mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_transaction_refused_compensation_can_be_retried() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::new()
            .with(Step::stubborn("a", 1))
            .with(Step::failing("b"));

        transaction.invoke(&mut log);
        assert!(!transaction.success());
        assert_eq!(log, ["a", "b", "refused:a"]);
        assert!(transaction.can_undo());

        log.clear();
        transaction.undo(&mut log);
        assert_eq!(log, ["undo:a"]);
        assert!(!transaction.can_undo());
    }

    #[test]
    fn test_transaction_skip_forces_failure() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::new().with(Step::ok("a"));

        transaction.invoke(&mut log);
        assert!(transaction.success());

        transaction.skip();
        assert!(!transaction.success());
        assert!(transaction.iter().all(|step| !step.success()));
    }

    #[test]
    fn test_empty_transaction_succeeds() {
        let mut log = Vec::new();
        let mut transaction = Transaction::<Vec<String>>::default();

        transaction.invoke(&mut log);
        assert!(transaction.success());
        assert!(transaction.is_empty());
    }

    #[test]
    fn test_all_or_nothing_on_fixed_array() {
        let mut log = Vec::new();
        let mut steps = [Step::ok("withdraw"), Step::failing("deposit")];

        assert!(!invoke_all_or_nothing(&mut steps, &mut log));
        assert_eq!(log, ["withdraw", "deposit", "undo:withdraw"]);
        assert!(steps.iter().all(|step| !step.undoable));
    }

    #[test]
    fn test_undo_in_reverse_on_fixed_array() {
        let mut log = Vec::new();
        let mut steps = [Step::ok("a"), Step::failing("b"), Step::ok("c")];
        for step in &mut steps {
            step.invoke(&mut log);
        }

        log.clear();
        undo_in_reverse(&mut steps, &mut log);
        assert_eq!(log, ["undo:c", "undo:a"]);
        assert!(steps.iter().all(|step| !step.skipped));
    }
}
