//! Data-management command algebra
//!
//! A planned mutation of the object graph is a tree of commands. Every
//! command supports the same protocol:
//!
//! 1. `collect_exceptions()`: pre-flight validation. Returns every planning
//!    error in tree order and never mutates anything.
//! 2. `begin()`: called once per node, for all nodes, before any `perform`.
//! 3. `perform()`: the mutation itself, for all nodes, before any `end`.
//! 4. `end()`: finalization.
//!
//! Before executing, a tree is closed over its cascading side effects with
//! [`DataCommand::expand_to_all_related_objects`], which yields a flat
//! [`ExpandedCommand`]. Expanding an `ExpandedCommand` again returns the same
//! allocation.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use unitwork_core::commands::{CommandExt, CommandRef, CompositeCommand, DataCommand, NopCommand};
//!
//! let plan: CommandRef = Rc::new(CompositeCommand::new(vec![
//!     Rc::new(NopCommand) as CommandRef,
//!     Rc::new(NopCommand) as CommandRef,
//! ]));
//!
//! let expanded = plan.expand_to_all_related_objects();
//! assert!(expanded.can_execute());
//! expanded.notify_and_perform().unwrap();
//! ```

pub mod composite;
pub mod exception;
pub mod unload;

use std::fmt;
use std::rc::Rc;

use crate::errors::{Result, UowError};

pub use composite::{CompositeCommand, ExpandedCommand};
pub use exception::{ExceptionCommand, NopCommand};
pub use unload::{UnloadCommand, UnloadEndPointsCommand};

/// Shared handle to a command node
pub type CommandRef = Rc<dyn DataCommand>;

/// A node in a planned mutation
pub trait DataCommand: fmt::Debug {
    /// Short stable name used in logs
    fn name(&self) -> &'static str;

    /// Planning errors of this node and its children, in tree order
    fn collect_exceptions(&self) -> Vec<UowError>;

    /// Acquire and validate preconditions
    ///
    /// # Errors
    ///
    /// Returns the first error raised in the subtree; later siblings are not
    /// visited.
    fn begin(&self) -> Result<()>;

    /// Apply the mutation
    ///
    /// # Errors
    ///
    /// Returns the first error raised in the subtree; later siblings are not
    /// visited.
    fn perform(&self) -> Result<()>;

    /// Finalize after all mutations were attempted
    ///
    /// # Errors
    ///
    /// Returns the first error raised in the subtree; later siblings are not
    /// visited.
    fn end(&self) -> Result<()>;

    /// Close this command over all cascading side effects
    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand>;
}

/// Expansion of a leaf without cascade: a one-element plan
pub fn expand_leaf<C: DataCommand + 'static>(command: Rc<C>) -> Rc<ExpandedCommand> {
    let command: CommandRef = command;
    Rc::new(ExpandedCommand::from_commands(vec![command]))
}

/// Execution helpers available on every command
pub trait CommandExt: DataCommand {
    /// True if the tree carries no planning errors
    fn can_execute(&self) -> bool {
        self.collect_exceptions().is_empty()
    }

    /// Fail with the first planning error of the tree, if any
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `collect_exceptions`.
    fn ensure_can_execute(&self) -> Result<()> {
        match self.collect_exceptions().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run the three phases on this node
    ///
    /// # Errors
    ///
    /// Returns the first error of any phase; later phases are not run.
    fn notify_and_perform(&self) -> Result<()> {
        self.begin()?;
        self.perform()?;
        self.end()
    }
}

impl<T: DataCommand + ?Sized> CommandExt for T {}
