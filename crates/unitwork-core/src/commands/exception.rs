use std::rc::Rc;

use super::{expand_leaf, DataCommand, ExpandedCommand};
use crate::errors::{Result, UowError};

/// Poison leaf carrying a planning error detected while building the tree
///
/// The error is reported by `collect_exceptions` at the node's position in the
/// tree, and every phase fails with it if execution reaches the node anyway.
#[derive(Debug, Clone)]
pub struct ExceptionCommand {
    error: UowError,
}

impl ExceptionCommand {
    pub fn new(error: UowError) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &UowError {
        &self.error
    }
}

impl DataCommand for ExceptionCommand {
    fn name(&self) -> &'static str {
        "exception"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        vec![self.error.clone()]
    }

    fn begin(&self) -> Result<()> {
        Err(self.error.clone())
    }

    fn perform(&self) -> Result<()> {
        Err(self.error.clone())
    }

    fn end(&self) -> Result<()> {
        Err(self.error.clone())
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        expand_leaf(self)
    }
}

/// Leaf that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NopCommand;

impl DataCommand for NopCommand {
    fn name(&self) -> &'static str {
        "nop"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        Vec::new()
    }

    fn begin(&self) -> Result<()> {
        Ok(())
    }

    fn perform(&self) -> Result<()> {
        Ok(())
    }

    fn end(&self) -> Result<()> {
        Ok(())
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        expand_leaf(self)
    }
}
