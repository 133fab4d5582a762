use std::rc::Rc;

use super::{CommandRef, DataCommand};
use crate::errors::{Result, UowError};

/// Ordered aggregate of commands
///
/// Children are visited in declaration order for every operation, in every
/// phase, so that dependencies expressed by construction order hold
/// throughout.
#[derive(Debug, Clone, Default)]
pub struct CompositeCommand {
    commands: Vec<CommandRef>,
}

impl CompositeCommand {
    /// Composite running `commands` in the given order
    pub fn new(commands: impl IntoIterator<Item = CommandRef>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    /// Direct children, unflattened
    pub fn commands(&self) -> &[CommandRef] {
        &self.commands
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// New composite with `more` appended; `self` is left untouched
    pub fn combine_with(&self, more: impl IntoIterator<Item = CommandRef>) -> CompositeCommand {
        Self::new(self.commands.iter().cloned().chain(more))
    }
}

impl DataCommand for CompositeCommand {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        self.commands
            .iter()
            .flat_map(|command| command.collect_exceptions())
            .collect()
    }

    fn begin(&self) -> Result<()> {
        for command in &self.commands {
            command.begin()?;
        }
        Ok(())
    }

    fn perform(&self) -> Result<()> {
        for command in &self.commands {
            command.perform()?;
        }
        Ok(())
    }

    fn end(&self) -> Result<()> {
        for command in &self.commands {
            command.end()?;
        }
        Ok(())
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        let mut flattened = Vec::with_capacity(self.commands.len());
        for command in &self.commands {
            let expanded = Rc::clone(command).expand_to_all_related_objects();
            flattened.extend(expanded.commands().iter().cloned());
        }
        Rc::new(ExpandedCommand::from_commands(flattened))
    }
}

/// A command tree that has already been closed over its cascades
///
/// Wraps exactly one flat [`CompositeCommand`]. Expanding it again is the
/// identity: the same `Rc` is returned, so a plan expanded defensively by
/// several planning layers still executes each cascade once.
#[derive(Debug, Clone, Default)]
pub struct ExpandedCommand {
    composite: CompositeCommand,
}

impl ExpandedCommand {
    pub fn new(composite: CompositeCommand) -> Self {
        Self { composite }
    }

    /// Plan over already expanded `commands`, kept in order
    pub fn from_commands(commands: impl IntoIterator<Item = CommandRef>) -> Self {
        Self::new(CompositeCommand::new(commands))
    }

    pub fn composite(&self) -> &CompositeCommand {
        &self.composite
    }

    /// The flat plan, in execution order
    pub fn commands(&self) -> &[CommandRef] {
        self.composite.commands()
    }

    /// New plan with `more` appended; `self` is left untouched
    ///
    /// The appended commands are taken as given: callers pass commands that
    /// are already expanded.
    pub fn combine_with(&self, more: impl IntoIterator<Item = CommandRef>) -> ExpandedCommand {
        Self::new(self.composite.combine_with(more))
    }
}

impl DataCommand for ExpandedCommand {
    fn name(&self) -> &'static str {
        "expanded"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        self.composite.collect_exceptions()
    }

    fn begin(&self) -> Result<()> {
        self.composite.begin()
    }

    fn perform(&self) -> Result<()> {
        self.composite.perform()
    }

    fn end(&self) -> Result<()> {
        self.composite.end()
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{ExceptionCommand, NopCommand};

    fn planning(reason: &str) -> UowError {
        UowError::Planning {
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_empty_composite_is_a_noop() {
        let composite = CompositeCommand::default();
        assert!(composite.is_empty());
        assert!(composite.collect_exceptions().is_empty());
        composite.begin().unwrap();
        composite.perform().unwrap();
        composite.end().unwrap();
    }

    #[test]
    fn test_composite_expansion_flattens_nested_composites() {
        let inner: CommandRef = Rc::new(CompositeCommand::new(vec![
            Rc::new(NopCommand) as CommandRef,
            Rc::new(NopCommand) as CommandRef,
        ]));
        let outer = Rc::new(CompositeCommand::new(vec![
            Rc::new(NopCommand) as CommandRef,
            inner,
        ]));

        let expanded = outer.expand_to_all_related_objects();

        assert_eq!(expanded.commands().len(), 3);
        assert!(expanded.commands().iter().all(|c| c.name() == "nop"));
    }

    #[test]
    fn test_expanded_expansion_returns_same_allocation() {
        let expanded = Rc::new(ExpandedCommand::from_commands(vec![
            Rc::new(NopCommand) as CommandRef
        ]));
        let again = Rc::clone(&expanded).expand_to_all_related_objects();
        assert!(Rc::ptr_eq(&expanded, &again));
    }

    #[test]
    fn test_combine_with_leaves_original_untouched() {
        let original = ExpandedCommand::from_commands(vec![
            Rc::new(ExceptionCommand::new(planning("a"))) as CommandRef
        ]);

        let combined = original.combine_with(vec![
            Rc::new(ExceptionCommand::new(planning("b"))) as CommandRef
        ]);

        assert_eq!(original.collect_exceptions(), vec![planning("a")]);
        assert_eq!(
            combined.collect_exceptions(),
            vec![planning("a"), planning("b")]
        );
    }

    #[test]
    fn test_expanding_nested_expanded_plan_reuses_its_commands() {
        let nop: CommandRef = Rc::new(NopCommand);
        let expanded: CommandRef = Rc::new(ExpandedCommand::from_commands(vec![nop.clone()]));
        let outer = Rc::new(CompositeCommand::new(vec![expanded]));

        let flattened = outer.expand_to_all_related_objects();

        assert_eq!(flattened.commands().len(), 1);
        assert!(Rc::ptr_eq(&flattened.commands()[0], &nop));
    }
}
