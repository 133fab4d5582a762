//! Unload commands
//!
//! Unloading drops entities and relation contents from the unit of work
//! without touching the underlying store. [`UnloadCommand`] disenlists
//! entities; its expansion cascades into an [`UnloadEndPointsCommand`] for the
//! virtual end-points those entities own.

use std::rc::Rc;

use super::{expand_leaf, CommandRef, DataCommand, ExpandedCommand};
use crate::entity::EntityRef;
use crate::errors::{Result, UowError};
use crate::registry::EnlistedEntityRegistry;
use crate::relations::{EndPointRef, RegistrationAgent, SharedEndPointMap};

/// Marks virtual end-points incomplete and unregisters the collectible ones
///
/// Cannot fail during planning: whether an end-point is collectible is only
/// known once it has been marked incomplete, so unregistration errors surface
/// from `perform` only.
#[derive(Debug, Clone)]
pub struct UnloadEndPointsCommand {
    end_points: Vec<EndPointRef>,
    registration_agent: Rc<dyn RegistrationAgent>,
    end_point_map: SharedEndPointMap,
}

impl UnloadEndPointsCommand {
    pub fn new(
        end_points: Vec<EndPointRef>,
        registration_agent: Rc<dyn RegistrationAgent>,
        end_point_map: SharedEndPointMap,
    ) -> Self {
        Self {
            end_points,
            registration_agent,
            end_point_map,
        }
    }

    pub fn end_points(&self) -> &[EndPointRef] {
        &self.end_points
    }
}

impl DataCommand for UnloadEndPointsCommand {
    fn name(&self) -> &'static str {
        "unload_end_points"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        Vec::new()
    }

    fn begin(&self) -> Result<()> {
        Ok(())
    }

    /// Marks each end-point incomplete and unregisters it right away when it
    /// can be collected; an unregistration failure leaves the remaining
    /// end-points untouched
    fn perform(&self) -> Result<()> {
        let mut map = self
            .end_point_map
            .try_borrow_mut()
            .map_err(|_| UowError::Internal {
                message: "relation end-point map is already borrowed".to_string(),
            })?;

        for end_point in &self.end_points {
            end_point.mark_data_incomplete();
            if end_point.can_be_collected() {
                self.registration_agent
                    .unregister_end_point(end_point.as_ref(), &mut map)?;
            }
        }
        Ok(())
    }

    fn end(&self) -> Result<()> {
        Ok(())
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        expand_leaf(self)
    }
}

/// Disenlists entities from the registry
///
/// Expansion adds an [`UnloadEndPointsCommand`] for the virtual end-points
/// owned by the unloaded entities, placed after this command so that the
/// entities are gone before their relations are dropped.
#[derive(Debug, Clone)]
pub struct UnloadCommand {
    entities: Vec<EntityRef>,
    registry: Rc<EnlistedEntityRegistry>,
    end_points: Vec<EndPointRef>,
    registration_agent: Rc<dyn RegistrationAgent>,
    end_point_map: SharedEndPointMap,
}

impl UnloadCommand {
    pub fn new(
        entities: Vec<EntityRef>,
        registry: Rc<EnlistedEntityRegistry>,
        end_points: Vec<EndPointRef>,
        registration_agent: Rc<dyn RegistrationAgent>,
        end_point_map: SharedEndPointMap,
    ) -> Self {
        Self {
            entities,
            registry,
            end_points,
            registration_agent,
            end_point_map,
        }
    }

    pub fn entities(&self) -> &[EntityRef] {
        &self.entities
    }
}

impl DataCommand for UnloadCommand {
    fn name(&self) -> &'static str {
        "unload"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        Vec::new()
    }

    fn begin(&self) -> Result<()> {
        Ok(())
    }

    fn perform(&self) -> Result<()> {
        for entity in &self.entities {
            self.registry.disenlist(entity)?;
        }
        Ok(())
    }

    fn end(&self) -> Result<()> {
        Ok(())
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        if self.end_points.is_empty() {
            return expand_leaf(self);
        }
        let end_points: CommandRef = Rc::new(UnloadEndPointsCommand::new(
            self.end_points.clone(),
            Rc::clone(&self.registration_agent),
            Rc::clone(&self.end_point_map),
        ));
        let this: CommandRef = self;
        Rc::new(ExpandedCommand::from_commands(vec![this, end_points]))
    }
}
