//! Unit-of-work facade
//!
//! [`UnitOfWork`] owns the enlisted-entity registry, the relation end-point
//! map and the registration agent, builds commands against them and executes
//! command trees through the full protocol:
//!
//! 1. expand the tree over its cascades
//! 2. collect planning errors, refusing the plan if configured to
//! 3. run `begin`, `perform` and `end` as three full passes
//!
//! ## Example
//!
//! ```
//! use unitwork_core::{DomainEntity, EntityRef, UnitOfWork};
//! use unitwork_core::config::UnitOfWorkConfig;
//! use unitwork_core::types::EntityId;
//!
//! #[derive(Debug)]
//! struct Customer {
//!     id: EntityId,
//! }
//!
//! impl DomainEntity for Customer {
//!     fn id(&self) -> &EntityId {
//!         &self.id
//!     }
//! }
//!
//! let uow = UnitOfWork::new(UnitOfWorkConfig::default()).unwrap();
//! let customer = EntityRef::new(Customer { id: EntityId::new("Customer", 1) });
//! uow.enlist(&customer).unwrap();
//!
//! let command = uow.create_unload_command(&[customer.id().clone()], Vec::new());
//! let report = uow.execute(command).unwrap();
//!
//! assert_eq!(report.commands, 1);
//! assert!(!uow.registry().is_enlisted(&customer));
//! ```

use std::collections::HashSet;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use unitwork_core_types::{EntityId, EntityState, UnitOfWorkId};

use crate::commands::{
    CommandRef, CompositeCommand, DataCommand, ExceptionCommand, UnloadCommand,
    UnloadEndPointsCommand,
};
use crate::config::UnitOfWorkConfig;
use crate::entity::EntityRef;
use crate::errors::{ExError, Result, UowError};
use crate::registry::{EnlistedEntities, EnlistedEntityRegistry};
use crate::relations::{
    DefaultRegistrationAgent, EndPointRef, RegistrationAgent, RelationEndPointMap,
    SharedEndPointMap,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Execution phase of a command tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Begin,
    Perform,
    End,
}

/// Outcome of a successful [`UnitOfWork::execute`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub uow_id: UnitOfWorkId,
    /// Number of commands in the expanded plan
    pub commands: usize,
    pub phases_completed: Vec<Phase>,
    pub started_at: DateTime<Utc>,
}

/// Transaction-side owner of the registry and the end-point map
#[derive(Debug)]
pub struct UnitOfWork {
    id: UnitOfWorkId,
    config: UnitOfWorkConfig,
    registry: Rc<EnlistedEntityRegistry>,
    end_point_map: SharedEndPointMap,
    registration_agent: Rc<dyn RegistrationAgent>,
}

impl UnitOfWork {
    /// Create a unit of work using the [`DefaultRegistrationAgent`]
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn new(config: UnitOfWorkConfig) -> Result<Self> {
        Self::with_agent(config, Rc::new(DefaultRegistrationAgent))
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate.
    pub fn with_agent(
        config: UnitOfWorkConfig,
        registration_agent: Rc<dyn RegistrationAgent>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id: UnitOfWorkId::new(),
            registry: Rc::new(EnlistedEntityRegistry::with_capacity(
                config.registry_capacity,
            )),
            end_point_map: RelationEndPointMap::shared(),
            registration_agent,
            config,
        })
    }

    pub fn id(&self) -> &UnitOfWorkId {
        &self.id
    }

    pub fn config(&self) -> &UnitOfWorkConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<EnlistedEntityRegistry> {
        &self.registry
    }

    pub fn end_point_map(&self) -> &SharedEndPointMap {
        &self.end_point_map
    }

    pub fn registration_agent(&self) -> &Rc<dyn RegistrationAgent> {
        &self.registration_agent
    }

    /// Enlist an entity; see [`EnlistedEntityRegistry::enlist`]
    ///
    /// # Errors
    ///
    /// Returns `EntityConflict` if a different instance holds the id.
    pub fn enlist(&self, entity: &EntityRef) -> Result<bool> {
        log_op_start!("uow_enlist", uow_id = %self.id, entity_id = %entity.id());
        let start = std::time::Instant::now();

        let added = self.registry.enlist(entity).map_err(|e| {
            log_op_error!(
                "uow_enlist",
                self.describe_error(e.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                uow_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "uow_enlist",
            duration_ms = start.elapsed().as_millis() as u64,
            uow_id = %self.id,
            added = added
        );
        Ok(added)
    }

    /// Disenlist an entity; see [`EnlistedEntityRegistry::disenlist`]
    ///
    /// # Errors
    ///
    /// Returns `NotEnlisted` if this exact instance is not enlisted.
    pub fn disenlist(&self, entity: &EntityRef) -> Result<()> {
        log_op_start!("uow_disenlist", uow_id = %self.id, entity_id = %entity.id());
        let start = std::time::Instant::now();

        self.registry.disenlist(entity).map_err(|e| {
            log_op_error!(
                "uow_disenlist",
                self.describe_error(e.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                uow_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "uow_disenlist",
            duration_ms = start.elapsed().as_millis() as u64,
            uow_id = %self.id
        );
        Ok(())
    }

    /// Structured form of an error raised by this unit of work, tagged with
    /// its id
    pub fn describe_error(&self, err: UowError) -> ExError {
        ExError::from(err).with_uow_id(self.id)
    }

    pub fn lookup(&self, id: &EntityId) -> Option<EntityRef> {
        self.registry.lookup(id)
    }

    pub fn enlisted_entities(&self) -> EnlistedEntities<'_> {
        self.registry.enumerate()
    }

    /// Register a virtual end-point through the registration agent
    ///
    /// # Errors
    ///
    /// Returns `EndPointAlreadyRegistered` if the id is taken, or `Internal`
    /// if the map is borrowed elsewhere.
    pub fn register_end_point(&self, end_point: EndPointRef) -> Result<()> {
        let mut map = self
            .end_point_map
            .try_borrow_mut()
            .map_err(|_| UowError::Internal {
                message: "relation end-point map is already borrowed".to_string(),
            })?;
        self.registration_agent
            .register_end_point(end_point, &mut map)
    }

    /// Command that marks `end_points` incomplete and unregisters the
    /// collectible ones
    pub fn create_unload_end_points_command(&self, end_points: Vec<EndPointRef>) -> CommandRef {
        Rc::new(UnloadEndPointsCommand::new(
            end_points,
            Rc::clone(&self.registration_agent),
            Rc::clone(&self.end_point_map),
        ))
    }

    /// Command that unloads the entities with the given ids together with
    /// the virtual end-points they own
    ///
    /// Never fails: ids that are not enlisted and entities that are not
    /// `Unchanged` turn the result into a poison command carrying one
    /// planning error per offending id, reported by `collect_exceptions`.
    /// Repeated ids are planned once, at their first position.
    pub fn create_unload_command(
        &self,
        ids: &[EntityId],
        end_points: Vec<EndPointRef>,
    ) -> CommandRef {
        let mut entities = Vec::with_capacity(ids.len());
        let mut errors = Vec::new();
        let mut seen = HashSet::with_capacity(ids.len());

        for id in ids.iter().filter(|id| seen.insert(*id)) {
            match self.registry.lookup(id) {
                None => errors.push(UowError::UnknownEntity {
                    entity_id: id.clone(),
                }),
                Some(entity) if entity.state() != EntityState::Unchanged => {
                    errors.push(UowError::UnloadNotPossible {
                        entity_id: id.clone(),
                        state: entity.state(),
                    })
                }
                Some(entity) => entities.push(entity),
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                uow_id = %self.id,
                errors = errors.len(),
                "unload planning produced errors"
            );
            return poison(errors);
        }

        Rc::new(UnloadCommand::new(
            entities,
            Rc::clone(&self.registry),
            end_points,
            Rc::clone(&self.registration_agent),
            Rc::clone(&self.end_point_map),
        ))
    }

    /// Expand and execute a command tree
    ///
    /// # Errors
    ///
    /// Returns `PlanRejected` with every collected planning error when the
    /// plan carries any and `reject_plans_with_errors` is set. Otherwise
    /// returns the first error raised by a phase; later commands of that pass
    /// and later passes are not run, and nothing is rolled back.
    pub fn execute(&self, command: CommandRef) -> Result<ExecutionReport> {
        log_op_start!("uow_execute", uow_id = %self.id, command = command.name());
        let start = std::time::Instant::now();

        let report = self.execute_impl(command).map_err(|e| {
            log_op_error!(
                "uow_execute",
                self.describe_error(e.clone()),
                duration_ms = start.elapsed().as_millis() as u64,
                uow_id = %self.id
            );
            e
        })?;

        log_op_end!(
            "uow_execute",
            duration_ms = start.elapsed().as_millis() as u64,
            uow_id = %self.id,
            commands = report.commands
        );
        Ok(report)
    }

    fn execute_impl(&self, command: CommandRef) -> Result<ExecutionReport> {
        let started_at = Utc::now();
        let plan = command.expand_to_all_related_objects();

        if self.config.trace_plan {
            for (position, planned) in plan.commands().iter().enumerate() {
                tracing::debug!(uow_id = %self.id, position, command = planned.name(), "planned");
            }
        }

        let errors = plan.collect_exceptions();
        if !errors.is_empty() {
            if self.config.reject_plans_with_errors {
                return Err(UowError::PlanRejected { errors });
            }
            tracing::debug!(
                uow_id = %self.id,
                errors = errors.len(),
                "executing plan with planning errors"
            );
        }

        let mut phases_completed = Vec::with_capacity(3);
        plan.begin()?;
        phases_completed.push(Phase::Begin);
        plan.perform()?;
        phases_completed.push(Phase::Perform);
        plan.end()?;
        phases_completed.push(Phase::End);

        Ok(ExecutionReport {
            uow_id: self.id,
            commands: plan.commands().len(),
            phases_completed,
            started_at,
        })
    }
}

/// Poison command for a failed plan: a single exception leaf, or a composite
/// of them in the order the offending ids were given
fn poison(mut errors: Vec<UowError>) -> CommandRef {
    if errors.len() == 1 {
        if let Some(error) = errors.pop() {
            return Rc::new(ExceptionCommand::new(error));
        }
    }
    Rc::new(CompositeCommand::new(
        errors
            .into_iter()
            .map(|e| Rc::new(ExceptionCommand::new(e)) as CommandRef),
    ))
}
