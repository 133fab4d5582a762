use std::cell::{Cell, RefCell};
use std::rc::Rc;

use unitwork_core::commands::{expand_leaf, DataCommand, ExpandedCommand};
use unitwork_core::relations::{
    DefaultRegistrationAgent, EndPointRef, RegistrationAgent, RelationEndPointMap,
    VirtualEndPoint,
};
use unitwork_core::types::{EntityId, EntityState, RelationEndPointId};
use unitwork_core::{DomainEntity, EntityRef, Result, UowError};

/// Shared call log: one `"<label>.<phase>"` entry per invocation
#[allow(dead_code)]
pub type CallLog = Rc<RefCell<Vec<String>>>;

#[allow(dead_code)]
pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Leaf command that records every phase call into a shared log
///
/// Optionally fails in one phase with an `Execution` error.
#[allow(dead_code)]
#[derive(Debug)]
pub struct RecordingCommand {
    label: String,
    log: CallLog,
    fail_in: Option<&'static str>,
}

#[allow(dead_code)]
impl RecordingCommand {
    pub fn new(label: &str, log: &CallLog) -> Self {
        Self {
            label: label.to_string(),
            log: Rc::clone(log),
            fail_in: None,
        }
    }

    pub fn failing_in(label: &str, log: &CallLog, phase: &'static str) -> Self {
        Self {
            fail_in: Some(phase),
            ..Self::new(label, log)
        }
    }

    fn record(&self, phase: &'static str) -> Result<()> {
        self.log
            .borrow_mut()
            .push(format!("{}.{}", self.label, phase));
        if self.fail_in == Some(phase) {
            return Err(UowError::Execution {
                op: phase.to_string(),
                reason: format!("{} failed", self.label),
            });
        }
        Ok(())
    }
}

impl DataCommand for RecordingCommand {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn collect_exceptions(&self) -> Vec<UowError> {
        self.log
            .borrow_mut()
            .push(format!("{}.collect", self.label));
        Vec::new()
    }

    fn begin(&self) -> Result<()> {
        self.record("begin")
    }

    fn perform(&self) -> Result<()> {
        self.record("perform")
    }

    fn end(&self) -> Result<()> {
        self.record("end")
    }

    fn expand_to_all_related_objects(self: Rc<Self>) -> Rc<ExpandedCommand> {
        expand_leaf(self)
    }
}

/// Virtual end-point counting how often it is marked incomplete
#[allow(dead_code)]
#[derive(Debug)]
pub struct CountingEndPoint {
    id: RelationEndPointId,
    collectible: bool,
    marked: Cell<usize>,
}

#[allow(dead_code)]
impl CountingEndPoint {
    pub fn new(owner: EntityId, property: &str, collectible: bool) -> Rc<Self> {
        Rc::new(Self {
            id: RelationEndPointId::new(owner, property),
            collectible,
            marked: Cell::new(0),
        })
    }

    pub fn marked_count(&self) -> usize {
        self.marked.get()
    }
}

impl VirtualEndPoint for CountingEndPoint {
    fn id(&self) -> &RelationEndPointId {
        &self.id
    }

    fn mark_data_incomplete(&self) {
        self.marked.set(self.marked.get() + 1);
    }

    fn can_be_collected(&self) -> bool {
        self.collectible
    }
}

/// Registration agent that records unregistrations and delegates to the
/// default agent
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct CountingAgent {
    unregistered: RefCell<Vec<RelationEndPointId>>,
}

#[allow(dead_code)]
impl CountingAgent {
    pub fn unregistered(&self) -> Vec<RelationEndPointId> {
        self.unregistered.borrow().clone()
    }

    pub fn unregister_count(&self, id: &RelationEndPointId) -> usize {
        self.unregistered.borrow().iter().filter(|u| *u == id).count()
    }
}

impl RegistrationAgent for CountingAgent {
    fn register_end_point(
        &self,
        end_point: EndPointRef,
        map: &mut RelationEndPointMap,
    ) -> Result<()> {
        DefaultRegistrationAgent.register_end_point(end_point, map)
    }

    fn unregister_end_point(
        &self,
        end_point: &dyn VirtualEndPoint,
        map: &mut RelationEndPointMap,
    ) -> Result<()> {
        self.unregistered.borrow_mut().push(end_point.id().clone());
        DefaultRegistrationAgent.unregister_end_point(end_point, map)
    }
}

/// Minimal domain entity with a settable persistence state
#[allow(dead_code)]
#[derive(Debug)]
pub struct TestEntity {
    id: EntityId,
    state: Cell<EntityState>,
}

#[allow(dead_code)]
impl TestEntity {
    pub fn set_state(&self, state: EntityState) {
        self.state.set(state);
    }
}

impl DomainEntity for TestEntity {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn state(&self) -> EntityState {
        self.state.get()
    }
}

/// Create an unchanged test entity of class `class_id`
#[allow(dead_code)]
pub fn entity(class_id: &str, value: u32) -> EntityRef {
    EntityRef::new(TestEntity {
        id: EntityId::new(class_id, value),
        state: Cell::new(EntityState::Unchanged),
    })
}

/// Create a test entity in the given state, keeping a typed handle
#[allow(dead_code)]
pub fn entity_in_state(class_id: &str, value: u32, state: EntityState) -> (Rc<TestEntity>, EntityRef) {
    let typed = Rc::new(TestEntity {
        id: EntityId::new(class_id, value),
        state: Cell::new(state),
    });
    let handle = EntityRef::from_rc(typed.clone());
    (typed, handle)
}
