use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use unitwork_core_types::{EntityId, RelationEndPointId};

/// Shared handle to a virtual end-point
pub type EndPointRef = Rc<dyn VirtualEndPoint>;

/// Capabilities of a virtual relation end-point needed for unloading
///
/// A virtual end-point is the side of an association whose contents are not
/// stored with the owning entity and must be loaded separately.
pub trait VirtualEndPoint: fmt::Debug {
    fn id(&self) -> &RelationEndPointId;

    /// Discard the loaded contents; the end-point no longer counts as loaded
    fn mark_data_incomplete(&self);

    /// True if nothing keeps the end-point alive and it may be dropped from
    /// the relation end-point map
    fn can_be_collected(&self) -> bool;
}

/// In-memory virtual end-point holding the ids of the related entities
///
/// The end-point is collectible once its data is incomplete and it carries no
/// unsaved local changes.
#[derive(Debug)]
pub struct VirtualCollectionEndPoint {
    id: RelationEndPointId,
    opposite_ids: RefCell<Vec<EntityId>>,
    complete: Cell<bool>,
    changed: Cell<bool>,
}

impl VirtualCollectionEndPoint {
    /// Create an end-point whose contents have not been loaded
    pub fn new(id: RelationEndPointId) -> Self {
        Self {
            id,
            opposite_ids: RefCell::new(Vec::new()),
            complete: Cell::new(false),
            changed: Cell::new(false),
        }
    }

    /// Create an end-point with loaded contents
    pub fn loaded(id: RelationEndPointId, opposite_ids: Vec<EntityId>) -> Self {
        Self {
            id,
            opposite_ids: RefCell::new(opposite_ids),
            complete: Cell::new(true),
            changed: Cell::new(false),
        }
    }

    pub fn is_data_complete(&self) -> bool {
        self.complete.get()
    }

    pub fn has_changed(&self) -> bool {
        self.changed.get()
    }

    pub fn opposite_ids(&self) -> Vec<EntityId> {
        self.opposite_ids.borrow().clone()
    }

    /// Add a related entity; the end-point becomes changed
    pub fn add_opposite(&self, id: EntityId) {
        self.opposite_ids.borrow_mut().push(id);
        self.changed.set(true);
    }

    /// Accept local changes as the new persisted state
    pub fn commit(&self) {
        self.changed.set(false);
    }
}

impl VirtualEndPoint for VirtualCollectionEndPoint {
    fn id(&self) -> &RelationEndPointId {
        &self.id
    }

    fn mark_data_incomplete(&self) {
        if self.complete.replace(false) {
            tracing::trace!(end_point_id = %self.id, "marked data incomplete");
        }
        if !self.changed.get() {
            self.opposite_ids.borrow_mut().clear();
        }
    }

    fn can_be_collected(&self) -> bool {
        !self.complete.get() && !self.changed.get()
    }
}
