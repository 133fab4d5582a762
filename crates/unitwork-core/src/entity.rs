//! Domain entity handles
//!
//! The unit of work never owns entity state. It holds an [`EntityRef`], a
//! shared handle whose *identity* (which allocation it points to) is distinct
//! from the *logical identity* carried by its [`EntityId`].

use std::fmt;
use std::rc::Rc;

use unitwork_core_types::{EntityId, EntityState};

/// A persistent domain object as seen by the unit of work
///
/// Implementations typically keep their mutable state behind `Cell`/`RefCell`
/// because the unit of work hands out shared handles only.
pub trait DomainEntity: fmt::Debug {
    /// Stable identity of this entity
    fn id(&self) -> &EntityId;

    /// Current persistence state
    fn state(&self) -> EntityState {
        EntityState::Unchanged
    }
}

/// Shared handle to a domain entity instance
///
/// Cloning the handle does not clone the entity; all clones compare equal
/// under [`EntityRef::ptr_eq`].
#[derive(Clone)]
pub struct EntityRef(Rc<dyn DomainEntity>);

impl EntityRef {
    /// Wrap a freshly constructed entity
    pub fn new<E: DomainEntity + 'static>(entity: E) -> Self {
        Self(Rc::new(entity))
    }

    /// Wrap an entity that is already shared
    pub fn from_rc(entity: Rc<dyn DomainEntity>) -> Self {
        Self(entity)
    }

    pub fn id(&self) -> &EntityId {
        self.0.id()
    }

    pub fn state(&self) -> EntityState {
        self.0.state()
    }

    /// True if both handles point to the same instance
    pub fn ptr_eq(&self, other: &EntityRef) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0).cast::<()>(),
            Rc::as_ptr(&other.0).cast::<()>(),
        )
    }

    /// Access the underlying entity
    pub fn entity(&self) -> &dyn DomainEntity {
        self.0.as_ref()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(self.id()).finish()
    }
}
