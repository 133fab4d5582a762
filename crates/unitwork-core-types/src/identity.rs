//! Identity types for persistent entities and their relation end-points
//!
//! An [`EntityId`] is the stable key of one persistent entity across its whole
//! lifetime. It is compared structurally: two handles carrying equal ids
//! denote the same *logical* entity, even if they are different in-memory
//! instances.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a persistent entity: its class plus a key value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    class_id: String,
    value: String,
}

impl EntityId {
    /// Create an id from a class identifier and a key value
    pub fn new(class_id: impl Into<String>, value: impl fmt::Display) -> Self {
        Self {
            class_id: class_id.into(),
            value: value.to_string(),
        }
    }

    pub fn class_id(&self) -> &str {
        &self.class_id
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.class_id, self.value)
    }
}

/// Identity of one side of an association: the owning entity plus the
/// relation property name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationEndPointId {
    entity_id: EntityId,
    property: String,
}

impl RelationEndPointId {
    pub fn new(entity_id: EntityId, property: impl Into<String>) -> Self {
        Self {
            entity_id,
            property: property.into(),
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl fmt::Display for RelationEndPointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity_id, self.property)
    }
}

/// Persistence state of an entity as seen by the unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    /// Created in this unit of work, not yet persisted
    New,
    /// Loaded and not modified
    #[default]
    Unchanged,
    /// Loaded and modified in memory
    Changed,
    /// Marked for deletion
    Deleted,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::New => "new",
            EntityState::Unchanged => "unchanged",
            EntityState::Changed => "changed",
            EntityState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
