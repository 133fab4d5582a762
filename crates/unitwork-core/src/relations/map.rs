use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use unitwork_core_types::RelationEndPointId;

use super::end_point::EndPointRef;
use crate::errors::{Result, UowError};

/// Relation end-point map shared between a unit of work and its commands
pub type SharedEndPointMap = Rc<RefCell<RelationEndPointMap>>;

/// In-memory map of the relation end-points registered in a unit of work
///
/// Mutated through a [`RegistrationAgent`](super::RegistrationAgent).
#[derive(Debug, Default)]
pub struct RelationEndPointMap {
    end_points: HashMap<RelationEndPointId, EndPointRef>,
}

impl RelationEndPointMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty map wrapped for sharing
    pub fn shared() -> SharedEndPointMap {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.end_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_points.is_empty()
    }

    pub fn contains(&self, id: &RelationEndPointId) -> bool {
        self.end_points.contains_key(id)
    }

    pub fn get(&self, id: &RelationEndPointId) -> Option<EndPointRef> {
        self.end_points.get(id).cloned()
    }

    /// Registered end-point ids in sorted order
    pub fn ids(&self) -> Vec<RelationEndPointId> {
        let mut ids: Vec<_> = self.end_points.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Add an end-point to the map
    ///
    /// # Errors
    ///
    /// Returns `EndPointAlreadyRegistered` if an end-point with the same id
    /// is present.
    pub fn add_end_point(&mut self, end_point: EndPointRef) -> Result<()> {
        let id = end_point.id().clone();
        if self.end_points.contains_key(&id) {
            return Err(UowError::EndPointAlreadyRegistered { end_point_id: id });
        }
        self.end_points.insert(id, end_point);
        Ok(())
    }

    /// Remove an end-point from the map
    ///
    /// # Errors
    ///
    /// Returns `EndPointNotRegistered` if no end-point with this id is present.
    pub fn remove_end_point(&mut self, id: &RelationEndPointId) -> Result<EndPointRef> {
        self.end_points
            .remove(id)
            .ok_or_else(|| UowError::EndPointNotRegistered {
                end_point_id: id.clone(),
            })
    }
}
