//! Registration agent trait and default implementation
//!
//! The agent owns the decision of *how* an end-point is attached to or
//! detached from a [`RelationEndPointMap`]. Commands only decide *when*.

use std::fmt;

use super::end_point::{EndPointRef, VirtualEndPoint};
use super::map::RelationEndPointMap;
use crate::errors::Result;

/// Attaches and detaches relation end-points to and from the map
pub trait RegistrationAgent: fmt::Debug {
    /// Register an end-point in the map
    ///
    /// # Errors
    ///
    /// Returns an error if the end-point cannot be registered, e.g. because an
    /// end-point with the same id is already present.
    fn register_end_point(
        &self,
        end_point: EndPointRef,
        map: &mut RelationEndPointMap,
    ) -> Result<()>;

    /// Detach an end-point from the map
    ///
    /// Only called for end-points that report `can_be_collected()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the end-point is not present in the map.
    fn unregister_end_point(
        &self,
        end_point: &dyn VirtualEndPoint,
        map: &mut RelationEndPointMap,
    ) -> Result<()>;
}

/// Agent that adds and removes end-points by id
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use unitwork_core::relations::{
///     DefaultRegistrationAgent, RegistrationAgent, RelationEndPointMap,
///     VirtualCollectionEndPoint, VirtualEndPoint,
/// };
/// use unitwork_core::types::{EntityId, RelationEndPointId};
///
/// let mut map = RelationEndPointMap::new();
/// let end_point = Rc::new(VirtualCollectionEndPoint::new(RelationEndPointId::new(
///     EntityId::new("Order", 1),
///     "OrderItems",
/// )));
///
/// let agent = DefaultRegistrationAgent;
/// agent.register_end_point(end_point.clone(), &mut map).unwrap();
/// agent.unregister_end_point(end_point.as_ref(), &mut map).unwrap();
/// assert!(map.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRegistrationAgent;

impl RegistrationAgent for DefaultRegistrationAgent {
    fn register_end_point(
        &self,
        end_point: EndPointRef,
        map: &mut RelationEndPointMap,
    ) -> Result<()> {
        tracing::debug!(end_point_id = %end_point.id(), "registering end-point");
        map.add_end_point(end_point)
    }

    fn unregister_end_point(
        &self,
        end_point: &dyn VirtualEndPoint,
        map: &mut RelationEndPointMap,
    ) -> Result<()> {
        tracing::debug!(end_point_id = %end_point.id(), "unregistering end-point");
        map.remove_end_point(end_point.id()).map(|_| ())
    }
}
