//! Relation end-point boundary
//!
//! The commands in this crate never inspect the relation end-point map
//! directly; they act on end-points through the [`VirtualEndPoint`]
//! capability set and delegate registration changes to a
//! [`RegistrationAgent`].

pub mod agent;
pub mod end_point;
pub mod map;

pub use agent::{DefaultRegistrationAgent, RegistrationAgent};
pub use end_point::{EndPointRef, VirtualCollectionEndPoint, VirtualEndPoint};
pub use map::{RelationEndPointMap, SharedEndPointMap};
