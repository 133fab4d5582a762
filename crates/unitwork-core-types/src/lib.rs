//! Core types shared across unitwork layers
//!
//! This crate provides the value types every layer of the unit-of-work
//! engine agrees on:
//!
//! - **Identity types**: EntityId, RelationEndPointId, EntityState
//! - **Correlation types**: UnitOfWorkId
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod identity;
pub mod schema;

pub use correlation::UnitOfWorkId;
pub use identity::{EntityId, EntityState, RelationEndPointId};
