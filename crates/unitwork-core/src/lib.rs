//! unitwork core - unit-of-work command engine
//!
//! This crate provides the transaction-side machinery that turns planned
//! mutations of an object graph into executable command trees:
//! - Enlisted-entity registry with stable slots and tombstones
//! - Command algebra (exception, composite, expanded, unload) with a
//!   collect / begin / perform / end protocol
//! - Relation end-point boundary (virtual end-points, end-point map,
//!   registration agent)
//! - Unit-of-work facade that plans, validates and executes command trees
//! - Structured error and logging facilities, TOML configuration
//!
//! Everything here is single-threaded: handles are `Rc`, shared mutable state
//! sits behind `RefCell`.

pub mod commands;
pub mod config;
pub mod entity;
pub mod errors;
pub mod logging_facility;
pub mod registry;
pub mod relations;
pub mod uow;

pub use unitwork_core_types as types;

// Re-export commonly used types
pub use commands::{CommandExt, CommandRef, DataCommand};
pub use config::UnitOfWorkConfig;
pub use entity::{DomainEntity, EntityRef};
pub use errors::{ErrorCategory, ExError, ExErrorKind, Result, UowError};
pub use registry::EnlistedEntityRegistry;
pub use uow::{ExecutionReport, Phase, UnitOfWork};
