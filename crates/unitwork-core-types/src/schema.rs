//! Field keys and event names of the structured log schema
//!
//! Boundary events carry `component`, `op` and `event`; `end` and
//! `end_error` events add `duration_ms`, and `end_error` adds `err.kind` and
//! `err.code`. Events emitted on behalf of a unit of work carry `uow_id`.

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_UOW_ID: &str = "uow_id";

/// `Class|value` rendering of an entity id
pub const FIELD_ENTITY_ID: &str = "entity_id";
/// `Class|value/Property` rendering of a relation end-point id
pub const FIELD_END_POINT_ID: &str = "end_point_id";
/// Registry slot index assigned or tombstoned
pub const FIELD_SLOT: &str = "slot";
/// Number of commands in an expanded plan
pub const FIELD_COMMAND_COUNT: &str = "commands";
/// Number of planning errors collected from a plan
pub const FIELD_ERROR_COUNT: &str = "errors";

pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Every boundary event name, in emission order
pub const BOUNDARY_EVENTS: [&str; 3] = [EVENT_START, EVENT_END, EVENT_END_ERROR];
