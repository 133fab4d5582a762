use thiserror::Error;
use unitwork_core_types::{EntityId, EntityState, RelationEndPointId, UnitOfWorkId};

/// Result type alias using UowError
pub type Result<T> = std::result::Result<T, UowError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and responses produced by outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Enlistment
    Conflict,
    NotEnlisted,
    NotFound,

    // Planning
    UnloadNotPossible,
    PlanningFailed,
    PlanRejected,

    // Relation end-points
    EndPointNotRegistered,
    AlreadyRegistered,

    // Execution
    ExecutionFailed,

    // Configuration
    InvalidConfig,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Conflict => "ERR_CONFLICT",
            ExErrorKind::NotEnlisted => "ERR_NOT_ENLISTED",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnloadNotPossible => "ERR_UNLOAD_NOT_POSSIBLE",
            ExErrorKind::PlanningFailed => "ERR_PLANNING_FAILED",
            ExErrorKind::PlanRejected => "ERR_PLAN_REJECTED",
            ExErrorKind::EndPointNotRegistered => "ERR_END_POINT_NOT_REGISTERED",
            ExErrorKind::AlreadyRegistered => "ERR_ALREADY_REGISTERED",
            ExErrorKind::ExecutionFailed => "ERR_EXECUTION_FAILED",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Structured representation of a [`UowError`] with classification fields for
/// programmatic handling and context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    end_point_id: Option<String>,
    uow_id: Option<UnitOfWorkId>,
    message: String,
    related: Vec<ExError>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            end_point_id: None,
            uow_id: None,
            message: String::new(),
            related: Vec::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    /// Add relation end-point ID context
    pub fn with_end_point_id(mut self, id: impl ToString) -> Self {
        self.end_point_id = Some(id.to_string());
        self
    }

    /// Add unit-of-work ID context
    pub fn with_uow_id(mut self, uow_id: UnitOfWorkId) -> Self {
        self.uow_id = Some(uow_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the individual errors an aggregate error was built from
    pub fn with_related(mut self, related: Vec<ExError>) -> Self {
        self.related = related;
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn end_point_id(&self) -> Option<&str> {
        self.end_point_id.as_deref()
    }

    pub fn uow_id(&self) -> Option<&UnitOfWorkId> {
        self.uow_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Errors aggregated into this one (populated on PlanRejected)
    pub fn related(&self) -> &[ExError] {
        &self.related
    }

    /// Render as a JSON payload for outer layers
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "code": self.code(),
            "message": self.message,
        });
        if let Some(op) = &self.op {
            value["op"] = serde_json::Value::from(op.as_str());
        }
        if let Some(entity_id) = &self.entity_id {
            value["entity_id"] = serde_json::Value::from(entity_id.as_str());
        }
        if let Some(end_point_id) = &self.end_point_id {
            value["end_point_id"] = serde_json::Value::from(end_point_id.as_str());
        }
        if let Some(uow_id) = &self.uow_id {
            value["uow_id"] = serde_json::Value::from(uow_id.to_string());
        }
        if !self.related.is_empty() {
            value["related"] = self.related.iter().map(ExError::to_json).collect();
        }
        value
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(end_point_id) = &self.end_point_id {
            write!(f, " (end_point_id: {})", end_point_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Coarse classification of where in the unit-of-work protocol an error arises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Known while building the command tree; surfaced by `collect_exceptions`
    Planning,
    /// Two distinct instances claimed the same identity
    Conflict,
    /// Disenlistment of something the registry does not hold
    NotEnlisted,
    /// Raised by a command while performing its mutation
    Execution,
    Configuration,
    Internal,
}

/// Error taxonomy for unit-of-work operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UowError {
    // ===== Enlistment Errors =====
    /// A different instance is already enlisted under this id
    #[error("A different instance is already enlisted for entity {entity_id}")]
    EntityConflict { entity_id: EntityId },

    /// The entity (or this particular instance of it) is not enlisted
    #[error("Entity is not enlisted: {entity_id}")]
    NotEnlisted { entity_id: EntityId },

    // ===== Planning Errors =====
    /// No instance is known for the id
    #[error("Entity is not known to this unit of work: {entity_id}")]
    UnknownEntity { entity_id: EntityId },

    /// Entity cannot be unloaded in its current state
    #[error("Entity {entity_id} cannot be unloaded because it is {state}")]
    UnloadNotPossible {
        entity_id: EntityId,
        state: EntityState,
    },

    /// Generic planning failure detected while building a command tree
    #[error("Planning failed: {reason}")]
    Planning { reason: String },

    /// Plan was refused because collection reported planning errors
    #[error("Plan rejected: {} planning error(s) collected", .errors.len())]
    PlanRejected { errors: Vec<UowError> },

    // ===== Relation End-Point Errors =====
    /// End-point is not present in the relation end-point map
    #[error("Relation end-point is not registered: {end_point_id}")]
    EndPointNotRegistered { end_point_id: RelationEndPointId },

    /// End-point is already present in the relation end-point map
    #[error("Relation end-point is already registered: {end_point_id}")]
    EndPointAlreadyRegistered { end_point_id: RelationEndPointId },

    // ===== Execution Errors =====
    /// A command failed while performing its mutation
    #[error("Execution of '{op}' failed: {reason}")]
    Execution { op: String, reason: String },

    // ===== Generic Errors =====
    /// Configuration could not be read or is out of range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl UowError {
    /// Classify this error within the unit-of-work protocol
    pub fn category(&self) -> ErrorCategory {
        match self {
            UowError::EntityConflict { .. } => ErrorCategory::Conflict,
            UowError::NotEnlisted { .. } => ErrorCategory::NotEnlisted,
            UowError::UnknownEntity { .. }
            | UowError::UnloadNotPossible { .. }
            | UowError::Planning { .. }
            | UowError::PlanRejected { .. } => ErrorCategory::Planning,
            UowError::EndPointNotRegistered { .. }
            | UowError::EndPointAlreadyRegistered { .. }
            | UowError::Execution { .. } => ErrorCategory::Execution,
            UowError::InvalidConfig { .. } => ErrorCategory::Configuration,
            UowError::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Conversion from UowError to the canonical ExError
impl From<UowError> for ExError {
    fn from(err: UowError) -> Self {
        match err {
            UowError::EntityConflict { entity_id } => ExError::new(ExErrorKind::Conflict)
                .with_op("enlist")
                .with_entity_id(entity_id)
                .with_message("A different instance is already enlisted"),

            UowError::NotEnlisted { entity_id } => ExError::new(ExErrorKind::NotEnlisted)
                .with_entity_id(entity_id)
                .with_message("Entity is not enlisted"),

            UowError::UnknownEntity { entity_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(entity_id)
                .with_message("Entity is not known to this unit of work"),

            UowError::UnloadNotPossible { entity_id, state } => {
                ExError::new(ExErrorKind::UnloadNotPossible)
                    .with_op("unload")
                    .with_entity_id(entity_id)
                    .with_message(format!("Entity is {}", state))
            }

            UowError::Planning { reason } => {
                ExError::new(ExErrorKind::PlanningFailed).with_message(reason)
            }

            UowError::PlanRejected { errors } => {
                let count = errors.len();
                ExError::new(ExErrorKind::PlanRejected)
                    .with_op("execute")
                    .with_message(format!("{} planning error(s) collected", count))
                    .with_related(errors.into_iter().map(ExError::from).collect())
            }

            UowError::EndPointNotRegistered { end_point_id } => {
                ExError::new(ExErrorKind::EndPointNotRegistered)
                    .with_entity_id(end_point_id.entity_id())
                    .with_end_point_id(end_point_id)
                    .with_message("Relation end-point is not registered")
            }

            UowError::EndPointAlreadyRegistered { end_point_id } => {
                ExError::new(ExErrorKind::AlreadyRegistered)
                    .with_entity_id(end_point_id.entity_id())
                    .with_end_point_id(end_point_id)
                    .with_message("Relation end-point is already registered")
            }

            UowError::Execution { op, reason } => ExError::new(ExErrorKind::ExecutionFailed)
                .with_op(op)
                .with_message(reason),

            UowError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::InvalidConfig).with_message(reason)
            }

            UowError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from toml::de::Error to UowError
impl From<toml::de::Error> for UowError {
    fn from(err: toml::de::Error) -> Self {
        UowError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Conversion from std::io::Error to UowError
impl From<std::io::Error> for UowError {
    fn from(err: std::io::Error) -> Self {
        UowError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
