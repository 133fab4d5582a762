//! Unit-of-work configuration
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```toml
//! log_profile = "production"
//! registry_capacity = 256
//! reject_plans_with_errors = true
//! trace_plan = false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, UowError};
use crate::logging_facility::Profile;

/// Upper bound for the initial registry capacity
pub const MAX_REGISTRY_CAPACITY: usize = 1_048_576;

const DEFAULT_REGISTRY_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitOfWorkConfig {
    /// Profile the host passes to `logging_facility::init`
    pub log_profile: Profile,
    /// Initial capacity of the registry slot vector and id index
    pub registry_capacity: usize,
    /// Refuse to execute plans that carry planning errors
    pub reject_plans_with_errors: bool,
    /// Debug-log the command names of every expanded plan
    pub trace_plan: bool,
}

impl Default for UnitOfWorkConfig {
    fn default() -> Self {
        Self {
            log_profile: Profile::default(),
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
            reject_plans_with_errors: true,
            trace_plan: false,
        }
    }
}

impl UnitOfWorkConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on malformed TOML, unknown keys or values that
    /// fail [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: UnitOfWorkConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the file cannot be read or its content is
    /// rejected by [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| UowError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&source)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` if `registry_capacity` exceeds
    /// [`MAX_REGISTRY_CAPACITY`].
    pub fn validate(&self) -> Result<()> {
        if self.registry_capacity > MAX_REGISTRY_CAPACITY {
            return Err(UowError::InvalidConfig {
                reason: format!(
                    "registry_capacity {} exceeds maximum {}",
                    self.registry_capacity, MAX_REGISTRY_CAPACITY
                ),
            });
        }
        Ok(())
    }
}
