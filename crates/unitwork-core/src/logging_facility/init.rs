//! Global subscriber installation

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Output profile of the logging facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable output at debug level
    #[default]
    Development,
    /// JSON lines at info level
    Production,
    /// No output; events are observed through `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter directive applied when `RUST_LOG` is not set
    pub fn default_directive(self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("unitwork=debug"),
            Profile::Production => Some("unitwork=info"),
            Profile::Test => None,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call in a process has an effect. If some other global
/// subscriber is already installed, for instance the test capture layer, it
/// is kept.
///
/// ```
/// use unitwork_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        if let Err(err) = install(profile) {
            tracing::debug!(?profile, %err, "keeping existing global subscriber");
        }
    });
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn install(profile: Profile) -> Result<(), TryInitError> {
    match (profile, profile.default_directive()) {
        (Profile::Production, Some(directive)) => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter(directive))
            .finish()
            .try_init(),
        (_, Some(directive)) => tracing_subscriber::fmt()
            .with_env_filter(env_filter(directive))
            .finish()
            .try_init(),
        (_, None) => tracing_subscriber::registry().try_init(),
    }
}
