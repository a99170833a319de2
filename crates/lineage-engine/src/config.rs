//! Configuration for derivation runs.
//!
//! Loaded from TOML:
//!
//! ```toml
//! lifetime_threshold = 125
//! derivable_types = ["birth", "death", "burial"]
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{LineageError, Result};
use crate::event_type::{EventType, EventTypeRegistry};

/// Settings for a [`Deriver`](crate::Deriver) run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeriverConfig {
    /// Years after which a person without a recorded death is presumed dead.
    /// Default: 125
    #[serde(default = "default_lifetime_threshold")]
    pub lifetime_threshold: u32,

    /// Event types to derive. When absent, every type the registry marks
    /// derivable is used.
    #[serde(default)]
    pub derivable_types: Option<Vec<EventType>>,
}

/// Default lifetime threshold: 125 years
fn default_lifetime_threshold() -> u32 {
    125
}

impl Default for DeriverConfig {
    fn default() -> Self {
        Self {
            lifetime_threshold: default_lifetime_threshold(),
            derivable_types: None,
        }
    }
}

impl DeriverConfig {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::ConfigParse`] for malformed TOML or unknown
    /// event type names, and [`LineageError::InvalidConfig`] for a zero
    /// lifetime threshold.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: DeriverConfig = toml::from_str(toml_str)?;
        if config.lifetime_threshold == 0 {
            return Err(LineageError::InvalidConfig(
                "lifetime_threshold must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The run set of derivable types, checked against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::InvalidConfig`] if a configured type is not
    /// derivable in `registry`.
    pub fn resolve_types(&self, registry: &EventTypeRegistry) -> Result<BTreeSet<EventType>> {
        let Some(types) = &self.derivable_types else {
            return Ok(registry.derivable_types());
        };
        types
            .iter()
            .map(|&event_type| {
                if registry.is_derivable(event_type) {
                    Ok(event_type)
                } else {
                    Err(LineageError::InvalidConfig(format!(
                        "event type {event_type} is not derivable"
                    )))
                }
            })
            .collect()
    }
}
