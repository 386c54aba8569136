//! Configuration for the authorization engine and its collaborators
//!
//! Configuration is read from a TOML document with an `[authorization]`
//! table, then overlaid with `TRELLIS_AUTHORIZATION_*` environment variables,
//! then validated.
//!
//! ```toml
//! [authorization]
//! enforce = true
//! save_chunk_size = 500
//! large_batch_warning = 500
//! log_denials = true
//! ```

mod traits;
mod validation;

pub use traits::ConfigValidation;
pub use validation::{ConfigValidator, ValidationError, ValidationResult};

use crate::TrellisError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "TRELLIS_AUTHORIZATION_";

/// Authorization engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// When false, access checks made through the configured evaluator always pass
    pub enforce: bool,
    /// Number of policies written per chunk when persisting a batch
    pub save_chunk_size: u32,
    /// Batches larger than this are logged at warn level
    pub large_batch_warning: u32,
    /// Emit a diagnostic event for every denied access check
    pub log_denials: bool,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            enforce: true,
            save_chunk_size: 500,
            large_batch_warning: 500,
            log_denials: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigDocument {
    authorization: AuthorizationConfig,
}

impl AuthorizationConfig {
    /// Parse the `[authorization]` table of a TOML document
    ///
    /// Missing keys fall back to defaults; an empty document yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, TrellisError> {
        let document: ConfigDocument = toml::from_str(content)?;
        let config = document.authorization;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, TrellisError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TrellisError::invalid(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay `TRELLIS_AUTHORIZATION_*` variables from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), TrellisError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Overlay `TRELLIS_AUTHORIZATION_*` entries from an arbitrary variable set
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> Result<(), TrellisError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            self.set_from_string(&field.to_ascii_lowercase(), value.as_ref())?;
        }
        self.validate()
    }

    /// Set a single field from its string form
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), TrellisError> {
        match key {
            "enforce" => self.enforce = parse_bool(key, value)?,
            "log_denials" => self.log_denials = parse_bool(key, value)?,
            "save_chunk_size" => self.save_chunk_size = parse_u32(key, value)?,
            "large_batch_warning" => self.large_batch_warning = parse_u32(key, value)?,
            other => {
                return Err(TrellisError::invalid(format!(
                    "Unknown authorization config key '{other}'"
                )))
            }
        }
        tracing::trace!(key, value, "authorization config override applied");
        Ok(())
    }
}

impl ConfigValidation for AuthorizationConfig {
    fn validate(&self) -> Result<(), TrellisError> {
        let mut validator = ConfigValidator::for_section("authorization");
        validator.at_least("save_chunk_size", self.save_chunk_size, 1);
        validator.result().map_err(Into::into)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, TrellisError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TrellisError::invalid(format!(
            "Expected a boolean for '{key}', got '{value}'"
        ))),
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, TrellisError> {
    value.trim().parse::<u32>().map_err(|e| {
        TrellisError::invalid(format!("Expected an integer for '{key}', got '{value}': {e}"))
    })
}
