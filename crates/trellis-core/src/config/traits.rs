//! Configuration traits

use crate::TrellisError;

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> Result<(), TrellisError>;
}
