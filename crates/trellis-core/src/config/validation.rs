//! Field-level checks for configuration sections

use crate::TrellisError;

/// Outcome of validating a section
pub type ValidationResult = Result<(), ValidationError>;

/// A single rejected configuration field
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field '{field}' must be at least {min} (got {actual})")]
    TooSmall { field: String, min: u64, actual: u64 },

    #[error("Field '{field}' must be at most {max} (got {actual})")]
    TooLarge { field: String, max: u64, actual: u64 },

    #[error("Field '{field}': {message}")]
    Rejected { field: String, message: String },
}

impl From<ValidationError> for TrellisError {
    fn from(err: ValidationError) -> Self {
        TrellisError::invalid(err.to_string())
    }
}

/// Collects failures for one `[section]` so every bad field can be reported
#[derive(Debug, Default)]
pub struct ConfigValidator {
    section: String,
    failures: Vec<ValidationError>,
}

impl ConfigValidator {
    pub fn for_section(section: &str) -> Self {
        Self {
            section: section.to_string(),
            failures: Vec::new(),
        }
    }

    pub fn at_least(&mut self, field: &str, actual: impl Into<u64>, min: u64) -> &mut Self {
        let actual = actual.into();
        if actual < min {
            let field = self.path(field);
            self.failures
                .push(ValidationError::TooSmall { field, min, actual });
        }
        self
    }

    pub fn at_most(&mut self, field: &str, actual: impl Into<u64>, max: u64) -> &mut Self {
        let actual = actual.into();
        if actual > max {
            let field = self.path(field);
            self.failures
                .push(ValidationError::TooLarge { field, max, actual });
        }
        self
    }

    /// Reject `field` with `message` unless `holds`
    pub fn require(&mut self, field: &str, holds: bool, message: &str) -> &mut Self {
        if !holds {
            let field = self.path(field);
            self.failures.push(ValidationError::Rejected {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    /// First failure, if any
    pub fn result(self) -> ValidationResult {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }

    pub fn failures(&self) -> &[ValidationError] {
        &self.failures
    }

    fn path(&self, field: &str) -> String {
        if self.section.is_empty() {
            field.to_string()
        } else {
            format!("{}.{field}", self.section)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_names_the_dotted_field() {
        let mut validator = ConfigValidator::for_section("authorization");
        validator.at_least("save_chunk_size", 0u32, 1);
        let err = validator.result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'authorization.save_chunk_size' must be at least 1 (got 0)"
        );
    }

    #[test]
    fn every_failure_is_kept() {
        let mut validator = ConfigValidator::default();
        validator
            .at_most("large_batch_warning", 9u32, 3)
            .require("profiles", false, "no profile registered");
        assert_eq!(validator.failures().len(), 2);
        assert!(validator.result().is_err());
    }
}
