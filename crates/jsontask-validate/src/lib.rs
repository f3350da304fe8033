#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # jsontask-validate
//!
//! JSON Schema validation of JSON trees.
//!
//! Validation collects every failure rather than stopping at the first, so a
//! caller can report all problems in one pass. An invalid document is a
//! result, not an error, unless the caller opts into failing hard.
//!
//! ## Example Usage
//!
//! ```rust
//! use jsontask_validate::{ValidateOptions, validate};
//! use serde_json::json;
//!
//! let schema = json!({"type": "object", "required": ["name"]});
//! let report = validate(&json!({"age": 3}), &schema, &ValidateOptions::default()).unwrap();
//! assert!(!report.is_valid);
//! assert_eq!(report.failures.len(), 1);
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while validating a document
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid schema: {0}")]
    Schema(String),

    #[error("document failed schema validation: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Options controlling a validation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Turn an invalid document into an [`Error::Invalid`] instead of a
    /// report with `is_valid` false.
    pub error_on_invalid: bool,
}

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    /// Whether the document satisfied the schema.
    pub is_valid: bool,
    /// One entry per violated schema constraint.
    pub failures: Vec<ValidationFailure>,
}

/// A single schema violation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationFailure {
    /// JSON Pointer to the offending value in the document.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Validate `document` against `schema`, collecting every failure.
///
/// # Errors
///
/// Returns [`Error::Schema`] when the schema itself does not compile, or
/// [`Error::Invalid`] when the document fails and
/// [`ValidateOptions::error_on_invalid`] is set.
pub fn validate(
    document: &Value,
    schema: &Value,
    options: &ValidateOptions,
) -> Result<ValidateReport> {
    let validator = jsonschema::validator_for(schema).map_err(|e| Error::Schema(e.to_string()))?;
    let failures: Vec<ValidationFailure> = validator
        .iter_errors(document)
        .map(|error| ValidationFailure {
            path: error.instance_path.to_string(),
            message: error.to_string(),
        })
        .collect();
    debug!(failures = failures.len(), "validated document against schema");
    if failures.is_empty() {
        return Ok(ValidateReport {
            is_valid: true,
            failures,
        });
    }
    if options.error_on_invalid {
        let summary = failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Invalid(summary));
    }
    Ok(ValidateReport {
        is_valid: false,
        failures,
    })
}
