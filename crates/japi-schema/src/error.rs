//! # Schema Errors
//!
//! Failures while describing a type as a schema node, compiling a node into
//! a validator, or validating a raw document against it.

use std::fmt;

use thiserror::Error;

use crate::node::JsonType;

/// Error produced by this crate.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// An allowed value does not match the JSON type of the node it was
    /// attached to.
    #[error("Expected type compatible with JSON type {} but found {found}", expected_name(.expected))]
    AllowedValues {
        /// JSON type of the node, `None` for combinator nodes.
        expected: Option<JsonType>,
        /// Kind of the offending value.
        found: &'static str,
    },

    /// The rendered schema could not be compiled.
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild {
        /// Name of the described type.
        schema_name: String,
        /// Reason reported by the compiler.
        reason: String,
    },

    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the described type.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },
}

fn expected_name(expected: &Option<JsonType>) -> &'static str {
    (*expected).map_or("(none)", JsonType::as_str)
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
