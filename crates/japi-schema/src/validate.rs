//! # Document Validation
//!
//! Validates raw JSON against a described type before (or instead of)
//! decoding it, reporting every violation with its instance path rather than
//! stopping at the first one as the decoder does.
//!
//! The node is rendered with [`JsonNode::to_json_schema`] and compiled once
//! with the `jsonschema` crate (Draft 2020-12). A [`SchemaValidator`] is
//! immutable after construction and can be shared across threads.

use std::fmt;

use jsonschema::{Draft, Validator};
use serde_json::Value;
use tracing::debug;

use crate::describe::OpenApiNodeType;
use crate::error::{SchemaError, ValidationViolations, Violation};
use crate::node::JsonNode;

/// A compiled validator for one schema node.
pub struct SchemaValidator {
    schema_name: String,
    node: JsonNode,
    schema: Value,
    validator: Validator,
}

impl SchemaValidator {
    /// Compile `node` under the given name.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ValidatorBuild`] if the rendered schema is rejected.
    pub fn new(schema_name: impl Into<String>, node: JsonNode) -> Result<Self, SchemaError> {
        let schema_name = schema_name.into();
        let schema = node.to_json_schema();

        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft202012);
        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;

        debug!(schema = %schema_name, "compiled schema validator");
        Ok(Self {
            schema_name,
            node,
            schema,
            validator,
        })
    }

    /// Compile the description of `T`, named after the type.
    pub fn for_type<T: OpenApiNodeType>() -> Result<Self, SchemaError> {
        Self::new(std::any::type_name::<T>(), T::openapi_node()?)
    }

    /// The name used in error messages.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The node this validator was compiled from.
    pub fn node(&self) -> &JsonNode {
        &self.node
    }

    /// The compiled JSON Schema.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Whether `instance` conforms.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Every violation in `instance`, empty if it conforms.
    pub fn violations(&self, instance: &Value) -> ValidationViolations {
        let violations = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();
        ValidationViolations::new(violations)
    }

    /// Validate `instance`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::ValidationFailed`] listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations = self.violations(instance);
        if violations.is_empty() {
            return Ok(());
        }
        debug!(
            schema = %self.schema_name,
            violations = violations.len(),
            "document failed schema validation"
        );
        Err(SchemaError::ValidationFailed {
            schema_name: self.schema_name.clone(),
            violations,
        })
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schema_name", &self.schema_name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
