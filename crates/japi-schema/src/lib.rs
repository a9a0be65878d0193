//! # japi-schema — Schema Description & Validation
//!
//! Describes JSON:API resource objects and documents as OpenAPI schema
//! nodes, and validates raw documents against those descriptions before
//! they reach the decoder.
//!
//! ## Description (`node`, `describe`)
//!
//! [`JsonNode`] is the schema tree. [`OpenApiNodeType`] is implemented for
//! primitives, `Option`, `Vec`, links, relationships, resource objects,
//! unions and documents; application payload structs implement it by
//! building an [`ObjectContext`]:
//!
//! ```ignore
//! impl OpenApiNodeType for ArticleAttributes {
//!     fn openapi_node() -> Result<JsonNode, SchemaError> {
//!         Ok(JsonNode::object(
//!             ObjectContext::new()
//!                 .property("title", String::openapi_node()?)
//!                 .property("word_count", u32::openapi_node()?),
//!         ))
//!     }
//! }
//! ```
//!
//! ## Validation (`validate`)
//!
//! [`SchemaValidator`] compiles a node to JSON Schema (Draft 2020-12) and
//! reports every violation with its instance path.
//!
//! ## Crate Policy
//!
//! - Depends only on `japi-core` internally.
//! - Marker payloads and unidentified ids never appear in a schema.

pub mod describe;
pub mod error;
pub mod node;
pub mod validate;

pub use describe::{identifier_node, IdNode, IncludeNode, OpenApiNodeType, PrimaryDataNode};
pub use error::{SchemaError, ValidationViolations, Violation};
pub use node::{
    ArrayContext, ArrayFormat, BooleanFormat, Context, Format, IntegerFormat, JsonNode, JsonType,
    NumberFormat, NumericContext, ObjectContext, ObjectFormat, StringContext, StringFormat,
};
pub use validate::SchemaValidator;
