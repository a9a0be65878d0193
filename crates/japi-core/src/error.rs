//! # Error Types — Structured Decode and Encode Failures
//!
//! Every decode failure is a structured value that carries the context its
//! enclosing containers add as it propagates outward: a resource object
//! reports the member that failed, a union reports every candidate it tried,
//! and a collection reports the 1-based position of the failing element
//! together with the collection size.
//!
//! ## Design
//!
//! - Collections fail fast: the first failing element aborts the decode.
//! - Unions keep every attempt but surface only the most specific reason.
//!   A candidate that matched the type tag and then failed (missing field,
//!   malformed member) outranks a plain tag mismatch.
//! - Encoding only fails on values that must never reach the wire.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::ordinal::ordinal;

/// Result type alias for the JSON entry points.
pub type Result<T> = std::result::Result<T, JsonApiError>;

/// The part of a resource object a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldLocation {
    /// A key of the `attributes` member.
    Attribute,
    /// A key of the `relationships` member.
    Relationship,
    /// A key of the `meta` member.
    Meta,
    /// A key of the `links` member.
    Links,
}

impl FieldLocation {
    /// The JSON member name this location lives under.
    pub fn member(&self) -> &'static str {
        match self {
            Self::Attribute => "attributes",
            Self::Relationship => "relationships",
            Self::Meta => "meta",
            Self::Links => "links",
        }
    }
}

impl fmt::Display for FieldLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = match self {
            Self::Attribute => "attribute",
            Self::Relationship => "relationship",
            Self::Meta => "meta",
            Self::Links => "links",
        };
        f.write_str(noun)
    }
}

/// Failure to decode a single resource object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceObjectDecodingError {
    /// The value is not a JSON object.
    #[error("expected a JSON:API resource object but found {found}")]
    NotAnObject {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// The `type` member is absent.
    #[error("'type' is required and missing.")]
    MissingType,

    /// The `type` member is not a string.
    #[error("'type' must be a string but found {found}")]
    MalformedType {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// The `type` member names a different resource type.
    #[error("Found JSON:API type '{found}' but expected '{expected}'")]
    TypeMismatch {
        /// Tag present in the document.
        found: String,
        /// Static tag of the resource being decoded.
        expected: &'static str,
    },

    /// The `id` member is absent for an identified resource type.
    #[error("'id' is required and missing.")]
    MissingId,

    /// The `id` member could not be read as the raw id type.
    #[error("'id' failed to parse: {reason}")]
    MalformedId {
        /// Underlying parse failure.
        reason: String,
    },

    /// An `id` member is present on a resource type that is unidentified.
    #[error("'id' must be absent for unidentified resources of type '{json_type}'")]
    UnexpectedId {
        /// Static tag of the resource being decoded.
        json_type: &'static str,
    },

    /// A required key inside attributes, relationships, meta or links is absent.
    #[error("'{field}' {location} is required and missing.")]
    MissingRequiredField {
        /// Name of the missing key.
        field: String,
        /// Member the key belongs to.
        location: FieldLocation,
    },

    /// A required top-level member (`meta` or `links`) is absent.
    #[error("'{member}' is required and missing.")]
    MissingRequiredMember {
        /// Name of the missing member.
        member: &'static str,
    },

    /// A member is present but its contents do not have the expected shape.
    #[error("'{member}' member failed to parse: {reason}")]
    MalformedMember {
        /// Name of the malformed member.
        member: &'static str,
        /// Underlying parse failure.
        reason: String,
    },
}

impl ResourceObjectDecodingError {
    /// Whether this failure is a plain type tag mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Classify a serde failure raised while reading one member into `P`.
    ///
    /// serde reports absent fields as ``missing field `name` `` at any depth.
    /// Only a key missing from the top level of `raw` becomes
    /// [`Self::MissingRequiredField`]; a key missing inside a nested value
    /// leaves the member malformed.
    pub(crate) fn from_member_error<P: DeserializeOwned>(
        err: serde_json::Error,
        raw: &Value,
        location: FieldLocation,
    ) -> Self {
        let message = err.to_string();
        match missing_field_name(&message) {
            Some(field) if is_top_level_key::<P>(raw, field) => Self::MissingRequiredField {
                field: field.to_string(),
                location,
            },
            _ => Self::MalformedMember {
                member: location.member(),
                reason: message,
            },
        }
    }
}

fn missing_field_name(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

/// Whether `field` is a top-level key of `P` that `raw` lacks.
///
/// Filling the key in with `null` clears a top-level miss and leaves a
/// nested one in place, since serde decodes present values before it checks
/// for absent ones.
fn is_top_level_key<P: DeserializeOwned>(raw: &Value, field: &str) -> bool {
    let Value::Object(object) = raw else {
        return false;
    };
    if object.contains_key(field) {
        return false;
    }
    let mut filled = object.clone();
    filled.insert(field.to_string(), Value::Null);
    match serde_json::from_value::<P>(Value::Object(filled)) {
        Ok(_) => true,
        Err(err) => {
            let message = err.to_string();
            missing_field_name(&message) != Some(field) && !message.starts_with("unknown field")
        }
    }
}

/// One rejected candidate of a union decode.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    /// Type tag of the candidate that was tried.
    pub json_type: &'static str,
    /// Why the candidate rejected the value.
    pub error: ResourceObjectDecodingError,
}

/// The reason a union decode surfaces to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum PolyFailure {
    /// Every candidate rejected the type tag.
    UnexpectedType {
        /// Tag present in the document.
        found: String,
        /// Candidate tags, in declared order.
        expected: Vec<&'static str>,
    },
    /// A candidate accepted the tag (or the value was structurally unusable)
    /// and then failed.
    Candidate(ResourceObjectDecodingError),
}

impl fmt::Display for PolyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedType { found, expected } => {
                write!(f, "Found JSON:API type '{found}' but expected one of ")?;
                for (i, tag) in expected.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{tag}'")?;
                }
                Ok(())
            }
            Self::Candidate(error) => write!(f, "{error}"),
        }
    }
}

/// Failure of every candidate of a union.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}")]
pub struct PolyDecodingError {
    reason: PolyFailure,
    attempts: Vec<CandidateFailure>,
}

impl PolyDecodingError {
    /// Build the error from the attempts made, in declared candidate order.
    ///
    /// The first attempt that failed for a reason other than a tag mismatch
    /// is selected. When every attempt was a tag mismatch the reason lists
    /// all candidate tags.
    pub fn from_attempts(attempts: Vec<CandidateFailure>) -> Self {
        let reason = match attempts.iter().find(|a| !a.error.is_type_mismatch()) {
            Some(specific) => PolyFailure::Candidate(specific.error.clone()),
            None => PolyFailure::UnexpectedType {
                found: attempts
                    .iter()
                    .find_map(|a| match &a.error {
                        ResourceObjectDecodingError::TypeMismatch { found, .. } => {
                            Some(found.clone())
                        }
                        _ => None,
                    })
                    .unwrap_or_default(),
                expected: attempts.iter().map(|a| a.json_type).collect(),
            },
        };
        Self { reason, attempts }
    }

    /// The selected, user-facing reason.
    pub fn reason(&self) -> &PolyFailure {
        &self.reason
    }

    /// Every candidate failure, in declared order. Empty once discarded.
    pub fn attempts(&self) -> &[CandidateFailure] {
        &self.attempts
    }

    /// Drop the per-candidate diagnostics, keeping the selected reason.
    pub fn without_attempts(mut self) -> Self {
        self.attempts = Vec::new();
        self
    }
}

/// Failure to decode a resource used as primary data: either a single
/// resource object or a union of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceDecodingError {
    /// A resource object failed to decode.
    #[error(transparent)]
    ResourceObject(#[from] ResourceObjectDecodingError),

    /// No candidate of a union accepted the value.
    #[error(transparent)]
    Poly(#[from] PolyDecodingError),
}

impl ResourceDecodingError {
    /// Drop union diagnostics, if any.
    pub fn without_attempts(self) -> Self {
        match self {
            Self::Poly(error) => Self::Poly(error.without_attempts()),
            other => other,
        }
    }
}

/// Failure of one element of the `included` array.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct IncludesDecodingError {
    /// 0-based index of the failing element.
    pub idx: usize,
    /// Number of elements in the `included` array.
    pub total_includes: usize,
    /// Why the element failed.
    #[source]
    pub error: PolyDecodingError,
}

impl IncludesDecodingError {
    /// 1-based position of the failing element.
    pub fn position(&self) -> usize {
        self.idx + 1
    }

    /// Drop union diagnostics, keeping the positional message.
    pub fn without_attempts(self) -> Self {
        Self {
            error: self.error.without_attempts(),
            ..self
        }
    }
}

impl fmt::Display for IncludesDecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Out of the {} includes in the document, the {} one failed to parse: {}",
            self.total_includes,
            ordinal(self.position()),
            self.error
        )
    }
}

/// Failure of one element of an array of primary resources.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct PrimaryDataDecodingError {
    /// 0-based index of the failing element.
    pub idx: usize,
    /// Number of elements in the `data` array.
    pub total_resources: usize,
    /// Why the element failed.
    #[source]
    pub error: ResourceDecodingError,
}

impl PrimaryDataDecodingError {
    /// 1-based position of the failing element.
    pub fn position(&self) -> usize {
        self.idx + 1
    }
}

impl fmt::Display for PrimaryDataDecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Out of the {} primary resources in the document, the {} one failed to parse: {}",
            self.total_resources,
            ordinal(self.position()),
            self.error
        )
    }
}

/// Failure to decode a top-level document.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentDecodingError {
    /// The document root is not a JSON object.
    #[error("expected a JSON:API document object but found {found}")]
    NotAnObject {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// The document requires primary data but has no `data` member.
    #[error("'data' is required and missing.")]
    MissingPrimaryData,

    /// The document requires a primary resource but `data` is null.
    #[error("'data' is null but a primary resource is required")]
    NullPrimaryData,

    /// The document requires an array of primary resources.
    #[error("'data' must be an array of resources but found {found}")]
    PrimaryDataNotAnArray {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// `included` is present but empty.
    #[error("'included' must be omitted or contain at least one resource, but an empty array was found")]
    EmptyIncludes,

    /// `included` is not an array.
    #[error("'included' must be an array but found {found}")]
    IncludesNotAnArray {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// A required top-level member (`meta` or `links`) is absent.
    #[error("'{member}' is required and missing.")]
    MissingRequiredMember {
        /// Name of the missing member.
        member: &'static str,
    },

    /// A top-level member does not have the expected shape.
    #[error("'{member}' member failed to parse: {reason}")]
    MalformedMember {
        /// Name of the malformed member.
        member: &'static str,
        /// Underlying parse failure.
        reason: String,
    },

    /// The single primary resource failed to decode.
    #[error(transparent)]
    PrimaryResource(#[from] ResourceDecodingError),

    /// An element of the primary resource array failed to decode.
    #[error(transparent)]
    PrimaryData(#[from] PrimaryDataDecodingError),

    /// An element of `included` failed to decode.
    #[error(transparent)]
    Includes(#[from] IncludesDecodingError),
}

impl DocumentDecodingError {
    /// Drop union diagnostics wherever they are nested.
    pub fn without_attempts(self) -> Self {
        match self {
            Self::PrimaryResource(error) => Self::PrimaryResource(error.without_attempts()),
            Self::PrimaryData(error) => Self::PrimaryData(PrimaryDataDecodingError {
                error: error.error.without_attempts(),
                ..error
            }),
            Self::Includes(error) => Self::Includes(error.without_attempts()),
            other => other,
        }
    }
}

/// Failure to encode a value.
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The value must never appear at the wire boundary.
    #[error("{0}")]
    IllegalEncoding(String),

    /// The underlying serializer failed.
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Umbrella error for the JSON entry points.
#[derive(Error, Debug)]
pub enum JsonApiError {
    /// The input is not valid JSON, or output could not be rendered.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document failed to decode.
    #[error(transparent)]
    Document(#[from] DocumentDecodingError),

    /// A resource object or union failed to decode.
    #[error(transparent)]
    Resource(#[from] ResourceDecodingError),

    /// An `included` array failed to decode.
    #[error(transparent)]
    Includes(#[from] IncludesDecodingError),

    /// A value failed to encode.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl From<ResourceObjectDecodingError> for JsonApiError {
    fn from(err: ResourceObjectDecodingError) -> Self {
        Self::Resource(err.into())
    }
}

impl From<PolyDecodingError> for JsonApiError {
    fn from(err: PolyDecodingError) -> Self {
        Self::Resource(err.into())
    }
}

/// Human-readable kind of a JSON value, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
