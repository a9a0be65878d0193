//! # Relationships
//!
//! Typed references from one resource to others. The target type is part of
//! the relationship type, so an identifier whose `type` names a different
//! resource is rejected at decode time. Relationships never look at
//! `included`; a reference decodes the same whether or not its target was
//! side-loaded.
//!
//! ```text
//! {"data": {"type": "people", "id": "9"}, "links": ..., "meta": ...}
//! {"data": null}
//! {"data": [{"type": "tags", "id": "1"}, {"type": "tags", "id": "2"}]}
//! ```

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{json_kind, FieldLocation, ResourceObjectDecodingError};
use crate::identifier::{JsonApiType, ResourceIdentifier};
use crate::payload::{is_omitted, NoLinks, NoMetadata, Payload};
use crate::resource::decode_member;

/// Failure to decode a relationship object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelationshipDecodingError {
    /// The relationship is not a JSON object.
    #[error("relationship must be an object but found {found}")]
    NotAnObject {
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// The `data` member is absent.
    #[error("relationship 'data' is required and missing.")]
    MissingData,

    /// `data` has the wrong shape for this relationship kind.
    #[error("relationship 'data' must be {expected} but found {found}")]
    MalformedData {
        /// Shape the relationship requires.
        expected: &'static str,
        /// Kind of JSON value found instead.
        found: &'static str,
    },

    /// An identifier is not a `{type, id}` object.
    #[error("relationship identifier failed to parse: {reason}")]
    MalformedIdentifier {
        /// Underlying parse failure.
        reason: String,
    },

    /// An identifier names a different resource type than the target.
    #[error("Found JSON:API type '{found}' but expected '{expected}'")]
    TypeMismatch {
        /// Tag present in the identifier.
        found: String,
        /// Static tag of the relationship target.
        expected: &'static str,
    },

    /// Relationship-level meta or links failed.
    #[error(transparent)]
    Member(#[from] ResourceObjectDecodingError),
}

fn split_relationship<M: Payload, L: Payload>(
    value: Value,
) -> Result<(Value, M, L), RelationshipDecodingError> {
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(RelationshipDecodingError::NotAnObject {
                found: json_kind(&other),
            })
        }
    };
    let meta = decode_member(&object, FieldLocation::Meta)?;
    let links = decode_member(&object, FieldLocation::Links)?;
    let data = object
        .remove("data")
        .ok_or(RelationshipDecodingError::MissingData)?;
    Ok((data, meta, links))
}

fn checked_identifier(
    value: Value,
    expected: &'static str,
) -> Result<ResourceIdentifier, RelationshipDecodingError> {
    let identifier: ResourceIdentifier = serde_json::from_value(value).map_err(|e| {
        RelationshipDecodingError::MalformedIdentifier {
            reason: e.to_string(),
        }
    })?;
    if identifier.json_type != expected {
        return Err(RelationshipDecodingError::TypeMismatch {
            found: identifier.json_type,
            expected,
        });
    }
    Ok(identifier)
}

fn serialize_relationship<S, D, M, L>(
    data: &D,
    meta: &M,
    links: &L,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    D: Serialize + ?Sized,
    M: Payload,
    L: Payload,
{
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("data", data)?;
    if !is_omitted::<L>() {
        map.serialize_entry("links", links)?;
    }
    if !is_omitted::<M>() {
        map.serialize_entry("meta", meta)?;
    }
    map.end()
}

/// A reference to zero or one resource of type `T`.
pub struct ToOneRelationship<T, M = NoMetadata, L = NoLinks> {
    identifier: Option<ResourceIdentifier>,
    /// Relationship-level meta.
    pub meta: M,
    /// Relationship-level links.
    pub links: L,
    target: PhantomData<fn() -> T>,
}

impl<T: JsonApiType> ToOneRelationship<T> {
    /// A relationship to the resource of type `T` with the given id.
    pub fn to(id: impl Into<String>) -> Self {
        Self::with_parts(Some(id.into()), NoMetadata, NoLinks)
    }

    /// An empty to-one relationship (`"data": null`).
    pub fn empty() -> Self {
        Self::with_parts(None, NoMetadata, NoLinks)
    }
}

impl<T: JsonApiType, M, L> ToOneRelationship<T, M, L> {
    /// A relationship carrying meta and links.
    pub fn with_parts(id: Option<String>, meta: M, links: L) -> Self {
        Self {
            identifier: id.map(|id| ResourceIdentifier::new(T::json_type(), id)),
            meta,
            links,
            target: PhantomData,
        }
    }

    /// The referenced identifier, if any.
    pub fn identifier(&self) -> Option<&ResourceIdentifier> {
        self.identifier.as_ref()
    }

    /// The referenced id, if any.
    pub fn id(&self) -> Option<&str> {
        self.identifier.as_ref().map(|i| i.id.as_str())
    }

    /// Whether the relationship references nothing.
    pub fn is_empty(&self) -> bool {
        self.identifier.is_none()
    }
}

impl<T: JsonApiType, M: Payload, L: Payload> Serialize for ToOneRelationship<T, M, L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_relationship(&self.identifier, &self.meta, &self.links, serializer)
    }
}

impl<'de, T: JsonApiType, M: Payload, L: Payload> Deserialize<'de> for ToOneRelationship<T, M, L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (data, meta, links) =
            split_relationship(Value::deserialize(deserializer)?).map_err(de::Error::custom)?;
        let identifier = match data {
            Value::Null => None,
            object @ Value::Object(_) => {
                Some(checked_identifier(object, T::json_type()).map_err(de::Error::custom)?)
            }
            other => {
                return Err(de::Error::custom(RelationshipDecodingError::MalformedData {
                    expected: "a resource identifier or null",
                    found: json_kind(&other),
                }))
            }
        };
        Ok(Self {
            identifier,
            meta,
            links,
            target: PhantomData,
        })
    }
}

impl<T: JsonApiType, M: Payload, L: Payload> Payload for ToOneRelationship<T, M, L> {}

impl<T, M: Clone, L: Clone> Clone for ToOneRelationship<T, M, L> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            meta: self.meta.clone(),
            links: self.links.clone(),
            target: PhantomData,
        }
    }
}

impl<T, M: PartialEq, L: PartialEq> PartialEq for ToOneRelationship<T, M, L> {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier && self.meta == other.meta && self.links == other.links
    }
}

impl<T, M: fmt::Debug, L: fmt::Debug> fmt::Debug for ToOneRelationship<T, M, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToOneRelationship")
            .field("identifier", &self.identifier)
            .field("meta", &self.meta)
            .field("links", &self.links)
            .finish()
    }
}

/// An ordered list of references to resources of type `T`.
pub struct ToManyRelationship<T, M = NoMetadata, L = NoLinks> {
    identifiers: Vec<ResourceIdentifier>,
    /// Relationship-level meta.
    pub meta: M,
    /// Relationship-level links.
    pub links: L,
    target: PhantomData<fn() -> T>,
}

impl<T: JsonApiType> ToManyRelationship<T> {
    /// A relationship to the resources of type `T` with the given ids.
    pub fn to<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_parts(ids, NoMetadata, NoLinks)
    }

    /// An empty to-many relationship (`"data": []`).
    pub fn empty() -> Self {
        Self::with_parts(std::iter::empty::<String>(), NoMetadata, NoLinks)
    }
}

impl<T: JsonApiType, M, L> ToManyRelationship<T, M, L> {
    /// A relationship carrying meta and links.
    pub fn with_parts<I, S>(ids: I, meta: M, links: L) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifiers: ids
                .into_iter()
                .map(|id| ResourceIdentifier::new(T::json_type(), id))
                .collect(),
            meta,
            links,
            target: PhantomData,
        }
    }

    /// The referenced identifiers, in document order.
    pub fn identifiers(&self) -> &[ResourceIdentifier] {
        &self.identifiers
    }

    /// The referenced ids, in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(|i| i.id.as_str())
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Whether the relationship references nothing.
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl<T: JsonApiType, M: Payload, L: Payload> Serialize for ToManyRelationship<T, M, L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_relationship(&self.identifiers, &self.meta, &self.links, serializer)
    }
}

impl<'de, T: JsonApiType, M: Payload, L: Payload> Deserialize<'de>
    for ToManyRelationship<T, M, L>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (data, meta, links) =
            split_relationship(Value::deserialize(deserializer)?).map_err(de::Error::custom)?;
        let elements = match data {
            Value::Array(elements) => elements,
            other => {
                return Err(de::Error::custom(RelationshipDecodingError::MalformedData {
                    expected: "an array of resource identifiers",
                    found: json_kind(&other),
                }))
            }
        };
        let identifiers = elements
            .into_iter()
            .map(|element| checked_identifier(element, T::json_type()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(de::Error::custom)?;
        Ok(Self {
            identifiers,
            meta,
            links,
            target: PhantomData,
        })
    }
}

impl<T: JsonApiType, M: Payload, L: Payload> Payload for ToManyRelationship<T, M, L> {}

impl<T, M: Clone, L: Clone> Clone for ToManyRelationship<T, M, L> {
    fn clone(&self) -> Self {
        Self {
            identifiers: self.identifiers.clone(),
            meta: self.meta.clone(),
            links: self.links.clone(),
            target: PhantomData,
        }
    }
}

impl<T, M: PartialEq, L: PartialEq> PartialEq for ToManyRelationship<T, M, L> {
    fn eq(&self, other: &Self) -> bool {
        self.identifiers == other.identifiers && self.meta == other.meta && self.links == other.links
    }
}

impl<T, M: fmt::Debug, L: fmt::Debug> fmt::Debug for ToManyRelationship<T, M, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToManyRelationship")
            .field("identifiers", &self.identifiers)
            .field("meta", &self.meta)
            .field("links", &self.links)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Person;

    impl JsonApiType for Person {
        fn json_type() -> &'static str {
            "people"
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Hint {
        note: String,
    }

    impl Payload for Hint {}

    #[test]
    fn test_to_one_encode() {
        let rel = ToOneRelationship::<Person>::to("9");
        assert_eq!(
            serde_json::to_value(&rel).expect("should encode"),
            json!({"data": {"type": "people", "id": "9"}})
        );
        assert_eq!(rel.id(), Some("9"));
    }

    #[test]
    fn test_to_one_null() {
        let rel = ToOneRelationship::<Person>::empty();
        assert_eq!(
            serde_json::to_value(&rel).expect("should encode"),
            json!({"data": null})
        );
        let back: ToOneRelationship<Person> =
            serde_json::from_value(json!({"data": null})).expect("should decode null");
        assert!(back.is_empty());
    }

    #[test]
    fn test_to_one_requires_data() {
        let err =
            serde_json::from_value::<ToOneRelationship<Person>>(json!({"links": {}})).unwrap_err();
        assert_eq!(err.to_string(), "relationship 'data' is required and missing.");
    }

    #[test]
    fn test_to_one_rejects_wrong_target() {
        let err = serde_json::from_value::<ToOneRelationship<Person>>(
            json!({"data": {"type": "robots", "id": "1"}}),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found JSON:API type 'robots' but expected 'people'"
        );
    }

    #[test]
    fn test_to_one_rejects_array() {
        let err = serde_json::from_value::<ToOneRelationship<Person>>(json!({"data": []}))
            .unwrap_err();
        assert!(err.to_string().contains("an array"), "got: {err}");
    }

    #[test]
    fn test_to_one_with_meta() {
        let rel = ToOneRelationship::<Person, Hint>::with_parts(
            Some("3".to_string()),
            Hint {
                note: "primary".to_string(),
            },
            NoLinks,
        );
        let value = serde_json::to_value(&rel).expect("should encode");
        assert_eq!(
            value,
            json!({"data": {"type": "people", "id": "3"}, "meta": {"note": "primary"}})
        );
        let back: ToOneRelationship<Person, Hint> =
            serde_json::from_value(value).expect("should decode");
        assert_eq!(back, rel);
    }

    #[test]
    fn test_to_many_round_trip() {
        let rel = ToManyRelationship::<Person>::to(["1", "2", "3"]);
        let value = serde_json::to_value(&rel).expect("should encode");
        assert_eq!(
            value,
            json!({"data": [
                {"type": "people", "id": "1"},
                {"type": "people", "id": "2"},
                {"type": "people", "id": "3"}
            ]})
        );
        let back: ToManyRelationship<Person> =
            serde_json::from_value(value).expect("should decode");
        assert_eq!(back.ids().collect::<Vec<_>>(), ["1", "2", "3"]);
        assert_eq!(back, rel);
    }

    #[test]
    fn test_to_many_rejects_null() {
        let err =
            serde_json::from_value::<ToManyRelationship<Person>>(json!({"data": null})).unwrap_err();
        assert!(err.to_string().contains("array of resource identifiers"), "got: {err}");
    }

    #[test]
    fn test_to_many_rejects_mixed_targets() {
        let err = serde_json::from_value::<ToManyRelationship<Person>>(json!({"data": [
            {"type": "people", "id": "1"},
            {"type": "robots", "id": "2"}
        ]}))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Found JSON:API type 'robots' but expected 'people'"
        );
    }

    #[test]
    fn test_empty_to_many() {
        let rel = ToManyRelationship::<Person>::empty();
        assert!(rel.is_empty());
        assert_eq!(
            serde_json::to_value(&rel).expect("should encode"),
            json!({"data": []})
        );
    }
}
