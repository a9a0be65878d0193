//! # Resource Objects
//!
//! A [`ResourceObject`] is one addressable entity. Its `type` tag comes from a
//! [`ResourceObjectDescription`] and is never read from the caller: decoding
//! checks the tag in the document against the static one and encoding always
//! writes the static one.
//!
//! ## Wire Shape
//!
//! ```text
//! {"type": ..., "id": ..., "attributes": {...}, "relationships": {...}, "links": {...}, "meta": {...}}
//! ```
//!
//! Members are written in exactly that order. `id` is dropped for
//! [`Unidentified`](crate::Unidentified) resources and every marker payload
//! drops its member.

use std::collections::BTreeSet;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::DecodeOptions;
use crate::error::{json_kind, EncodingError, FieldLocation, ResourceObjectDecodingError};
use crate::identifier::{is_unidentified, JsonApiType, MaybeRawId, ResourceIdentifier, Unidentified};
use crate::json::{JsonApiDecode, JsonApiEncode};
use crate::payload::{is_omitted, NoLinks, NoMetadata, Payload};
use crate::sparse::SparseFieldset;

/// Static description of a resource type: its tag and payload shapes.
///
/// ```ignore
/// struct ArticleDescription;
///
/// impl ResourceObjectDescription for ArticleDescription {
///     const JSON_TYPE: &'static str = "articles";
///     type Attributes = ArticleAttributes;
///     type Relationships = NoRelationships;
/// }
///
/// type Article = BasicResource<ArticleDescription>;
/// ```
pub trait ResourceObjectDescription {
    /// The `type` member value.
    const JSON_TYPE: &'static str;
    /// The `attributes` payload, or [`NoAttributes`](crate::NoAttributes).
    type Attributes: Payload;
    /// The `relationships` payload, or [`NoRelationships`](crate::NoRelationships).
    type Relationships: Payload;
}

/// One resource object.
pub struct ResourceObject<D, M = NoMetadata, L = NoLinks, Id = String>
where
    D: ResourceObjectDescription,
{
    /// The raw id.
    pub id: Id,
    /// Attributes payload.
    pub attributes: D::Attributes,
    /// Relationships payload.
    pub relationships: D::Relationships,
    /// Resource-level meta.
    pub meta: M,
    /// Resource-level links.
    pub links: L,
}

/// A server-side resource with a string id and no meta or links.
pub type BasicResource<D> = ResourceObject<D>;

/// A client-created resource that has no id yet.
pub type NewResource<D, M = NoMetadata, L = NoLinks> = ResourceObject<D, M, L, Unidentified>;

impl<D, M, L, Id> ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    /// Assemble a resource object from its parts.
    pub fn new(
        id: Id,
        attributes: D::Attributes,
        relationships: D::Relationships,
        meta: M,
        links: L,
    ) -> Self {
        Self {
            id,
            attributes,
            relationships,
            meta,
            links,
        }
    }

    /// The static type tag.
    pub fn json_type(&self) -> &'static str {
        D::JSON_TYPE
    }

    /// The `(type, id)` pair, or `None` for unidentified resources.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id
            .to_id_string()
            .map(|id| ResourceIdentifier::new(D::JSON_TYPE, id))
    }

    /// View this resource through a sparse fieldset that only lets the
    /// named attributes through.
    pub fn sparse<I, S>(&self, fields: I) -> SparseFieldset<'_, D, M, L, Id>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SparseFieldset::new(self, fields.into_iter().map(Into::into).collect::<BTreeSet<_>>())
    }

    /// Decode a resource object of this exact type from a JSON value.
    pub fn decode(value: &Value) -> Result<Self, ResourceObjectDecodingError> {
        let object = value
            .as_object()
            .ok_or(ResourceObjectDecodingError::NotAnObject {
                found: json_kind(value),
            })?;
        check_type(object, D::JSON_TYPE)?;
        let id = decode_id::<Id>(object, D::JSON_TYPE)?;
        let attributes = decode_body(object, FieldLocation::Attribute)?;
        let relationships = decode_body(object, FieldLocation::Relationship)?;
        let meta = decode_member(object, FieldLocation::Meta)?;
        let links = decode_member(object, FieldLocation::Links)?;
        Ok(Self {
            id,
            attributes,
            relationships,
            meta,
            links,
        })
    }

    /// Encode this resource object to a JSON value.
    pub fn encode(&self) -> Result<Value, EncodingError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Check the `type` member of a resource object against the expected tag.
pub(crate) fn check_type(
    object: &Map<String, Value>,
    expected: &'static str,
) -> Result<(), ResourceObjectDecodingError> {
    match object.get("type") {
        None => Err(ResourceObjectDecodingError::MissingType),
        Some(Value::String(found)) if found == expected => Ok(()),
        Some(Value::String(found)) => Err(ResourceObjectDecodingError::TypeMismatch {
            found: found.clone(),
            expected,
        }),
        Some(other) => Err(ResourceObjectDecodingError::MalformedType {
            found: json_kind(other),
        }),
    }
}

fn decode_id<Id: MaybeRawId>(
    object: &Map<String, Value>,
    json_type: &'static str,
) -> Result<Id, ResourceObjectDecodingError> {
    if let Some(marker) = Id::unidentified() {
        return match object.contains_key("id") {
            true => Err(ResourceObjectDecodingError::UnexpectedId { json_type }),
            false => Ok(marker),
        };
    }
    match object.get("id") {
        None | Some(Value::Null) => Err(ResourceObjectDecodingError::MissingId),
        Some(raw) => Id::deserialize(raw).map_err(|e| ResourceObjectDecodingError::MalformedId {
            reason: e.to_string(),
        }),
    }
}

/// Decode `attributes` or `relationships`. A missing member reads as `{}`
/// so its required keys are reported by name.
fn decode_body<P: Payload>(
    object: &Map<String, Value>,
    location: FieldLocation,
) -> Result<P, ResourceObjectDecodingError> {
    if let Some(marker) = P::absent() {
        return Ok(marker);
    }
    let empty = Value::Object(Map::new());
    let raw = object.get(location.member()).unwrap_or(&empty);
    P::deserialize(raw)
        .map_err(|e| ResourceObjectDecodingError::from_member_error::<P>(e, raw, location))
}

/// Decode `meta` or `links`. A missing member is only accepted when the
/// payload accepts `null`.
pub(crate) fn decode_member<P: Payload>(
    object: &Map<String, Value>,
    location: FieldLocation,
) -> Result<P, ResourceObjectDecodingError> {
    if let Some(marker) = P::absent() {
        return Ok(marker);
    }
    match object.get(location.member()) {
        Some(raw) => {
            P::deserialize(raw)
                .map_err(|e| ResourceObjectDecodingError::from_member_error::<P>(e, raw, location))
        }
        None => P::deserialize(&Value::Null).map_err(|_| {
            ResourceObjectDecodingError::MissingRequiredMember {
                member: location.member(),
            }
        }),
    }
}

/// Write a resource object, using `attributes` in place of its own
/// attributes payload.
pub(crate) fn serialize_resource<S, D, M, L, Id, A>(
    resource: &ResourceObject<D, M, L, Id>,
    attributes: &A,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
    A: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(None)?;
    map.serialize_entry("type", D::JSON_TYPE)?;
    if !is_unidentified::<Id>() {
        map.serialize_entry("id", &resource.id)?;
    }
    if !is_omitted::<D::Attributes>() {
        map.serialize_entry("attributes", attributes)?;
    }
    if !is_omitted::<D::Relationships>() {
        map.serialize_entry("relationships", &resource.relationships)?;
    }
    if !is_omitted::<L>() {
        map.serialize_entry("links", &resource.links)?;
    }
    if !is_omitted::<M>() {
        map.serialize_entry("meta", &resource.meta)?;
    }
    map.end()
}

impl<D, M, L, Id> Serialize for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_resource(self, &self.attributes, serializer)
    }
}

impl<'de, D, M, L, Id> Deserialize<'de> for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(de::Error::custom)
    }
}

impl<D, M, L, Id> Clone for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Clone,
    L: Clone,
    Id: Clone,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            attributes: self.attributes.clone(),
            relationships: self.relationships.clone(),
            meta: self.meta.clone(),
            links: self.links.clone(),
        }
    }
}

impl<D, M, L, Id> PartialEq for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: PartialEq,
    L: PartialEq,
    Id: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.attributes == other.attributes
            && self.relationships == other.relationships
            && self.meta == other.meta
            && self.links == other.links
    }
}

impl<D, M, L, Id> fmt::Debug for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: fmt::Debug,
    L: fmt::Debug,
    Id: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceObject")
            .field("type", &D::JSON_TYPE)
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .field("relationships", &self.relationships)
            .field("meta", &self.meta)
            .field("links", &self.links)
            .finish()
    }
}

impl<D, M, L, Id> JsonApiType for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
{
    fn json_type() -> &'static str {
        D::JSON_TYPE
    }
}

/// A resource shape that can be a union candidate or primary data.
pub trait ResourceObjectType: JsonApiType + Sized + Clone + PartialEq + fmt::Debug {
    /// Decode from a JSON value, checking the type tag first.
    fn decode_resource(value: &Value) -> Result<Self, ResourceObjectDecodingError>;

    /// Encode to a JSON value.
    fn encode_resource(&self) -> Result<Value, EncodingError>;

    /// The `(type, id)` pair, when the resource has an id.
    fn resource_identifier(&self) -> Option<ResourceIdentifier>;
}

impl<D, M, L, Id> ResourceObjectType for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn decode_resource(value: &Value) -> Result<Self, ResourceObjectDecodingError> {
        Self::decode(value)
    }

    fn encode_resource(&self) -> Result<Value, EncodingError> {
        self.encode()
    }

    fn resource_identifier(&self) -> Option<ResourceIdentifier> {
        self.identifier()
    }
}

impl<D, M, L, Id> JsonApiDecode for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    type Error = ResourceObjectDecodingError;

    fn decode_json(value: &Value, _options: &DecodeOptions) -> Result<Self, Self::Error> {
        Self::decode(value)
    }
}

impl<D, M, L, Id> JsonApiEncode for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn encode_json(&self) -> Result<Value, EncodingError> {
        self.encode()
    }
}
