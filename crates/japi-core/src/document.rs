//! # Documents
//!
//! The top-level envelope: primary data, included resources, links and meta.
//!
//! ## Primary Data Shapes
//!
//! | Rust type           | `data` member                                  |
//! |---------------------|------------------------------------------------|
//! | a resource or union | required object                                |
//! | `Option<R>`         | required, object or `null`                     |
//! | `Vec<R>`            | required array; failures report their position |
//! | [`NoResourceBody`]  | not read, never written                        |
//!
//! Encoding writes `data`, `included`, `links`, `meta` in that order. The
//! `included` member is written only when there is at least one resource, and
//! a decoded `included` member must not be an empty array.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DecodeOptions;
use crate::error::{
    json_kind, DocumentDecodingError, EncodingError, FieldLocation, PrimaryDataDecodingError,
    ResourceDecodingError, ResourceObjectDecodingError,
};
use crate::identifier::MaybeRawId;
use crate::includes::Includes;
use crate::json::{JsonApiDecode, JsonApiEncode};
use crate::payload::{is_omitted, NoLinks, NoMetadata, Payload};
use crate::poly::{NoIncludes, PolyUnion};
use crate::resource::{decode_member, ResourceObject, ResourceObjectDescription};
use crate::sparse::SparseFieldset;

/// A single resource that can be written as primary data.
pub trait EncodablePrimaryResource {
    /// Encode to a resource object value.
    fn encode_primary(&self) -> Result<Value, EncodingError>;
}

/// A single resource that can be read as primary data.
pub trait PrimaryResource: EncodablePrimaryResource + Sized + Clone + PartialEq + fmt::Debug {
    /// Decode from a resource object value.
    fn decode_primary(value: &Value) -> Result<Self, ResourceDecodingError>;
}

/// A primary data shape that can be written.
pub trait EncodablePrimaryData {
    /// The `data` member, or `None` to omit it.
    fn encode_data(&self) -> Result<Option<Value>, EncodingError>;
}

/// A primary data shape that can be read.
pub trait PrimaryData: EncodablePrimaryData + Sized {
    /// Decode from the `data` member, `None` when it is absent.
    fn decode_data(data: Option<&Value>) -> Result<Self, DocumentDecodingError>;
}

/// Primary data for documents that carry none, such as error or meta-only
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoResourceBody;

impl EncodablePrimaryData for NoResourceBody {
    fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
        Ok(None)
    }
}

impl PrimaryData for NoResourceBody {
    fn decode_data(_data: Option<&Value>) -> Result<Self, DocumentDecodingError> {
        Ok(NoResourceBody)
    }
}

/// Decode a `data` member that must hold exactly one resource.
pub(crate) fn decode_single<R: PrimaryResource>(
    data: Option<&Value>,
) -> Result<R, DocumentDecodingError> {
    match data {
        None => Err(DocumentDecodingError::MissingPrimaryData),
        Some(Value::Null) => Err(DocumentDecodingError::NullPrimaryData),
        Some(value) => Ok(R::decode_primary(value)?),
    }
}

impl<R: EncodablePrimaryResource> EncodablePrimaryData for Option<R> {
    fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
        match self {
            Some(resource) => resource.encode_primary().map(Some),
            None => Ok(Some(Value::Null)),
        }
    }
}

impl<R: PrimaryResource> PrimaryData for Option<R> {
    fn decode_data(data: Option<&Value>) -> Result<Self, DocumentDecodingError> {
        match data {
            None => Err(DocumentDecodingError::MissingPrimaryData),
            Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(R::decode_primary(value)?)),
        }
    }
}

impl<R: EncodablePrimaryResource> EncodablePrimaryData for Vec<R> {
    fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
        let elements = self
            .iter()
            .map(EncodablePrimaryResource::encode_primary)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Value::Array(elements)))
    }
}

impl<R: PrimaryResource> PrimaryData for Vec<R> {
    fn decode_data(data: Option<&Value>) -> Result<Self, DocumentDecodingError> {
        let elements = match data {
            None => return Err(DocumentDecodingError::MissingPrimaryData),
            Some(Value::Array(elements)) => elements,
            Some(other) => {
                return Err(DocumentDecodingError::PrimaryDataNotAnArray {
                    found: json_kind(other),
                })
            }
        };
        let total_resources = elements.len();
        elements
            .iter()
            .enumerate()
            .map(|(idx, element)| {
                R::decode_primary(element).map_err(|error| PrimaryDataDecodingError {
                    idx,
                    total_resources,
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

impl<D, M, L, Id> EncodablePrimaryResource for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn encode_primary(&self) -> Result<Value, EncodingError> {
        self.encode()
    }
}

impl<D, M, L, Id> PrimaryResource for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn decode_primary(value: &Value) -> Result<Self, ResourceDecodingError> {
        Ok(Self::decode(value)?)
    }
}

impl<D, M, L, Id> EncodablePrimaryData for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
        self.encode().map(Some)
    }
}

impl<D, M, L, Id> PrimaryData for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn decode_data(data: Option<&Value>) -> Result<Self, DocumentDecodingError> {
        decode_single(data)
    }
}

impl<D, M, L, Id> EncodablePrimaryResource for SparseFieldset<'_, D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn encode_primary(&self) -> Result<Value, EncodingError> {
        self.encode()
    }
}

impl<D, M, L, Id> EncodablePrimaryData for SparseFieldset<'_, D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
        self.encode().map(Some)
    }
}

/// A JSON:API document.
///
/// `P` is the primary data shape, `M` and `L` the top-level meta and links,
/// and `I` the union of resource shapes allowed in `included`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<P, M = NoMetadata, L = NoLinks, I = NoIncludes> {
    /// Primary data.
    pub data: P,
    /// Included resources, in document order.
    pub includes: Includes<I>,
    /// Top-level meta.
    pub meta: M,
    /// Top-level links.
    pub links: L,
}

impl<P> Document<P> {
    /// A document with only primary data.
    pub fn new(data: P) -> Self {
        Self {
            data,
            includes: Includes::none(),
            meta: NoMetadata,
            links: NoLinks,
        }
    }
}

impl<P, M, L, I> Document<P, M, L, I> {
    /// A document with every member given.
    pub fn with_parts(data: P, includes: Includes<I>, meta: M, links: L) -> Self {
        Self {
            data,
            includes,
            meta,
            links,
        }
    }
}

impl<P, M, L, I> Document<P, M, L, I>
where
    P: PrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    /// Decode a document with default options.
    pub fn decode(value: &Value) -> Result<Self, DocumentDecodingError> {
        Self::decode_with(value, &DecodeOptions::default())
    }

    /// Decode a document.
    pub fn decode_with(
        value: &Value,
        options: &DecodeOptions,
    ) -> Result<Self, DocumentDecodingError> {
        Self::decode_object(value).map_err(|e| options.finish_document(e))
    }

    fn decode_object(value: &Value) -> Result<Self, DocumentDecodingError> {
        let object = value
            .as_object()
            .ok_or(DocumentDecodingError::NotAnObject {
                found: json_kind(value),
            })?;
        debug!(
            has_data = object.contains_key("data"),
            has_included = object.contains_key("included"),
            "decoding document"
        );
        let data = P::decode_data(object.get("data"))?;
        let includes = Includes::decode_member(object.get("included"))?;
        let meta = decode_top_level(object, FieldLocation::Meta)?;
        let links = decode_top_level(object, FieldLocation::Links)?;
        Ok(Self {
            data,
            includes,
            meta,
            links,
        })
    }
}

impl<P, M, L, I> Document<P, M, L, I>
where
    P: EncodablePrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    /// Encode the document to a JSON value.
    pub fn encode(&self) -> Result<Value, EncodingError> {
        let mut object = Map::new();
        if let Some(data) = self.data.encode_data()? {
            object.insert("data".to_string(), data);
        }
        if !self.includes.is_empty() {
            object.insert("included".to_string(), Value::Array(self.includes.encode()?));
        }
        insert_member(&mut object, "links", &self.links)?;
        insert_member(&mut object, "meta", &self.meta)?;
        debug!(
            members = object.len(),
            included = self.includes.len(),
            "encoded document"
        );
        Ok(Value::Object(object))
    }
}

/// Write a top-level payload member. Markers and payloads that render as
/// `null` (such as `None`) leave the member out.
fn insert_member<P: Payload>(
    object: &mut Map<String, Value>,
    name: &str,
    payload: &P,
) -> Result<(), EncodingError> {
    if is_omitted::<P>() {
        return Ok(());
    }
    match serde_json::to_value(payload)? {
        Value::Null => {}
        value => {
            object.insert(name.to_string(), value);
        }
    }
    Ok(())
}

fn decode_top_level<P: Payload>(
    object: &Map<String, Value>,
    location: FieldLocation,
) -> Result<P, DocumentDecodingError> {
    decode_member(object, location).map_err(|e| match e {
        ResourceObjectDecodingError::MissingRequiredMember { member } => {
            DocumentDecodingError::MissingRequiredMember { member }
        }
        other => DocumentDecodingError::MalformedMember {
            member: location.member(),
            reason: other.to_string(),
        },
    })
}

impl<P, M, L, I> Serialize for Document<P, M, L, I>
where
    P: EncodablePrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode()
            .map_err(ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, P, M, L, I> Deserialize<'de> for Document<P, M, L, I>
where
    P: PrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::decode(&value).map_err(de::Error::custom)
    }
}

impl<P, M, L, I> JsonApiDecode for Document<P, M, L, I>
where
    P: PrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    type Error = DocumentDecodingError;

    fn decode_json(value: &Value, options: &DecodeOptions) -> Result<Self, Self::Error> {
        Self::decode_with(value, options)
    }
}

impl<P, M, L, I> JsonApiEncode for Document<P, M, L, I>
where
    P: EncodablePrimaryData,
    M: Payload,
    L: Payload,
    I: PolyUnion,
{
    fn encode_json(&self) -> Result<Value, EncodingError> {
        self.encode()
    }
}
