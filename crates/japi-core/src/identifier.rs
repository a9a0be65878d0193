//! # Resource Identifiers
//!
//! A resource is addressed by its `(type, id)` pair. The raw id type is
//! chosen per resource: [`String`], [`uuid::Uuid`], or [`Unidentified`] for
//! client-created resources whose id the server has not assigned yet.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A type usable as the raw `id` of a resource object.
pub trait MaybeRawId: Serialize + DeserializeOwned + Clone + PartialEq + Debug {
    /// The marker value for resources without an id, if this is the marker type.
    fn unidentified() -> Option<Self> {
        None
    }

    /// The id as it appears inside a resource identifier, or `None` when unidentified.
    fn to_id_string(&self) -> Option<String>;
}

/// Raw id marker for resources that have not been assigned an id.
///
/// Resources with this id type never write an `id` member and refuse to
/// decode one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Unidentified;

impl MaybeRawId for Unidentified {
    fn unidentified() -> Option<Self> {
        Some(Unidentified)
    }

    fn to_id_string(&self) -> Option<String> {
        None
    }
}

impl MaybeRawId for String {
    fn to_id_string(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl MaybeRawId for uuid::Uuid {
    fn to_id_string(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Whether ids of type `Id` are kept off the wire.
pub(crate) fn is_unidentified<Id: MaybeRawId>() -> bool {
    Id::unidentified().is_some()
}

/// A `(type, id)` reference to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    /// The resource type tag.
    #[serde(rename = "type")]
    pub json_type: String,
    /// The resource id.
    pub id: String,
}

impl ResourceIdentifier {
    /// Create an identifier.
    pub fn new(json_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            json_type: json_type.into(),
            id: id.into(),
        }
    }
}

/// A type with a static JSON:API type tag.
pub trait JsonApiType {
    /// The `type` member value.
    fn json_type() -> &'static str;
}
