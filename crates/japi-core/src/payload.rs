//! # Payloads and Wire Markers
//!
//! Attributes, relationships, meta and links are all *payloads*: serde values
//! the codec reads from, and writes to, one member of a resource object or
//! document. A payload type may declare itself a marker through
//! [`Payload::absent`], meaning the member never appears on the wire. The
//! codec asks the type, never compares types at runtime.
//!
//! ## Markers
//!
//! | Marker              | Replaces        | On encode       | On decode             |
//! |---------------------|-----------------|-----------------|-----------------------|
//! | [`NoAttributes`]    | `attributes`    | member omitted  | member ignored        |
//! | [`NoRelationships`] | `relationships` | member omitted  | member ignored        |
//! | [`NoMetadata`]      | `meta`          | member omitted  | member ignored        |
//! | [`NoLinks`]         | `links`         | member omitted  | member ignored        |

use std::fmt::Debug;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A value carried by one member of a resource object or document.
pub trait Payload: Serialize + DeserializeOwned + Clone + PartialEq + Debug {
    /// The value to use when this payload is a marker for an absent member.
    ///
    /// Returns `None` for every ordinary payload. Marker types return their
    /// single value, which also tells the codec to omit the member on encode
    /// and ignore it on decode.
    fn absent() -> Option<Self> {
        None
    }
}

/// Whether members of payload type `P` are kept off the wire.
pub(crate) fn is_omitted<P: Payload>() -> bool {
    P::absent().is_some()
}

macro_rules! marker_payload {
    ($($(#[$doc:meta])* $name:ident;)+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
            pub struct $name;

            impl Payload for $name {
                fn absent() -> Option<Self> {
                    Some($name)
                }
            }
        )+
    };
}

marker_payload! {
    /// The resource has no attributes. `attributes` is never emitted.
    NoAttributes;
    /// The resource has no relationships. `relationships` is never emitted.
    NoRelationships;
    /// No `meta` member.
    NoMetadata;
    /// No `links` member.
    NoLinks;
}

impl Payload for Value {}

impl Payload for Map<String, Value> {}

/// An optional member: absent or `null` decodes to `None`.
impl<P: Payload> Payload for Option<P> {}

/// A hypermedia link: a URL with optional link-level meta.
///
/// With the default [`NoMetadata`] the link is written as a bare string.
/// Any other meta type writes `{"href": ..., "meta": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link<M = NoMetadata> {
    /// Target URL.
    pub url: String,
    /// Link-level meta.
    pub meta: M,
}

impl Link<NoMetadata> {
    /// A link with no meta.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            meta: NoMetadata,
        }
    }
}

impl<M> Link<M> {
    /// A link carrying meta.
    pub fn with_meta(url: impl Into<String>, meta: M) -> Self {
        Self {
            url: url.into(),
            meta,
        }
    }
}

impl<M: Payload> Serialize for Link<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if is_omitted::<M>() {
            return serializer.serialize_str(&self.url);
        }
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("href", &self.url)?;
        map.serialize_entry("meta", &self.meta)?;
        map.end()
    }
}

impl<'de, M: Payload> Deserialize<'de> for Link<M> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match (value, M::absent()) {
            (Value::String(url), Some(meta)) => Ok(Self { url, meta }),
            (Value::String(_), None) => Err(de::Error::custom(
                "link must be an object with 'href' and 'meta' when it carries meta",
            )),
            (Value::Object(mut object), absent) => {
                let url = match object.remove("href") {
                    Some(Value::String(url)) => url,
                    Some(_) => return Err(de::Error::custom("link 'href' must be a string")),
                    None => return Err(de::Error::missing_field("href")),
                };
                let meta = match (absent, object.remove("meta")) {
                    (Some(meta), _) => meta,
                    (None, Some(raw)) => serde_json::from_value(raw).map_err(de::Error::custom)?,
                    (None, None) => return Err(de::Error::missing_field("meta")),
                };
                Ok(Self { url, meta })
            }
            (other, _) => Err(de::Error::custom(format!(
                "link must be a string or an object but found {}",
                crate::error::json_kind(&other)
            ))),
        }
    }
}

impl<M: Payload> Payload for Link<M> {}
