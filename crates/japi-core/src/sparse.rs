//! # Sparse Fieldsets
//!
//! [`SparseFieldset`] encodes a resource object with only the named
//! attributes. Everything else about the resource (type, id, relationships,
//! links, meta) is written unchanged.
//!
//! The filtering happens inside serde: [`SparseFieldSerializer`] wraps the
//! real serializer and drops the fields of the *outermost* struct or map it
//! is handed. Values of allowed fields are passed to the real serializer
//! untouched, so nested objects are written in full. A dropped field is not
//! written at all, not even as `null`. Names that match no attribute have no
//! effect.

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

use crate::error::EncodingError;
use crate::identifier::MaybeRawId;
use crate::json::JsonApiEncode;
use crate::payload::{NoLinks, NoMetadata, Payload};
use crate::resource::{serialize_resource, ResourceObject, ResourceObjectDescription};

/// A serializer that forwards to `S` but keeps only the allowed fields of
/// the top-level struct or map.
pub struct SparseFieldSerializer<'f, S> {
    inner: S,
    fields: &'f BTreeSet<String>,
}

impl<'f, S: Serializer> SparseFieldSerializer<'f, S> {
    /// Wrap `inner`, allowing only `fields`.
    pub fn new(inner: S, fields: &'f BTreeSet<String>) -> Self {
        Self { inner, fields }
    }
}

impl<'f, S: Serializer> Serializer for SparseFieldSerializer<'f, S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = S::SerializeSeq;
    type SerializeTuple = S::SerializeTuple;
    type SerializeTupleStruct = S::SerializeTupleStruct;
    type SerializeTupleVariant = S::SerializeTupleVariant;
    type SerializeMap = SparseMap<'f, S::SerializeMap>;
    type SerializeStruct = SparseStruct<'f, S::SerializeStruct>;
    type SerializeStructVariant = S::SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<S::Ok, S::Error> {
        self.inner.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<S::Ok, S::Error> {
        self.inner.serialize_u128(v)
    }

    fn serialize_f32(self, v: f32) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f32(v)
    }

    fn serialize_f64(self, v: f64) -> Result<S::Ok, S::Error> {
        self.inner.serialize_f64(v)
    }

    fn serialize_char(self, v: char) -> Result<S::Ok, S::Error> {
        self.inner.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<S::Ok, S::Error> {
        self.inner.serialize_bytes(v)
    }

    fn serialize_none(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_none()
    }

    // Option and newtype wrappers are transparent: the struct inside is
    // still the top level.
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<S::Ok, S::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<S::Ok, S::Error> {
        self.inner.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<S::Ok, S::Error> {
        self.inner
            .serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<S::Ok, S::Error> {
        self.inner
            .serialize_newtype_variant(name, variant_index, variant, value)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, S::Error> {
        self.inner.serialize_seq(len)
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, S::Error> {
        self.inner.serialize_tuple(len)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, S::Error> {
        self.inner.serialize_tuple_struct(name, len)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, S::Error> {
        self.inner
            .serialize_tuple_variant(name, variant_index, variant, len)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, S::Error> {
        Ok(SparseMap {
            inner: self.inner.serialize_map(None)?,
            fields: self.fields,
            skip_value: false,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, S::Error> {
        Ok(SparseStruct {
            inner: self.inner.serialize_struct(name, len)?,
            fields: self.fields,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, S::Error> {
        self.inner
            .serialize_struct_variant(name, variant_index, variant, len)
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

/// Struct state of [`SparseFieldSerializer`].
pub struct SparseStruct<'f, S> {
    inner: S,
    fields: &'f BTreeSet<String>,
}

impl<S: SerializeStruct> SerializeStruct for SparseStruct<'_, S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), S::Error> {
        match self.fields.contains(key) {
            true => self.inner.serialize_field(key, value),
            false => self.inner.skip_field(key),
        }
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), S::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

/// Map state of [`SparseFieldSerializer`].
pub struct SparseMap<'f, S> {
    inner: S,
    fields: &'f BTreeSet<String>,
    skip_value: bool,
}

impl<S> SparseMap<'_, S> {
    fn allows<K: ?Sized + Serialize>(&self, key: &K) -> bool {
        key_name(key).is_some_and(|name| self.fields.contains(&name))
    }
}

/// The field name a map key renders to. Keys that do not render to a
/// string, number or boolean have no name and are never allowed.
fn key_name<K: ?Sized + Serialize>(key: &K) -> Option<String> {
    match serde_json::to_value(key).ok()? {
        Value::String(name) => Some(name),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl<S: SerializeMap> SerializeMap for SparseMap<'_, S> {
    type Ok = S::Ok;
    type Error = S::Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), S::Error> {
        self.skip_value = !self.allows(key);
        match self.skip_value {
            true => Ok(()),
            false => self.inner.serialize_key(key),
        }
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), S::Error> {
        match std::mem::take(&mut self.skip_value) {
            true => Ok(()),
            false => self.inner.serialize_value(value),
        }
    }

    fn serialize_entry<K: ?Sized + Serialize, V: ?Sized + Serialize>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), S::Error> {
        match self.allows(key) {
            true => self.inner.serialize_entry(key, value),
            false => Ok(()),
        }
    }

    fn end(self) -> Result<S::Ok, S::Error> {
        self.inner.end()
    }
}

/// Attributes payload routed through [`SparseFieldSerializer`].
struct SparseAttributes<'a, A> {
    attributes: &'a A,
    fields: &'a BTreeSet<String>,
}

impl<A: Serialize> Serialize for SparseAttributes<'_, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes
            .serialize(SparseFieldSerializer::new(serializer, self.fields))
    }
}

/// A resource object viewed through an allowed set of attribute names.
pub struct SparseFieldset<'r, D, M = NoMetadata, L = NoLinks, Id = String>
where
    D: ResourceObjectDescription,
{
    resource: &'r ResourceObject<D, M, L, Id>,
    fields: BTreeSet<String>,
}

impl<'r, D, M, L, Id> SparseFieldset<'r, D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    /// View `resource` with only `fields` among its attributes.
    pub fn new(resource: &'r ResourceObject<D, M, L, Id>, fields: BTreeSet<String>) -> Self {
        Self { resource, fields }
    }

    /// The underlying resource.
    pub fn resource(&self) -> &'r ResourceObject<D, M, L, Id> {
        self.resource
    }

    /// The allowed attribute names.
    pub fn fields(&self) -> &BTreeSet<String> {
        &self.fields
    }

    /// Encode to a JSON value.
    pub fn encode(&self) -> Result<Value, EncodingError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl<D, M, L, Id> Serialize for SparseFieldset<'_, D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: Payload,
    L: Payload,
    Id: MaybeRawId,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let attributes = SparseAttributes {
            attributes: &self.resource.attributes,
            fields: &self.fields,
        };
        serialize_resource(self.resource, &attributes, serializer)
    }
}

impl<D, M, L, Id> JsonApiEncode for SparseFieldset<'_, D, M, L, Id>
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

impl<D, M, L, Id> Clone for SparseFieldset<'_, D, M, L, Id>
where
    D: ResourceObjectDescription,
{
    fn clone(&self) -> Self {
        Self {
            resource: self.resource,
            fields: self.fields.clone(),
        }
    }
}

impl<D, M, L, Id> fmt::Debug for SparseFieldset<'_, D, M, L, Id>
where
    D: ResourceObjectDescription,
    M: fmt::Debug,
    L: fmt::Debug,
    Id: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseFieldset")
            .field("resource", self.resource)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::NoRelationships;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Nested {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Attributes {
        foo: String,
        bar: i64,
        nested: Nested,
    }

    impl Payload for Attributes {}

    struct Thing;

    impl ResourceObjectDescription for Thing {
        const JSON_TYPE: &'static str = "things";
        type Attributes = Attributes;
        type Relationships = NoRelationships;
    }

    fn thing() -> ResourceObject<Thing> {
        ResourceObject::new(
            "1".to_string(),
            Attributes {
                foo: "hello".to_string(),
                bar: 7,
                nested: Nested { x: 1, y: 2 },
            },
            NoRelationships,
            NoMetadata,
            NoLinks,
        )
    }

    fn allow(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_only_allowed_attributes() {
        let value = thing().sparse(["foo"]).encode().expect("should encode");
        assert_eq!(
            value,
            json!({"type": "things", "id": "1", "attributes": {"foo": "hello"}})
        );
    }

    #[test]
    fn test_nested_values_kept_whole() {
        let value = thing().sparse(["nested"]).encode().expect("should encode");
        assert_eq!(value["attributes"], json!({"nested": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_empty_set_emits_no_fields() {
        let value = thing()
            .sparse(std::iter::empty::<String>())
            .encode()
            .expect("should encode");
        assert_eq!(value["attributes"], json!({}));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let value = thing()
            .sparse(["foo", "does_not_exist"])
            .encode()
            .expect("should encode");
        assert_eq!(value["attributes"], json!({"foo": "hello"}));
    }

    #[test]
    fn test_text_output_matches() {
        let resource = thing();
        let text = serde_json::to_string(&resource.sparse(["bar", "foo"])).expect("should encode");
        assert_eq!(
            text,
            r#"{"type":"things","id":"1","attributes":{"foo":"hello","bar":7}}"#
        );
    }

    #[test]
    fn test_map_keys_filtered() {
        let mut map = BTreeMap::new();
        map.insert("keep", 1);
        map.insert("drop", 2);
        let fields = allow(&["keep"]);
        let value = map
            .serialize(SparseFieldSerializer::new(
                serde_json::value::Serializer,
                &fields,
            ))
            .expect("should serialize");
        assert_eq!(value, json!({"keep": 1}));
    }

    #[test]
    fn test_json_object_keys_filtered() {
        let mut map = serde_json::Map::new();
        map.insert("a".to_string(), json!(1));
        map.insert("b".to_string(), json!({"a": 2}));
        let fields = allow(&["b"]);
        let mut out = Vec::new();
        Value::Object(map)
            .serialize(SparseFieldSerializer::new(
                &mut serde_json::Serializer::new(&mut out),
                &fields,
            ))
            .expect("should serialize");
        assert_eq!(String::from_utf8(out).expect("utf8"), r#"{"b":{"a":2}}"#);
    }

    #[test]
    fn test_scalars_pass_through() {
        let fields = allow(&[]);
        let value = 5u8
            .serialize(SparseFieldSerializer::new(
                serde_json::value::Serializer,
                &fields,
            ))
            .expect("should serialize");
        assert_eq!(value, json!(5));
    }

    #[test]
    fn test_sparse_document_primary_data() {
        let resource = thing();
        let doc = crate::Document::new(resource.sparse(["bar"]));
        assert_eq!(
            doc.encode().expect("should encode"),
            json!({"data": {"type": "things", "id": "1", "attributes": {"bar": 7}}})
        );
    }
}
