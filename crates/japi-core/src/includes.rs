//! # Included Resources
//!
//! [`Includes`] materialises the `included` array of a document: one union
//! value per element, in document order, with no deduplication. Decoding is
//! fail-fast. The first element no candidate accepts aborts the decode with
//! its 1-based position and the array length:
//!
//! ```text
//! Out of the 6 includes in the document, the 5th one failed to parse: ...
//! ```

use std::ops::Add;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::DecodeOptions;
use crate::error::{json_kind, DocumentDecodingError, EncodingError, IncludesDecodingError};
use crate::json::{JsonApiDecode, JsonApiEncode};
use crate::poly::{PolyCase, PolyUnion};

/// The side-loaded resources of a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Includes<I> {
    values: Vec<I>,
}

impl<I> Includes<I> {
    /// Wrap already-decoded values.
    pub fn new(values: Vec<I>) -> Self {
        Self { values }
    }

    /// No included resources.
    pub fn none() -> Self {
        Self { values: Vec::new() }
    }

    /// All values in document order.
    pub fn values(&self) -> &[I] {
        &self.values
    }

    /// All values in document order, by value.
    pub fn into_values(self) -> Vec<I> {
        self.values
    }

    /// Number of included resources.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no included resources.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in document order.
    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.values.iter()
    }

    /// Every payload whose active case is `T`, in document order.
    ///
    /// ```ignore
    /// let authors: Vec<&Author> = document.includes.of::<Author, _>();
    /// ```
    pub fn of<T, Idx>(&self) -> Vec<&T>
    where
        I: PolyCase<T, Idx>,
    {
        self.values
            .iter()
            .filter_map(|value| PolyCase::<T, Idx>::case(value))
            .collect()
    }

    /// Every payload whose active case is `T`, in document order, by value.
    pub fn into_of<T, Idx>(self) -> Vec<T>
    where
        I: PolyCase<T, Idx>,
    {
        self.values
            .into_iter()
            .filter_map(PolyCase::<T, Idx>::into_case)
            .collect()
    }
}

impl<I: PolyUnion> Includes<I> {
    /// Decode the elements of an `included` array.
    pub fn decode(elements: &[Value]) -> Result<Self, IncludesDecodingError> {
        if I::ARITY == 0 {
            return Ok(Self::none());
        }
        let total_includes = elements.len();
        let values = elements
            .iter()
            .enumerate()
            .map(|(idx, element)| {
                I::decode_poly(element).map_err(|error| {
                    debug!(
                        position = idx + 1,
                        total = total_includes,
                        "included resource failed to decode"
                    );
                    IncludesDecodingError {
                        idx,
                        total_includes,
                        error,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { values })
    }

    /// Decode the `included` member of a document. An absent member means no
    /// includes; an empty array is rejected.
    pub(crate) fn decode_member(member: Option<&Value>) -> Result<Self, DocumentDecodingError> {
        match member {
            None => Ok(Self::none()),
            Some(Value::Array(elements)) if elements.is_empty() => {
                Err(DocumentDecodingError::EmptyIncludes)
            }
            Some(Value::Array(elements)) => Ok(Self::decode(elements)?),
            Some(other) => Err(DocumentDecodingError::IncludesNotAnArray {
                found: json_kind(other),
            }),
        }
    }

    /// Encode every element in document order.
    pub fn encode(&self) -> Result<Vec<Value>, EncodingError> {
        self.values.iter().map(PolyUnion::encode_poly).collect()
    }
}

impl<I> Default for Includes<I> {
    fn default() -> Self {
        Self::none()
    }
}

impl<I> Add for Includes<I> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.values.extend(rhs.values);
        self
    }
}

impl<I> FromIterator<I> for Includes<I> {
    fn from_iter<It: IntoIterator<Item = I>>(iter: It) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<I> Extend<I> for Includes<I> {
    fn extend<It: IntoIterator<Item = I>>(&mut self, iter: It) {
        self.values.extend(iter);
    }
}

impl<I> IntoIterator for Includes<I> {
    type Item = I;
    type IntoIter = std::vec::IntoIter<I>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a, I> IntoIterator for &'a Includes<I> {
    type Item = &'a I;
    type IntoIter = std::slice::Iter<'a, I>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<I: PolyUnion> Serialize for Includes<I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de, I: PolyUnion> Deserialize<'de> for Includes<I> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::<Value>::deserialize(deserializer)?;
        Self::decode(&elements).map_err(de::Error::custom)
    }
}

impl<I: PolyUnion> JsonApiDecode for Includes<I> {
    type Error = DocumentDecodingError;

    fn decode_json(value: &Value, options: &DecodeOptions) -> Result<Self, Self::Error> {
        match value {
            Value::Array(elements) => Self::decode(elements)
                .map_err(|e| options.finish_document(DocumentDecodingError::Includes(e))),
            other => Err(DocumentDecodingError::IncludesNotAnArray {
                found: json_kind(other),
            }),
        }
    }
}

impl<I: PolyUnion> JsonApiEncode for Includes<I> {
    fn encode_json(&self) -> Result<Value, EncodingError> {
        Ok(Value::Array(self.encode()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{NoAttributes, NoLinks, NoMetadata, NoRelationships};
    use crate::poly::{Poly0, Poly2};
    use crate::resource::{BasicResource, ResourceObject, ResourceObjectDescription};
    use serde_json::json;

    struct Cat;
    impl ResourceObjectDescription for Cat {
        const JSON_TYPE: &'static str = "cats";
        type Attributes = NoAttributes;
        type Relationships = NoRelationships;
    }

    struct Dog;
    impl ResourceObjectDescription for Dog {
        const JSON_TYPE: &'static str = "dogs";
        type Attributes = NoAttributes;
        type Relationships = NoRelationships;
    }

    type CatRes = BasicResource<Cat>;
    type DogRes = BasicResource<Dog>;
    type Pets = Poly2<CatRes, DogRes>;

    fn cat(id: &str) -> CatRes {
        ResourceObject::new(id.to_string(), NoAttributes, NoRelationships, NoMetadata, NoLinks)
    }

    fn dog(id: &str) -> DogRes {
        ResourceObject::new(id.to_string(), NoAttributes, NoRelationships, NoMetadata, NoLinks)
    }

    #[test]
    fn test_decode_preserves_order_and_duplicates() {
        let elements = vec![
            json!({"type": "dogs", "id": "1"}),
            json!({"type": "cats", "id": "2"}),
            json!({"type": "dogs", "id": "1"}),
        ];
        let includes = Includes::<Pets>::decode(&elements).expect("should decode");
        assert_eq!(includes.len(), 3);
        assert_eq!(
            includes.values(),
            &[Pets::B(dog("1")), Pets::A(cat("2")), Pets::B(dog("1"))]
        );
    }

    #[test]
    fn test_typed_retrieval() {
        let includes: Includes<Pets> = vec![
            Pets::B(dog("1")),
            Pets::A(cat("2")),
            Pets::B(dog("3")),
        ]
        .into_iter()
        .collect();
        let dogs = includes.of::<DogRes, _>();
        assert_eq!(dogs, vec![&dog("1"), &dog("3")]);
        let cats = includes.clone().into_of::<CatRes, _>();
        assert_eq!(cats, vec![cat("2")]);
    }

    #[test]
    fn test_fail_fast_position() {
        let elements = vec![
            json!({"type": "cats", "id": "1"}),
            json!({"type": "birds", "id": "2"}),
            json!({"type": "fish", "id": "3"}),
        ];
        let err = Includes::<Pets>::decode(&elements).unwrap_err();
        assert_eq!(err.idx, 1);
        assert_eq!(err.total_includes, 3);
        assert_eq!(
            err.to_string(),
            "Out of the 3 includes in the document, the 2nd one failed to parse: Found JSON:API type 'birds' but expected one of 'cats', 'dogs'"
        );
    }

    #[test]
    fn test_member_rules() {
        assert!(Includes::<Pets>::decode_member(None)
            .expect("absent is fine")
            .is_empty());
        assert_eq!(
            Includes::<Pets>::decode_member(Some(&json!([]))),
            Err(DocumentDecodingError::EmptyIncludes)
        );
        assert_eq!(
            Includes::<Pets>::decode_member(Some(&json!({}))),
            Err(DocumentDecodingError::IncludesNotAnArray {
                found: "an object"
            })
        );
    }

    #[test]
    fn test_no_includes_ignores_elements() {
        let includes = Includes::<Poly0>::decode(&[json!({"type": "anything"})])
            .expect("should decode");
        assert!(includes.is_empty());
    }

    #[test]
    fn test_concatenation() {
        let left = Includes::new(vec![Pets::A(cat("1"))]);
        let right = Includes::new(vec![Pets::B(dog("2")), Pets::A(cat("3"))]);
        let both = left + right;
        assert_eq!(both.len(), 3);
        assert_eq!(
            both.iter().map(PolyUnion::active_type).collect::<Vec<_>>(),
            ["cats", "dogs", "cats"]
        );
        assert_eq!(Includes::<Pets>::default() + Includes::none(), Includes::none());
    }

    #[test]
    fn test_encode_in_order() {
        let includes = Includes::new(vec![Pets::B(dog("2")), Pets::A(cat("1"))]);
        assert_eq!(
            serde_json::to_value(&includes).expect("should encode"),
            json!([{"type": "dogs", "id": "2"}, {"type": "cats", "id": "1"}])
        );
    }

    #[test]
    fn test_encoding_poly0_fails() {
        let includes = Includes::new(vec![Poly0]);
        assert!(matches!(
            includes.encode(),
            Err(EncodingError::IllegalEncoding(_))
        ));
    }
}
