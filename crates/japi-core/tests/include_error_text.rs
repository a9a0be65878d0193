//! Integration test: the exact text of include decoding failures.
//!
//! Callers match these messages byte for byte, so every case here pins the
//! full string: totals that exercise each ordinal suffix family, the all-tags
//! mismatch form, and the missing-attribute form that outranks it.

use japi_core::{
    from_str, from_value, BasicResource, Include2, Include3, Includes, IncludesDecodingError,
    JsonApiError, NoAttributes, NoRelationships, Payload, ResourceObjectDescription,
    ToOneRelationship,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FooBar {
    foo: String,
    bar: i64,
}

impl Payload for FooBar {}

enum TestEntityType {}

impl ResourceObjectDescription for TestEntityType {
    const JSON_TYPE: &'static str = "test_entity1";
    type Attributes = FooBar;
    type Relationships = NoRelationships;
}

type TestEntity = BasicResource<TestEntityType>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Entity2Relationships {
    entity1: ToOneRelationship<TestEntity>,
}

impl Payload for Entity2Relationships {}

enum TestEntityType2 {}

impl ResourceObjectDescription for TestEntityType2 {
    const JSON_TYPE: &'static str = "test_entity2";
    type Attributes = FooBar;
    type Relationships = Entity2Relationships;
}

type TestEntity2 = BasicResource<TestEntityType2>;

enum TestEntityType4 {}

impl ResourceObjectDescription for TestEntityType4 {
    const JSON_TYPE: &'static str = "test_entity4";
    type Attributes = NoAttributes;
    type Relationships = NoRelationships;
}

type TestEntity4 = BasicResource<TestEntityType4>;

fn entity1(id: usize) -> Value {
    json!({
        "type": "test_entity1",
        "id": id.to_string(),
        "attributes": {"foo": "Hello", "bar": 123}
    })
}

fn entity2(id: usize) -> Value {
    json!({
        "type": "test_entity2",
        "id": id.to_string(),
        "attributes": {"foo": "World", "bar": 456},
        "relationships": {
            "entity1": {"data": {"type": "test_entity1", "id": "1"}}
        }
    })
}

fn entity4(id: usize) -> Value {
    json!({"type": "test_entity4", "id": id.to_string()})
}

/// `total` includes alternating between the two accepted types, with a
/// `test_entity4` at the 1-based position `bad`.
fn includes_with_bad_type(total: usize, bad: usize) -> Value {
    let elements = (1..=total)
        .map(|position| match position {
            p if p == bad => entity4(p),
            p if p % 2 == 1 => entity1(p),
            p => entity2(p),
        })
        .collect();
    Value::Array(elements)
}

fn decode_error(value: &Value) -> IncludesDecodingError {
    let elements = value.as_array().expect("fixture should be an array");
    Includes::<Include2<TestEntity, TestEntity2>>::decode(elements)
        .expect_err("decoding should fail")
}

#[test]
fn test_three_includes_third_bad() {
    let err = decode_error(&includes_with_bad_type(3, 3));
    assert_eq!(err.idx, 2);
    assert_eq!(err.total_includes, 3);
    assert_eq!(
        err.to_string(),
        "Out of the 3 includes in the document, the 3rd one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_four_includes_third_bad() {
    assert_eq!(
        decode_error(&includes_with_bad_type(4, 3)).to_string(),
        "Out of the 4 includes in the document, the 3rd one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_six_includes_fifth_bad() {
    assert_eq!(
        decode_error(&includes_with_bad_type(6, 5)).to_string(),
        "Out of the 6 includes in the document, the 5th one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_eleven_includes_tenth_bad() {
    assert_eq!(
        decode_error(&includes_with_bad_type(11, 10)).to_string(),
        "Out of the 11 includes in the document, the 10th one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_twenty_two_includes_twenty_first_bad() {
    let err = decode_error(&includes_with_bad_type(22, 21));
    assert_eq!(err.idx, 20);
    assert_eq!(
        err.to_string(),
        "Out of the 22 includes in the document, the 21st one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_first_bad_element_stops_decoding() {
    let mut value = includes_with_bad_type(6, 2);
    if let Some(elements) = value.as_array_mut() {
        elements[4] = entity4(5);
    }
    let err = decode_error(&value);
    assert_eq!(err.idx, 1);
    assert!(err.to_string().contains("the 2nd one failed to parse"));
}

#[test]
fn test_missing_attribute_outranks_type_mismatch() {
    let value = json!([
        entity1(1),
        entity4(2),
        {
            "type": "test_entity2",
            "id": "3",
            "attributes": {"bar": 3},
            "relationships": {
                "entity1": {"data": {"type": "test_entity1", "id": "1"}}
            }
        }
    ]);
    let elements = value.as_array().expect("fixture should be an array");
    let err = Includes::<Include3<TestEntity, TestEntity2, TestEntity4>>::decode(elements)
        .expect_err("decoding should fail");
    assert_eq!(
        err.to_string(),
        "Out of the 3 includes in the document, the 3rd one failed to parse: 'foo' attribute is required and missing."
    );
    assert_eq!(err.error.attempts().len(), 3);
}

#[test]
fn test_error_text_survives_json_entry_points() {
    let text = includes_with_bad_type(3, 3).to_string();
    let err = from_str::<Includes<Include2<TestEntity, TestEntity2>>>(&text)
        .expect_err("decoding should fail");
    assert!(matches!(err, JsonApiError::Document(_)));
    assert_eq!(
        err.to_string(),
        "Out of the 3 includes in the document, the 3rd one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_error_text_survives_serde() {
    let err = serde_json::from_value::<Includes<Include2<TestEntity, TestEntity2>>>(
        includes_with_bad_type(4, 3),
    )
    .expect_err("decoding should fail");
    assert_eq!(
        err.to_string(),
        "Out of the 4 includes in the document, the 3rd one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'"
    );
}

#[test]
fn test_valid_includes_decode_in_order() {
    let includes: Includes<Include3<TestEntity, TestEntity2, TestEntity4>> =
        from_value(&includes_with_bad_type(5, 4)).expect("should decode");
    assert_eq!(includes.len(), 5);
    assert_eq!(includes.of::<TestEntity, _>().len(), 3);
    assert_eq!(includes.of::<TestEntity2, _>().len(), 1);
    let fourth = includes.of::<TestEntity4, _>();
    assert_eq!(fourth.len(), 1);
    assert_eq!(fourth[0].id, "4");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Address {
    street: String,
    city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PersonAttributes {
    name: String,
    address: Address,
}

impl Payload for PersonAttributes {}

enum PersonType {}

impl ResourceObjectDescription for PersonType {
    const JSON_TYPE: &'static str = "people";
    type Attributes = PersonAttributes;
    type Relationships = NoRelationships;
}

type Person = BasicResource<PersonType>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct OwnerMeta {
    since: String,
}

impl Payload for OwnerMeta {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PetRelationships {
    owner: ToOneRelationship<TestEntity, OwnerMeta>,
}

impl Payload for PetRelationships {}

enum PetType {}

impl ResourceObjectDescription for PetType {
    const JSON_TYPE: &'static str = "pets";
    type Attributes = NoAttributes;
    type Relationships = PetRelationships;
}

type Pet = BasicResource<PetType>;

#[test]
fn test_nested_missing_key_is_not_an_attribute() {
    let value = json!([{
        "type": "people",
        "id": "1",
        "attributes": {"name": "Ada", "address": {"street": "Main"}}
    }]);
    let err = decode_person_error(&value);
    assert_eq!(
        err.to_string(),
        "Out of the 1 includes in the document, the 1st one failed to parse: 'attributes' member failed to parse: missing field `city`"
    );
}

#[test]
fn test_top_level_missing_key_beside_nested_struct() {
    let value = json!([{
        "type": "people",
        "id": "1",
        "attributes": {"address": {"street": "Main", "city": "Springfield"}}
    }]);
    let err = decode_person_error(&value);
    assert_eq!(
        err.to_string(),
        "Out of the 1 includes in the document, the 1st one failed to parse: 'name' attribute is required and missing."
    );
}

#[test]
fn test_missing_relationship_meta_key() {
    let value = json!([
        entity1(1),
        {
            "type": "pets",
            "id": "2",
            "relationships": {
                "owner": {"data": {"type": "test_entity1", "id": "1"}, "meta": {}}
            }
        }
    ]);
    let elements = value.as_array().expect("fixture should be an array");
    let err = Includes::<Include2<TestEntity, Pet>>::decode(elements)
        .expect_err("decoding should fail");
    assert_eq!(
        err.to_string(),
        "Out of the 2 includes in the document, the 2nd one failed to parse: 'relationships' member failed to parse: 'since' meta is required and missing."
    );
}

#[test]
fn test_relationship_meta_decodes_when_present() {
    let value = json!([{
        "type": "pets",
        "id": "2",
        "relationships": {
            "owner": {"data": {"type": "test_entity1", "id": "1"}, "meta": {"since": "2020"}}
        }
    }]);
    let includes: Includes<Include2<TestEntity, Pet>> =
        from_value(&value).expect("should decode");
    let pets = includes.of::<Pet, _>();
    assert_eq!(pets[0].relationships.owner.meta.since, "2020");
    assert_eq!(pets[0].relationships.owner.id(), Some("1"));
}

fn decode_person_error(value: &Value) -> IncludesDecodingError {
    let elements = value.as_array().expect("fixture should be an array");
    Includes::<Include2<TestEntity, Person>>::decode(elements).expect_err("decoding should fail")
}
