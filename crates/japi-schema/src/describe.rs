//! # Type Descriptions
//!
//! [`OpenApiNodeType`] maps a Rust type to the [`JsonNode`] describing its
//! wire form. Primitives, options, vectors and every `japi-core` shape are
//! covered here; application attribute and relationship structs implement
//! the trait by assembling an [`ObjectContext`].
//!
//! Marker payloads describe themselves as empty optional objects, but the
//! resource and document descriptions consult [`Payload::absent`] first, so
//! marker members never appear in a rendered schema.

use japi_core::{
    Document, JsonApiType, Link, MaybeRawId, NoAttributes, NoLinks, NoMetadata, NoRelationships,
    NoResourceBody, Payload, Poly0, Poly1, Poly10, Poly11, Poly12, Poly13, Poly14, Poly15,
    Poly16, Poly2, Poly3, Poly4, Poly5, Poly6, Poly7, Poly8, Poly9, ResourceObject,
    ResourceObjectDescription, ToManyRelationship, ToOneRelationship, Unidentified,
};
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::SchemaError;
use crate::node::{
    ArrayContext, Context, IntegerFormat, JsonNode, NumberFormat, NumericContext, ObjectContext,
    StringFormat,
};

/// A type with a schema description.
pub trait OpenApiNodeType {
    /// The node describing this type's JSON form.
    fn openapi_node() -> Result<JsonNode, SchemaError>;
}

/// A raw id type: the node of its `id` member, `None` when the member is
/// never written.
pub trait IdNode: MaybeRawId {
    /// The `id` member node.
    fn id_node() -> Option<JsonNode>;
}

/// A primary data shape: the node of the `data` member, `None` when the
/// member is never written.
pub trait PrimaryDataNode {
    /// The `data` member node.
    fn data_node() -> Result<Option<JsonNode>, SchemaError>;
}

/// An include union: the node of one `included` element, `None` when the
/// document never carries `included`.
pub trait IncludeNode {
    /// The node of one `included` element.
    fn include_node() -> Result<Option<JsonNode>, SchemaError>;
}

macro_rules! primitive_node {
    ($($ty:ty => $node:expr;)+) => {
        $(
            impl OpenApiNodeType for $ty {
                fn openapi_node() -> Result<JsonNode, SchemaError> {
                    Ok($node)
                }
            }
        )+
    };
}

primitive_node! {
    String => JsonNode::string(StringFormat::Generic);
    bool => JsonNode::boolean();
    f32 => JsonNode::number(NumberFormat::Float);
    f64 => JsonNode::number(NumberFormat::Double);
    i32 => JsonNode::integer(IntegerFormat::Int32);
    i64 => JsonNode::integer(IntegerFormat::Int64);
    u32 => unsigned(IntegerFormat::Int64);
    u64 => unsigned(IntegerFormat::Generic);
    uuid::Uuid => JsonNode::string(StringFormat::Uuid);
    Map<String, Value> => JsonNode::object(ObjectContext::new());
    NoAttributes => marker();
    NoRelationships => marker();
    NoMetadata => marker();
    NoLinks => marker();
}

fn unsigned(format: IntegerFormat) -> JsonNode {
    JsonNode::Integer(
        Context::new(format),
        NumericContext {
            minimum: Some(0.0),
            ..NumericContext::default()
        },
    )
}

fn marker() -> JsonNode {
    JsonNode::object(ObjectContext::new()).optional_node()
}

/// Accept `null` as well. A union becomes an `anyOf` of nullable cases.
fn or_null(node: JsonNode) -> JsonNode {
    match node {
        JsonNode::OneOf(cases) | JsonNode::AnyOf(cases) => {
            JsonNode::AnyOf(cases.into_iter().map(or_null).collect())
        }
        other => other.nullable_node(),
    }
}

/// Absent or `null`, matching how serde writes `None`.
impl<T: OpenApiNodeType> OpenApiNodeType for Option<T> {
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        Ok(or_null(T::openapi_node()?).optional_node())
    }
}

impl<T: OpenApiNodeType> OpenApiNodeType for Vec<T> {
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        Ok(JsonNode::array(T::openapi_node()?))
    }
}

/// A bare URL string, or `{href, meta}` when the link carries meta.
impl<M: Payload + OpenApiNodeType> OpenApiNodeType for Link<M> {
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        let href = JsonNode::string(StringFormat::Generic);
        if M::absent().is_some() {
            return Ok(href);
        }
        Ok(JsonNode::object(
            ObjectContext::new()
                .property("href", href)
                .property("meta", M::openapi_node()?),
        ))
    }
}

impl IdNode for String {
    fn id_node() -> Option<JsonNode> {
        Some(JsonNode::string(StringFormat::Generic))
    }
}

impl IdNode for uuid::Uuid {
    fn id_node() -> Option<JsonNode> {
        Some(JsonNode::string(StringFormat::Uuid))
    }
}

impl IdNode for Unidentified {
    fn id_node() -> Option<JsonNode> {
        None
    }
}

/// A string restricted to one type tag.
fn type_tag(json_type: &'static str) -> Result<JsonNode, SchemaError> {
    JsonNode::string(StringFormat::Generic).with_allowed_values([json_type])
}

/// `{"type": <tag>, "id": <string>}` for targets of type `json_type`.
pub fn identifier_node(json_type: &'static str) -> Result<JsonNode, SchemaError> {
    Ok(JsonNode::object(
        ObjectContext::new()
            .property("type", type_tag(json_type)?)
            .property("id", JsonNode::string(StringFormat::Generic)),
    ))
}

/// Add `name` to `object` unless `P` is a marker payload.
fn with_payload<P>(object: ObjectContext, name: &str) -> Result<ObjectContext, SchemaError>
where
    P: Payload + OpenApiNodeType,
{
    if P::absent().is_some() {
        return Ok(object);
    }
    Ok(object.property(name, P::openapi_node()?))
}

fn relationship_node<M, L>(data: JsonNode) -> Result<JsonNode, SchemaError>
where
    M: Payload + OpenApiNodeType,
    L: Payload + OpenApiNodeType,
{
    let object = ObjectContext::new().property("data", data.required_node());
    let object = with_payload::<L>(object, "links")?;
    let object = with_payload::<M>(object, "meta")?;
    Ok(JsonNode::object(object))
}

impl<T, M, L> OpenApiNodeType for ToOneRelationship<T, M, L>
where
    T: JsonApiType,
    M: Payload + OpenApiNodeType,
    L: Payload + OpenApiNodeType,
{
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        relationship_node::<M, L>(identifier_node(T::json_type())?.nullable_node())
    }
}

impl<T, M, L> OpenApiNodeType for ToManyRelationship<T, M, L>
where
    T: JsonApiType,
    M: Payload + OpenApiNodeType,
    L: Payload + OpenApiNodeType,
{
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        relationship_node::<M, L>(JsonNode::array(identifier_node(T::json_type())?))
    }
}

impl<D, M, L, Id> OpenApiNodeType for ResourceObject<D, M, L, Id>
where
    D: ResourceObjectDescription,
    D::Attributes: OpenApiNodeType,
    D::Relationships: OpenApiNodeType,
    M: Payload + OpenApiNodeType,
    L: Payload + OpenApiNodeType,
    Id: IdNode,
{
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        let mut object = ObjectContext::new().property("type", type_tag(D::JSON_TYPE)?);
        if let Some(id) = Id::id_node() {
            object = object.property("id", id);
        }
        let object = with_payload::<D::Attributes>(object, "attributes")?;
        let object = with_payload::<D::Relationships>(object, "relationships")?;
        let object = with_payload::<L>(object, "links")?;
        let object = with_payload::<M>(object, "meta")?;
        trace!(
            json_type = D::JSON_TYPE,
            members = object.properties.len(),
            "described resource object"
        );
        Ok(JsonNode::object(object))
    }
}

impl<D, M, L, Id> PrimaryDataNode for ResourceObject<D, M, L, Id>
where
    Self: OpenApiNodeType,
    D: ResourceObjectDescription,
{
    fn data_node() -> Result<Option<JsonNode>, SchemaError> {
        Self::openapi_node().map(Some)
    }
}

impl PrimaryDataNode for NoResourceBody {
    fn data_node() -> Result<Option<JsonNode>, SchemaError> {
        Ok(None)
    }
}

/// Present but possibly `null`.
impl<R: OpenApiNodeType> PrimaryDataNode for Option<R> {
    fn data_node() -> Result<Option<JsonNode>, SchemaError> {
        Ok(Some(or_null(R::openapi_node()?)))
    }
}

impl<R: OpenApiNodeType> PrimaryDataNode for Vec<R> {
    fn data_node() -> Result<Option<JsonNode>, SchemaError> {
        Ok(Some(JsonNode::array(R::openapi_node()?)))
    }
}

impl IncludeNode for Poly0 {
    fn include_node() -> Result<Option<JsonNode>, SchemaError> {
        Ok(None)
    }
}

// Unions render as `anyOf`: same-tag cases may both match, and decoding takes the first.
macro_rules! poly_node {
    ($($name:ident<$($T:ident),+>;)+) => {
        $(
            impl<$($T: OpenApiNodeType),+> OpenApiNodeType for $name<$($T),+> {
                fn openapi_node() -> Result<JsonNode, SchemaError> {
                    Ok(JsonNode::AnyOf(vec![$($T::openapi_node()?),+]))
                }
            }

            impl<$($T: OpenApiNodeType),+> PrimaryDataNode for $name<$($T),+> {
                fn data_node() -> Result<Option<JsonNode>, SchemaError> {
                    Self::openapi_node().map(Some)
                }
            }

            impl<$($T: OpenApiNodeType),+> IncludeNode for $name<$($T),+> {
                fn include_node() -> Result<Option<JsonNode>, SchemaError> {
                    Self::openapi_node().map(Some)
                }
            }
        )+
    };
}

poly_node! {
    Poly1<A>;
    Poly2<A, B>;
    Poly3<A, B, C>;
    Poly4<A, B, C, D>;
    Poly5<A, B, C, D, E>;
    Poly6<A, B, C, D, E, F>;
    Poly7<A, B, C, D, E, F, G>;
    Poly8<A, B, C, D, E, F, G, H>;
    Poly9<A, B, C, D, E, F, G, H, I>;
    Poly10<A, B, C, D, E, F, G, H, I, J>;
    Poly11<A, B, C, D, E, F, G, H, I, J, K>;
    Poly12<A, B, C, D, E, F, G, H, I, J, K, L>;
    Poly13<A, B, C, D, E, F, G, H, I, J, K, L, M>;
    Poly14<A, B, C, D, E, F, G, H, I, J, K, L, M, N>;
    Poly15<A, B, C, D, E, F, G, H, I, J, K, L, M, N, O>;
    Poly16<A, B, C, D, E, F, G, H, I, J, K, L, M, N, O, P>;
}

/// `data` (unless the body is [`NoResourceBody`]), an optional non-empty
/// `included` array (unless the union is empty), then links and meta.
impl<P, M, L, I> OpenApiNodeType for Document<P, M, L, I>
where
    P: PrimaryDataNode,
    M: Payload + OpenApiNodeType,
    L: Payload + OpenApiNodeType,
    I: IncludeNode,
{
    fn openapi_node() -> Result<JsonNode, SchemaError> {
        let mut object = ObjectContext::new();
        if let Some(data) = P::data_node()? {
            object = object.property("data", data.required_node());
        }
        if let Some(element) = I::include_node()? {
            let mut included = ArrayContext::new(element);
            included.min_items = 1;
            object = object.property(
                "included",
                JsonNode::Array(Context::default(), included).optional_node(),
            );
        }
        let object = with_payload::<L>(object, "links")?;
        let object = with_payload::<M>(object, "meta")?;
        Ok(JsonNode::object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use japi_core::{BasicResource, Include2, NewResource};
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Name {
        name: String,
        nickname: Option<String>,
    }

    impl Payload for Name {}

    impl OpenApiNodeType for Name {
        fn openapi_node() -> Result<JsonNode, SchemaError> {
            Ok(JsonNode::object(
                ObjectContext::new()
                    .property("name", String::openapi_node()?)
                    .property("nickname", Option::<String>::openapi_node()?),
            ))
        }
    }

    enum Person {}

    impl ResourceObjectDescription for Person {
        const JSON_TYPE: &'static str = "people";
        type Attributes = Name;
        type Relationships = NoRelationships;
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Owner {
        owner: ToOneRelationship<BasicResource<Person>>,
        friends: ToManyRelationship<BasicResource<Person>>,
    }

    impl Payload for Owner {}

    impl OpenApiNodeType for Owner {
        fn openapi_node() -> Result<JsonNode, SchemaError> {
            Ok(JsonNode::object(
                ObjectContext::new()
                    .property("owner", ToOneRelationship::<BasicResource<Person>>::openapi_node()?)
                    .property(
                        "friends",
                        ToManyRelationship::<BasicResource<Person>>::openapi_node()?,
                    ),
            ))
        }
    }

    enum Pet {}

    impl ResourceObjectDescription for Pet {
        const JSON_TYPE: &'static str = "pets";
        type Attributes = NoAttributes;
        type Relationships = Owner;
    }

    #[test]
    fn test_primitive_nodes() {
        assert_eq!(String::openapi_node().expect("string").format(), None);
        assert_eq!(f32::openapi_node().expect("f32").format(), Some("float"));
        assert_eq!(f64::openapi_node().expect("f64").format(), Some("double"));
        assert_eq!(i32::openapi_node().expect("i32").format(), Some("int32"));
        assert_eq!(i64::openapi_node().expect("i64").format(), Some("int64"));
        assert_eq!(
            u64::openapi_node().expect("u64").to_openapi()["minimum"],
            json!(0.0)
        );
        assert_eq!(
            uuid::Uuid::openapi_node().expect("uuid").format(),
            Some("uuid")
        );
    }

    #[test]
    fn test_option_is_optional_and_nullable() {
        let node = Option::<bool>::openapi_node().expect("should describe");
        assert!(!node.required());
        assert!(node.nullable());
    }

    #[test]
    fn test_option_of_union_accepts_null_in_every_case() {
        let node = Option::<Poly2<BasicResource<Person>, BasicResource<Pet>>>::openapi_node()
            .expect("should describe");
        let JsonNode::AnyOf(cases) = &node else {
            panic!("expected anyOf, got {node:?}");
        };
        assert!(cases.iter().all(JsonNode::nullable));
    }

    #[test]
    fn test_link_shapes() {
        let bare = Link::<NoMetadata>::openapi_node().expect("should describe");
        assert_eq!(bare, JsonNode::string(StringFormat::Generic));
        let with_meta = Link::<Map<String, Value>>::openapi_node().expect("should describe");
        assert!(with_meta.property("href").is_some());
        assert!(with_meta.property("meta").is_some());
    }

    #[test]
    fn test_resource_object_node() {
        let node = BasicResource::<Person>::openapi_node().expect("should describe");
        let schema = node.to_openapi();
        assert_eq!(schema["properties"]["type"]["enum"], json!(["people"]));
        assert_eq!(schema["required"], json!(["type", "id", "attributes"]));
        assert!(schema["properties"].get("relationships").is_none());
        assert!(schema["properties"].get("meta").is_none());
        assert!(schema["properties"].get("links").is_none());
        assert_eq!(
            schema["properties"]["attributes"]["required"],
            json!(["name"])
        );
    }

    #[test]
    fn test_unidentified_resource_has_no_id() {
        let node = NewResource::<Person>::openapi_node().expect("should describe");
        assert!(node.property("id").is_none());
        assert!(node.property("type").is_some());
    }

    #[test]
    fn test_relationship_nodes() {
        let node = BasicResource::<Pet>::openapi_node().expect("should describe");
        assert!(node.property("attributes").is_none());
        let relationships = node
            .property("relationships")
            .expect("relationships should be described");

        let owner = relationships.property("owner").expect("owner");
        let data = owner.property("data").expect("data");
        assert!(data.required());
        assert!(data.nullable());
        assert_eq!(
            data.property("type").and_then(JsonNode::allowed_values),
            Some(&[json!("people")][..])
        );

        let friends = relationships.property("friends").expect("friends");
        let data = friends.property("data").expect("data");
        assert!(!data.nullable());
        assert_eq!(data.to_openapi()["type"], json!("array"));
    }

    #[test]
    fn test_document_node() {
        type PetDocument = Document<
            BasicResource<Pet>,
            NoMetadata,
            NoLinks,
            Include2<BasicResource<Person>, BasicResource<Pet>>,
        >;
        let schema = PetDocument::openapi_node()
            .expect("should describe")
            .to_openapi();
        assert_eq!(schema["required"], json!(["data"]));
        assert_eq!(schema["properties"]["included"]["minItems"], json!(1));
        assert_eq!(
            schema["properties"]["included"]["items"]["anyOf"]
                .as_array()
                .map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn test_document_without_body_or_includes() {
        let node = Document::<NoResourceBody, Map<String, Value>>::openapi_node()
            .expect("should describe");
        assert!(node.property("data").is_none());
        assert!(node.property("included").is_none());
        assert!(node.property("meta").is_some());
    }

    #[test]
    fn test_nullable_primary_data_still_required() {
        let node = Document::<Option<BasicResource<Person>>>::openapi_node()
            .expect("should describe");
        let data = node.property("data").expect("data");
        assert!(data.required());
        assert!(data.nullable());
    }
}
