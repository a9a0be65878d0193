//! # japi-core — JSON:API Document Codec
//!
//! Decodes JSON:API documents into strongly-typed resource graphs and encodes
//! them back, validating the structural rules of the format along the way.
//! Every operation is a pure, one-shot transformation over a single document:
//! no I/O, no caching, no shared mutable state.
//!
//! ## Building Blocks
//!
//! 1. **Resource objects.** [`ResourceObject`] pairs a static type tag (from a
//!    [`ResourceObjectDescription`]) with an id, attributes, relationships,
//!    meta and links. The tag is never client-supplied.
//!
//! 2. **Wire markers.** [`NoAttributes`], [`NoRelationships`], [`NoMetadata`],
//!    [`NoLinks`] and [`Unidentified`] stand for members that never appear on
//!    the wire. They are recognised through the [`Payload`] and [`MaybeRawId`]
//!    traits, never through runtime type comparison.
//!
//! 3. **Polymorphic unions.** [`Poly1`]..[`Poly16`] hold exactly one of N
//!    known resource shapes. Decoding tries each candidate in declared order;
//!    the first success wins and total failure reports the most specific
//!    reason ([`PolyDecodingError`]).
//!
//! 4. **Includes.** [`Includes`] materialises the `included` array in document
//!    order, fails fast with positional context ([`IncludesDecodingError`]),
//!    and offers typed retrieval by case.
//!
//! 5. **Sparse fieldsets.** [`SparseFieldset`] encodes a resource object while
//!    suppressing every attribute not explicitly allowed.
//!
//! ## Error Text
//!
//! The include failure message is an observable contract:
//!
//! ```text
//! Out of the 3 includes in the document, the 3rd one failed to parse: Found JSON:API type 'test_entity4' but expected one of 'test_entity1', 'test_entity2'
//! ```
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Logging goes through `tracing`; the crate never installs a subscriber.

pub mod config;
pub mod document;
pub mod error;
pub mod identifier;
pub mod includes;
pub mod json;
pub mod ordinal;
pub mod payload;
pub mod poly;
pub mod relationship;
pub mod resource;
pub mod sparse;

// Re-export primary types for ergonomic imports.
pub use config::{DecodeOptions, EncodeOptions};
pub use document::{
    Document, EncodablePrimaryData, EncodablePrimaryResource, NoResourceBody, PrimaryData,
    PrimaryResource,
};
pub use error::{
    CandidateFailure, DocumentDecodingError, EncodingError, FieldLocation, IncludesDecodingError,
    JsonApiError, PolyDecodingError, PolyFailure, PrimaryDataDecodingError, ResourceDecodingError,
    ResourceObjectDecodingError, Result,
};
pub use identifier::{JsonApiType, MaybeRawId, ResourceIdentifier, Unidentified};
pub use includes::Includes;
pub use json::{
    from_slice, from_str, from_str_with, from_value, from_value_with, to_string,
    to_string_pretty, to_string_with, to_value, to_vec, JsonApiDecode, JsonApiEncode,
};
pub use ordinal::{ordinal, ordinal_suffix};
pub use payload::{Link, NoAttributes, NoLinks, NoMetadata, NoRelationships, Payload};
pub use poly::{
    CaseA, CaseB, CaseC, CaseD, CaseE, CaseF, CaseG, CaseH, CaseI, CaseJ, CaseK, CaseL, CaseM,
    CaseN, CaseO, CaseP, Include1, Include10, Include11, Include12, Include13, Include14,
    Include15, Include16, Include2, Include3, Include4, Include5, Include6, Include7, Include8,
    Include9, NoIncludes, Poly0, Poly1, Poly10, Poly11, Poly12, Poly13, Poly14, Poly15, Poly16,
    Poly2, Poly3, Poly4, Poly5, Poly6, Poly7, Poly8, Poly9, PolyCase, PolyUnion,
};
pub use relationship::{RelationshipDecodingError, ToManyRelationship, ToOneRelationship};
pub use resource::{
    BasicResource, NewResource, ResourceObject, ResourceObjectDescription, ResourceObjectType,
};
pub use sparse::{SparseFieldSerializer, SparseFieldset};
