//! # Polymorphic Unions
//!
//! `PolyN<A, B, ...>` holds exactly one of N known resource shapes. The active
//! case is not stored separately: it is whichever candidate decoded the value.
//!
//! ## Decoding
//!
//! Candidates are tried in declared order and the first success wins, so an
//! ambiguous value always resolves to the earliest candidate that accepts it.
//! When every candidate fails, the failures are kept in declared order and
//! [`PolyDecodingError`] selects the reason to show:
//!
//! 1. the first failure that is not a type tag mismatch (a candidate that
//!    recognised the tag and then hit a missing field says more than one that
//!    never recognised it);
//! 2. otherwise, `Found JSON:API type '<found>' but expected one of '<a>', '<b>', ...`.
//!
//! ## Typed Retrieval
//!
//! Besides the positional accessors (`a()`, `b()`, ...), every union
//! implements [`PolyCase<T, CaseX>`] once per case, which lets
//! [`Includes::of`](crate::Includes::of) select payloads by type. The case
//! marker parameter is normally inferred.
//!
//! [`Poly0`] is the empty union. It stands for "no included resources" and
//! refuses to encode.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::config::DecodeOptions;
use crate::document::{EncodablePrimaryData, EncodablePrimaryResource, PrimaryData, PrimaryResource};
use crate::error::{
    CandidateFailure, DocumentDecodingError, EncodingError, PolyDecodingError,
    ResourceDecodingError,
};
use crate::json::{JsonApiDecode, JsonApiEncode};
use crate::resource::ResourceObjectType;

/// A closed union of resource shapes.
pub trait PolyUnion: Sized + Clone + PartialEq + fmt::Debug {
    /// Number of cases.
    const ARITY: usize;

    /// Type tags of every case, in declared order.
    fn json_types() -> Vec<&'static str>;

    /// Type tag of the active case.
    fn active_type(&self) -> &'static str;

    /// Decode by trying each case in declared order.
    fn decode_poly(value: &Value) -> Result<Self, PolyDecodingError>;

    /// Encode the active case.
    fn encode_poly(&self) -> Result<Value, EncodingError>;
}

/// Typed access to one case of a union. `Idx` is a case marker
/// ([`CaseA`], [`CaseB`], ...) that keeps the impls apart.
pub trait PolyCase<T, Idx> {
    /// The payload, if this case is active.
    fn case(&self) -> Option<&T>;

    /// The payload by value, if this case is active.
    fn into_case(self) -> Option<T>;

    /// Wrap a payload in this case.
    fn from_case(value: T) -> Self;
}

macro_rules! case_markers {
    ($($marker:ident),+) => {
        $(
            #[doc = concat!("Case marker `", stringify!($marker), "` for [`PolyCase`].")]
            #[derive(Debug, Clone, Copy, PartialEq, Eq)]
            pub enum $marker {}
        )+
    };
}

case_markers!(
    CaseA, CaseB, CaseC, CaseD, CaseE, CaseF, CaseG, CaseH, CaseI, CaseJ, CaseK, CaseL, CaseM,
    CaseN, CaseO, CaseP
);

/// Ordered trial decode of one value against a union's candidates.
struct Trial<'v> {
    value: &'v Value,
    attempts: Vec<CandidateFailure>,
}

impl<'v> Trial<'v> {
    fn new(value: &'v Value) -> Self {
        Self {
            value,
            attempts: Vec::new(),
        }
    }

    fn attempt<T: ResourceObjectType>(&mut self) -> Option<T> {
        match T::decode_resource(self.value) {
            Ok(decoded) => {
                debug!(
                    json_type = T::json_type(),
                    rejected = self.attempts.len(),
                    "union resolved"
                );
                Some(decoded)
            }
            Err(error) => {
                trace!(json_type = T::json_type(), %error, "union candidate rejected");
                self.attempts.push(CandidateFailure {
                    json_type: T::json_type(),
                    error,
                });
                None
            }
        }
    }

    fn fail(self) -> PolyDecodingError {
        PolyDecodingError::from_attempts(self.attempts)
    }
}

const POLY0_ENCODING: &str = "Attempted to encode Include0, which should be represented by the absence of an 'included' entry altogether.";

/// The empty union: a document with no included resources.
///
/// Decoding always succeeds; encoding always fails with
/// [`EncodingError::IllegalEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Poly0;

/// Include type for documents without side-loaded resources.
pub type NoIncludes = Poly0;

impl PolyUnion for Poly0 {
    const ARITY: usize = 0;

    fn json_types() -> Vec<&'static str> {
        Vec::new()
    }

    fn active_type(&self) -> &'static str {
        ""
    }

    fn decode_poly(_value: &Value) -> Result<Self, PolyDecodingError> {
        Ok(Poly0)
    }

    fn encode_poly(&self) -> Result<Value, EncodingError> {
        Err(EncodingError::IllegalEncoding(POLY0_ENCODING.to_string()))
    }
}

impl Serialize for Poly0 {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(ser::Error::custom(POLY0_ENCODING))
    }
}

impl<'de> Deserialize<'de> for Poly0 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Poly0)
    }
}

macro_rules! impl_poly_case {
    ($name:ident $generics:tt; $($T:ident => $case:ident),+) => {
        $( impl_poly_case!(@one $name $generics $T $case); )+
    };
    (@one $name:ident [$($G:ident),+] $T:ident $case:ident) => {
        impl<$($G: ResourceObjectType),+> PolyCase<$T, $case> for $name<$($G),+> {
            fn case(&self) -> Option<&$T> {
                match self {
                    Self::$T(value) => Some(value),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn into_case(self) -> Option<$T> {
                match self {
                    Self::$T(value) => Some(value),
                    #[allow(unreachable_patterns)]
                    _ => None,
                }
            }

            fn from_case(value: $T) -> Self {
                Self::$T(value)
            }
        }
    };
}

macro_rules! poly_union {
    (
        $(#[$doc:meta])*
        $name:ident, $alias:ident [$($T:ident => $acc:ident, $into:ident, $case:ident);+]
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name<$($T),+> {
            $(
                #[doc = concat!("Case `", stringify!($T), "`.")]
                $T($T),
            )+
        }

        #[doc = concat!("Include type with the cases of [`", stringify!($name), "`].")]
        pub type $alias<$($T),+> = $name<$($T),+>;

        impl<$($T: ResourceObjectType),+> $name<$($T),+> {
            $(
                #[doc = concat!("The payload of case `", stringify!($T), "`, if active.")]
                pub fn $acc(&self) -> Option<&$T> {
                    match self {
                        Self::$T(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }

                #[doc = concat!("The payload of case `", stringify!($T), "` by value, if active.")]
                pub fn $into(self) -> Option<$T> {
                    match self {
                        Self::$T(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            )+
        }

        impl_poly_case!($name [$($T),+]; $($T => $case),+);

        impl<$($T: ResourceObjectType),+> PolyUnion for $name<$($T),+> {
            const ARITY: usize = [$(stringify!($T)),+].len();

            fn json_types() -> Vec<&'static str> {
                vec![$($T::json_type()),+]
            }

            fn active_type(&self) -> &'static str {
                match self {
                    $(Self::$T(_) => $T::json_type(),)+
                }
            }

            fn decode_poly(value: &Value) -> Result<Self, PolyDecodingError> {
                let mut trial = Trial::new(value);
                $(
                    if let Some(decoded) = trial.attempt::<$T>() {
                        return Ok(Self::$T(decoded));
                    }
                )+
                Err(trial.fail())
            }

            fn encode_poly(&self) -> Result<Value, EncodingError> {
                match self {
                    $(Self::$T(value) => value.encode_resource(),)+
                }
            }
        }

        impl<$($T: ResourceObjectType),+> fmt::Display for $name<$($T),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$T(value) => write!(f, "Include({value:?})"),)+
                }
            }
        }

        impl<$($T: ResourceObjectType),+> Serialize for $name<$($T),+> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                self.encode_poly()
                    .map_err(ser::Error::custom)?
                    .serialize(serializer)
            }
        }

        impl<'de, $($T: ResourceObjectType),+> Deserialize<'de> for $name<$($T),+> {
            fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
                let value = Value::deserialize(deserializer)?;
                Self::decode_poly(&value).map_err(de::Error::custom)
            }
        }

        impl<$($T: ResourceObjectType),+> EncodablePrimaryResource for $name<$($T),+> {
            fn encode_primary(&self) -> Result<Value, EncodingError> {
                self.encode_poly()
            }
        }

        impl<$($T: ResourceObjectType),+> PrimaryResource for $name<$($T),+> {
            fn decode_primary(value: &Value) -> Result<Self, ResourceDecodingError> {
                Ok(Self::decode_poly(value)?)
            }
        }

        impl<$($T: ResourceObjectType),+> EncodablePrimaryData for $name<$($T),+> {
            fn encode_data(&self) -> Result<Option<Value>, EncodingError> {
                self.encode_poly().map(Some)
            }
        }

        impl<$($T: ResourceObjectType),+> PrimaryData for $name<$($T),+> {
            fn decode_data(data: Option<&Value>) -> Result<Self, DocumentDecodingError> {
                crate::document::decode_single(data)
            }
        }

        impl<$($T: ResourceObjectType),+> JsonApiDecode for $name<$($T),+> {
            type Error = PolyDecodingError;

            fn decode_json(value: &Value, options: &DecodeOptions) -> Result<Self, Self::Error> {
                Self::decode_poly(value).map_err(|e| options.finish_poly(e))
            }
        }

        impl<$($T: ResourceObjectType),+> JsonApiEncode for $name<$($T),+> {
            fn encode_json(&self) -> Result<Value, EncodingError> {
                self.encode_poly()
            }
        }
    };
}

poly_union! {
    /// One of 1 resource shape.
    Poly1, Include1 [A => a, into_a, CaseA]
}

poly_union! {
    /// One of 2 resource shapes.
    Poly2, Include2 [A => a, into_a, CaseA; B => b, into_b, CaseB]
}

poly_union! {
    /// One of 3 resource shapes.
    Poly3, Include3 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC
    ]
}

poly_union! {
    /// One of 4 resource shapes.
    Poly4, Include4 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD
    ]
}

poly_union! {
    /// One of 5 resource shapes.
    Poly5, Include5 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE
    ]
}

poly_union! {
    /// One of 6 resource shapes.
    Poly6, Include6 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF
    ]
}

poly_union! {
    /// One of 7 resource shapes.
    Poly7, Include7 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG
    ]
}

poly_union! {
    /// One of 8 resource shapes.
    Poly8, Include8 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH
    ]
}

poly_union! {
    /// One of 9 resource shapes.
    Poly9, Include9 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI
    ]
}

poly_union! {
    /// One of 10 resource shapes.
    Poly10, Include10 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ
    ]
}

poly_union! {
    /// One of 11 resource shapes.
    Poly11, Include11 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK
    ]
}

poly_union! {
    /// One of 12 resource shapes.
    Poly12, Include12 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK; L => l, into_l, CaseL
    ]
}

poly_union! {
    /// One of 13 resource shapes.
    Poly13, Include13 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK; L => l, into_l, CaseL;
        M => m, into_m, CaseM
    ]
}

poly_union! {
    /// One of 14 resource shapes.
    Poly14, Include14 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK; L => l, into_l, CaseL;
        M => m, into_m, CaseM; N => n, into_n, CaseN
    ]
}

poly_union! {
    /// One of 15 resource shapes.
    Poly15, Include15 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK; L => l, into_l, CaseL;
        M => m, into_m, CaseM; N => n, into_n, CaseN; O => o, into_o, CaseO
    ]
}

poly_union! {
    /// One of 16 resource shapes.
    Poly16, Include16 [
        A => a, into_a, CaseA; B => b, into_b, CaseB; C => c, into_c, CaseC;
        D => d, into_d, CaseD; E => e, into_e, CaseE; F => f, into_f, CaseF;
        G => g, into_g, CaseG; H => h, into_h, CaseH; I => i, into_i, CaseI;
        J => j, into_j, CaseJ; K => k, into_k, CaseK; L => l, into_l, CaseL;
        M => m, into_m, CaseM; N => n, into_n, CaseN; O => o, into_o, CaseO;
        P => p, into_p, CaseP
    ]
}
