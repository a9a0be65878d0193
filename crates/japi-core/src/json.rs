//! # JSON Entry Points
//!
//! Parse and render whole values. Decoding parses the text into a
//! [`serde_json::Value`] first and then runs the structured decoder, so
//! failures come back as typed errors rather than serde messages.

use serde_json::Value;

use crate::config::{DecodeOptions, EncodeOptions};
use crate::error::{EncodingError, JsonApiError, Result};

/// A value that can be decoded from a JSON value.
pub trait JsonApiDecode: Sized {
    /// The structured error for this value.
    type Error: Into<JsonApiError>;

    /// Decode from a parsed JSON value.
    fn decode_json(value: &Value, options: &DecodeOptions) -> std::result::Result<Self, Self::Error>;
}

/// A value that can be encoded to a JSON value.
pub trait JsonApiEncode {
    /// Encode to a JSON value.
    fn encode_json(&self) -> std::result::Result<Value, EncodingError>;
}

/// Decode from a parsed JSON value with default options.
pub fn from_value<T: JsonApiDecode>(value: &Value) -> Result<T> {
    from_value_with(value, &DecodeOptions::default())
}

/// Decode from a parsed JSON value.
pub fn from_value_with<T: JsonApiDecode>(value: &Value, options: &DecodeOptions) -> Result<T> {
    T::decode_json(value, options).map_err(Into::into)
}

/// Decode from JSON text with default options.
pub fn from_str<T: JsonApiDecode>(text: &str) -> Result<T> {
    from_str_with(text, &DecodeOptions::default())
}

/// Decode from JSON text.
pub fn from_str_with<T: JsonApiDecode>(text: &str, options: &DecodeOptions) -> Result<T> {
    let value: Value = serde_json::from_str(text)?;
    from_value_with(&value, options)
}

/// Decode from JSON bytes with default options.
pub fn from_slice<T: JsonApiDecode>(bytes: &[u8]) -> Result<T> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_value(&value)
}

/// Encode to a JSON value.
pub fn to_value<T: JsonApiEncode + ?Sized>(value: &T) -> Result<Value> {
    Ok(value.encode_json()?)
}

/// Encode to compact JSON text.
pub fn to_string<T: JsonApiEncode + ?Sized>(value: &T) -> Result<String> {
    to_string_with(value, &EncodeOptions::compact())
}

/// Encode to indented JSON text.
pub fn to_string_pretty<T: JsonApiEncode + ?Sized>(value: &T) -> Result<String> {
    to_string_with(value, &EncodeOptions::pretty())
}

/// Encode to JSON text.
pub fn to_string_with<T: JsonApiEncode + ?Sized>(value: &T, options: &EncodeOptions) -> Result<String> {
    let encoded = value.encode_json()?;
    let text = match options.pretty {
        true => serde_json::to_string_pretty(&encoded)?,
        false => serde_json::to_string(&encoded)?,
    };
    Ok(text)
}

/// Encode to compact JSON bytes.
pub fn to_vec<T: JsonApiEncode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&value.encode_json()?)?)
}
