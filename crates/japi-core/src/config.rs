//! # Codec Options
//!
//! Per-call options for the JSON entry points. Both structs deserialize with
//! every field defaulted, so a host application can embed them in its own
//! configuration file under any key.
//!
//! ```yaml
//! encode:
//!   pretty: true
//! decode:
//!   retain_attempts: false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DocumentDecodingError, PolyDecodingError};

/// Options for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Indent the rendered JSON.
    pub pretty: bool,
}

impl EncodeOptions {
    /// Compact output.
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// Options for decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Keep every rejected union candidate on failure. The selected message
    /// is the same either way.
    pub retain_attempts: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            retain_attempts: true,
        }
    }
}

impl DecodeOptions {
    pub(crate) fn finish_poly(&self, error: PolyDecodingError) -> PolyDecodingError {
        match self.retain_attempts {
            true => error,
            false => error.without_attempts(),
        }
    }

    pub(crate) fn finish_document(&self, error: DocumentDecodingError) -> DocumentDecodingError {
        match self.retain_attempts {
            true => error,
            false => error.without_attempts(),
        }
    }
}
