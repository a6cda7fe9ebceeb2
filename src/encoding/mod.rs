//! Pluggable byte encodings for the legacy transport.
//!
//! The legacy wire carries opaque payloads; which format those bytes are in is
//! chosen by the host and injected into the proxy as an [`Encoder`].

pub mod json;
pub mod yaml;

pub use json::JsonEncoder;
pub use yaml::YamlEncoder;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure to turn a value into bytes or back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncodingError {
    Encode { encoding: String, message: String },
    Decode { encoding: String, message: String },
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingError::Encode { encoding, message } => {
                write!(f, "Failed to encode {} payload: {}", encoding, message)
            }
            EncodingError::Decode { encoding, message } => {
                write!(f, "Failed to decode {} payload: {}", encoding, message)
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// A byte encoding strategy.
///
/// Implementations work on the self-describing [`serde_json::Value`] tree so the
/// trait stays object safe; use [`encode`](dyn Encoder::encode) and
/// [`decode`](dyn Encoder::decode) for typed access.
pub trait Encoder: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    fn encode_value(&self, value: &serde_json::Value) -> Result<Vec<u8>, EncodingError>;

    fn decode_value(&self, bytes: &[u8]) -> Result<serde_json::Value, EncodingError>;
}

impl dyn Encoder {
    /// Encodes `value`. Fails on NaN or infinite floats, which the value tree
    /// would otherwise turn into `null`.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, EncodingError> {
        self.reject_non_finite(value)?;
        let tree = serde_json::to_value(value).map_err(|e| self.encode_error(e))?;
        self.encode_value(&tree)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, EncodingError> {
        let tree = self.decode_value(bytes)?;
        serde_json::from_value(tree).map_err(|e| self.decode_error(e))
    }

    /// Like [`decode`](Self::decode) but treats an empty payload as `T::default()`.
    pub fn decode_or_default<T: DeserializeOwned + Default>(
        &self,
        bytes: &[u8],
    ) -> Result<T, EncodingError> {
        if bytes.is_empty() {
            return Ok(T::default());
        }
        self.decode(bytes)
    }

    pub fn encode_error(&self, e: impl fmt::Display) -> EncodingError {
        EncodingError::Encode {
            encoding: self.name().to_string(),
            message: e.to_string(),
        }
    }

    pub fn decode_error(&self, e: impl fmt::Display) -> EncodingError {
        EncodingError::Decode {
            encoding: self.name().to_string(),
            message: e.to_string(),
        }
    }

    fn reject_non_finite<T: Serialize>(&self, value: &T) -> Result<(), EncodingError> {
        let tree = serde_yaml::to_value(value).map_err(|e| self.encode_error(e))?;
        match first_non_finite(&tree) {
            Some(float) => Err(self.encode_error(format!(
                "non-finite float {} has no {} representation",
                float,
                self.name()
            ))),
            None => Ok(()),
        }
    }
}

/// First NaN or infinite number anywhere in `value`.
fn first_non_finite(value: &serde_yaml::Value) -> Option<f64> {
    use serde_yaml::Value;

    match value {
        Value::Number(number) => number.as_f64().filter(|float| !float.is_finite()),
        Value::Sequence(items) => items.iter().find_map(first_non_finite),
        Value::Mapping(map) => map
            .iter()
            .find_map(|(key, value)| first_non_finite(key).or_else(|| first_non_finite(value))),
        Value::Tagged(tagged) => first_non_finite(&tagged.value),
        Value::Null | Value::Bool(_) | Value::String(_) => None,
    }
}

#[cfg(test)]
#[path = "tests/encoding_tests.rs"]
mod encoding_tests;
