use super::{Encoder, EncodingError};

/// JSON payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn encode_value(&self, value: &serde_json::Value) -> Result<Vec<u8>, EncodingError> {
        serde_json::to_vec(value).map_err(|e| EncodingError::Encode {
            encoding: self.name().to_string(),
            message: e.to_string(),
        })
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<serde_json::Value, EncodingError> {
        serde_json::from_slice(bytes).map_err(|e| EncodingError::Decode {
            encoding: self.name().to_string(),
            message: e.to_string(),
        })
    }
}
