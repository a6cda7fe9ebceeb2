use super::{Encoder, EncodingError};

/// YAML payloads. Human readable, used mostly when debugging a collector.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlEncoder;

impl Encoder for YamlEncoder {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn encode_value(&self, value: &serde_json::Value) -> Result<Vec<u8>, EncodingError> {
        serde_yaml::to_string(value)
            .map(String::into_bytes)
            .map_err(|e| EncodingError::Encode {
                encoding: self.name().to_string(),
                message: e.to_string(),
            })
    }

    fn decode_value(&self, bytes: &[u8]) -> Result<serde_json::Value, EncodingError> {
        serde_yaml::from_slice(bytes).map_err(|e| EncodingError::Decode {
            encoding: self.name().to_string(),
            message: e.to_string(),
        })
    }
}
