//! JSON codec using `serde_json`.

use crate::error::Result;

/// JSON codec for records.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to a compact JSON string.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Encode a value as a single newline-terminated JSON line.
    pub fn encode_line<T: serde::Serialize>(value: &T) -> Result<String> {
        let mut line = serde_json::to_string(value)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode a value from JSON text.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
        Ok(serde_json::from_str(text.trim_end())?)
    }
}
