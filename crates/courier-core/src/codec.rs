//! JSON codec helpers
//!
//! Thin wrappers over serde_json for moving between dynamic JSON values,
//! raw bytes and typed models. All failures surface as [`Error::Json`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Decode a typed model from a dynamic JSON value
pub fn decode_model<T: DeserializeOwned>(value: &Value) -> Result<T> {
    Ok(serde_json::from_value(value.clone())?)
}

/// Decode a typed model directly from raw bytes
pub fn decode_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode a typed model into a dynamic JSON value
pub fn encode_model<T: Serialize>(model: &T) -> Result<Value> {
    Ok(serde_json::to_value(model)?)
}
