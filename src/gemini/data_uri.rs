use crate::error::{BrewError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Embeds raw bytes in a `data:<mime>;base64,<payload>` URI.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

pub fn encode_jpeg(bytes: &[u8]) -> String {
    encode("image/jpeg", bytes)
}

/// Splits a base64 data URI back into its mime type and bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| BrewError::EncodingError("Not a data URI".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| BrewError::EncodingError("Data URI has no payload".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| BrewError::EncodingError("Only base64 data URIs are supported".into()))?;

    let bytes = STANDARD.decode(payload.as_bytes())?;
    Ok((mime_type.to_string(), bytes))
}
