//! Text/binary codecs used at the request boundary.
//!
//! Decoding is lenient about the base64 alphabet and padding so callers can
//! send standard or URL-safe text; encoding is always canonical.

use crate::infra::error::{ServiceError, ServiceResult};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;

/// Decode base64 text in any of the standard/URL-safe, padded/unpadded forms.
///
/// ASCII whitespace is ignored so line-wrapped input is accepted.
pub fn decode_base64(input: &str) -> ServiceResult<Vec<u8>> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(ServiceError::Decoding("empty base64 input".to_string()));
    }

    let url_safe = compact.contains(['-', '_']);
    let padded = compact.ends_with('=');
    let engine = match (url_safe, padded) {
        (false, true) => &STANDARD,
        (false, false) => &STANDARD_NO_PAD,
        (true, true) => &URL_SAFE,
        (true, false) => &URL_SAFE_NO_PAD,
    };

    Ok(engine.decode(compact.as_bytes())?)
}

/// Decode a base64 field that must carry UTF-8 text.
pub fn decode_base64_utf8(input: &str) -> ServiceResult<String> {
    let bytes = decode_base64(input)?;
    String::from_utf8(bytes)
        .map_err(|e| ServiceError::Decoding(format!("invalid UTF-8: {}", e.utf8_error())))
}

/// Key material supplied either as PEM text or as base64 of PEM/DER bytes.
pub fn decode_pem_or_base64(input: &str) -> ServiceResult<Vec<u8>> {
    if input.contains("-----BEGIN") {
        Ok(input.trim().as_bytes().to_vec())
    } else {
        decode_base64(input)
    }
}

/// Standard padded base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// URL-safe base64 with the `=` padding stripped.
#[must_use]
pub fn encode_base64url_unpadded(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}
