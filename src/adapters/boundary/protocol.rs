//! Request and response messages for the three operations.
//!
//! Binary fields cross the boundary as base64 text. Required fields are
//! `Option`s so an absent field is reported as `MISSING_FIELD` rather than
//! as a generic deserialization failure.

use serde::{Deserialize, Serialize};

use crate::infra::error::ServiceError;
use crate::services::xades::EnrichmentReport;

/// `status` of every successful response.
pub const STATUS_OK: &str = "ok";
/// `status` of every error response.
pub const STATUS_ERROR: &str = "error";

/// Encrypt a payload to a recipient certificate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Base64 payload.
    #[serde(default, alias = "data_b64")]
    pub data: Option<String>,
    /// Base64 of DER or PEM bytes, or PEM text.
    #[serde(default, alias = "cert_b64")]
    pub certificate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResponse {
    pub status: String,
    /// Base64 ciphertext.
    pub ciphertext: String,
}

/// Sign an XML document with an enveloped signature.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignXmlRequest {
    /// Base64 XML bytes.
    #[serde(default)]
    pub document: Option<String>,
    /// Base64 certificate (PEM or DER).
    #[serde(default)]
    pub certificate: Option<String>,
    /// Base64 PEM private key.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Base64 password bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignXmlResponse {
    pub status: String,
    /// Base64 of the signed UTF-8 document.
    pub signed_document: String,
    pub algorithm_used: String,
    #[serde(default)]
    pub enrichments: Vec<EnrichmentReport>,
}

/// Sign an access link.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignLinkRequest {
    /// Base64 UTF-8 link.
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub certificate: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecdsa_encoding: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignLinkResponse {
    pub status: String,
    /// Base64 UTF-8 signed link.
    pub link: String,
    pub algorithm_used: String,
    pub ecdsa_encoding_used: Option<String>,
}

/// Structured failure returned instead of any success payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    /// Numeric code, see [`ServiceError::code`].
    pub code: u16,
    /// Machine-readable category, see [`error_codes`].
    pub error_code: String,
    /// Stage that failed.
    pub stage: String,
    /// Human-readable cause.
    pub message: String,
    /// HTTP-equivalent status; carried out of band.
    #[serde(skip)]
    pub http_status: u16,
}

/// Categories reported in `error_code`.
pub mod error_codes {
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const DECODING_ERROR: &str = "DECODING_ERROR";
    pub const CERTIFICATE_PARSE_ERROR: &str = "CERTIFICATE_PARSE_ERROR";
    pub const KEY_PARSE_ERROR: &str = "KEY_PARSE_ERROR";
    pub const KEY_COMPARISON_ERROR: &str = "KEY_COMPARISON_ERROR";
    pub const KEY_MISMATCH: &str = "KEY_MISMATCH";
    pub const ALGORITHM_COMPATIBILITY_ERROR: &str = "ALGORITHM_COMPATIBILITY_ERROR";
    pub const XML_PARSE_ERROR: &str = "XML_PARSE_ERROR";
    pub const URL_FORMAT_ERROR: &str = "URL_FORMAT_ERROR";
    pub const INSUFFICIENT_SEGMENTS_ERROR: &str = "INSUFFICIENT_SEGMENTS_ERROR";
    pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
    pub const ENCRYPTION_ERROR: &str = "ENCRYPTION_ERROR";
    pub const SIGNING_ERROR: &str = "SIGNING_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const UNEXPECTED_ERROR: &str = "UNEXPECTED_ERROR";
}

impl EncryptResponse {
    #[must_use]
    pub fn new(ciphertext: impl Into<String>) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            ciphertext: ciphertext.into(),
        }
    }
}

impl SignXmlResponse {
    #[must_use]
    pub fn new(
        signed_document: impl Into<String>,
        algorithm_used: impl Into<String>,
        enrichments: Vec<EnrichmentReport>,
    ) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            signed_document: signed_document.into(),
            algorithm_used: algorithm_used.into(),
            enrichments,
        }
    }
}

impl SignLinkResponse {
    #[must_use]
    pub fn new(
        link: impl Into<String>,
        algorithm_used: impl Into<String>,
        ecdsa_encoding_used: Option<String>,
    ) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            link: link.into(),
            algorithm_used: algorithm_used.into(),
            ecdsa_encoding_used,
        }
    }
}

impl ErrorResponse {
    /// Build an error response directly from its parts.
    #[must_use]
    pub fn new(
        code: u16,
        error_code: impl Into<String>,
        stage: impl Into<String>,
        message: impl Into<String>,
        http_status: u16,
    ) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            code,
            error_code: error_code.into(),
            stage: stage.into(),
            message: message.into(),
            http_status,
        }
    }

    #[must_use]
    pub fn from_error(error: &ServiceError) -> Self {
        Self::new(
            error.code(),
            error.category(),
            error.stage().as_str(),
            error.to_string(),
            error.http_status(),
        )
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status)
    }
}

impl From<ServiceError> for ErrorResponse {
    fn from(error: ServiceError) -> Self {
        Self::from_error(&error)
    }
}
