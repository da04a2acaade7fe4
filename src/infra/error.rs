//! Error types for encryption and signing operations.
//!
//! Every failure carries a machine-readable category, a numeric code, the
//! validation stage that produced it and an HTTP-equivalent status, so the
//! request boundary never has to inspect message text.

use std::fmt;
use thiserror::Error;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Processing stage at which an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Decoding of request fields (base64, UTF-8, required fields)
    Decode,
    /// Certificate parsing
    Certificate,
    /// Private key parsing
    PrivateKey,
    /// Certificate/private key correspondence
    KeyBinding,
    /// Algorithm and key type compatibility
    Algorithm,
    /// XML document parsing
    Document,
    /// Access link parsing
    Link,
    /// The cryptographic transform itself
    Transform,
    /// Algorithm/encoding selection and configuration files
    Configuration,
    /// Anything not attributable to a specific stage
    Unexpected,
}

impl Stage {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Certificate => "certificate",
            Stage::PrivateKey => "private_key",
            Stage::KeyBinding => "key_binding",
            Stage::Algorithm => "algorithm",
            Stage::Document => "document",
            Stage::Link => "link",
            Stage::Transform => "transform",
            Stage::Configuration => "configuration",
            Stage::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comprehensive error types for service operations
#[derive(Error, Debug, miette::Diagnostic)]
pub enum ServiceError {
    #[error("Missing required field: {0}")]
    #[diagnostic(code(ksef_signer::missing_field))]
    MissingField(String),

    #[error("Decoding error: {0}")]
    #[diagnostic(code(ksef_signer::decoding))]
    Decoding(String),

    #[error("Certificate parse error: {0}")]
    #[diagnostic(code(ksef_signer::certificate_parse))]
    CertificateParse(String),

    #[error("Private key parse error: {0}")]
    #[diagnostic(code(ksef_signer::key_parse))]
    KeyParse(String),

    #[error("Key comparison error: {0}")]
    #[diagnostic(code(ksef_signer::key_comparison))]
    KeyComparison(String),

    #[error("Certificate does not correspond to the supplied private key")]
    #[diagnostic(
        code(ksef_signer::key_mismatch),
        help("supply the certificate issued for this private key")
    )]
    KeyMismatch,

    #[error("Algorithm compatibility error: {0}")]
    #[diagnostic(code(ksef_signer::algorithm_compatibility))]
    AlgorithmCompatibility(String),

    #[error("XML parse error: {0}")]
    #[diagnostic(code(ksef_signer::xml_parse))]
    XmlParse(String),

    #[error("Malformed link: {0}")]
    #[diagnostic(code(ksef_signer::url_format))]
    UrlFormat(String),

    #[error("Link has {found} path segments, at least {required} are required")]
    #[diagnostic(code(ksef_signer::insufficient_segments))]
    InsufficientSegments { found: usize, required: usize },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(ksef_signer::configuration))]
    Configuration(String),

    #[error("Encryption error: {0}")]
    #[diagnostic(code(ksef_signer::encryption))]
    Encryption(String),

    #[error("Signing error: {0}")]
    #[diagnostic(code(ksef_signer::signing))]
    Signing(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(ksef_signer::io))]
    Io(String),

    #[error("Unexpected error: {0}")]
    #[diagnostic(code(ksef_signer::unexpected))]
    Unexpected(String),
}

impl ServiceError {
    /// Machine-readable category reported across the request boundary.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            ServiceError::MissingField(_) => "MISSING_FIELD",
            ServiceError::Decoding(_) => "DECODING_ERROR",
            ServiceError::CertificateParse(_) => "CERTIFICATE_PARSE_ERROR",
            ServiceError::KeyParse(_) => "KEY_PARSE_ERROR",
            ServiceError::KeyComparison(_) => "KEY_COMPARISON_ERROR",
            ServiceError::KeyMismatch => "KEY_MISMATCH",
            ServiceError::AlgorithmCompatibility(_) => "ALGORITHM_COMPATIBILITY_ERROR",
            ServiceError::XmlParse(_) => "XML_PARSE_ERROR",
            ServiceError::UrlFormat(_) => "URL_FORMAT_ERROR",
            ServiceError::InsufficientSegments { .. } => "INSUFFICIENT_SEGMENTS_ERROR",
            ServiceError::Configuration(_) => "CONFIGURATION_ERROR",
            ServiceError::Encryption(_) => "ENCRYPTION_ERROR",
            ServiceError::Signing(_) => "SIGNING_ERROR",
            ServiceError::Io(_) => "IO_ERROR",
            ServiceError::Unexpected(_) => "UNEXPECTED_ERROR",
        }
    }

    /// Numeric error code. 101-104 and 199 are the encryption codes already
    /// known to existing clients.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::MissingField(_) => 101,
            ServiceError::Decoding(_) => 102,
            ServiceError::CertificateParse(_) => 103,
            ServiceError::Encryption(_) => 104,
            ServiceError::KeyParse(_) => 105,
            ServiceError::KeyComparison(_) => 106,
            ServiceError::KeyMismatch => 107,
            ServiceError::AlgorithmCompatibility(_) => 108,
            ServiceError::XmlParse(_) => 109,
            ServiceError::UrlFormat(_) => 110,
            ServiceError::InsufficientSegments { .. } => 111,
            ServiceError::Configuration(_) => 112,
            ServiceError::Signing(_) => 113,
            ServiceError::Io(_) => 198,
            ServiceError::Unexpected(_) => 199,
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            ServiceError::MissingField(_) | ServiceError::Decoding(_) => Stage::Decode,
            ServiceError::CertificateParse(_) => Stage::Certificate,
            ServiceError::KeyParse(_) => Stage::PrivateKey,
            ServiceError::KeyComparison(_) | ServiceError::KeyMismatch => Stage::KeyBinding,
            ServiceError::AlgorithmCompatibility(_) => Stage::Algorithm,
            ServiceError::XmlParse(_) => Stage::Document,
            ServiceError::UrlFormat(_) | ServiceError::InsufficientSegments { .. } => Stage::Link,
            ServiceError::Encryption(_) | ServiceError::Signing(_) => Stage::Transform,
            ServiceError::Configuration(_) | ServiceError::Io(_) => Stage::Configuration,
            ServiceError::Unexpected(_) => Stage::Unexpected,
        }
    }

    /// HTTP-equivalent status: caller mistakes are 400, failures of the
    /// transform or of the service itself are 500.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Encryption(_)
            | ServiceError::Signing(_)
            | ServiceError::Io(_)
            | ServiceError::Unexpected(_) => 500,
            _ => 400,
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<base64::DecodeError> for ServiceError {
    fn from(error: base64::DecodeError) -> Self {
        ServiceError::Decoding(format!("invalid base64: {error}"))
    }
}

impl From<std::str::Utf8Error> for ServiceError {
    fn from(error: std::str::Utf8Error) -> Self {
        ServiceError::Decoding(format!("invalid UTF-8: {error}"))
    }
}

impl From<roxmltree::Error> for ServiceError {
    fn from(error: roxmltree::Error) -> Self {
        ServiceError::XmlParse(error.to_string())
    }
}

impl From<der::Error> for ServiceError {
    fn from(error: der::Error) -> Self {
        ServiceError::CertificateParse(error.to_string())
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(error: std::io::Error) -> Self {
        ServiceError::Io(error.to_string())
    }
}

// OpenSSL failures only surface here once a stage has not mapped them to
// something more specific; by then the transform itself has failed.
impl From<openssl::error::ErrorStack> for ServiceError {
    fn from(error: openssl::error::ErrorStack) -> Self {
        ServiceError::Signing(error.to_string())
    }
}
