//! Closed algorithm and policy choices.
//!
//! Requests name algorithms with free-form strings; they are parsed into
//! these enums at the boundary so unknown names are rejected with a
//! configuration error before any key material is touched.

use crate::infra::error::ServiceError;
use std::fmt;
use std::str::FromStr;

/// The three operations offered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Encrypt,
    SignXml,
    SignLink,
}

impl Operation {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Encrypt => "encrypt",
            Operation::SignXml => "sign_xml",
            Operation::SignLink => "sign_link",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature algorithm for enveloped XML signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum XmlSignatureAlgorithm {
    #[default]
    RsaSha256,
    EcdsaSha256,
}

impl XmlSignatureAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            XmlSignatureAlgorithm::RsaSha256 => "rsa_sha256",
            XmlSignatureAlgorithm::EcdsaSha256 => "ecdsa_sha256",
        }
    }
}

impl FromStr for XmlSignatureAlgorithm {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsa_sha256" => Ok(XmlSignatureAlgorithm::RsaSha256),
            "ecdsa_sha256" => Ok(XmlSignatureAlgorithm::EcdsaSha256),
            other => Err(ServiceError::Configuration(format!(
                "unknown XML signature algorithm '{other}' (expected rsa_sha256 or ecdsa_sha256)"
            ))),
        }
    }
}

impl fmt::Display for XmlSignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature algorithm for access links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSignatureAlgorithm {
    #[default]
    RsaPss,
    EcdsaP256,
}

impl LinkSignatureAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkSignatureAlgorithm::RsaPss => "rsa_pss",
            LinkSignatureAlgorithm::EcdsaP256 => "ecdsa_p256",
        }
    }

    #[must_use]
    pub fn is_ecdsa(&self) -> bool {
        matches!(self, LinkSignatureAlgorithm::EcdsaP256)
    }
}

impl FromStr for LinkSignatureAlgorithm {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rsa_pss" => Ok(LinkSignatureAlgorithm::RsaPss),
            "ecdsa_p256" => Ok(LinkSignatureAlgorithm::EcdsaP256),
            other => Err(ServiceError::Configuration(format!(
                "unknown link signature algorithm '{other}' (expected rsa_pss or ecdsa_p256)"
            ))),
        }
    }
}

impl fmt::Display for LinkSignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire encoding of an ECDSA signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EcdsaEncoding {
    /// Fixed-width big-endian `r || s`
    #[default]
    P1363,
    /// ASN.1 DER `SEQUENCE { r INTEGER, s INTEGER }`
    Der,
}

impl EcdsaEncoding {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EcdsaEncoding::P1363 => "p1363",
            EcdsaEncoding::Der => "der",
        }
    }
}

impl FromStr for EcdsaEncoding {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p1363" => Ok(EcdsaEncoding::P1363),
            "der" => Ok(EcdsaEncoding::Der),
            other => Err(ServiceError::Configuration(format!(
                "unknown ECDSA encoding '{other}' (expected p1363 or der)"
            ))),
        }
    }
}

impl fmt::Display for EcdsaEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do with path segments beyond the signed prefix of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtraSegmentPolicy {
    /// Drop them (e.g. a previous signature) and sign the prefix
    #[default]
    Truncate,
    /// Refuse links that carry more than the signed prefix
    Reject,
}

impl ExtraSegmentPolicy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtraSegmentPolicy::Truncate => "truncate",
            ExtraSegmentPolicy::Reject => "reject",
        }
    }
}

impl FromStr for ExtraSegmentPolicy {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncate" => Ok(ExtraSegmentPolicy::Truncate),
            "reject" => Ok(ExtraSegmentPolicy::Reject),
            other => Err(ServiceError::Configuration(format!(
                "unknown extra segment policy '{other}' (expected truncate or reject)"
            ))),
        }
    }
}

impl fmt::Display for ExtraSegmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
