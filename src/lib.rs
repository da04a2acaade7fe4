//! KSeF Signer Library
//!
//! Stateless cryptographic operations on caller-supplied key material:
//! RSA-OAEP encryption to a certificate, enveloped XAdES XML signatures and
//! signed access links (RSA-PSS or ECDSA P-256).
//!
//! Layout follows the usual layering: `domain` holds pure types and
//! canonicalization, `services` the operations, `adapters` the
//! request/response boundary and `infra` errors, configuration, codecs and
//! observers.

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod services;

pub use infra::{config, error};

pub use adapters::boundary::{
    Dispatcher, EncryptRequest, EncryptResponse, ErrorResponse, SignLinkRequest,
    SignLinkResponse, SignXmlRequest, SignXmlResponse,
};
pub use domain::crypto::{Certificate, CertificateFormat, EcCurve, KeyKind, PrivateKey};
pub use domain::types::{
    EcdsaEncoding, ExtraSegmentPolicy, LinkSignatureAlgorithm, Operation, XmlSignatureAlgorithm,
};
pub use infra::error::{ServiceError, ServiceResult, Stage};
pub use infra::observability::{LogObserver, OperationObserver, SilentObserver};
pub use services::{
    encrypt, ensure_keys_match, keys_match, load_certificate, load_private_key, sign_link,
    sign_xml, LinkSigner, SignedLink, SignedXml, XmlSigner, XmlSigningOptions,
};
