//! Foundational cryptographic domain types.
//!
//! Provides wrappers for the per-request key material:
//! - Certificates with their detected source encoding
//! - Private keys classified by family and size/curve, with redacted `Debug`
//! - ECDSA signature values convertible between DER and P1363 encodings

mod cert;
mod key;
mod signature;

pub use cert::{Certificate, CertificateFormat};
pub use key::{EcCurve, KeyKind, PrivateKey};
pub use signature::EcdsaSignature;
