//! Service layer module root.
//! Contains the encryption and signing operations.

pub mod encryption;
pub mod key_loader;
pub mod link_signer;
pub mod primitives;
pub mod xades;
pub mod xml_signer;

pub use encryption::{encrypt, oaep_capacity, OAEP_SHA256};
pub use key_loader::{
    ensure_keys_match, keys_match, load_certificate, load_certificate_text, load_private_key,
};
pub use link_signer::{sign_link, LinkSigner, SignedLink};
pub use xades::{
    EnrichmentOutcome, EnrichmentReport, SignedPropertyEnrichment, SigningCertificateEnrichment,
    SigningTimeEnrichment,
};
pub use xml_signer::{sign_xml, SignedXml, XmlSigner, XmlSigningOptions};
