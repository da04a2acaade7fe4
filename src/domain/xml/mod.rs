//! XML canonicalization and enveloped signature structure.

pub mod c14n;
pub mod dsig;

pub use c14n::{canonicalize_document, canonicalize_node, escape_text};
pub use dsig::{insert_enveloped, with_utf8_declaration, SignatureTemplate};
