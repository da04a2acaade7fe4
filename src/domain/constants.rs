//! Centralized constants: algorithm URIs, namespaces and fixed parameters.
//! Keep this intentionally small; only broadly reused literals should live here.

// === Link signing ===

/// Number of leading path segments covered by a link signature
pub const LINK_SIGNED_SEGMENTS: usize = 6;

/// Scheme assumed when a link has no `scheme://` prefix
pub const LINK_DEFAULT_SCHEME: &str = "https";

/// Minimum RSA modulus size accepted for RSA-PSS link signatures
pub const MIN_RSA_PSS_KEY_BITS: u32 = 2048;

/// Explicit RSA-PSS salt length (bytes), equal to the SHA-256 output size
pub const RSA_PSS_SALT_LEN: i32 = 32;

// === RSA-OAEP ===

/// SHA-256 output size used to compute the OAEP capacity
pub const SHA256_LEN: usize = 32;

// === XML signature namespaces ===

pub const NS_DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";
pub const NS_XADES: &str = "http://uri.etsi.org/01903/v1.3.2#";

// === XML signature algorithm URIs ===

pub const ALG_C14N11: &str = "http://www.w3.org/2006/12/xml-c14n11";
pub const ALG_ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const ALG_SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const ALG_RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
pub const ALG_ECDSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#ecdsa-sha256";

/// `Type` of the reference pointing at XAdES signed properties
pub const XADES_SIGNED_PROPERTIES_TYPE: &str = "http://uri.etsi.org/01903#SignedProperties";

/// XML declaration written in front of every signed document
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
