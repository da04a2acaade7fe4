//! Request/response boundary.
//!
//! Transport-neutral: an HTTP server or the bundled CLI deserializes a
//! request, hands it to a [`Dispatcher`] and serializes whatever comes back.

pub mod handlers;
pub mod protocol;

pub use handlers::Dispatcher;
pub use protocol::{
    error_codes, EncryptRequest, EncryptResponse, ErrorResponse, SignLinkRequest,
    SignLinkResponse, SignXmlRequest, SignXmlResponse,
};
