//! Adapter layer modules for external system integration.
//!
//! Provides the request/response boundary used by transports (the CLI, or
//! an HTTP service embedding the library).

pub mod boundary;
