//! Infrastructure layer for cross-cutting concerns.
//!
//! Provides foundational infrastructure including:
//! - Configuration management and validation
//! - Error handling and result types
//! - Operation observers wired to the `log` facade
//! - Base64 and UTF-8 codecs used at the boundary

pub mod codec;
pub mod config;
pub mod error;
pub mod observability;
