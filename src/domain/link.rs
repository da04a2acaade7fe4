//! Access link parsing and canonical signing string construction.
//!
//! A link is split the way a generic URL parser would split it (scheme,
//! netloc, path), without normalizing the host or percent-encoding, because
//! the exact host text is part of the signed bytes.

use crate::domain::constants::{LINK_DEFAULT_SCHEME, LINK_SIGNED_SEGMENTS};
use crate::domain::types::ExtraSegmentPolicy;
use crate::infra::error::{ServiceError, ServiceResult};

/// A link broken into the parts that take part in signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    scheme: String,
    host: String,
    segments: Vec<String>,
}

impl ParsedLink {
    /// Parse a link; trailing slashes are stripped, a missing scheme means
    /// `https`, query/fragment/path parameters are dropped.
    ///
    /// Text before the first `://` must be a valid scheme; it is lowercased.
    pub fn parse(link: &str) -> ServiceResult<Self> {
        let trimmed = link.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ServiceError::UrlFormat("link is empty".to_string()));
        }

        let (scheme, rest) = match trimmed.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => (scheme.to_ascii_lowercase(), rest),
            Some(_) => {
                return Err(ServiceError::UrlFormat(format!(
                    "link '{trimmed}' does not start with a valid scheme"
                )))
            }
            None => (LINK_DEFAULT_SCHEME.to_string(), trimmed),
        };

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (host, tail) = rest.split_at(authority_end);
        let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
        let mut path = &tail[..path_end];
        // Path parameters only ever belong to the last segment.
        let last_segment = path.rfind('/').map_or(0, |i| i + 1);
        if let Some(params) = path[last_segment..].find(';') {
            path = &path[..last_segment + params];
        }

        if host.is_empty() {
            return Err(ServiceError::UrlFormat(format!(
                "link '{trimmed}' has no host"
            )));
        }
        if path.trim_matches('/').is_empty() {
            return Err(ServiceError::UrlFormat(format!(
                "link '{trimmed}' has no path"
            )));
        }

        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            scheme,
            host: host.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Select the signed prefix according to `policy`.
    pub fn signing_target(&self, policy: ExtraSegmentPolicy) -> ServiceResult<SigningTarget<'_>> {
        if self.segments.len() < LINK_SIGNED_SEGMENTS {
            return Err(ServiceError::InsufficientSegments {
                found: self.segments.len(),
                required: LINK_SIGNED_SEGMENTS,
            });
        }

        let discarded = self.segments.len() - LINK_SIGNED_SEGMENTS;
        if discarded > 0 && policy == ExtraSegmentPolicy::Reject {
            return Err(ServiceError::UrlFormat(format!(
                "link has {discarded} segment(s) beyond the {LINK_SIGNED_SEGMENTS} signed ones; \
                 submit the unsigned link"
            )));
        }

        Ok(SigningTarget {
            link: self,
            core: &self.segments[..LINK_SIGNED_SEGMENTS],
            discarded,
        })
    }
}

// ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// The signed part of a link.
#[derive(Debug, Clone, Copy)]
pub struct SigningTarget<'a> {
    link: &'a ParsedLink,
    core: &'a [String],
    discarded: usize,
}

impl SigningTarget<'_> {
    #[must_use]
    pub fn core_segments(&self) -> &[String] {
        self.core
    }

    /// Number of trailing segments left out of the signature.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// `host/seg1/.../seg6`
    #[must_use]
    pub fn canonical_string(&self) -> String {
        format!("{}/{}", self.link.host, self.core.join("/"))
    }

    /// Reassemble `scheme://host/seg1/.../seg6/<signature>`.
    #[must_use]
    pub fn signed_link(&self, encoded_signature: &str) -> String {
        format!(
            "{}://{}/{}/{}",
            self.link.scheme,
            self.link.host,
            self.core.join("/"),
            encoded_signature
        )
    }
}
