//! Access link signing.
//!
//! The signature covers `host/seg1/.../seg6` and is appended to the link as
//! a seventh path segment in URL-safe base64 without padding.

use crate::domain::constants::MIN_RSA_PSS_KEY_BITS;
use crate::domain::crypto::{Certificate, EcCurve, PrivateKey};
use crate::domain::link::ParsedLink;
use crate::domain::types::{EcdsaEncoding, ExtraSegmentPolicy, LinkSignatureAlgorithm, Operation};
use crate::infra::codec::encode_base64url_unpadded;
use crate::infra::error::{ServiceResult, Stage};
use crate::infra::observability::{finish, OperationObserver};
use crate::services::key_loader::ensure_keys_match;
use crate::services::primitives;

/// A signed link and the scheme that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedLink {
    pub link: String,
    pub algorithm: LinkSignatureAlgorithm,
    /// Only set for ECDSA signatures
    pub ecdsa_encoding: Option<EcdsaEncoding>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LinkSigner {
    policy: ExtraSegmentPolicy,
}

impl LinkSigner {
    #[must_use]
    pub fn new(policy: ExtraSegmentPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> ExtraSegmentPolicy {
        self.policy
    }

    /// Sign `link`. `encoding` is only consulted for ECDSA.
    pub fn sign(
        &self,
        link: &str,
        key: &PrivateKey,
        certificate: &Certificate,
        algorithm: LinkSignatureAlgorithm,
        encoding: EcdsaEncoding,
        observer: &dyn OperationObserver,
    ) -> ServiceResult<SignedLink> {
        finish(
            observer,
            Operation::SignLink,
            algorithm.as_str(),
            self.sign_inner(link, key, certificate, algorithm, encoding, observer),
        )
    }

    fn sign_inner(
        &self,
        link: &str,
        key: &PrivateKey,
        certificate: &Certificate,
        algorithm: LinkSignatureAlgorithm,
        encoding: EcdsaEncoding,
        observer: &dyn OperationObserver,
    ) -> ServiceResult<SignedLink> {
        let op = Operation::SignLink;

        let parsed = ParsedLink::parse(link)?;
        let target = parsed.signing_target(self.policy)?;
        if target.discarded() > 0 {
            observer.warning(
                op,
                &format!(
                    "discarding {} path segment(s) beyond the signed prefix",
                    target.discarded()
                ),
            );
        }
        observer.stage_completed(
            op,
            Stage::Link,
            &format!("{} segments, host {}", parsed.segments().len(), parsed.host()),
        );

        ensure_keys_match(certificate, key)?;
        observer.stage_completed(op, Stage::KeyBinding, &key.kind().to_string());

        // r and s width for P1363; RSA has none
        let ecdsa_width = match algorithm {
            LinkSignatureAlgorithm::RsaPss => {
                key.kind()
                    .require_rsa(algorithm.as_str(), MIN_RSA_PSS_KEY_BITS)?;
                0
            }
            LinkSignatureAlgorithm::EcdsaP256 => {
                key.kind().require_curve(algorithm.as_str(), &EcCurve::P256)?
            }
        };
        observer.stage_completed(op, Stage::Algorithm, algorithm.as_str());

        let canonical = target.canonical_string();
        let signature = match algorithm {
            LinkSignatureAlgorithm::RsaPss => {
                primitives::rsa_pss_sha256(key.pkey(), canonical.as_bytes())?
            }
            LinkSignatureAlgorithm::EcdsaP256 => {
                primitives::ecdsa_sha256(key.pkey(), canonical.as_bytes())?
                    .encode(encoding, ecdsa_width)?
            }
        };
        observer.stage_completed(
            op,
            Stage::Transform,
            &format!("{} byte signature", signature.len()),
        );

        Ok(SignedLink {
            link: target.signed_link(&encode_base64url_unpadded(&signature)),
            algorithm,
            ecdsa_encoding: algorithm.is_ecdsa().then_some(encoding),
        })
    }
}

/// Sign with the default (truncating) segment policy.
pub fn sign_link(
    link: &str,
    key: &PrivateKey,
    certificate: &Certificate,
    algorithm: LinkSignatureAlgorithm,
    encoding: EcdsaEncoding,
    observer: &dyn OperationObserver,
) -> ServiceResult<SignedLink> {
    LinkSigner::default().sign(link, key, certificate, algorithm, encoding, observer)
}
