//! Enveloped XML signatures with XAdES signed properties.

use roxmltree::Document;
use sha2::{Digest, Sha256};

use crate::domain::constants::{ALG_ECDSA_SHA256, ALG_RSA_SHA256};
use crate::domain::crypto::{Certificate, EcCurve, PrivateKey};
use crate::domain::types::{Operation, XmlSignatureAlgorithm};
use crate::domain::xml::{
    canonicalize_document, canonicalize_node, insert_enveloped, with_utf8_declaration,
    SignatureTemplate,
};
use crate::infra::codec::encode_base64;
use crate::infra::error::{ServiceError, ServiceResult, Stage};
use crate::infra::observability::{finish, OperationObserver};
use crate::services::key_loader::ensure_keys_match;
use crate::services::primitives;
use crate::services::xades::{
    collect_properties, EnrichmentReport, SignedPropertyEnrichment, SigningCertificateEnrichment,
    SigningTimeEnrichment,
};

/// Which XAdES properties to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlSigningOptions {
    pub signing_time: bool,
    pub signing_certificate: bool,
}

impl Default for XmlSigningOptions {
    fn default() -> Self {
        Self {
            signing_time: true,
            signing_certificate: true,
        }
    }
}

/// A signed document and what went into it.
#[derive(Debug, Clone)]
pub struct SignedXml {
    /// UTF-8 bytes with a leading XML declaration
    pub document: Vec<u8>,
    pub algorithm: XmlSignatureAlgorithm,
    pub enrichments: Vec<EnrichmentReport>,
}

pub struct XmlSigner {
    enrichments: Vec<Box<dyn SignedPropertyEnrichment>>,
}

impl XmlSigner {
    #[must_use]
    pub fn new(options: XmlSigningOptions) -> Self {
        Self::with_enrichments(vec![
            Box::new(SigningTimeEnrichment::new(options.signing_time)),
            Box::new(SigningCertificateEnrichment::new(options.signing_certificate)),
        ])
    }

    #[must_use]
    pub fn with_enrichments(enrichments: Vec<Box<dyn SignedPropertyEnrichment>>) -> Self {
        Self { enrichments }
    }

    /// Sign `document` with an enveloped signature.
    ///
    /// Checks run in order: key binding, algorithm/key compatibility, then
    /// UTF-8 and XML well-formedness.
    pub fn sign(
        &self,
        document: &[u8],
        key: &PrivateKey,
        certificate: &Certificate,
        algorithm: XmlSignatureAlgorithm,
        observer: &dyn OperationObserver,
    ) -> ServiceResult<SignedXml> {
        finish(
            observer,
            Operation::SignXml,
            algorithm.as_str(),
            self.sign_inner(document, key, certificate, algorithm, observer),
        )
    }

    fn sign_inner(
        &self,
        document: &[u8],
        key: &PrivateKey,
        certificate: &Certificate,
        algorithm: XmlSignatureAlgorithm,
        observer: &dyn OperationObserver,
    ) -> ServiceResult<SignedXml> {
        let op = Operation::SignXml;

        ensure_keys_match(certificate, key)?;
        observer.stage_completed(op, Stage::KeyBinding, &key.kind().to_string());

        check_compatibility(algorithm, key)?;
        observer.stage_completed(op, Stage::Algorithm, algorithm.as_str());

        let text = std::str::from_utf8(document)?.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(ServiceError::XmlParse("document is empty".to_string()));
        }
        let doc = Document::parse(text)?;
        observer.stage_completed(
            op,
            Stage::Document,
            &format!("root element <{}>", doc.root_element().tag_name().name()),
        );

        let document_digest = sha256_b64(canonicalize_document(text)?.as_bytes());
        let (properties, enrichments) = collect_properties(&self.enrichments, certificate, observer);
        let template = SignatureTemplate::new(
            hex::encode(rand::random::<[u8; 8]>()),
            signature_method(algorithm),
            document_digest,
            encode_base64(certificate.as_der()),
            properties,
        );

        let properties_digest = if template.has_signed_properties() {
            let draft = insert_enveloped(text, &doc, &template.render("", ""))?;
            let xpath = format!(
                "//xades:SignedProperties[@Id='{}']",
                template.signed_properties_id()
            );
            sha256_b64(draft_c14n(&draft, &xpath)?.as_bytes())
        } else {
            String::new()
        };

        let draft = insert_enveloped(text, &doc, &template.render(&properties_digest, ""))?;
        let xpath = format!(
            "//ds:Signature[@Id='{}']/ds:SignedInfo",
            template.signature_id()
        );
        let signed_info_c14n = draft_c14n(&draft, &xpath)?;

        let signature_value = match algorithm {
            XmlSignatureAlgorithm::RsaSha256 => {
                primitives::rsa_pkcs1_sha256(key.pkey(), signed_info_c14n.as_bytes())?
            }
            XmlSignatureAlgorithm::EcdsaSha256 => {
                let width = key.kind().require_curve(algorithm.as_str(), &EcCurve::P256)?;
                primitives::ecdsa_sha256(key.pkey(), signed_info_c14n.as_bytes())?
                    .to_p1363(width)?
            }
        };
        observer.stage_completed(
            op,
            Stage::Transform,
            &format!("{} byte signature value", signature_value.len()),
        );

        let signed = insert_enveloped(
            text,
            &doc,
            &template.render(&properties_digest, &encode_base64(&signature_value)),
        )?;

        Ok(SignedXml {
            document: with_utf8_declaration(&signed).into_bytes(),
            algorithm,
            enrichments,
        })
    }
}

impl Default for XmlSigner {
    fn default() -> Self {
        Self::new(XmlSigningOptions::default())
    }
}

/// Sign with the default set of enrichments.
pub fn sign_xml(
    document: &[u8],
    key: &PrivateKey,
    certificate: &Certificate,
    algorithm: XmlSignatureAlgorithm,
    observer: &dyn OperationObserver,
) -> ServiceResult<SignedXml> {
    XmlSigner::default().sign(document, key, certificate, algorithm, observer)
}

fn check_compatibility(algorithm: XmlSignatureAlgorithm, key: &PrivateKey) -> ServiceResult<()> {
    match algorithm {
        XmlSignatureAlgorithm::RsaSha256 => key.kind().require_rsa(algorithm.as_str(), 0).map(|_| ()),
        XmlSignatureAlgorithm::EcdsaSha256 => key
            .kind()
            .require_curve(algorithm.as_str(), &EcCurve::P256)
            .map(|_| ()),
    }
}

fn signature_method(algorithm: XmlSignatureAlgorithm) -> &'static str {
    match algorithm {
        XmlSignatureAlgorithm::RsaSha256 => ALG_RSA_SHA256,
        XmlSignatureAlgorithm::EcdsaSha256 => ALG_ECDSA_SHA256,
    }
}

fn sha256_b64(data: &[u8]) -> String {
    encode_base64(&Sha256::digest(data))
}

// Drafts are our own output; failing to parse them is a signing fault.
fn draft_c14n(draft: &str, xpath: &str) -> ServiceResult<String> {
    canonicalize_node(draft, xpath).map_err(|e| match e {
        ServiceError::XmlParse(msg) => {
            ServiceError::Signing(format!("signature draft is not well-formed: {msg}"))
        }
        other => other,
    })
}
