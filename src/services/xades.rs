//! XAdES signed signature properties.
//!
//! Each property is produced by a [`SignedPropertyEnrichment`]. An enrichment
//! either yields its XML fragment or explains why it cannot; the signer
//! skips the latter and reports them, it never fails a signature because of
//! a missing enrichment.

use chrono::{DateTime, Utc};
use der::Decode;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::constants::ALG_SHA256;
use crate::domain::crypto::Certificate;
use crate::domain::xml::escape_text;
use crate::infra::codec::encode_base64;
use crate::infra::observability::OperationObserver;

/// Result of asking an enrichment for its property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// XML fragment to place inside `xades:SignedSignatureProperties`
    Applied(String),
    /// The property cannot be produced; the reason is reported
    Unsupported(String),
}

/// A single XAdES signed signature property.
pub trait SignedPropertyEnrichment: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, certificate: &Certificate) -> EnrichmentOutcome;
}

/// What happened to one enrichment during a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentReport {
    pub name: String,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// `xades:SigningTime` in UTC.
pub struct SigningTimeEnrichment {
    enabled: bool,
    clock: fn() -> DateTime<Utc>,
}

impl SigningTimeEnrichment {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            clock: Utc::now,
        }
    }

    /// Use a fixed clock instead of the system time.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

impl SignedPropertyEnrichment for SigningTimeEnrichment {
    fn name(&self) -> &'static str {
        "signing_time"
    }

    fn apply(&self, _certificate: &Certificate) -> EnrichmentOutcome {
        if !self.enabled {
            return EnrichmentOutcome::Unsupported("disabled".to_string());
        }
        let now = (self.clock)();
        EnrichmentOutcome::Applied(format!(
            "<xades:SigningTime>{}</xades:SigningTime>",
            now.format("%Y-%m-%dT%H:%M:%SZ")
        ))
    }
}

/// `xades:SigningCertificate`: SHA-256 digest of the certificate plus its
/// issuer name and serial number.
pub struct SigningCertificateEnrichment {
    enabled: bool,
}

impl SigningCertificateEnrichment {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SignedPropertyEnrichment for SigningCertificateEnrichment {
    fn name(&self) -> &'static str {
        "signing_certificate"
    }

    fn apply(&self, certificate: &Certificate) -> EnrichmentOutcome {
        if !self.enabled {
            return EnrichmentOutcome::Unsupported("disabled".to_string());
        }

        let parsed = match x509_cert::Certificate::from_der(certificate.as_der()) {
            Ok(parsed) => parsed,
            Err(e) => {
                return EnrichmentOutcome::Unsupported(format!(
                    "certificate structure not decodable: {e}"
                ))
            }
        };
        let issuer = parsed.tbs_certificate.issuer.to_string();
        if issuer.is_empty() {
            return EnrichmentOutcome::Unsupported("certificate has an empty issuer".to_string());
        }
        let serial = match certificate.serial_decimal() {
            Ok(serial) => serial,
            Err(e) => {
                return EnrichmentOutcome::Unsupported(format!("serial number unreadable: {e}"))
            }
        };
        let digest = encode_base64(&Sha256::digest(certificate.as_der()));

        EnrichmentOutcome::Applied(format!(
            "<xades:SigningCertificate><xades:Cert><xades:CertDigest>\
             <ds:DigestMethod Algorithm=\"{ALG_SHA256}\"></ds:DigestMethod>\
             <ds:DigestValue>{digest}</ds:DigestValue></xades:CertDigest>\
             <xades:IssuerSerial><ds:X509IssuerName>{}</ds:X509IssuerName>\
             <ds:X509SerialNumber>{serial}</ds:X509SerialNumber></xades:IssuerSerial>\
             </xades:Cert></xades:SigningCertificate>",
            escape_text(&issuer)
        ))
    }
}

/// Run every enrichment, returning the combined properties fragment (if
/// any applied) and one report per enrichment.
pub fn collect_properties(
    enrichments: &[Box<dyn SignedPropertyEnrichment>],
    certificate: &Certificate,
    observer: &dyn OperationObserver,
) -> (Option<String>, Vec<EnrichmentReport>) {
    let mut fragment = String::new();
    let mut reports = Vec::with_capacity(enrichments.len());

    for enrichment in enrichments {
        match enrichment.apply(certificate) {
            EnrichmentOutcome::Applied(xml) => {
                fragment.push_str(&xml);
                reports.push(EnrichmentReport {
                    name: enrichment.name().to_string(),
                    applied: true,
                    reason: None,
                });
            }
            EnrichmentOutcome::Unsupported(reason) => {
                observer.enrichment_skipped(enrichment.name(), &reason);
                reports.push(EnrichmentReport {
                    name: enrichment.name().to_string(),
                    applied: false,
                    reason: Some(reason),
                });
            }
        }
    }

    let fragment = (!fragment.is_empty()).then_some(fragment);
    (fragment, reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap()
    }

    #[test]
    fn test_signing_time_is_utc_with_seconds() {
        let enrichment = SigningTimeEnrichment::new(true).with_clock(fixed_time);
        let certificate = test_certificate();
        assert_eq!(
            enrichment.apply(&certificate),
            EnrichmentOutcome::Applied(
                "<xades:SigningTime>2025-03-04T05:06:07Z</xades:SigningTime>".to_string()
            )
        );
    }

    #[test]
    fn test_disabled_enrichments_are_unsupported() {
        let certificate = test_certificate();
        assert_eq!(
            SigningTimeEnrichment::new(false).apply(&certificate),
            EnrichmentOutcome::Unsupported("disabled".to_string())
        );
        assert_eq!(
            SigningCertificateEnrichment::new(false).apply(&certificate),
            EnrichmentOutcome::Unsupported("disabled".to_string())
        );
    }

    #[test]
    fn test_signing_certificate_carries_issuer_and_serial() {
        let certificate = test_certificate();
        let EnrichmentOutcome::Applied(xml) = SigningCertificateEnrichment::new(true).apply(&certificate)
        else {
            panic!("signing certificate enrichment not applied");
        };
        assert!(xml.contains("CN=Test &amp; Co"), "{xml}");
        assert!(xml.contains("<ds:X509SerialNumber>4242</ds:X509SerialNumber>"), "{xml}");
    }

    #[test]
    fn test_collect_reports_every_enrichment() {
        let certificate = test_certificate();
        let enrichments: Vec<Box<dyn SignedPropertyEnrichment>> = vec![
            Box::new(SigningTimeEnrichment::new(false)),
            Box::new(SigningCertificateEnrichment::new(true)),
        ];
        let (fragment, reports) = collect_properties(
            &enrichments,
            &certificate,
            &crate::infra::observability::SilentObserver,
        );
        assert!(fragment.unwrap().starts_with("<xades:SigningCertificate>"));
        assert_eq!(reports.len(), 2);
        assert!(!reports[0].applied);
        assert_eq!(reports[0].reason.as_deref(), Some("disabled"));
        assert!(reports[1].applied);
    }

    #[test]
    fn test_collect_without_applied_enrichments_yields_no_fragment() {
        let certificate = test_certificate();
        let enrichments: Vec<Box<dyn SignedPropertyEnrichment>> =
            vec![Box::new(SigningTimeEnrichment::new(false))];
        let (fragment, _) = collect_properties(
            &enrichments,
            &certificate,
            &crate::infra::observability::SilentObserver,
        );
        assert!(fragment.is_none());
    }

    fn test_certificate() -> Certificate {
        use openssl::asn1::{Asn1Integer, Asn1Time};
        use openssl::bn::BigNum;
        use openssl::hash::MessageDigest;
        use openssl::pkey::PKey;
        use openssl::rsa::Rsa;
        use openssl::x509::{X509Builder, X509NameBuilder};

        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", "Test & Co").unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = Asn1Integer::from_bn(&BigNum::from_u32(4242).unwrap()).unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(30).unwrap())
            .unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Certificate::new(builder.build(), crate::domain::crypto::CertificateFormat::Der).unwrap()
    }
}
