//! Access link signing: canonical string, schemes and encodings.

mod common;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use common::fixtures::{other_rsa2048, p256, p384, rsa1024, rsa2048, KeyPair};
use common::observer::RecordingObserver;
use ksef_signer::{
    sign_link, EcdsaEncoding, ExtraSegmentPolicy, LinkSignatureAlgorithm, LinkSigner,
    ServiceError, SilentObserver, Stage,
};
use openssl::ecdsa::EcdsaSig;
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Verifier};

const LINK: &str = "https://ksef.example.gov/api/v2/certificate/A/B/C/D";
const CANONICAL: &str = "ksef.example.gov/api/v2/certificate/A/B/C";

fn path_segments(link: &str) -> Vec<&str> {
    let after_scheme = link.split_once("://").unwrap().1;
    let path = after_scheme.split_once('/').unwrap().1;
    path.split('/').collect()
}

fn signature_of(link: &str) -> Vec<u8> {
    let last = *path_segments(link).last().unwrap();
    assert!(!last.contains('='), "signature segment must be unpadded");
    URL_SAFE_NO_PAD.decode(last).unwrap()
}

fn verify_pss(pair: &KeyPair, data: &[u8], signature: &[u8]) -> bool {
    let public = pair.certificate.public_key().unwrap();
    let mut verifier = Verifier::new(MessageDigest::sha256(), &public).unwrap();
    verifier.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
    verifier
        .set_rsa_pss_saltlen(RsaPssSaltlen::custom(32))
        .unwrap();
    verifier.set_rsa_mgf1_md(MessageDigest::sha256()).unwrap();
    verifier.update(data).unwrap();
    verifier.verify(signature).unwrap()
}

fn verify_ecdsa_der(pair: &KeyPair, data: &[u8], der: &[u8]) -> bool {
    let public = pair.certificate.public_key().unwrap();
    let mut verifier = Verifier::new(MessageDigest::sha256(), &public).unwrap();
    verifier.update(data).unwrap();
    verifier.verify(der).unwrap()
}

#[test]
fn rsa_pss_link_has_seven_segments_and_verifies() {
    let pair = rsa2048();
    let (certificate, key) = pair.load();

    let signed = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap();

    assert!(signed.link.starts_with("https://ksef.example.gov/api/v2/certificate/A/B/C/"));
    assert_eq!(path_segments(&signed.link).len(), 7);
    assert_eq!(signed.algorithm, LinkSignatureAlgorithm::RsaPss);
    assert_eq!(signed.ecdsa_encoding, None);

    let signature = signature_of(&signed.link);
    assert_eq!(signature.len(), 256);
    assert!(verify_pss(pair, CANONICAL.as_bytes(), &signature));
}

#[test]
fn resigning_a_signed_link_signs_the_same_prefix() {
    let pair = rsa2048();
    let (certificate, key) = pair.load();
    let sign = |link: &str| {
        sign_link(
            link,
            &key,
            &certificate,
            LinkSignatureAlgorithm::RsaPss,
            EcdsaEncoding::P1363,
            &SilentObserver,
        )
        .unwrap()
        .link
    };

    let first = sign(LINK);
    let second = sign(&first);

    let prefix = |link: &str| path_segments(link)[..6].join("/");
    assert_eq!(prefix(&first), prefix(&second));
    assert!(verify_pss(pair, CANONICAL.as_bytes(), &signature_of(&first)));
    assert!(verify_pss(pair, CANONICAL.as_bytes(), &signature_of(&second)));
}

#[test]
fn ecdsa_p1363_signature_is_64_bytes() {
    let pair = p256();
    let (certificate, key) = pair.load();

    let signed = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::EcdsaP256,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap();
    assert_eq!(signed.ecdsa_encoding, Some(EcdsaEncoding::P1363));

    let raw = signature_of(&signed.link);
    assert_eq!(raw.len(), 64);

    let (r, s) = raw.split_at(32);
    let sig = EcdsaSig::from_private_components(
        openssl::bn::BigNum::from_slice(r).unwrap(),
        openssl::bn::BigNum::from_slice(s).unwrap(),
    )
    .unwrap();
    assert!(verify_ecdsa_der(pair, CANONICAL.as_bytes(), &sig.to_der().unwrap()));
}

#[test]
fn ecdsa_der_signature_is_a_valid_sequence() {
    let pair = p256();
    let (certificate, key) = pair.load();

    let signed = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::EcdsaP256,
        EcdsaEncoding::Der,
        &SilentObserver,
    )
    .unwrap();
    assert_eq!(signed.ecdsa_encoding, Some(EcdsaEncoding::Der));

    let der = signature_of(&signed.link);
    assert_eq!(der[0], 0x30);
    assert!(EcdsaSig::from_der(&der).is_ok());
    assert!(verify_ecdsa_der(pair, CANONICAL.as_bytes(), &der));
}

#[test]
fn missing_scheme_query_and_fragment_are_normalized() {
    let pair = rsa2048();
    let (certificate, key) = pair.load();

    let signed = sign_link(
        "ksef.example.gov/api/v2/certificate/A/B/C/?x=1#frag",
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap();

    assert!(signed.link.starts_with("https://ksef.example.gov/"));
    assert!(!signed.link.contains('?'));
    assert!(!signed.link.contains('#'));
    assert!(verify_pss(pair, CANONICAL.as_bytes(), &signature_of(&signed.link)));
}

#[test]
fn url_inside_query_cannot_supply_scheme_or_host() {
    let (certificate, key) = rsa2048().load();
    let observer = RecordingObserver::default();

    let err = sign_link(
        "h.example/a/b/c/d/e/f?next=https://evil.example/1/2/3/4/5/6",
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &observer,
    )
    .unwrap_err();

    assert!(matches!(err, ServiceError::UrlFormat(_)), "{err}");
    assert!(!observer.stages().contains(&Stage::Transform));
}

#[test]
fn uppercase_scheme_is_lowercased() {
    let pair = rsa2048();
    let (certificate, key) = pair.load();

    let signed = sign_link(
        "HTTPS://ksef.example.gov/api/v2/certificate/A/B/C",
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap();

    assert!(signed.link.starts_with("https://ksef.example.gov/"));
    assert!(verify_pss(pair, CANONICAL.as_bytes(), &signature_of(&signed.link)));
}

#[test]
fn too_few_segments_fail_before_signing() {
    let (certificate, key) = rsa2048().load();
    let observer = RecordingObserver::default();

    let err = sign_link(
        "https://ksef.example.gov/a/b/c/d/e",
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &observer,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::InsufficientSegments {
            found: 5,
            required: 6
        }
    ));
    assert!(!observer.stages().contains(&Stage::Transform));
}

#[test]
fn extra_segments_are_truncated_with_a_warning() {
    let (certificate, key) = rsa2048().load();
    let observer = RecordingObserver::default();

    LinkSigner::new(ExtraSegmentPolicy::Truncate)
        .sign(
            LINK,
            &key,
            &certificate,
            LinkSignatureAlgorithm::RsaPss,
            EcdsaEncoding::P1363,
            &observer,
        )
        .unwrap();

    let warnings = observer.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("discarding 1"), "{warnings:?}");
}

#[test]
fn extra_segments_can_be_rejected() {
    let (certificate, key) = rsa2048().load();
    let err = LinkSigner::new(ExtraSegmentPolicy::Reject)
        .sign(
            LINK,
            &key,
            &certificate,
            LinkSignatureAlgorithm::RsaPss,
            EcdsaEncoding::P1363,
            &SilentObserver,
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::UrlFormat(_)));
}

#[test]
fn mismatched_certificate_is_rejected_before_algorithm_checks() {
    let (certificate, _) = rsa2048().load();
    let (_, other_key) = other_rsa2048().load();
    let observer = RecordingObserver::default();

    let err = sign_link(
        LINK,
        &other_key,
        &certificate,
        LinkSignatureAlgorithm::EcdsaP256,
        EcdsaEncoding::P1363,
        &observer,
    )
    .unwrap_err();

    assert!(matches!(err, ServiceError::KeyMismatch));
    assert!(!observer.stages().contains(&Stage::Algorithm));
    assert_eq!(observer.failures(), vec!["KEY_MISMATCH".to_string()]);
}

#[test]
fn short_rsa_key_is_rejected_with_its_size() {
    let (certificate, key) = rsa1024().load();
    let err = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::RsaPss,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::AlgorithmCompatibility(_)));
    assert!(err.to_string().contains("1024"), "{err}");
}

#[test]
fn p384_key_is_rejected_with_its_curve() {
    let (certificate, key) = p384().load();
    let err = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::EcdsaP256,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::AlgorithmCompatibility(_)));
    assert!(err.to_string().contains("secp384r1"), "{err}");
}

#[test]
fn rsa_key_cannot_sign_ecdsa() {
    let (certificate, key) = rsa2048().load();
    let err = sign_link(
        LINK,
        &key,
        &certificate,
        LinkSignatureAlgorithm::EcdsaP256,
        EcdsaEncoding::P1363,
        &SilentObserver,
    )
    .unwrap_err();
    assert_eq!(err.category(), "ALGORITHM_COMPATIBILITY_ERROR");
}
