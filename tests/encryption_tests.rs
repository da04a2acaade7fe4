//! RSA-OAEP encryption against OpenSSL decryption.

mod common;

use common::fixtures::{p256, rsa2048, KeyPair};
use common::observer::{Event, RecordingObserver};
use ksef_signer::{encrypt, load_certificate, Operation, ServiceError, SilentObserver, Stage};
use openssl::encrypt::Decrypter;
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;

fn decrypt(pair: &KeyPair, ciphertext: &[u8]) -> Vec<u8> {
    let mut decrypter = Decrypter::new(&pair.pkey).unwrap();
    decrypter.set_rsa_padding(Padding::PKCS1_OAEP).unwrap();
    decrypter.set_rsa_oaep_md(MessageDigest::sha256()).unwrap();
    decrypter.set_rsa_mgf1_md(MessageDigest::sha256()).unwrap();
    let mut out = vec![0u8; decrypter.decrypt_len(ciphertext).unwrap()];
    let len = decrypter.decrypt(ciphertext, &mut out).unwrap();
    out.truncate(len);
    out
}

#[test]
fn oaep_round_trip() {
    let pair = rsa2048();
    let certificate = load_certificate(&pair.cert_der()).unwrap();
    let plaintext = b"symmetric session key material";

    let ciphertext = encrypt(plaintext, &certificate, &SilentObserver).unwrap();
    assert_eq!(ciphertext.len(), 256);
    assert_eq!(decrypt(pair, &ciphertext), plaintext);
}

#[test]
fn oaep_is_randomized() {
    let certificate = load_certificate(&rsa2048().cert_pem()).unwrap();
    let a = encrypt(b"same", &certificate, &SilentObserver).unwrap();
    let b = encrypt(b"same", &certificate, &SilentObserver).unwrap();
    assert_ne!(a, b);
}

#[test]
fn payload_at_capacity_is_accepted() {
    let pair = rsa2048();
    let certificate = load_certificate(&pair.cert_pem()).unwrap();
    let payload = vec![0x5a; 190];
    let ciphertext = encrypt(&payload, &certificate, &SilentObserver).unwrap();
    assert_eq!(decrypt(pair, &ciphertext), payload);
}

#[test]
fn oversized_payload_is_rejected_before_encrypting() {
    let certificate = load_certificate(&rsa2048().cert_pem()).unwrap();
    let observer = RecordingObserver::default();

    let err = encrypt(&[0u8; 191], &certificate, &observer).unwrap_err();
    assert!(matches!(err, ServiceError::Encryption(_)));
    let message = err.to_string();
    assert!(message.contains("191"), "{message}");
    assert!(message.contains("190"), "{message}");
    assert_eq!(err.http_status(), 500);
    assert!(!observer.stages().contains(&Stage::Transform));
    assert_eq!(observer.failures(), vec!["ENCRYPTION_ERROR".to_string()]);
}

#[test]
fn ec_certificate_cannot_encrypt() {
    let certificate = load_certificate(&p256().cert_pem()).unwrap();
    let err = encrypt(b"data", &certificate, &SilentObserver).unwrap_err();
    assert!(matches!(err, ServiceError::Encryption(_)));
    assert!(err.to_string().contains("EC secp256r1"), "{err}");
}

#[test]
fn success_is_reported() {
    let certificate = load_certificate(&rsa2048().cert_pem()).unwrap();
    let observer = RecordingObserver::default();
    encrypt(b"x", &certificate, &observer).unwrap();
    assert!(observer
        .events()
        .contains(&Event::Succeeded(Operation::Encrypt, "RSA-OAEP-SHA256".to_string())));
}
