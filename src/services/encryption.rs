//! RSA-OAEP encryption to a certificate's public key.

use openssl::encrypt::Encrypter;
use openssl::hash::MessageDigest;
use openssl::rsa::Padding;

use crate::domain::constants::SHA256_LEN;
use crate::domain::crypto::{Certificate, KeyKind};
use crate::domain::types::Operation;
use crate::infra::error::{ServiceError, ServiceResult, Stage};
use crate::infra::observability::{finish, OperationObserver};

/// Algorithm name reported for encryption results.
pub const OAEP_SHA256: &str = "RSA-OAEP-SHA256";

/// Largest plaintext OAEP with SHA-256 accepts for a key of `key_bytes`.
#[must_use]
pub fn oaep_capacity(key_bytes: usize) -> usize {
    key_bytes.saturating_sub(2 * SHA256_LEN + 2)
}

/// Encrypt `plaintext` with RSA-OAEP (SHA-256, MGF1-SHA-256, empty label)
/// under the certificate's public key.
pub fn encrypt(
    plaintext: &[u8],
    certificate: &Certificate,
    observer: &dyn OperationObserver,
) -> ServiceResult<Vec<u8>> {
    finish(
        observer,
        Operation::Encrypt,
        OAEP_SHA256,
        encrypt_inner(plaintext, certificate, observer),
    )
}

fn encrypt_inner(
    plaintext: &[u8],
    certificate: &Certificate,
    observer: &dyn OperationObserver,
) -> ServiceResult<Vec<u8>> {
    let public = certificate.public_key().map_err(|e| {
        ServiceError::Encryption(format!("cannot extract certificate public key: {e}"))
    })?;

    let kind = KeyKind::of(&public)
        .map_err(|e| ServiceError::Encryption(format!("cannot inspect certificate key: {e}")))?;
    match &kind {
        Some(KeyKind::Rsa { .. }) => {}
        Some(other) => {
            return Err(ServiceError::Encryption(format!(
                "certificate key must be RSA for OAEP encryption, found {other}"
            )))
        }
        None => {
            return Err(ServiceError::Encryption(format!(
                "certificate key must be RSA for OAEP encryption, found {:?}",
                public.id()
            )))
        }
    }

    let key_bytes = public.size();
    let capacity = oaep_capacity(key_bytes);
    if plaintext.len() > capacity {
        return Err(ServiceError::Encryption(format!(
            "payload of {} bytes exceeds the OAEP capacity of {capacity} bytes for a {}-bit key",
            plaintext.len(),
            key_bytes * 8
        )));
    }
    observer.stage_completed(
        Operation::Encrypt,
        Stage::Algorithm,
        &format!("{} bytes within capacity {capacity}", plaintext.len()),
    );

    let mut encrypter = Encrypter::new(&public)
        .map_err(|e| ServiceError::Encryption(e.to_string()))?;
    encrypter
        .set_rsa_padding(Padding::PKCS1_OAEP)
        .and_then(|()| encrypter.set_rsa_oaep_md(MessageDigest::sha256()))
        .and_then(|()| encrypter.set_rsa_mgf1_md(MessageDigest::sha256()))
        .map_err(|e| ServiceError::Encryption(format!("cannot configure OAEP: {e}")))?;

    let mut ciphertext = vec![
        0u8;
        encrypter
            .encrypt_len(plaintext)
            .map_err(|e| ServiceError::Encryption(e.to_string()))?
    ];
    let written = encrypter
        .encrypt(plaintext, &mut ciphertext)
        .map_err(|e| ServiceError::Encryption(e.to_string()))?;
    ciphertext.truncate(written);

    observer.stage_completed(
        Operation::Encrypt,
        Stage::Transform,
        &format!("{written} bytes of ciphertext"),
    );
    Ok(ciphertext)
}
