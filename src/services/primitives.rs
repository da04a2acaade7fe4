//! SHA-256 signing primitives over OpenSSL.

use openssl::hash::MessageDigest;
use openssl::pkey::{PKeyRef, Private};
use openssl::rsa::Padding;
use openssl::sign::{RsaPssSaltlen, Signer};

use crate::domain::constants::RSA_PSS_SALT_LEN;
use crate::domain::crypto::EcdsaSignature;
use crate::infra::error::{ServiceError, ServiceResult};

fn signing_error(context: &str) -> impl Fn(openssl::error::ErrorStack) -> ServiceError + '_ {
    move |e| ServiceError::Signing(format!("{context}: {e}"))
}

/// RSASSA-PKCS1-v1_5 with SHA-256.
pub fn rsa_pkcs1_sha256(key: &PKeyRef<Private>, data: &[u8]) -> ServiceResult<Vec<u8>> {
    let mut signer =
        Signer::new(MessageDigest::sha256(), key).map_err(signing_error("RSA signer setup"))?;
    signer
        .set_rsa_padding(Padding::PKCS1)
        .map_err(signing_error("RSA padding"))?;
    signer.update(data).map_err(signing_error("RSA signing"))?;
    signer.sign_to_vec().map_err(signing_error("RSA signing"))
}

/// RSASSA-PSS with SHA-256, MGF1-SHA-256 and a 32-byte salt.
pub fn rsa_pss_sha256(key: &PKeyRef<Private>, data: &[u8]) -> ServiceResult<Vec<u8>> {
    let mut signer =
        Signer::new(MessageDigest::sha256(), key).map_err(signing_error("RSA-PSS signer setup"))?;
    signer
        .set_rsa_padding(Padding::PKCS1_PSS)
        .and_then(|()| signer.set_rsa_pss_saltlen(RsaPssSaltlen::custom(RSA_PSS_SALT_LEN)))
        .and_then(|()| signer.set_rsa_mgf1_md(MessageDigest::sha256()))
        .map_err(signing_error("RSA-PSS parameters"))?;
    signer.update(data).map_err(signing_error("RSA-PSS signing"))?;
    signer.sign_to_vec().map_err(signing_error("RSA-PSS signing"))
}

/// ECDSA with SHA-256, returned in the DER form OpenSSL produces.
pub fn ecdsa_sha256(key: &PKeyRef<Private>, data: &[u8]) -> ServiceResult<EcdsaSignature> {
    let mut signer =
        Signer::new(MessageDigest::sha256(), key).map_err(signing_error("ECDSA signer setup"))?;
    signer.update(data).map_err(signing_error("ECDSA signing"))?;
    let der = signer.sign_to_vec().map_err(signing_error("ECDSA signing"))?;
    EcdsaSignature::from_der(der)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::ec::{EcGroup, EcKey};
    use openssl::nid::Nid;
    use openssl::pkey::PKey;
    use openssl::rsa::Rsa;
    use openssl::sign::Verifier;

    #[test]
    fn test_pss_signature_verifies_with_matching_parameters() {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let signature = rsa_pss_sha256(&key, b"host/a/b/c/d/e/f").unwrap();
        assert_eq!(signature.len(), 256);

        let mut verifier = Verifier::new(MessageDigest::sha256(), &key).unwrap();
        verifier.set_rsa_padding(Padding::PKCS1_PSS).unwrap();
        verifier
            .set_rsa_pss_saltlen(RsaPssSaltlen::custom(32))
            .unwrap();
        verifier.set_rsa_mgf1_md(MessageDigest::sha256()).unwrap();
        verifier.update(b"host/a/b/c/d/e/f").unwrap();
        assert!(verifier.verify(&signature).unwrap());
    }

    #[test]
    fn test_ecdsa_signature_converts_to_fixed_width() {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
        let signature = ecdsa_sha256(&key, b"payload").unwrap();
        assert_eq!(signature.to_p1363(32).unwrap().len(), 64);

        let mut verifier = Verifier::new(MessageDigest::sha256(), &key).unwrap();
        verifier.update(b"payload").unwrap();
        assert!(verifier.verify(signature.as_der()).unwrap());
    }
}
