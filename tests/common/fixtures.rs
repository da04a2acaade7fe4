//! Key and certificate fixtures generated with OpenSSL at test time.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ksef_signer::{load_certificate, load_private_key, Certificate, PrivateKey};
use openssl::asn1::{Asn1Integer, Asn1Time};
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::{X509Builder, X509NameBuilder, X509};

/// A private key and a self-signed certificate for it.
pub struct KeyPair {
    pub pkey: PKey<Private>,
    pub certificate: X509,
}

impl KeyPair {
    pub fn generate(pkey: PKey<Private>, common_name: &str) -> Self {
        let certificate = self_signed(&pkey, common_name);
        Self { pkey, certificate }
    }

    pub fn key_pem(&self) -> Vec<u8> {
        self.pkey.private_key_to_pem_pkcs8().unwrap()
    }

    pub fn encrypted_key_pem(&self, password: &[u8]) -> Vec<u8> {
        self.pkey
            .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), password)
            .unwrap()
    }

    pub fn cert_pem(&self) -> Vec<u8> {
        self.certificate.to_pem().unwrap()
    }

    pub fn cert_der(&self) -> Vec<u8> {
        self.certificate.to_der().unwrap()
    }

    pub fn cert_pem_b64(&self) -> String {
        STANDARD.encode(self.cert_pem())
    }

    pub fn key_pem_b64(&self) -> String {
        STANDARD.encode(self.key_pem())
    }

    /// Parsed through the crate's own loader.
    pub fn load(&self) -> (Certificate, PrivateKey) {
        (
            load_certificate(&self.cert_pem()).unwrap(),
            load_private_key(&self.key_pem(), None).unwrap(),
        )
    }
}

pub fn rsa_key(bits: u32) -> PKey<Private> {
    PKey::from_rsa(Rsa::generate(bits).unwrap()).unwrap()
}

pub fn ec_key(curve: Nid) -> PKey<Private> {
    let group = EcGroup::from_curve_name(curve).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

pub fn rsa2048() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(rsa_key(2048), "RSA Test Signer"))
}

pub fn other_rsa2048() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(rsa_key(2048), "Other RSA Signer"))
}

pub fn rsa1024() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(rsa_key(1024), "Short RSA Signer"))
}

pub fn p256() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(ec_key(Nid::X9_62_PRIME256V1), "P-256 Test Signer"))
}

pub fn other_p256() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(ec_key(Nid::X9_62_PRIME256V1), "Other P-256 Signer"))
}

pub fn p384() -> &'static KeyPair {
    static PAIR: OnceLock<KeyPair> = OnceLock::new();
    PAIR.get_or_init(|| KeyPair::generate(ec_key(Nid::SECP384R1), "P-384 Test Signer"))
}

fn self_signed(pkey: &PKey<Private>, common_name: &str) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("C", "PL").unwrap();
    name.append_entry_by_text("O", "KSeF Test").unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = Asn1Integer::from_bn(&BigNum::from_u32(0x1234_5678).unwrap()).unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(pkey).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(365).unwrap())
        .unwrap();
    builder.sign(pkey, MessageDigest::sha256()).unwrap();
    builder.build()
}

pub fn b64(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

pub fn unb64(text: &str) -> Vec<u8> {
    STANDARD.decode(text).unwrap()
}
