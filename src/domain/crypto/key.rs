use std::fmt;

use openssl::error::ErrorStack;
use openssl::nid::Nid;
use openssl::pkey::{HasPublic, Id, PKey, PKeyRef, Private};

use crate::infra::error::{ServiceError, ServiceResult};

/// Named elliptic curves the service can recognise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
    Secp256k1,
    Other(String),
}

impl EcCurve {
    #[must_use]
    pub fn from_nid(nid: Option<Nid>) -> Self {
        match nid {
            Some(Nid::X9_62_PRIME256V1) => EcCurve::P256,
            Some(Nid::SECP384R1) => EcCurve::P384,
            Some(Nid::SECP521R1) => EcCurve::P521,
            Some(Nid::SECP256K1) => EcCurve::Secp256k1,
            Some(other) => EcCurve::Other(
                other
                    .short_name()
                    .map_or_else(|_| format!("nid {}", other.as_raw()), str::to_string),
            ),
            None => EcCurve::Other("unnamed curve".to_string()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            EcCurve::P256 => "secp256r1",
            EcCurve::P384 => "secp384r1",
            EcCurve::P521 => "secp521r1",
            EcCurve::Secp256k1 => "secp256k1",
            EcCurve::Other(name) => name,
        }
    }

    /// Byte width of a field element (and of each P1363 signature half).
    #[must_use]
    pub fn field_bytes(&self) -> Option<usize> {
        match self {
            EcCurve::P256 | EcCurve::Secp256k1 => Some(32),
            EcCurve::P384 => Some(48),
            EcCurve::P521 => Some(66),
            EcCurve::Other(_) => None,
        }
    }
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key family and its size/curve parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    Rsa { bits: u32 },
    Ec { curve: EcCurve },
}

impl KeyKind {
    /// Classify a key; `Ok(None)` for families other than RSA and EC.
    pub fn of<T: HasPublic>(pkey: &PKeyRef<T>) -> Result<Option<Self>, ErrorStack> {
        match pkey.id() {
            Id::RSA => {
                let rsa = pkey.rsa()?;
                let bits = u32::try_from(rsa.n().num_bits()).unwrap_or_default();
                Ok(Some(KeyKind::Rsa { bits }))
            }
            Id::EC => {
                let ec = pkey.ec_key()?;
                Ok(Some(KeyKind::Ec {
                    curve: EcCurve::from_nid(ec.group().curve_name()),
                }))
            }
            _ => Ok(None),
        }
    }

    #[must_use]
    pub fn family(&self) -> &'static str {
        match self {
            KeyKind::Rsa { .. } => "RSA",
            KeyKind::Ec { .. } => "EC",
        }
    }

    /// Require an RSA key of at least `min_bits` (0 accepts any size).
    pub fn require_rsa(&self, algorithm: &str, min_bits: u32) -> ServiceResult<u32> {
        match self {
            KeyKind::Rsa { bits } if *bits >= min_bits => Ok(*bits),
            KeyKind::Rsa { bits } => Err(ServiceError::AlgorithmCompatibility(format!(
                "{algorithm} requires an RSA key of at least {min_bits} bits, got {bits}"
            ))),
            KeyKind::Ec { curve } => Err(ServiceError::AlgorithmCompatibility(format!(
                "{algorithm} requires an RSA key, got an EC key on {curve}"
            ))),
        }
    }

    /// Require an EC key on `expected`; returns the curve's field width.
    pub fn require_curve(&self, algorithm: &str, expected: &EcCurve) -> ServiceResult<usize> {
        match self {
            KeyKind::Ec { curve } if curve == expected => expected.field_bytes().ok_or_else(|| {
                ServiceError::AlgorithmCompatibility(format!(
                    "{algorithm}: no fixed signature width for {curve}"
                ))
            }),
            KeyKind::Ec { curve } => Err(ServiceError::AlgorithmCompatibility(format!(
                "{algorithm} requires an EC key on {expected}, got {curve}"
            ))),
            KeyKind::Rsa { bits } => Err(ServiceError::AlgorithmCompatibility(format!(
                "{algorithm} requires an EC key on {expected}, got an RSA-{bits} key"
            ))),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Rsa { bits } => write!(f, "RSA-{bits}"),
            KeyKind::Ec { curve } => write!(f, "EC {curve}"),
        }
    }
}

/// Private key held for the duration of one request.
///
/// `Debug` never prints key material.
pub struct PrivateKey {
    pkey: PKey<Private>,
    kind: KeyKind,
}

impl PrivateKey {
    #[must_use]
    pub fn new(pkey: PKey<Private>, kind: KeyKind) -> Self {
        Self { pkey, kind }
    }

    #[must_use]
    pub fn kind(&self) -> &KeyKind {
        &self.kind
    }

    #[must_use]
    pub fn pkey(&self) -> &PKeyRef<Private> {
        &self.pkey
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, [REDACTED])", self.kind)
    }
}
