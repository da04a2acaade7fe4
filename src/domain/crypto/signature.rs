use std::fmt;

use openssl::ecdsa::EcdsaSig;

use crate::domain::types::EcdsaEncoding;
use crate::infra::error::{ServiceError, ServiceResult};

/// ECDSA signature value, kept in the DER form the primitive produces.
#[derive(Clone, Eq, PartialEq)]
pub struct EcdsaSignature {
    der: Box<[u8]>,
}

impl EcdsaSignature {
    /// Wrap a DER `Ecdsa-Sig-Value`, rejecting anything that does not parse.
    pub fn from_der(der: Vec<u8>) -> ServiceResult<Self> {
        EcdsaSig::from_der(&der).map_err(|e| {
            ServiceError::Signing(format!("ECDSA signature is not valid DER: {e}"))
        })?;
        Ok(Self {
            der: der.into_boxed_slice(),
        })
    }

    /// Build from a fixed-width `r || s` concatenation.
    #[cfg(test)]
    pub fn from_p1363(bytes: &[u8]) -> ServiceResult<Self> {
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(ServiceError::Signing(format!(
                "P1363 signature must have an even, non-zero length, got {}",
                bytes.len()
            )));
        }
        use openssl::bn::BigNum;

        let (r, s) = bytes.split_at(bytes.len() / 2);
        let sig = EcdsaSig::from_private_components(BigNum::from_slice(r)?, BigNum::from_slice(s)?)?;
        Ok(Self {
            der: sig.to_der()?.into_boxed_slice(),
        })
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Fixed-width big-endian `r || s`, each half left-zero-padded to `width`.
    pub fn to_p1363(&self, width: usize) -> ServiceResult<Vec<u8>> {
        let sig = EcdsaSig::from_der(&self.der)?;
        let (r, s) = (sig.r(), sig.s());
        let too_wide = |n: i32| usize::try_from(n).map_or(true, |n| n > width);
        if too_wide(r.num_bytes()) || too_wide(s.num_bytes()) {
            return Err(ServiceError::Signing(format!(
                "ECDSA signature component exceeds {width} bytes"
            )));
        }
        let pad = i32::try_from(width)
            .map_err(|_| ServiceError::Signing(format!("invalid component width {width}")))?;
        let mut out = r.to_vec_padded(pad)?;
        out.extend_from_slice(&s.to_vec_padded(pad)?);
        Ok(out)
    }

    /// Signature bytes in the requested wire encoding.
    pub fn encode(&self, encoding: EcdsaEncoding, width: usize) -> ServiceResult<Vec<u8>> {
        match encoding {
            EcdsaEncoding::P1363 => self.to_p1363(width),
            EcdsaEncoding::Der => Ok(self.der.to_vec()),
        }
    }
}

impl fmt::Debug for EcdsaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaSignature(der_len={})", self.der.len())
    }
}
