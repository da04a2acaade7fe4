use std::fmt;

use openssl::error::ErrorStack;
use openssl::pkey::{PKey, Public};
use openssl::x509::{X509Ref, X509};

/// Encoding a certificate was supplied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateFormat {
    Der,
    Pem,
}

/// Parsed X.509 certificate together with its canonical DER bytes.
#[derive(Clone)]
pub struct Certificate {
    x509: X509,
    der: Box<[u8]>,
    format: CertificateFormat,
}

impl Certificate {
    pub fn new(x509: X509, format: CertificateFormat) -> Result<Self, ErrorStack> {
        let der = x509.to_der()?;
        Ok(Self {
            x509,
            der: der.into_boxed_slice(),
            format,
        })
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub fn format(&self) -> CertificateFormat {
        self.format
    }

    #[must_use]
    pub fn x509(&self) -> &X509Ref {
        &self.x509
    }

    pub fn public_key(&self) -> Result<PKey<Public>, ErrorStack> {
        self.x509.public_key()
    }

    /// Serial number in decimal, as used by `ds:X509SerialNumber`.
    pub fn serial_decimal(&self) -> Result<String, ErrorStack> {
        let serial = self.x509.serial_number().to_bn()?;
        Ok(serial.to_dec_str()?.to_string())
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Certificate(format={:?}, len={})",
            self.format,
            self.der.len()
        )
    }
}
