//! Request handlers.
//!
//! Each handler checks required fields, resolves algorithm names (request
//! value or configured default), decodes every base64 field, loads the key
//! material and only then runs the operation. Every failure becomes an
//! [`ErrorResponse`]; nothing else crosses the boundary.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::protocol::{
    EncryptRequest, EncryptResponse, ErrorResponse, SignLinkRequest, SignLinkResponse,
    SignXmlRequest, SignXmlResponse,
};
use crate::domain::crypto::{Certificate, PrivateKey};
use crate::domain::types::{EcdsaEncoding, LinkSignatureAlgorithm, Operation, XmlSignatureAlgorithm};
use crate::infra::codec::{decode_base64, decode_base64_utf8, decode_pem_or_base64, encode_base64};
use crate::infra::config::ServiceConfiguration;
use crate::infra::error::{ServiceError, ServiceResult};
use crate::infra::observability::{LogObserver, OperationObserver};
use crate::services::encryption::encrypt;
use crate::services::key_loader::{load_certificate, load_private_key};
use crate::services::link_signer::LinkSigner;
use crate::services::xml_signer::XmlSigner;

/// Routes decoded requests to the operations.
pub struct Dispatcher {
    config: ServiceConfiguration,
    observer: Arc<dyn OperationObserver>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: ServiceConfiguration, observer: Arc<dyn OperationObserver>) -> Self {
        Self { config, observer }
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfiguration {
        &self.config
    }

    pub fn handle_encrypt(&self, request: &EncryptRequest) -> Result<EncryptResponse, ErrorResponse> {
        let op = Operation::Encrypt;
        let (plaintext, certificate) = self.prepare(op, || {
            let data = required(request.data.as_deref(), "data")?;
            let certificate = required(request.certificate.as_deref(), "certificate")?;
            let plaintext = field(decode_base64(data), "data")?;
            let certificate = field(decode_pem_or_base64(certificate), "certificate")?;
            Ok((plaintext, load_certificate(&certificate)?))
        })?;
        log::debug!("encrypt: {} byte payload", plaintext.len());

        let ciphertext = encrypt(&plaintext, &certificate, self.observer.as_ref())?;
        Ok(EncryptResponse::new(encode_base64(&ciphertext)))
    }

    pub fn handle_sign_xml(&self, request: &SignXmlRequest) -> Result<SignXmlResponse, ErrorResponse> {
        let op = Operation::SignXml;
        let (document, material, algorithm) = self.prepare(op, || {
            let document = required(request.document.as_deref(), "document")?;
            let certificate = required(request.certificate.as_deref(), "certificate")?;
            let private_key = required(request.private_key.as_deref(), "private_key")?;
            let algorithm = match request.algorithm.as_deref().filter(|a| !a.trim().is_empty()) {
                Some(name) => name.parse::<XmlSignatureAlgorithm>()?,
                None => self.config.xml_algorithm()?,
            };

            let document = field(decode_base64(document), "document")?;
            let material = KeyMaterial::decode(certificate, private_key, request.key_password.as_deref())?
                .load()?;
            Ok((document, material, algorithm))
        })?;
        log::debug!("sign_xml: {} byte document, {algorithm}", document.len());

        let signer = XmlSigner::new(self.config.xml_signing_options());
        let signed = signer.sign(
            &document,
            &material.key,
            &material.certificate,
            algorithm,
            self.observer.as_ref(),
        )?;
        Ok(SignXmlResponse::new(
            encode_base64(&signed.document),
            signed.algorithm.as_str(),
            signed.enrichments,
        ))
    }

    pub fn handle_sign_link(&self, request: &SignLinkRequest) -> Result<SignLinkResponse, ErrorResponse> {
        let op = Operation::SignLink;
        let (link, material, algorithm, encoding, policy) = self.prepare(op, || {
            let link = required(request.link.as_deref(), "link")?;
            let certificate = required(request.certificate.as_deref(), "certificate")?;
            let private_key = required(request.private_key.as_deref(), "private_key")?;
            let algorithm = match request.algorithm.as_deref().filter(|a| !a.trim().is_empty()) {
                Some(name) => name.parse::<LinkSignatureAlgorithm>()?,
                None => self.config.link_algorithm()?,
            };
            let encoding = match request.ecdsa_encoding.as_deref().filter(|e| !e.trim().is_empty()) {
                Some(name) => name.parse::<EcdsaEncoding>()?,
                None => self.config.ecdsa_encoding()?,
            };
            let policy = self.config.segment_policy()?;

            let link = field(decode_base64_utf8(link), "link")?;
            let material = KeyMaterial::decode(certificate, private_key, request.key_password.as_deref())?
                .load()?;
            Ok((link, material, algorithm, encoding, policy))
        })?;
        log::debug!("sign_link: {algorithm}, extra segments {policy}");

        let signed = LinkSigner::new(policy).sign(
            &link,
            &material.key,
            &material.certificate,
            algorithm,
            encoding,
            self.observer.as_ref(),
        )?;
        Ok(SignLinkResponse::new(
            encode_base64(signed.link.as_bytes()),
            signed.algorithm.as_str(),
            signed.ecdsa_encoding.map(|e| e.as_str().to_string()),
        ))
    }

    /// Decode a JSON request for `operation`, handle it and serialize the
    /// response. Panics inside the handler surface as `UNEXPECTED_ERROR`.
    pub fn handle_json(&self, operation: Operation, body: &str) -> Result<serde_json::Value, ErrorResponse> {
        let outcome = catch_unwind(AssertUnwindSafe(|| match operation {
            Operation::Encrypt => {
                let request: EncryptRequest = self.parse_request(operation, body)?;
                to_json(&self.handle_encrypt(&request)?)
            }
            Operation::SignXml => {
                let request: SignXmlRequest = self.parse_request(operation, body)?;
                to_json(&self.handle_sign_xml(&request)?)
            }
            Operation::SignLink => {
                let request: SignLinkRequest = self.parse_request(operation, body)?;
                to_json(&self.handle_sign_link(&request)?)
            }
        }));

        outcome.unwrap_or_else(|_| {
            let error = ServiceError::Unexpected(format!("{operation} handler panicked"));
            self.observer.failed(operation, &error);
            Err(ErrorResponse::from_error(&error))
        })
    }

    fn parse_request<T: DeserializeOwned>(&self, operation: Operation, body: &str) -> Result<T, ErrorResponse> {
        self.prepare(operation, || {
            serde_json::from_str(body)
                .map_err(|e| ServiceError::Decoding(format!("malformed {operation} request: {e}")))
        })
    }

    /// Run request preparation, reporting failures to the observer; the
    /// operations report their own.
    fn prepare<T>(
        &self,
        operation: Operation,
        step: impl FnOnce() -> ServiceResult<T>,
    ) -> Result<T, ErrorResponse> {
        step().map_err(|error| {
            self.observer.failed(operation, &error);
            ErrorResponse::from_error(&error)
        })
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(ServiceConfiguration::default(), Arc::new(LogObserver))
    }
}

/// Decoded but not yet parsed signing material.
struct KeyMaterial {
    certificate: Vec<u8>,
    private_key: Vec<u8>,
    password: Option<Vec<u8>>,
}

/// Parsed signing material, dropped with the request.
struct LoadedMaterial {
    certificate: Certificate,
    key: PrivateKey,
}

impl KeyMaterial {
    fn decode(certificate: &str, private_key: &str, password: Option<&str>) -> ServiceResult<Self> {
        let certificate = field(decode_pem_or_base64(certificate), "certificate")?;
        let private_key = field(decode_pem_or_base64(private_key), "private_key")?;
        let password = password
            .filter(|p| !p.trim().is_empty())
            .map(|p| field(decode_base64(p), "key_password"))
            .transpose()?;
        Ok(Self {
            certificate,
            private_key,
            password,
        })
    }

    fn load(self) -> ServiceResult<LoadedMaterial> {
        let certificate = load_certificate(&self.certificate)?;
        let key = load_private_key(&self.private_key, self.password.as_deref())?;
        Ok(LoadedMaterial { certificate, key })
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> ServiceResult<&'a str> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::MissingField(name.to_string()))
}

/// Prefix decoding failures with the field they came from.
fn field<T>(result: ServiceResult<T>, name: &str) -> ServiceResult<T> {
    result.map_err(|e| match e {
        ServiceError::Decoding(msg) => ServiceError::Decoding(format!("{name}: {msg}")),
        other => other,
    })
}

fn to_json<T: Serialize>(response: &T) -> Result<serde_json::Value, ErrorResponse> {
    serde_json::to_value(response).map_err(|e| {
        ErrorResponse::from_error(&ServiceError::Unexpected(format!(
            "cannot serialize response: {e}"
        )))
    })
}
