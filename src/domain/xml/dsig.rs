//! Enveloped `ds:Signature` rendering and placement.
//!
//! The signature is rendered without inter-element whitespace and appended as
//! the last child of the document element, so the canonical form of the
//! document minus the signature is exactly the canonical form of the input.

use roxmltree::Document;

use crate::domain::constants::{
    ALG_C14N11, ALG_ENVELOPED_SIGNATURE, ALG_SHA256, NS_DSIG, NS_XADES, XADES_SIGNED_PROPERTIES_TYPE,
    XML_DECLARATION,
};
use crate::infra::error::{ServiceError, ServiceResult};

/// Everything a signature element needs apart from the values computed
/// over it.
#[derive(Debug, Clone)]
pub struct SignatureTemplate {
    id: String,
    signature_method: &'static str,
    document_digest: String,
    certificate_b64: String,
    signed_signature_properties: Option<String>,
}

impl SignatureTemplate {
    /// `signed_signature_properties` is the inner XML of
    /// `xades:SignedSignatureProperties`; `None` omits the XAdES object.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        signature_method: &'static str,
        document_digest: impl Into<String>,
        certificate_b64: impl Into<String>,
        signed_signature_properties: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            signature_method,
            document_digest: document_digest.into(),
            certificate_b64: certificate_b64.into(),
            signed_signature_properties,
        }
    }

    #[must_use]
    pub fn signature_id(&self) -> String {
        format!("Signature-{}", self.id)
    }

    #[must_use]
    pub fn signed_properties_id(&self) -> String {
        format!("SignedProperties-{}", self.id)
    }

    #[must_use]
    pub fn has_signed_properties(&self) -> bool {
        self.signed_signature_properties.is_some()
    }

    /// Render the `ds:Signature` element with the given digest of the
    /// signed properties and signature value (both base64, may be empty
    /// while they are still being computed).
    #[must_use]
    pub fn render(&self, properties_digest: &str, signature_value: &str) -> String {
        let signature_id = self.signature_id();
        let properties_id = self.signed_properties_id();

        let mut xml = String::with_capacity(2048);
        xml.push_str(&format!(
            "<ds:Signature xmlns:ds=\"{NS_DSIG}\" Id=\"{signature_id}\">"
        ));
        xml.push_str("<ds:SignedInfo>");
        xml.push_str(&format!(
            "<ds:CanonicalizationMethod Algorithm=\"{ALG_C14N11}\"></ds:CanonicalizationMethod>"
        ));
        xml.push_str(&format!(
            "<ds:SignatureMethod Algorithm=\"{}\"></ds:SignatureMethod>",
            self.signature_method
        ));
        xml.push_str(&format!(
            "<ds:Reference Id=\"Reference-{}\" URI=\"\"><ds:Transforms>\
             <ds:Transform Algorithm=\"{ALG_ENVELOPED_SIGNATURE}\"></ds:Transform>\
             <ds:Transform Algorithm=\"{ALG_C14N11}\"></ds:Transform>\
             </ds:Transforms><ds:DigestMethod Algorithm=\"{ALG_SHA256}\"></ds:DigestMethod>\
             <ds:DigestValue>{}</ds:DigestValue></ds:Reference>",
            self.id, self.document_digest
        ));
        if self.has_signed_properties() {
            xml.push_str(&format!(
                "<ds:Reference Type=\"{XADES_SIGNED_PROPERTIES_TYPE}\" URI=\"#{properties_id}\">\
                 <ds:Transforms><ds:Transform Algorithm=\"{ALG_C14N11}\"></ds:Transform></ds:Transforms>\
                 <ds:DigestMethod Algorithm=\"{ALG_SHA256}\"></ds:DigestMethod>\
                 <ds:DigestValue>{properties_digest}</ds:DigestValue></ds:Reference>"
            ));
        }
        xml.push_str("</ds:SignedInfo>");
        xml.push_str(&format!(
            "<ds:SignatureValue>{signature_value}</ds:SignatureValue>"
        ));
        xml.push_str(&format!(
            "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>",
            self.certificate_b64
        ));
        if let Some(properties) = &self.signed_signature_properties {
            xml.push_str(&format!(
                "<ds:Object><xades:QualifyingProperties xmlns:xades=\"{NS_XADES}\" Target=\"#{signature_id}\">\
                 <xades:SignedProperties Id=\"{properties_id}\">\
                 <xades:SignedSignatureProperties>{properties}</xades:SignedSignatureProperties>\
                 </xades:SignedProperties></xades:QualifyingProperties></ds:Object>"
            ));
        }
        xml.push_str("</ds:Signature>");
        xml
    }
}

/// Insert `signature` as the last child of the document element of `text`.
pub fn insert_enveloped(text: &str, doc: &Document<'_>, signature: &str) -> ServiceResult<String> {
    let root = doc.root_element();
    let range = root.range();
    let element = &text[range.clone()];

    let mut out = String::with_capacity(text.len() + signature.len() + 32);
    if element.ends_with("/>") {
        let qname_end = element[1..]
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .map_or(element.len(), |i| i + 1);
        let qname = &element[1..qname_end];
        out.push_str(&text[..range.end - 2]);
        out.push('>');
        out.push_str(signature);
        out.push_str("</");
        out.push_str(qname);
        out.push('>');
    } else {
        let end_tag = element.rfind("</").ok_or_else(|| {
            ServiceError::Signing("document element has no end tag".to_string())
        })?;
        out.push_str(&text[..range.start + end_tag]);
        out.push_str(signature);
        out.push_str(&text[range.start + end_tag..range.end]);
    }
    out.push_str(&text[range.end..]);
    Ok(out)
}

/// Replace any leading byte-order mark and XML declaration with the
/// standard UTF-8 declaration.
#[must_use]
pub fn with_utf8_declaration(text: &str) -> String {
    let body = text.trim_start_matches('\u{feff}');
    let body = match body.strip_prefix("<?xml") {
        Some(rest) if rest.starts_with(|c: char| c.is_whitespace()) => rest
            .find("?>")
            .map_or(body, |end| rest[end + 2..].trim_start_matches(['\r', '\n'])),
        _ => body,
    };
    format!("{XML_DECLARATION}{body}")
}
