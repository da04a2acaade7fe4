//! Canonical XML 1.1 without comments (`http://www.w3.org/2006/12/xml-c14n11`),
//! delegated to libxml2.
//!
//! Inputs have already been accepted by `roxmltree`, so no DTD is present and
//! only the predefined entities can occur.

use libxml::parser::Parser;
use libxml::tree::c14n::{CanonicalizationMode, CanonicalizationOptions};
use libxml::tree::Document;
use libxml::xpath::Context;

use super::dsig::with_utf8_declaration;
use crate::domain::constants::{NS_DSIG, NS_XADES};
use crate::infra::error::{ServiceError, ServiceResult};

fn options() -> CanonicalizationOptions {
    CanonicalizationOptions {
        mode: CanonicalizationMode::Canonical1_1,
        with_comments: false,
        inclusive_ns_prefixes: Vec::new(),
    }
}

// The declaration is rewritten so libxml2 never transcodes text that is
// already UTF-8.
fn parse(xml: &str) -> ServiceResult<Document> {
    Parser::default()
        .parse_string(with_utf8_declaration(xml))
        .map_err(|e| ServiceError::XmlParse(format!("{e:?}")))
}

/// Canonicalize a whole document.
pub fn canonicalize_document(xml: &str) -> ServiceResult<String> {
    parse(xml)?
        .canonicalize(options(), None)
        .map_err(|()| ServiceError::Signing("canonicalization failed".to_string()))
}

/// Canonicalize the single element selected by `xpath` as a document subset.
///
/// The prefixes `ds` and `xades` are bound for the expression. Namespaces and
/// `xml:*` attributes in scope at the element are rendered on it.
pub fn canonicalize_node(xml: &str, xpath: &str) -> ServiceResult<String> {
    let doc = parse(xml)?;
    let mut context = Context::new(&doc)
        .map_err(|()| ServiceError::Signing("cannot create XPath context".to_string()))?;
    for (prefix, uri) in [("ds", NS_DSIG), ("xades", NS_XADES)] {
        context.register_namespace(prefix, uri).map_err(|()| {
            ServiceError::Signing(format!("cannot register namespace prefix {prefix}"))
        })?;
    }

    let mut nodes = context
        .findnodes(xpath, None)
        .map_err(|()| ServiceError::Signing(format!("invalid XPath expression {xpath}")))?;
    if nodes.len() != 1 {
        return Err(ServiceError::Signing(format!(
            "expected one element at {xpath}, found {}",
            nodes.len()
        )));
    }
    let mut node = nodes.remove(0);
    node.canonicalize(options())
        .map_err(|()| ServiceError::Signing(format!("canonicalization of {xpath} failed")))
}

/// Escape character data for insertion into a document.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(c),
        }
    }
    out
}
