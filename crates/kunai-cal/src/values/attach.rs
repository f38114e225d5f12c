use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use kunai_core::element::Element;
use kunai_core::metadata::Metadata;

use crate::error::{CalError, CalResult};
use crate::ical::{ContentLine, Parameter};

const E_ATTACH: &str = "attach";
const A_URI: &str = "uri";
const A_CONTENT_TYPE: &str = "ct";

const FN_URI: &str = "uri";
const FN_CONTENT_TYPE: &str = "ct";
const FN_BINARY: &str = "bin";

/// An attachment, either a reference by URI or inline base64 content.
///
/// The two arms are exclusive: a URI attachment may carry a content
/// type, inline content never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attach {
    Uri {
        uri: String,
        content_type: Option<String>,
    },
    Binary {
        b64: String,
    },
}

impl Attach {
    #[must_use]
    pub fn from_uri(uri: impl Into<String>, content_type: Option<String>) -> Self {
        Self::Uri {
            uri: uri.into(),
            content_type,
        }
    }

    #[must_use]
    pub fn from_base64(b64: impl Into<String>) -> Self {
        Self::Binary { b64: b64.into() }
    }

    /// Encodes raw bytes as an inline attachment.
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::Binary {
            b64: BASE64.encode(data),
        }
    }

    #[must_use]
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Uri { uri, .. } => Some(uri),
            Self::Binary { .. } => None,
        }
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Uri { content_type, .. } => content_type.as_deref(),
            Self::Binary { .. } => None,
        }
    }

    /// Returns the inline base64 payload, if this is an inline attachment.
    #[must_use]
    pub fn binary(&self) -> Option<&str> {
        match self {
            Self::Uri { .. } => None,
            Self::Binary { b64 } => Some(b64),
        }
    }

    /// Decodes the inline payload to raw bytes.
    ///
    /// ## Errors
    ///
    /// Fails on a URI attachment or invalid base64.
    pub fn decode_bytes(&self) -> CalResult<Vec<u8>> {
        match self {
            Self::Uri { .. } => Err(CalError::InvalidData(
                "attachment is a URI reference, not inline content".to_owned(),
            )),
            Self::Binary { b64 } => BASE64
                .decode(b64)
                .map_err(|e| CalError::InvalidData(format!("invalid base64 attachment: {e}"))),
        }
    }

    /// Builds the text property form.
    ///
    /// A URI arm renders the URI with an optional `FMTTYPE` parameter.
    /// The inline arm renders the base64 payload tagged `VALUE=BINARY`
    /// and `ENCODING=BASE64`.
    #[must_use]
    pub fn to_content_line(&self) -> ContentLine {
        match self {
            Self::Uri { uri, content_type } => {
                let mut line = ContentLine::new("ATTACH", uri.clone());
                if let Some(ct) = content_type {
                    line.add_param(Parameter::new("FMTTYPE", ct.clone()));
                }
                line
            }
            Self::Binary { b64 } => ContentLine::with_params(
                "ATTACH",
                vec![
                    Parameter::new("VALUE", "BINARY"),
                    Parameter::new("ENCODING", "BASE64"),
                ],
                b64.clone(),
            ),
        }
    }

    /// Parses the text property form. `VALUE=BINARY` selects the inline
    /// arm; anything else is a URI.
    #[must_use]
    pub fn parse(line: &ContentLine) -> Self {
        let is_binary = line
            .param_value("VALUE")
            .is_some_and(|v| v.eq_ignore_ascii_case("BINARY"));
        if is_binary {
            Self::from_base64(line.value.clone())
        } else {
            Self::from_uri(
                line.value.clone(),
                line.param_value("FMTTYPE").map(str::to_owned),
            )
        }
    }

    pub fn to_element(&self, parent: &mut Element) {
        let el = parent.add_element(E_ATTACH);
        match self {
            Self::Uri { uri, content_type } => {
                el.add_attribute(A_URI, uri);
                if let Some(ct) = content_type {
                    el.add_attribute(A_CONTENT_TYPE, ct);
                }
            }
            Self::Binary { b64 } => {
                el.set_text(b64);
            }
        }
    }

    /// Reads the wire element form. Presence of the `uri` attribute
    /// selects the URI arm; otherwise the element text is the payload.
    #[must_use]
    pub fn from_element(el: &Element) -> Self {
        if let Some(uri) = el.attribute(A_URI) {
            Self::from_uri(uri, el.attribute(A_CONTENT_TYPE).map(str::to_owned))
        } else {
            Self::from_base64(el.text_trim())
        }
    }

    #[must_use]
    pub fn encode_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        match self {
            Self::Uri { uri, content_type } => {
                meta.put(FN_URI, uri.as_str());
                if let Some(ct) = content_type {
                    meta.put(FN_CONTENT_TYPE, ct.as_str());
                }
            }
            Self::Binary { b64 } => {
                meta.put(FN_BINARY, b64.as_str());
            }
        }
        meta
    }

    /// ## Errors
    ///
    /// Fails when the record carries neither a URI nor an inline payload.
    pub fn decode_metadata(meta: &Metadata) -> CalResult<Self> {
        if let Some(uri) = meta.get_str(FN_URI) {
            return Ok(Self::from_uri(
                uri,
                meta.get_str(FN_CONTENT_TYPE).map(str::to_owned),
            ));
        }
        meta.get_str(FN_BINARY).map(Self::from_base64).ok_or_else(|| {
            CalError::InvalidData("attachment record has neither uri nor bin".to_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_content_line_round_trip() {
        let attach = Attach::from_uri("http://example.com/a.png", Some("image/png".to_owned()));
        let line = attach.to_content_line();
        assert_eq!(
            line.to_string(),
            "ATTACH;FMTTYPE=image/png:http://example.com/a.png"
        );
        assert_eq!(Attach::parse(&line), attach);
    }

    #[test]
    fn binary_content_line_round_trip() {
        let attach = Attach::from_bytes(b"hello");
        let line = attach.to_content_line();
        assert_eq!(
            line.to_string(),
            "ATTACH;VALUE=BINARY;ENCODING=BASE64:aGVsbG8="
        );
        let parsed = Attach::parse(&line);
        assert_eq!(parsed, attach);
        assert_eq!(parsed.decode_bytes().unwrap(), b"hello");
    }

    #[test]
    fn value_param_check_is_case_insensitive() {
        let line = ContentLine::with_params(
            "ATTACH",
            vec![Parameter::new("VALUE", "binary")],
            "aGVsbG8=",
        );
        assert!(matches!(Attach::parse(&line), Attach::Binary { .. }));
    }

    #[test]
    fn element_uri_arm_uses_attributes() {
        let attach = Attach::from_uri("http://example.com/a.pdf", Some("application/pdf".into()));
        let mut parent = Element::new("comp");
        attach.to_element(&mut parent);
        let el = parent.child(E_ATTACH).unwrap();
        assert_eq!(el.attribute(A_URI), Some("http://example.com/a.pdf"));
        assert_eq!(el.attribute(A_CONTENT_TYPE), Some("application/pdf"));
        assert_eq!(Attach::from_element(el), attach);
    }

    #[test]
    fn element_binary_arm_uses_text() {
        let attach = Attach::from_base64("aGVsbG8=");
        let mut parent = Element::new("comp");
        attach.to_element(&mut parent);
        let el = parent.child(E_ATTACH).unwrap();
        assert_eq!(el.attribute(A_URI), None);
        assert_eq!(el.text_trim(), "aGVsbG8=");
        assert_eq!(Attach::from_element(el), attach);
    }

    #[test]
    fn metadata_round_trip_both_arms() {
        let uri = Attach::from_uri("http://example.com/a", None);
        assert_eq!(Attach::decode_metadata(&uri.encode_metadata()).unwrap(), uri);

        let bin = Attach::from_base64("aGVsbG8=");
        assert_eq!(Attach::decode_metadata(&bin.encode_metadata()).unwrap(), bin);
    }

    #[test]
    fn metadata_uri_presence_selects_arm() {
        let mut meta = Metadata::new();
        meta.put(FN_URI, "http://example.com/a");
        meta.put(FN_BINARY, "aGVsbG8=");
        let decoded = Attach::decode_metadata(&meta).unwrap();
        assert!(matches!(decoded, Attach::Uri { .. }));
    }

    #[test]
    fn metadata_empty_record_fails() {
        let meta = Metadata::new();
        assert!(Attach::decode_metadata(&meta).is_err());
    }

    #[test]
    fn decode_bytes_rejects_uri_arm() {
        let attach = Attach::from_uri("http://example.com/a", None);
        assert!(attach.decode_bytes().is_err());
    }
}
