use kunai_core::element::Element;
use kunai_core::metadata::Metadata;
use url::Url;

use crate::error::{CalError, CalResult};
use crate::ical::{ContentLine, Parameter};

const E_ORGANIZER: &str = "or";
const A_ADDRESS: &str = "a";
const A_DISPLAY_NAME: &str = "d";

const FN_ADDRESS: &str = "a";
const FN_CN: &str = "cn";

const MAILTO: &str = "mailto:";

/// The organizer of a calendar component: a bare mail address plus an
/// optional display name.
///
/// The address is stored without its `MAILTO:` scheme; the scheme is
/// re-applied whenever a URI form is needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organizer {
    address: String,
    display_name: Option<String>,
}

fn strip_mailto(value: &str) -> &str {
    if value.len() >= MAILTO.len() && value[..MAILTO.len()].eq_ignore_ascii_case(MAILTO) {
        &value[MAILTO.len()..]
    } else {
        value
    }
}

impl Organizer {
    /// Creates an organizer. A leading `MAILTO:` on the address is
    /// stripped case-insensitively.
    #[must_use]
    pub fn new(address: &str, display_name: Option<String>) -> Self {
        Self {
            address: strip_mailto(address).to_owned(),
            display_name,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the organizer as a `mailto:` URI.
    ///
    /// ## Errors
    ///
    /// Fails with [`CalError::Construction`] when the stored address does
    /// not form a valid URI.
    pub fn to_uri(&self) -> CalResult<Url> {
        Url::parse(&format!("{MAILTO}{}", self.address))
            .map_err(|e| CalError::Construction(format!("bad organizer address: {e}")))
    }

    /// Builds the text property form. The `CN` parameter is emitted only
    /// when a non-empty display name is present.
    #[must_use]
    pub fn to_content_line(&self) -> ContentLine {
        let mut line = ContentLine::new("ORGANIZER", format!("MAILTO:{}", self.address));
        if let Some(cn) = self.display_name.as_deref().filter(|cn| !cn.is_empty()) {
            line.add_param(Parameter::new("CN", cn));
        }
        line
    }

    #[must_use]
    pub fn parse(line: &ContentLine) -> Self {
        Self::new(&line.value, line.param_value("CN").map(str::to_owned))
    }

    pub fn to_element(&self, parent: &mut Element) {
        let el = parent.add_element(E_ORGANIZER);
        el.add_attribute(A_ADDRESS, &self.address);
        if let Some(cn) = &self.display_name {
            el.add_attribute(A_DISPLAY_NAME, cn);
        }
    }

    #[must_use]
    pub fn from_element(el: &Element) -> Option<Self> {
        let address = el.attribute(A_ADDRESS)?;
        Some(Self::new(
            address,
            el.attribute(A_DISPLAY_NAME).map(str::to_owned),
        ))
    }

    #[must_use]
    pub fn encode_metadata(&self) -> Metadata {
        let mut meta = Metadata::new();
        meta.put(FN_ADDRESS, self.address.as_str());
        if let Some(cn) = &self.display_name {
            meta.put(FN_CN, cn.as_str());
        }
        meta
    }

    /// Decodes the persisted form. An absent record decodes to `None`
    /// rather than an error, since components without an organizer are
    /// common.
    ///
    /// ## Errors
    ///
    /// Fails when a record exists but carries no address.
    pub fn decode_metadata(meta: Option<&Metadata>) -> CalResult<Option<Self>> {
        let Some(meta) = meta else {
            return Ok(None);
        };
        let address = meta.get_str(FN_ADDRESS).ok_or_else(|| {
            CalError::InvalidData("organizer record is missing its address".to_owned())
        })?;
        Ok(Some(Self::new(
            address,
            meta.get_str(FN_CN).map(str::to_owned),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_mailto_case_insensitively() {
        for addr in ["MAILTO:jane@example.com", "mailto:jane@example.com", "jane@example.com"] {
            assert_eq!(Organizer::new(addr, None).address(), "jane@example.com");
        }
    }

    #[test]
    fn content_line_with_display_name() {
        let org = Organizer::new("jane@example.com", Some("Jane Doe".to_owned()));
        assert_eq!(
            org.to_content_line().to_string(),
            "ORGANIZER;CN=Jane Doe:MAILTO:jane@example.com"
        );
    }

    #[test]
    fn empty_display_name_omits_cn() {
        let org = Organizer::new("jane@example.com", Some(String::new()));
        assert_eq!(
            org.to_content_line().to_string(),
            "ORGANIZER:MAILTO:jane@example.com"
        );
    }

    #[test]
    fn parse_content_line() {
        let line = ContentLine::with_params(
            "ORGANIZER",
            vec![Parameter::new("CN", "Jane Doe")],
            "MAILTO:jane@example.com",
        );
        let org = Organizer::parse(&line);
        assert_eq!(org.address(), "jane@example.com");
        assert_eq!(org.display_name(), Some("Jane Doe"));
    }

    #[test]
    fn uri_form() {
        let org = Organizer::new("jane@example.com", None);
        assert_eq!(org.to_uri().unwrap().as_str(), "mailto:jane@example.com");
    }

    #[test]
    fn element_round_trip() {
        let org = Organizer::new("jane@example.com", Some("Jane".to_owned()));
        let mut parent = Element::new("comp");
        org.to_element(&mut parent);
        let el = parent.child(E_ORGANIZER).unwrap();
        assert_eq!(Organizer::from_element(el), Some(org));
    }

    #[test]
    fn metadata_round_trip() {
        let org = Organizer::new("jane@example.com", Some("Jane".to_owned()));
        let meta = org.encode_metadata();
        assert_eq!(Organizer::decode_metadata(Some(&meta)).unwrap(), Some(org));
    }

    #[test]
    fn metadata_absent_record_is_none() {
        assert_eq!(Organizer::decode_metadata(None).unwrap(), None);
    }

    #[test]
    fn metadata_record_without_address_fails() {
        let mut meta = Metadata::new();
        meta.put(FN_CN, "Jane");
        assert!(Organizer::decode_metadata(Some(&meta)).is_err());
    }
}
