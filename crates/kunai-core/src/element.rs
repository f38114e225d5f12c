//! Wire element tree.
//!
//! The remote procedure protocol exchanges a generic attributed tree: named
//! elements with ordered attributes, optional text content, and child
//! elements. Codecs build and read this tree through the accessors here; the
//! element and attribute names they use are a fixed wire contract. XML is
//! the transport serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::{CoreError, CoreResult};

/// A node in the wire element tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Creates an element with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Returns the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a child element and returns a mutable reference to it.
    pub fn add_element(&mut self, name: impl Into<String>) -> &mut Element {
        self.children.push(Element::new(name));
        let idx = self.children.len() - 1;
        &mut self.children[idx]
    }

    /// Sets an attribute, replacing any existing attribute with the same
    /// name while keeping its position.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(attr) = self.attrs.iter_mut().find(|(n, _)| *n == name) {
            attr.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Returns the value of an attribute, if set.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of an attribute, or `default` when absent.
    #[must_use]
    pub fn attribute_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attribute(name).unwrap_or(default)
    }

    /// Sets the text content of this element.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Returns the text content with surrounding whitespace trimmed.
    #[must_use]
    pub fn text_trim(&self) -> &str {
        self.text.trim()
    }

    /// Returns the child elements in order.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Returns the first child element with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Serializes this element (and its subtree) as XML.
    ///
    /// ## Errors
    /// Returns an error if the writer fails, which for an in-memory buffer
    /// indicates invalid content.
    pub fn to_xml(&self) -> CoreResult<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_xml(&mut writer)?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| CoreError::ParseError(format!("non-UTF-8 XML output: {e}")))
    }

    fn write_xml(&self, writer: &mut Writer<Vec<u8>>) -> CoreResult<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attrs {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.text.is_empty() && self.children.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| CoreError::ParseError(e.to_string()))?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| CoreError::ParseError(e.to_string()))?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(|e| CoreError::ParseError(e.to_string()))?;
        }
        for child in &self.children {
            child.write_xml(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| CoreError::ParseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_and_defaults() {
        let mut el = Element::new("geo");
        el.add_attribute("lat", "37.3861");
        assert_eq!(el.attribute("lat"), Some("37.3861"));
        assert_eq!(el.attribute_or("lon", "0"), "0");
    }

    #[test]
    fn add_attribute_replaces_in_place() {
        let mut el = Element::new("attach");
        el.add_attribute("uri", "http://a");
        el.add_attribute("ct", "text/plain");
        el.add_attribute("uri", "http://b");
        assert_eq!(el.attribute("uri"), Some("http://b"));
        // Replacement keeps the original attribute position.
        assert_eq!(el.to_xml().unwrap(), r#"<attach uri="http://b" ct="text/plain"/>"#);
    }

    #[test]
    fn text_trim() {
        let mut el = Element::new("attach");
        el.set_text("  QmFzZTY0  ");
        assert_eq!(el.text_trim(), "QmFzZTY0");
    }

    #[test]
    fn nested_xml() {
        let mut root = Element::new("comp");
        root.add_element("geo").add_attribute("lat", "1");
        let xml = root.to_xml().unwrap();
        assert_eq!(xml, r#"<comp><geo lat="1"/></comp>"#);
    }

    #[test]
    fn text_is_escaped() {
        let mut el = Element::new("attach");
        el.set_text("a<b&c");
        assert_eq!(el.to_xml().unwrap(), "<attach>a&lt;b&amp;c</attach>");
    }
}
