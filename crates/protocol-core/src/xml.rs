//! # XML element trees
//!
//! A small owned element tree used to carry session descriptions. Parsing is
//! done with `quick-xml`'s namespace-aware reader so every element records
//! the namespace URI it resolved to, not the prefix it was written with.
//!
//! Only what session descriptions need is modelled: elements, attributes and
//! text. Comments, processing instructions and the XML declaration are
//! accepted on input and dropped. Text is kept as written, whitespace
//! included; adjacent runs of character data (text and CDATA) are stored as
//! one text node, so a tree written out and parsed back compares equal.
//!
//! ```
//! use remoting_protocol_core::xml::XmlElement;
//!
//! let root = XmlElement::parse(r#"<description xmlns="google:remoting"><control transport="stream"/></description>"#)?;
//! assert!(root.is("google:remoting", "description"));
//! let control = root.children().next().unwrap();
//! assert_eq!(control.attribute("transport"), Some("stream"));
//! # Ok::<(), remoting_protocol_core::ProtocolError>(())
//! ```

use std::fmt;
use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::{NsReader, Writer};

use crate::error::{ProtocolError, Result};

/// A node inside an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Nested element
    Element(XmlElement),
    /// Character data (already unescaped)
    Text(String),
}

/// An XML element with its resolved namespace, attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    nodes: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element outside any namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            attributes: Vec::new(),
            nodes: Vec::new(),
        }
    }

    /// Create an element in the given namespace
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new(name)
        }
    }

    /// Local name of the element
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace URI of the element, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Name in `{namespace}local` form, used in diagnostics
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{}}}{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// Check both namespace and local name
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// Look up an attribute by name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All attributes in document order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Set an attribute, replacing any previous value
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Append a child element
    pub fn add_child(&mut self, child: XmlElement) {
        self.nodes.push(XmlNode::Element(child));
    }

    /// Builder form of [`add_child`](Self::add_child)
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.add_child(child);
        self
    }

    /// Append character data, extending the last node when it is text.
    /// Empty strings add nothing.
    pub fn add_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(XmlNode::Text(last)) => last.push_str(&text),
            _ => self.nodes.push(XmlNode::Text(text)),
        }
    }

    /// Builder form of [`add_text`](Self::add_text)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.add_text(text);
        self
    }

    /// All child nodes in document order
    pub fn nodes(&self) -> &[XmlNode] {
        &self.nodes
    }

    /// Child elements in document order
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.nodes.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given namespace and local name
    pub fn first_child_named(&self, namespace: &str, name: &str) -> Option<&XmlElement> {
        self.children().find(|child| child.is(namespace, name))
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// True when the element has neither attributes nor content
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.nodes.is_empty()
    }

    /// Parse a document into its root element.
    ///
    /// Fails on anything that is not a single well-formed element tree:
    /// mismatched or missing end tags, unknown namespace prefixes, duplicate
    /// attributes, several root elements or text outside the root.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ProtocolError::malformed_xml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(ref start) => {
                    stack.push(open_element(&reader, start)?);
                }
                Event::Empty(ref start) => {
                    let element = open_element(&reader, start)?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| ProtocolError::malformed_xml("unbalanced end tag"))?;
                    close_element(element, &mut stack, &mut root)?;
                }
                Event::Text(ref text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ProtocolError::malformed_xml(e.to_string()))?;
                    push_text(text.into_owned(), &mut stack)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())
                        .map_err(|e| ProtocolError::malformed_xml(e.to_string()))?;
                    push_text(text, &mut stack)?;
                }
                Event::Eof => break,
                // Declaration, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ProtocolError::malformed_xml(format!(
                "unexpected end of document inside <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| ProtocolError::malformed_xml("document has no root element"))
    }

    /// Serialize the tree to text.
    ///
    /// Namespaces are written as default-namespace declarations wherever an
    /// element's namespace differs from its parent's.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        self.write_into(&mut writer, None)?;
        String::from_utf8(writer.into_inner().into_inner())
            .map_err(|e| ProtocolError::Serialization(e.to_string()))
    }

    fn write_into<W: std::io::Write>(
        &self,
        writer: &mut Writer<W>,
        inherited_namespace: Option<&str>,
    ) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        if self.namespace.as_deref() != inherited_namespace {
            start.push_attribute(("xmlns", self.namespace.as_deref().unwrap_or("")));
        }
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.nodes.is_empty() {
            writer
                .write_event(Event::Empty(start))
                .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
            return Ok(());
        }

        writer
            .write_event(Event::Start(start))
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;

        for node in &self.nodes {
            match node {
                XmlNode::Element(child) => child.write_into(writer, self.namespace.as_deref())?,
                XmlNode::Text(text) => writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(|e| ProtocolError::Serialization(e.to_string()))?,
            }
        }

        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(())
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml_string().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

fn open_element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement> {
    let (resolved, local) = reader.resolve_element(start.name());
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(utf8(ns.as_ref())?),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(ProtocolError::malformed_xml(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };

    let mut element = XmlElement {
        namespace,
        name: utf8(local.as_ref())?,
        attributes: Vec::new(),
        nodes: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| ProtocolError::malformed_xml(e.to_string()))?;
        // Namespace declarations are already reflected in `namespace`
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| ProtocolError::malformed_xml(e.to_string()))?;
        element
            .attributes
            .push((utf8(attr.key.as_ref())?, value.into_owned()));
    }

    Ok(element)
}

fn close_element(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.nodes.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(ProtocolError::malformed_xml(format!(
            "second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(text: String, stack: &mut [XmlElement]) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.add_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ProtocolError::malformed_xml("text outside the root element")),
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ProtocolError::malformed_xml(e.to_string()))
}
