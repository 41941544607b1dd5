//! Lossless element tree over quick-xml events.
//!
//! Parts that get mutated are parsed into an [`XmlDocument`]: every start tag
//! keeps its raw attribute bytes, and text, entity references, comments and
//! processing instructions are kept as the events the reader produced. Writing
//! the tree back therefore only changes what a caller touched.

use crate::ooxml::error::{OoxmlError, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// A node inside an element (or at document level).
#[derive(Debug, Clone)]
pub enum XmlNode {
    /// A child element
    Element(XmlElement),
    /// Character data, kept in its escaped form
    Text(BytesText<'static>),
    /// Anything else (declaration, comment, PI, CDATA, entity reference)
    Other(Event<'static>),
}

/// An element with its raw start tag and ordered children.
#[derive(Debug, Clone)]
pub struct XmlElement {
    start: BytesStart<'static>,
    children: Vec<XmlNode>,
    /// Written as `<x/>` when it has no children
    self_closing: bool,
}

/// A parsed XML part.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Top-level nodes; exactly one of them is an element (the root)
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a part into a tree.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| OoxmlError::Xml(format!("at {}: {}", reader.buffer_position(), e)))?;

            match event {
                Event::Start(e) => stack.push(XmlElement {
                    start: e.into_owned(),
                    children: Vec::new(),
                    self_closing: false,
                }),
                Event::Empty(e) => {
                    let element = XmlElement {
                        start: e.into_owned(),
                        children: Vec::new(),
                        self_closing: true,
                    };
                    push_node(&mut stack, &mut nodes, XmlNode::Element(element));
                },
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| OoxmlError::Xml("unbalanced end tag".to_string()))?;
                    push_node(&mut stack, &mut nodes, XmlNode::Element(element));
                },
                Event::Text(e) => push_node(&mut stack, &mut nodes, XmlNode::Text(e.into_owned())),
                Event::Eof => break,
                other => push_node(&mut stack, &mut nodes, XmlNode::Other(other.into_owned())),
            }
        }

        if !stack.is_empty() {
            return Err(OoxmlError::Xml("unexpected end of document".to_string()));
        }
        if !nodes.iter().any(|n| matches!(n, XmlNode::Element(_))) {
            return Err(OoxmlError::Xml("document has no root element".to_string()));
        }

        Ok(Self { nodes })
    }

    /// The root element.
    pub fn root(&self) -> &XmlElement {
        self.nodes
            .iter()
            .find_map(|n| match n {
                XmlNode::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("parse guarantees a root element"))
    }

    /// The root element, mutably.
    pub fn root_mut(&mut self) -> &mut XmlElement {
        self.nodes
            .iter_mut()
            .find_map(|n| match n {
                XmlNode::Element(e) => Some(e),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("parse guarantees a root element"))
    }

    /// Serialize the tree.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::with_capacity(4096));
        for node in &self.nodes {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn push_node(stack: &mut [XmlElement], top: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => top.push(node),
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<()> {
    match node {
        XmlNode::Element(element) => {
            if element.children.is_empty() && element.self_closing {
                writer.write_event(Event::Empty(element.start.borrow()))?;
            } else {
                writer.write_event(Event::Start(element.start.borrow()))?;
                for child in &element.children {
                    write_node(writer, child)?;
                }
                writer.write_event(Event::End(element.start.to_end()))?;
            }
        },
        XmlNode::Text(text) => writer.write_event(Event::Text(text.borrow()))?,
        XmlNode::Other(event) => writer.write_event(event.borrow())?,
    }
    Ok(())
}

impl XmlElement {
    /// Create an empty element named `name` (qualified, e.g. `a:r`).
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Parse a standalone fragment with exactly one root element.
    pub fn parse_fragment(xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(xml.as_bytes())?;
        Ok(doc.root().clone())
    }

    /// Qualified tag name (`p:sp`).
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    /// Tag name without prefix (`sp`).
    pub fn local_name(&self) -> &[u8] {
        self.start.local_name().into_inner()
    }

    /// Namespace prefix of the tag, if any.
    pub fn prefix(&self) -> Option<&str> {
        let name = self.name();
        let colon = name.iter().position(|&b| b == b':')?;
        std::str::from_utf8(&name[..colon]).ok()
    }

    /// Unescaped value of the attribute whose qualified key is `key`.
    pub fn attr(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .find(|a| a.key.as_ref() == key.as_bytes())
            .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
    }

    /// Attribute value parsed as an integer.
    pub fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attr(key).and_then(|v| v.trim().parse().ok())
    }

    /// Attribute value parsed as an unsigned id.
    pub fn attr_u32(&self, key: &str) -> Option<u32> {
        self.attr(key)
            .and_then(|v| atoi_simd::parse::<u32, false, false>(v.trim().as_bytes()).ok())
    }

    /// All `(key, value)` pairs in source order.
    pub fn attrs(&self) -> Vec<(String, String)> {
        self.start
            .attributes()
            .with_checks(false)
            .flatten()
            .filter_map(|a| {
                let key = std::str::from_utf8(a.key.as_ref()).ok()?.to_string();
                let value = a.unescape_value().ok()?.into_owned();
                Some((key, value))
            })
            .collect()
    }

    /// Child nodes.
    pub fn nodes(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child elements in order.
    pub fn children(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements in order, mutably.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children().find(|e| e.local_name() == local.as_bytes())
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.children_mut().find(|e| e.local_name() == local.as_bytes())
    }

    /// Follow a path of local names through first matching children.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |el, local| el.child(local))
    }

    /// First element with the given local name anywhere below this one.
    pub fn find(&self, local: &str) -> Option<&XmlElement> {
        for child in self.children() {
            if child.local_name() == local.as_bytes() {
                return Some(child);
            }
            if let Some(found) = child.find(local) {
                return Some(found);
            }
        }
        None
    }

    /// Index (into [`nodes`](Self::nodes)) of every child element matching `pred`.
    pub fn element_positions<F>(&self, mut pred: F) -> Vec<usize>
    where
        F: FnMut(&XmlElement) -> bool,
    {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                XmlNode::Element(e) if pred(e) => Some(i),
                _ => None,
            })
            .collect()
    }

    /// Element stored at node position `pos`.
    pub fn element_at(&self, pos: usize) -> Option<&XmlElement> {
        match self.children.get(pos) {
            Some(XmlNode::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Element stored at node position `pos`, mutably.
    pub fn element_at_mut(&mut self, pos: usize) -> Option<&mut XmlElement> {
        match self.children.get_mut(pos) {
            Some(XmlNode::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Remove and return the node at position `pos`.
    pub fn remove_node(&mut self, pos: usize) -> XmlNode {
        self.children.remove(pos)
    }

    /// Insert a child element at node position `pos` (clamped to the end).
    pub fn insert_child(&mut self, pos: usize, child: XmlElement) {
        let pos = pos.min(self.children.len());
        self.children.insert(pos, XmlNode::Element(child));
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    /// Remove every child element matching `pred`; returns how many went.
    pub fn remove_children<F>(&mut self, mut pred: F) -> usize
    where
        F: FnMut(&XmlElement) -> bool,
    {
        let before = self.children.len();
        self.children
            .retain(|n| !matches!(n, XmlNode::Element(e) if pred(e)));
        before - self.children.len()
    }

    /// Replace all content with a single text node (escaped on write).
    ///
    /// Characters XML 1.0 does not allow are written as `_xHHHH_`, the
    /// OOXML escape for them.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            let text = escape_forbidden(text);
            self.children
                .push(XmlNode::Text(BytesText::new(&text).into_owned()));
        }
    }

    /// Concatenated, unescaped character data of the direct children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(&unescape_raw(t)),
                XmlNode::Other(Event::CData(c)) => out.push_str(&String::from_utf8_lossy(c)),
                XmlNode::Other(Event::GeneralRef(r)) => {
                    let entity = format!("&{};", String::from_utf8_lossy(r));
                    out.push_str(&unescape_raw(entity.as_bytes()));
                },
                _ => {},
            }
        }
        out
    }
}

/// Whether `c` may appear in XML 1.0 character data.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn escape_forbidden(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if is_xml_char(c) {
            out.push(c);
        } else {
            out.push_str(&format!("_x{:04X}_", c as u32));
        }
    }
    Cow::Owned(out)
}

fn unescape_raw(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match quick_xml::escape::unescape(&s) {
        Ok(v) => v.into_owned(),
        Err(_) => s.into_owned(),
    }
}
