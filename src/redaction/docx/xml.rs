//! Minimal owned XML tree over `quick-xml` events.
//!
//! Parts are parsed into [`Element`]s that keep each start tag verbatim, so a
//! part written back without edits carries the same attributes, namespace
//! declarations, comments and processing instructions it was read with.

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt;

/// XML parse or write failure.
#[derive(Debug)]
pub struct XmlError(String);

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for XmlError {}

impl From<quick_xml::Error> for XmlError {
    fn from(err: quick_xml::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<std::io::Error> for XmlError {
    fn from(err: std::io::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for XmlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Declarations, comments, CDATA, processing instructions
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub struct Element {
    start: BytesStart<'static>,
    pub children: Vec<Node>,
}

impl Element {
    /// A new element without attributes.
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    /// True when the qualified name (prefix included) equals `name`.
    pub fn is(&self, name: &str) -> bool {
        self.start.name().as_ref() == name.as_bytes()
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(self.start.name().as_ref()).into_owned()
    }

    /// Unescaped value of attribute `key` (qualified name).
    pub fn attr(&self, key: &str) -> Option<String> {
        let attr = self.start.try_get_attribute(key).ok()??;
        attr.unescape_value().ok().map(|v| v.into_owned())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.is(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.is(name))
    }

    /// Concatenated direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every descendant element named `name`, depth first, in document order.
    pub fn descendants<'a>(&'a self, name: &'a str, out: &mut Vec<&'a Element>) {
        for child in self.elements() {
            if child.is(name) {
                out.push(child);
            }
            child.descendants(name, out);
        }
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<(), XmlError> {
        if self.children.is_empty() {
            writer.write_event(Event::Empty(self.start.borrow()))?;
            return Ok(());
        }
        writer.write_event(Event::Start(self.start.borrow()))?;
        for child in &self.children {
            write_node(writer, child)?;
        }
        writer.write_event(Event::End(self.start.to_end()))?;
        Ok(())
    }
}

/// A parsed XML part: prolog nodes, the root element, trailing nodes.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    prolog: Vec<Node>,
    pub root: Element,
    epilog: Vec<Node>,
}

impl XmlDocument {
    pub fn parse(bytes: &[u8]) -> Result<Self, XmlError> {
        let source = std::str::from_utf8(bytes).map_err(|e| XmlError(e.to_string()))?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut reader = Reader::from_str(source);

        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let node = match reader.read_event()? {
                Event::Eof => break,
                Event::Start(start) => {
                    stack.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                    });
                    continue;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlError("unbalanced end tag".to_string()))?;
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                }),
                Event::Text(text) => Node::Text(text.unescape()?.into_owned()),
                other => Node::Other(other.into_owned()),
            };

            match (stack.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, Node::Element(element)) if root.is_none() => root = Some(element),
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        if !stack.is_empty() {
            return Err(XmlError("unclosed element".to_string()));
        }
        let root = root.ok_or_else(|| XmlError("document has no root element".to_string()))?;
        Ok(Self {
            prolog,
            root,
            epilog,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, XmlError> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }
        Ok(writer.into_inner())
    }
}

fn write_node<W: std::io::Write>(writer: &mut Writer<W>, node: &Node) -> Result<(), XmlError> {
    match node {
        Node::Element(e) => e.write(writer),
        Node::Text(t) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(t))))?;
            Ok(())
        }
        Node::Other(event) => {
            writer.write_event(event.borrow())?;
            Ok(())
        }
    }
}
