use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::SpawnError;

/// Line ending applied to serialized documents. The game's tooling expects CRLF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    Lf,
    #[default]
    Crlf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Comments and declarations ahead of the root element.
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter_map(move |node| match node {
            Node::Element(element) if element.name == name => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn set_text(&mut self, value: &str) {
        self.children = vec![Node::Text(value.to_string())];
    }

    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(Element::text)
    }

    pub fn set_child_text(&mut self, name: &str, value: &str) -> bool {
        match self.child_mut(name) {
            Some(child) => {
                child.set_text(value);
                true
            }
            None => false,
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, SpawnError> {
        let mut reader = Reader::from_str(source);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| SpawnError::Malformed {
                        message: "closing tag without an open element".to_string(),
                    })?;
                    drop_indentation(&mut element);
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    // Text outside the root is only layout whitespace.
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Text(text.unescape()?.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::CData(String::from_utf8_lossy(&data).into_owned()));
                    }
                }
                Event::Comment(comment) => {
                    let node = Node::Comment(String::from_utf8_lossy(&comment).into_owned());
                    push_node(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Event::PI(instruction) => {
                    let node = Node::ProcessingInstruction(String::from_utf8_lossy(&instruction).into_owned());
                    push_node(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Event::DocType(doctype) => {
                    prolog.push(Node::DocType(String::from_utf8_lossy(&doctype).trim().to_string()));
                }
                Event::Eof => break,
                // The declaration is always written fresh.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(SpawnError::Malformed {
                message: format!("element <{}> is never closed", open.name),
            });
        }

        root.map(|root| Self { prolog, root, epilog }).ok_or_else(|| SpawnError::Malformed {
            message: "document has no root element".to_string(),
        })
    }

    pub fn to_xml_string(&self, line_ending: LineEnding) -> Result<String, SpawnError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        let mut output = String::from_utf8(writer.into_inner()).map_err(|e| SpawnError::Malformed {
            message: e.to_string(),
        })?;
        output.push('\n');

        Ok(match line_ending {
            LineEnding::Lf => output.replace("\r\n", "\n"),
            LineEnding::Crlf => output.replace("\r\n", "\n").replace('\n', "\r\n"),
        })
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element, SpawnError> {
    let mut element = Element::new(&String::from_utf8_lossy(start.name().as_ref()));
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Whitespace-only text between child elements is indentation; the writer
/// re-indents, so it is dropped. Text of leaf elements is kept verbatim.
fn drop_indentation(element: &mut Element) {
    let has_elements = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(_)));
    if has_elements {
        element
            .children
            .retain(|node| !matches!(node, Node::Text(text) if text.trim().is_empty()));
    }
}

fn push_node(
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
    node: Node,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), SpawnError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SpawnError::Malformed {
                message: format!("second root element <{}>", element.name),
            })
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), SpawnError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;

    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), SpawnError> {
    match node {
        Node::Element(element) => write_element(writer, element)?,
        Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
        Node::CData(data) => writer.write_event(Event::CData(BytesCData::new(data.as_str())))?,
        Node::Comment(comment) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?
        }
        Node::ProcessingInstruction(instruction) => {
            writer.write_event(Event::PI(BytesText::from_escaped(instruction.as_str())))?
        }
        Node::DocType(doctype) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?
        }
    }
    Ok(())
}
