//! Minimal XML element tree on top of `quick-xml`.
//!
//! Documents are small (one plan, one area), so the whole tree is kept in
//! memory, edited in place and written back out tab-indented with one element
//! per line. Element names are compared as written in the document
//! (`prefix:local`); callers resolve prefixes through [`Element::namespace_prefix`].

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

use crate::error::{Result, XPlanError};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Prefix bound to `uri` by an `xmlns:*` declaration on this element.
    /// `Some(None)` means the default namespace.
    pub fn namespace_prefix(&self, uri: &str) -> Option<Option<&str>> {
        self.namespace_prefix_matching(|value| value == uri)
    }

    pub fn namespace_prefix_matching(
        &self,
        matches: impl Fn(&str) -> bool,
    ) -> Option<Option<&str>> {
        let prefixed = self.attributes.iter().find_map(|(key, value)| {
            key.strip_prefix("xmlns:")
                .filter(|_| matches(value.as_str()))
                .map(Some)
        });
        prefixed.or_else(|| {
            self.attribute("xmlns")
                .filter(|value| matches(*value))
                .map(|_| None)
        })
    }

    /// Concatenated text and CDATA content of the direct children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children
            .retain(|child| !matches!(child, Node::Text(_) | Node::CData(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.insert(0, Node::Text(text));
        }
    }

    pub fn set_cdata(&mut self, text: impl Into<String>) {
        self.children
            .retain(|child| !matches!(child, Node::Text(_) | Node::CData(_)));
        let text = text.into();
        if !text.is_empty() {
            self.children.insert(0, Node::CData(text));
        }
    }

    /// Drops whitespace-only text between child elements. Text of leaf
    /// elements is kept as written.
    fn drop_indentation(&mut self) {
        if self.child_elements().next().is_none() {
            return;
        }
        self.children.retain(|child| match child {
            Node::Text(text) => !text.chars().all(|c| matches!(c, ' ' | '\t' | '\r' | '\n')),
            _ => true,
        });
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|element| element.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.child_elements_mut().find(|element| element.name == name)
    }

    /// First descendant (depth first, document order) named `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        for child in self.child_elements_mut() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find_mut(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant named `name`, in document order.
    pub fn find_all(&self, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.name == name {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }

    /// Calls `f` on this element and every descendant element.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.child_elements_mut() {
            child.visit_mut(f);
        }
    }

    pub fn remove_child(&mut self, name: &str) -> Option<Element> {
        let index = self
            .children
            .iter()
            .position(|child| matches!(child, Node::Element(e) if e.name == name))?;
        match self.children.remove(index) {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Removes the first descendant named `name`.
    pub fn remove_descendant(&mut self, name: &str) -> Option<Element> {
        for index in 0..self.children.len() {
            let hit = matches!(&self.children[index], Node::Element(e) if e.name == name);
            if hit {
                if let Node::Element(element) = self.children.remove(index) {
                    return Some(element);
                }
                return None;
            }
            if let Node::Element(child) = &mut self.children[index] {
                if let Some(removed) = child.remove_descendant(name) {
                    return Some(removed);
                }
            }
        }
        None
    }

    /// Replaces the first descendant named `name` and returns the old element.
    pub fn replace_descendant(&mut self, name: &str, replacement: Element) -> Option<Element> {
        let mut replacement = Some(replacement);
        self.replace_first(name, &mut replacement)
    }

    fn replace_first(&mut self, name: &str, replacement: &mut Option<Element>) -> Option<Element> {
        for child in self.children.iter_mut() {
            if let Node::Element(element) = child {
                if element.name == name {
                    let new = replacement.take()?;
                    return Some(std::mem::replace(element, new));
                }
                if let Some(old) = element.replace_first(name, replacement) {
                    return Some(old);
                }
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| XPlanError::Xml("unexpected closing tag".to_string()))?;
                    element.drop_indentation();
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = text.unescape()?;
                        match parent.children.last_mut() {
                            Some(Node::Text(previous)) => previous.push_str(&text),
                            _ => parent.children.push(Node::Text(text.into_owned())),
                        }
                    }
                }
                Event::CData(cdata) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = std::str::from_utf8(&cdata)
                            .map_err(|e| XPlanError::Xml(format!("CDATA is not UTF-8: {e}")))?;
                        // a value holding `]]>` is stored as consecutive sections
                        match parent.children.last_mut() {
                            Some(Node::CData(previous)) => previous.push_str(text),
                            _ => parent.children.push(Node::CData(text.to_string())),
                        }
                    }
                }
                Event::Comment(comment) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&comment).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XPlanError::Xml(format!(
                "unexpected end of document, <{}> is not closed",
                stack[stack.len() - 1].name
            )));
        }

        root.map(Self::new)
            .ok_or_else(|| XPlanError::Xml("document has no root element".to_string()))
    }

    pub fn parse_bytes(bytes: &[u8]) -> Result<Self> {
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| XPlanError::Xml(format!("document is not UTF-8: {e}")))?;
        Self::parse(xml.strip_prefix('\u{feff}').unwrap_or(xml))
    }

    /// Writes the UTF-8 declaration and the tab-indented tree.
    pub fn write_to<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(out, b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&mut writer, &self.root)?;
        writer.into_inner().write_all(b"\n")?;
        Ok(())
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| XPlanError::Xml(e.to_string()))
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| XPlanError::Xml(format!("element name is not UTF-8: {e}")))?
        .to_string();
    let mut element = Element::new(name);
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| XPlanError::Xml(format!("attribute name is not UTF-8: {e}")))?
            .to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(XPlanError::Xml(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<()> {
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
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
            Node::CData(text) => {
                for section in BytesCData::escaped(text) {
                    writer.write_event(Event::CData(section))?;
                }
            }
            Node::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
