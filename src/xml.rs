//! Minimal element tree over `quick-xml` events.
//!
//! efetch responses are streamed and only the elements of interest
//! (`PubmedArticle`) are materialized, one at a time. An element that fails
//! to decode is reported together with whatever was built before the failure,
//! so the caller can still name the record it belonged to.

use crate::error::{OptionExt, PapersError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its attributes and ordered children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Local (prefix-free) element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct child elements named `name`.
    pub fn children<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Element> + 'n
    where
        'a: 'n,
    {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// First direct child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: child_elements(self).rev().collect(),
        }
    }

    /// First descendant named `name` in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }

    /// Concatenated descendant text, trimmed.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out.trim().to_string()
    }

    /// Trimmed text, or `None` when the element has no text.
    pub fn non_empty_text(&self) -> Option<String> {
        Some(self.text()).filter(|t| !t.is_empty())
    }
}

fn child_elements(element: &Element) -> impl DoubleEndedIterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        Node::Element(e) => Some(e),
        Node::Text(_) => None,
    })
}

fn collect_text(element: &Element, out: &mut String) {
    for node in &element.children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

/// Pre-order iterator returned by [`Element::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(child_elements(current).rev());
        Some(current)
    }
}

/// An element that could not be fully decoded.
#[derive(Debug)]
pub struct BrokenElement {
    /// What was built before the error, if the start tag was read
    pub partial: Option<Element>,
    pub error: PapersError,
}

/// Streams every element named `target` out of an XML document.
///
/// Text-level errors (bad entities, bad attributes) cost only the element
/// they occur in. Syntax errors end the stream after being reported, and so
/// does a document that stops before its root element is closed.
pub struct Elements<'a> {
    reader: Reader<&'a [u8]>,
    target: &'a str,
    root: Option<String>,
    depth: usize,
    done: bool,
}

impl<'a> Elements<'a> {
    pub fn new(content: &'a str, target: &'a str) -> Self {
        Self {
            reader: Reader::from_str(content),
            target,
            root: None,
            depth: 0,
            done: false,
        }
    }

    /// Name of the document's first top-level element, once it has been read.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    fn note_top_level(&mut self, start: &BytesStart<'_>) {
        if self.depth == 0 && self.root.is_none() {
            self.root = Some(local_name(start));
        }
    }

    fn build(&mut self, root: Element) -> std::result::Result<Element, BrokenElement> {
        let mut stack = vec![root];
        let mut first_error: Option<PapersError> = None;

        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    self.done = true;
                    return Err(BrokenElement {
                        partial: collapse(stack),
                        error: e.into(),
                    });
                }
            };

            match event {
                Event::Start(e) => match open(&e) {
                    Ok(element) => stack.push(element),
                    Err(err) => {
                        first_error.get_or_insert(err);
                        stack.push(Element {
                            name: local_name(&e),
                            ..Default::default()
                        });
                    }
                },
                Event::Empty(e) => match open(&e) {
                    Ok(element) => push_child(&mut stack, Node::Element(element)),
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                },
                Event::Text(t) => match t.unescape() {
                    Ok(text) => push_child(&mut stack, Node::Text(text.into_owned())),
                    Err(err) => {
                        first_error.get_or_insert(err.into());
                    }
                },
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    push_child(&mut stack, Node::Text(text));
                }
                Event::End(_) => {
                    let finished = match stack.pop().ok_or_parse("closing tag without an open element") {
                        Ok(element) => element,
                        Err(error) => return Err(BrokenElement { partial: None, error }),
                    };
                    if stack.is_empty() {
                        return match first_error {
                            None => Ok(finished),
                            Some(error) => Err(BrokenElement {
                                partial: Some(finished),
                                error,
                            }),
                        };
                    }
                    push_child(&mut stack, Node::Element(finished));
                }
                Event::Eof => {
                    self.done = true;
                    let error = PapersError::Parse(format!(
                        "document ended inside <{}>",
                        self.target
                    ));
                    return Err(BrokenElement {
                        partial: collapse(stack),
                        error,
                    });
                }
                _ => {}
            }
        }
    }
}

impl Iterator for Elements<'_> {
    type Item = std::result::Result<Element, BrokenElement>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.reader.read_event() {
                Ok(Event::Start(e)) if e.local_name().as_ref() == self.target.as_bytes() => {
                    self.note_top_level(&e);
                    let root = match open(&e) {
                        Ok(root) => root,
                        Err(error) => {
                            return Some(Err(BrokenElement {
                                partial: None,
                                error,
                            }))
                        }
                    };
                    return Some(self.build(root));
                }
                Ok(Event::Empty(e)) if e.local_name().as_ref() == self.target.as_bytes() => {
                    self.note_top_level(&e);
                    return Some(open(&e).map_err(|error| BrokenElement {
                        partial: None,
                        error,
                    }));
                }
                Ok(Event::Start(e)) => {
                    self.note_top_level(&e);
                    self.depth += 1;
                }
                Ok(Event::Empty(e)) => self.note_top_level(&e),
                Ok(Event::End(_)) => self.depth = self.depth.saturating_sub(1),
                Ok(Event::Eof) => {
                    self.done = true;
                    if self.depth > 0 {
                        let error = PapersError::Parse(format!(
                            "document ended before <{}> was closed",
                            self.root.as_deref().unwrap_or("root")
                        ));
                        return Some(Err(BrokenElement {
                            partial: None,
                            error,
                        }));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(BrokenElement {
                        partial: None,
                        error: e.into(),
                    }));
                }
                Ok(_) => {}
            }
        }
        None
    }
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

fn open(start: &BytesStart<'_>) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name: local_name(start),
        attributes,
        children: Vec::new(),
    })
}

fn push_child(stack: &mut [Element], node: Node) {
    if let Some(top) = stack.last_mut() {
        top.children.push(node);
    }
}

/// Fold still-open elements into their parents and return the root.
fn collapse(mut stack: Vec<Element>) -> Option<Element> {
    while stack.len() > 1 {
        let child = stack.pop()?;
        push_child(&mut stack, Node::Element(child));
    }
    stack.pop()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<!DOCTYPE Set>
<Set>
  <Item Flag="Y"><Id>1</Id><Title>The <i>BRCA1</i> gene</Title></Item>
  <Other><Item><Id>2</Id></Item></Other>
</Set>"#;

    #[test]
    fn test_streams_nested_targets_in_order() {
        let items: Vec<Element> = Elements::new(DOC, "Item")
            .collect::<std::result::Result<_, _>>()
            .expect("well-formed");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attr("Flag"), Some("Y"));
        assert_eq!(items[0].find("Id").map(Element::text).as_deref(), Some("1"));
        assert_eq!(items[1].child("Id").map(Element::text).as_deref(), Some("2"));
    }

    #[test]
    fn test_text_includes_inline_markup() {
        let item = Elements::new(DOC, "Item")
            .next()
            .expect("one item")
            .expect("well-formed");
        assert_eq!(item.find("Title").map(Element::text).as_deref(), Some("The BRCA1 gene"));
    }

    #[test]
    fn test_descendants_preorder() {
        let doc = "<A><B><C/></B><D/></A>";
        let root = Elements::new(doc, "A")
            .next()
            .expect("root")
            .expect("well-formed");
        let names: Vec<&str> = root.descendants().map(Element::name).collect();
        assert_eq!(names, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_bad_entity_costs_only_its_element() {
        let doc = "<Set><Item><Id>1</Id><T>&bogus;</T></Item><Item><Id>2</Id></Item></Set>";
        let results: Vec<_> = Elements::new(doc, "Item").collect();
        assert_eq!(results.len(), 2);

        let broken = results[0].as_ref().expect_err("bad entity");
        let partial = broken.partial.as_ref().expect("partial tree");
        assert_eq!(partial.find("Id").map(Element::text).as_deref(), Some("1"));

        let ok = results[1].as_ref().expect("second item intact");
        assert_eq!(ok.find("Id").map(Element::text).as_deref(), Some("2"));
    }

    #[test]
    fn test_child_lookup_with_borrowed_name() {
        let item = Elements::new(DOC, "Item")
            .next()
            .expect("one item")
            .expect("well-formed");
        let found = {
            let name = String::from("Title");
            item.child(&name)
        };
        assert_eq!(found.map(Element::text).as_deref(), Some("The BRCA1 gene"));
        assert!(item.child("Missing").is_none());
        assert_eq!(item.children("Id").count(), 1);
    }

    #[test]
    fn test_truncated_document_reports_error() {
        let doc = "<Set><Item><Id>1</Id></Item><Item><Id>2</Id></Item>";
        let mut elements = Elements::new(doc, "Item");
        let results: Vec<_> = elements.by_ref().collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok() && results[1].is_ok());
        let broken = results[2].as_ref().expect_err("unclosed root");
        assert!(broken.partial.is_none());
        assert_eq!(elements.root(), Some("Set"));
    }

    #[test]
    fn test_root_name_is_recorded() {
        let mut html = Elements::new("<html><body>Service unavailable</body></html>", "Item");
        assert_eq!(html.by_ref().count(), 0);
        assert_eq!(html.root(), Some("html"));

        let mut json = Elements::new(r#"{"error":"API rate limit exceeded"}"#, "Item");
        assert_eq!(json.by_ref().count(), 0);
        assert_eq!(json.root(), None);

        let mut own = Elements::new(DOC, "Item");
        assert_eq!(own.by_ref().count(), 2);
        assert_eq!(own.root(), Some("Set"));
    }

    #[test]
    fn test_syntax_error_ends_stream() {
        let doc = "<Set><Item><Id>1</Id></Item><Item><Id>2</Wrong></Item><Item/></Set>";
        let results: Vec<_> = Elements::new(doc, "Item").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }
}
