//! Namespace-agnostic XML element tree for the RDF-flavoured dialects.
//!
//! SBOL and JBEI documents mix prefixes freely (`sbol:`, `dcterms:`, `seq:`),
//! so elements and attributes are keyed by their local name only.

use crate::error::{FormatError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();
        let mut attributes = vec![];
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FormatError::Xml(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| FormatError::Xml(e.to_string()))?
                .to_string();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Trimmed text of the first child called `name`, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
    }

    /// Follows a path of child names, eg `["location", "Range"]`.
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// Depth-first search of this element and all its descendants.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for child in &self.children {
            child.find_all(pred, out);
        }
    }
}

pub fn parse_xml(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut stack: Vec<Element> = vec![];
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| FormatError::Xml(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(FormatError::Xml(format!(
            "unclosed element <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| FormatError::Xml("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_prefixes() {
        let xml = r#"<?xml version="1.0"?>
            <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:sbol="http://sbols.org/v2#">
              <sbol:Sequence rdf:about="http://example.com/seq/1">
                <sbol:elements>atgc</sbol:elements>
              </sbol:Sequence>
              <sbol:Empty rdf:resource="x"/>
            </rdf:RDF>"#;
        let root = parse_xml(xml).unwrap();
        assert_eq!(root.name, "RDF");
        let seq = root.child("Sequence").unwrap();
        assert_eq!(seq.attr("about"), Some("http://example.com/seq/1"));
        assert_eq!(seq.child_text("elements"), Some("atgc"));
        assert_eq!(root.child("Empty").unwrap().attr("resource"), Some("x"));
    }

    #[test]
    fn test_path_and_find_all() {
        let root = parse_xml("<a><b><c>1</c></b><b><c>2</c></b></a>").unwrap();
        assert_eq!(root.path(&["b", "c"]).unwrap().text, "1");
        let mut found = vec![];
        root.find_all(&|e| e.name == "c", &mut found);
        assert_eq!(found.len(), 2);
        assert_eq!(root.children_named("b").count(), 2);
    }

    #[test]
    fn test_entities_and_cdata() {
        let root = parse_xml("<a>x &amp; y<![CDATA[<z>]]></a>").unwrap();
        assert_eq!(root.text, "x & y<z>");
    }

    #[test]
    fn test_malformed() {
        assert!(parse_xml("<a><b></a>").is_err());
        assert!(parse_xml("<a>").is_err());
        assert!(parse_xml("").is_err());
    }
}
