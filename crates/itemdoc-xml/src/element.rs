//! Minimal element tree built from the `quick-xml` event stream.
//!
//! The document format is attribute-driven and small, so the reader first
//! collects elements into a tree and then interprets it, which keeps the
//! legacy nested-item handling simple.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{DocumentError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    /// Attribute value, or `default` when the attribute is absent.
    pub fn attr_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.attr(key).unwrap_or(default)
    }
}

/// Parse text into its root element.
pub(crate) fn parse_tree(text: &str) -> Result<Element> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(error) => {
                return Err(DocumentError::format(format!(
                    "{error} (at byte {})",
                    reader.buffer_position()
                )));
            }
        };
        match event {
            Event::Start(start) => {
                let element = start_element(&start)?;
                if stack.is_empty() && root.is_some() {
                    return Err(DocumentError::format("more than one root element"));
                }
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root)?;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError::format(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }
    root.ok_or_else(|| DocumentError::format("no root element found"))
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocumentError::format("more than one root element")),
    }
    Ok(())
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|error| {
            DocumentError::format(format!("bad attribute in <{name}>: {error}"))
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|error| {
                DocumentError::format(format!("bad value for {key} in <{name}>: {error}"))
            })?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}
