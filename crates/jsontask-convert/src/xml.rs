//! XML to JSON tree conversion.
//!
//! Elements become objects, attributes become `@`-prefixed string fields,
//! repeated sibling elements collapse into arrays. An element with only text
//! becomes a plain string, an empty element becomes `null`, and an element
//! mixing text with children or attributes keeps its text under `#text`.
//! CDATA sections always land under `#cdata-section`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use tracing::trace;

/// Key for character content of an element that also has children or
/// attributes.
pub const TEXT_KEY: &str = "#text";

/// Key for CDATA section content.
pub const CDATA_SECTION_KEY: &str = "#cdata-section";

struct Frame {
    name: String,
    fields: Map<String, Value>,
    text: Option<String>,
}

impl Frame {
    fn new(name: String, fields: Map<String, Value>) -> Self {
        Self {
            name,
            fields,
            text: None,
        }
    }

    fn collapse(self) -> Value {
        match (self.fields.is_empty(), self.text) {
            (true, None) => Value::Null,
            (true, Some(text)) => Value::String(text),
            (false, text) => {
                let mut fields = self.fields;
                if let Some(text) = text {
                    fields.insert(TEXT_KEY.to_string(), Value::String(text));
                }
                Value::Object(fields)
            }
        }
    }
}

/// Insert `value` under `key`, collapsing repeated keys into an array.
fn attach(fields: &mut Map<String, Value>, key: String, value: Value) {
    match fields.get_mut(&key) {
        None => {
            fields.insert(key, value);
        }
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

fn element_fields(element: &BytesStart<'_>) -> crate::Result<Map<String, Value>> {
    let mut fields = Map::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| crate::Error::Xml(e.to_string()))?;
        let key = format!("@{}", String::from_utf8_lossy(attribute.key.as_ref()));
        let value = attribute
            .unescape_value()
            .map_err(|e| crate::Error::Xml(e.to_string()))?;
        fields.insert(key, Value::String(value.into_owned()));
    }
    Ok(fields)
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).into_owned()
}

/// Parse an XML document into a JSON tree rooted at the document element.
///
/// # Errors
///
/// Returns [`crate::Error::Xml`] when the document is not well-formed.
pub fn xml_to_tree(text: &str) -> crate::Result<Value> {
    let mut reader = Reader::from_str(text);
    let mut stack = vec![Frame::new(String::new(), Map::new())];

    loop {
        match reader
            .read_event()
            .map_err(|e| crate::Error::Xml(e.to_string()))?
        {
            Event::Start(element) => {
                stack.push(Frame::new(element_name(&element), element_fields(&element)?));
            }
            Event::Empty(element) => {
                let frame = Frame::new(element_name(&element), element_fields(&element)?);
                if let Some(parent) = stack.last_mut() {
                    let name = frame.name.clone();
                    attach(&mut parent.fields, name, frame.collapse());
                }
            }
            Event::End(_) => {
                // The reader guarantees balanced tags, so both frames exist.
                if stack.len() >= 2 {
                    let frame = stack.pop().ok_or_else(unbalanced)?;
                    let parent = stack.last_mut().ok_or_else(unbalanced)?;
                    let name = frame.name.clone();
                    attach(&mut parent.fields, name, frame.collapse());
                } else {
                    return Err(unbalanced());
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| crate::Error::Xml(e.to_string()))?;
                if !text.trim().is_empty() {
                    if let Some(frame) = stack.last_mut() {
                        frame.text.get_or_insert_with(String::new).push_str(&text);
                    }
                }
            }
            Event::CData(section) => {
                let content = String::from_utf8_lossy(&section.into_inner()).into_owned();
                if let Some(frame) = stack.last_mut() {
                    attach(
                        &mut frame.fields,
                        CDATA_SECTION_KEY.to_string(),
                        Value::String(content),
                    );
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no tree content.
            _ => {}
        }
    }

    let root = stack.pop().ok_or_else(unbalanced)?;
    if !stack.is_empty() || root.fields.is_empty() {
        return Err(crate::Error::Xml("missing document element".to_string()));
    }
    trace!("converted XML document");
    Ok(Value::Object(root.fields))
}

/// Parse raw XML bytes into a JSON tree.
///
/// # Errors
///
/// Returns [`crate::Error::Xml`] when the bytes are not UTF-8 or the
/// document is not well-formed.
pub fn xml_bytes_to_tree(bytes: &[u8]) -> crate::Result<Value> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| crate::Error::Xml(format!("document is not UTF-8: {e}")))?;
    xml_to_tree(text)
}

fn unbalanced() -> crate::Error {
    crate::Error::Xml("unbalanced element tags".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simple_elements_become_strings() {
        let tree = xml_to_tree("<person><name>John</name><age>42</age></person>").unwrap();
        assert_eq!(tree, json!({"person": {"name": "John", "age": "42"}}));
    }

    #[test]
    fn attributes_get_an_at_prefix() {
        let tree = xml_to_tree(r#"<person id="1" role="admin"/>"#).unwrap();
        assert_eq!(tree, json!({"person": {"@id": "1", "@role": "admin"}}));
    }

    #[test]
    fn empty_elements_are_null() {
        let tree = xml_to_tree("<person><note/></person>").unwrap();
        assert_eq!(tree, json!({"person": {"note": null}}));

        let tree = xml_to_tree("<person><note></note></person>").unwrap();
        assert_eq!(tree, json!({"person": {"note": null}}));
    }

    #[test]
    fn repeated_siblings_collapse_into_arrays() {
        let tree = xml_to_tree(
            "<list><item>a</item><item>b</item><item>c</item></list>",
        )
        .unwrap();
        assert_eq!(tree, json!({"list": {"item": ["a", "b", "c"]}}));
    }

    #[test]
    fn text_beside_attributes_lands_under_text_key() {
        let tree = xml_to_tree(r#"<note lang="en">hello</note>"#).unwrap();
        assert_eq!(tree, json!({"note": {"@lang": "en", "#text": "hello"}}));
    }

    #[test]
    fn cdata_sections_keep_their_own_key() {
        let tree = xml_to_tree("<doc><body><![CDATA[<p>raw</p>]]></body></doc>").unwrap();
        assert_eq!(
            tree,
            json!({"doc": {"body": {"#cdata-section": "<p>raw</p>"}}})
        );
    }

    #[test]
    fn entities_are_unescaped() {
        let tree = xml_to_tree("<v>a &amp; b &lt;c&gt;</v>").unwrap();
        assert_eq!(tree, json!({"v": "a & b <c>"}));
    }

    #[test]
    fn declaration_and_comments_are_skipped() {
        let tree = xml_to_tree(
            "<?xml version=\"1.0\"?><!-- note --><root><a>1</a></root>",
        )
        .unwrap();
        assert_eq!(tree, json!({"root": {"a": "1"}}));
    }

    #[test]
    fn whitespace_between_elements_is_not_text() {
        let tree = xml_to_tree("<root>\n  <a>1</a>\n  <b>2</b>\n</root>").unwrap();
        assert_eq!(tree, json!({"root": {"a": "1", "b": "2"}}));
    }

    #[test]
    fn nested_structures_convert_recursively() {
        let tree = xml_to_tree(
            r#"<order id="7"><lines><line qty="2">pen</line><line qty="1">pad</line></lines></order>"#,
        )
        .unwrap();
        assert_eq!(
            tree,
            json!({
                "order": {
                    "@id": "7",
                    "lines": {
                        "line": [
                            {"@qty": "2", "#text": "pen"},
                            {"@qty": "1", "#text": "pad"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn bytes_entry_point_requires_utf8() {
        let tree = xml_bytes_to_tree(b"<a>1</a>").unwrap();
        assert_eq!(tree, json!({"a": "1"}));
        assert!(matches!(
            xml_bytes_to_tree(&[0xff, 0xfe]),
            Err(crate::Error::Xml(_))
        ));
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(matches!(
            xml_to_tree("<a><b></a>"),
            Err(crate::Error::Xml(_))
        ));
        assert!(matches!(xml_to_tree(""), Err(crate::Error::Xml(_))));
    }
}
