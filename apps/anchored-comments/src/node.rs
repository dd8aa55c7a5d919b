//! Rendered document tree
//!
//! The tree handed over by the markup converter. Its JSON shape mirrors what
//! a component renderer produces:
//!
//! - a string is a text leaf
//! - an array is a collection of sibling nodes
//! - `{"type": "element", "tag": .., "attributes": {..}, "children": [..]}`
//!   is an element
//! - `{"type": "highlight", ..}` is a styled unit emitted by the annotator
//!
//! Anything else is kept as an opaque value and written back exactly as it
//! was read. Reading a tree never fails on shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::range::OffsetUnit;

/// A node of the rendered tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text run; the only variant that consumes offsets
    Text(String),
    /// Element with tag, attributes and ordered children
    Element(Element),
    /// Ordered sequence of siblings without a wrapper
    Collection(Vec<Node>),
    /// Styled unit wrapping a highlighted text segment
    Highlight(Segment),
    /// Content of unknown kind, passed through untouched
    Opaque(Value),
}

/// An element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

/// A maximal run of text covered by a constant, non-empty set of ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// The covered text
    pub text: String,
    /// Identifiers of the covering ranges, in caller-supplied order
    pub range_ids: Vec<String>,
    /// Whether the active annotation is among the covering ranges
    pub active: bool,
    /// Absolute offset of the first character; stable render key
    pub start: usize,
}

impl Segment {
    /// Identifier used where a single attachment point is needed
    pub fn primary_id(&self) -> Option<&str> {
        self.range_ids.first().map(String::as_str)
    }

    pub fn is_covered_by(&self, id: &str) -> bool {
        self.range_ids.iter().any(|r| r == id)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn element(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(Element::new(tag).with_children(children))
    }

    pub fn collection(children: Vec<Node>) -> Self {
        Node::Collection(children)
    }

    /// Build a node from a JSON value, degrading unknown shapes to opaque
    pub fn from_value(value: Value) -> Node {
        let map = match value {
            Value::String(content) => return Node::Text(content),
            Value::Array(items) => {
                return Node::Collection(items.into_iter().map(Node::from_value).collect())
            }
            Value::Object(map) => map,
            other => return Node::Opaque(other),
        };

        let kind = map.get("type").and_then(Value::as_str).map(str::to_owned);

        match kind.as_deref() {
            Some("element") => return element_from_map(map),
            Some("collection") => return Node::Collection(children_from(map.get("children"))),
            _ => {}
        }

        let value = Value::Object(map);
        let parsed = match kind.as_deref() {
            Some("highlight") => Segment::deserialize(&value).map(Node::Highlight),
            Some("text") => TextObject::deserialize(&value).map(|t| Node::Text(t.content)),
            _ => return Node::Opaque(value),
        };

        parsed.unwrap_or_else(|e| {
            tracing::debug!("Keeping malformed {:?} node as opaque: {}", kind, e);
            Node::Opaque(value)
        })
    }

    /// Parse a tree from JSON text
    pub fn from_json(json: &str) -> crate::Result<Node> {
        Ok(serde_json::from_str(json)?)
    }

    /// Children of container variants; leaves have none
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(element) => &element.children,
            Node::Collection(children) => children,
            _ => &[],
        }
    }

    /// The flattened plain-text stream of this subtree
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Node::Text(content) => out.push_str(content),
            Node::Highlight(segment) => out.push_str(&segment.text),
            Node::Element(_) | Node::Collection(_) => {
                for child in self.children() {
                    child.push_text(out);
                }
            }
            Node::Opaque(_) => {}
        }
    }

    /// Number of offsets this subtree consumes
    pub fn text_len(&self, unit: OffsetUnit) -> usize {
        match self {
            Node::Text(content) => unit.len(content),
            Node::Highlight(segment) => unit.len(&segment.text),
            Node::Element(_) | Node::Collection(_) => {
                self.children().iter().map(|c| c.text_len(unit)).sum()
            }
            Node::Opaque(_) => 0,
        }
    }

    /// Styled units in document order
    pub fn highlights(&self) -> Vec<&Segment> {
        let mut out = Vec::new();
        self.collect_highlights(&mut out);
        out
    }

    fn collect_highlights<'a>(&'a self, out: &mut Vec<&'a Segment>) {
        match self {
            Node::Highlight(segment) => out.push(segment),
            Node::Element(_) | Node::Collection(_) => {
                for child in self.children() {
                    child.collect_highlights(out);
                }
            }
            Node::Text(_) | Node::Opaque(_) => {}
        }
    }
}

#[derive(Deserialize)]
struct TextObject {
    content: String,
}

/// Read an element one field at a time
///
/// Only a missing or non-string `tag` makes the object opaque. Attribute
/// values that are not strings are written as JSON text, `null` attributes
/// are dropped, and a `children` value that is not an array is one child.
fn element_from_map(map: Map<String, Value>) -> Node {
    let Some(tag) = map.get("tag").and_then(Value::as_str).map(str::to_owned) else {
        tracing::debug!("Keeping element without a tag as opaque");
        return Node::Opaque(Value::Object(map));
    };

    let attributes = match map.get("attributes") {
        Some(Value::Object(attributes)) => attributes
            .iter()
            .filter_map(|(name, value)| match value {
                Value::String(value) => Some((name.clone(), value.clone())),
                Value::Null => None,
                other => Some((name.clone(), other.to_string())),
            })
            .collect(),
        Some(Value::Null) | None => BTreeMap::new(),
        Some(other) => {
            tracing::debug!("Ignoring attributes of <{}>: {}", tag, other);
            BTreeMap::new()
        }
    };

    Node::Element(Element {
        children: children_from(map.get("children")),
        tag,
        attributes,
    })
}

fn children_from(children: Option<&Value>) -> Vec<Node> {
    match children {
        Some(Value::Array(items)) => items.iter().cloned().map(Node::from_value).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(child) => vec![Node::from_value(child.clone())],
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Tagged<'a> {
    Element(&'a Element),
    Highlight(&'a Segment),
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Text(content) => serializer.serialize_str(content),
            Node::Collection(children) => children.serialize(serializer),
            Node::Element(element) => Tagged::Element(element).serialize(serializer),
            Node::Highlight(segment) => Tagged::Highlight(segment).serialize(serializer),
            Node::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from_value)
    }
}

impl From<&str> for Node {
    fn from(content: &str) -> Self {
        Node::Text(content.to_string())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_component_shaped_tree() {
        let value = json!([
            {"type": "element", "tag": "p", "attributes": {"class": "lead"}, "children": [
                "Hello ",
                {"type": "element", "tag": "em", "children": ["world"]}
            ]},
            null
        ]);

        let node = Node::from_value(value);
        let Node::Collection(children) = &node else {
            panic!("expected a collection, got {:?}", node);
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[1], Node::Opaque(Value::Null));

        let Node::Element(p) = &children[0] else {
            panic!("expected an element");
        };
        assert_eq!(p.tag, "p");
        assert_eq!(p.attribute("class"), Some("lead"));
        assert_eq!(node.plain_text(), "Hello world");
    }

    #[test]
    fn test_unknown_and_malformed_nodes_are_opaque() {
        let image = json!({"type": "image", "src": "cover.png"});
        assert_eq!(Node::from_value(image.clone()), Node::Opaque(image));

        let broken = json!({"type": "element", "children": ["no tag"]});
        assert_eq!(Node::from_value(broken.clone()), Node::Opaque(broken));

        let numeric_tag = json!({"type": "element", "tag": 3, "children": ["x"]});
        assert_eq!(Node::from_value(numeric_tag.clone()), Node::Opaque(numeric_tag));

        assert_eq!(Node::from_value(json!(42)), Node::Opaque(json!(42)));
    }

    #[test]
    fn test_element_with_non_string_attributes_keeps_its_text() {
        let node = Node::from_value(json!({
            "type": "element",
            "tag": "td",
            "attributes": {"colspan": 2, "hidden": false, "title": "cell", "data-x": null},
            "children": ["ab"]
        }));

        let Node::Element(td) = &node else {
            panic!("expected an element, got {:?}", node);
        };
        assert_eq!(td.attribute("colspan"), Some("2"));
        assert_eq!(td.attribute("hidden"), Some("false"));
        assert_eq!(td.attribute("title"), Some("cell"));
        assert_eq!(td.attribute("data-x"), None);
        assert_eq!(node.plain_text(), "ab");
    }

    #[test]
    fn test_single_child_shapes() {
        let text_child =
            Node::from_value(json!({"type": "element", "tag": "em", "children": "ab"}));
        assert_eq!(text_child, Node::element("em", vec![Node::text("ab")]));

        let element_child = Node::from_value(json!({
            "type": "element",
            "tag": "p",
            "children": {"type": "element", "tag": "b", "children": "cd"}
        }));
        assert_eq!(
            element_child,
            Node::element("p", vec![Node::element("b", vec![Node::text("cd")])])
        );

        let no_children =
            Node::from_value(json!({"type": "element", "tag": "br", "children": null}));
        assert_eq!(no_children, Node::element("br", vec![]));

        let collection = Node::from_value(json!({"type": "collection", "children": "ef"}));
        assert_eq!(collection, Node::collection(vec![Node::text("ef")]));
    }

    #[test]
    fn test_object_forms_of_text_and_collection() {
        let node = Node::from_value(json!({"type": "collection", "children": [
            {"type": "text", "content": "ab"},
            "cd"
        ]}));
        assert_eq!(node, Node::collection(vec![Node::text("ab"), Node::text("cd")]));
    }

    #[test]
    fn test_serialization_keeps_opaque_values() {
        let source = json!([
            "plain",
            {"type": "widget", "payload": [1, 2, 3]},
            {"type": "element", "tag": "br", "children": []}
        ]);

        let node = Node::from_value(source.clone());
        let written = serde_json::to_value(&node).unwrap();
        assert_eq!(written, source);
    }

    #[test]
    fn test_highlight_serialization() {
        let node = Node::Highlight(Segment {
            text: "quick".to_string(),
            range_ids: vec!["a".to_string()],
            active: true,
            start: 4,
        });

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "highlight",
                "text": "quick",
                "rangeIds": ["a"],
                "active": true,
                "start": 4
            })
        );
        assert_eq!(Node::from_value(json), node);
    }

    #[test]
    fn test_text_len_skips_opaque() {
        let node = Node::collection(vec![
            Node::text("ab"),
            Node::Opaque(json!({"type": "hr"})),
            Node::element("span", vec![Node::text("\u{1F600}")]),
        ]);
        assert_eq!(node.text_len(OffsetUnit::Utf16), 4);
        assert_eq!(node.text_len(OffsetUnit::Char), 3);
    }

    #[test]
    fn test_from_json() {
        let node = Node::from_json(r#"{"type":"element","tag":"p","children":["hi"]}"#).unwrap();
        assert_eq!(node, Node::element("p", vec![Node::text("hi")]));
        assert!(Node::from_json("{not json").is_err());
    }
}
