//! Highlight rendering using html_escape for text and attribute values

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::{HighlightConfig, IDS_ATTRIBUTE};
use crate::node::{Element, Node, Segment};

/// Elements written without children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `name` can be written as a tag or attribute name as-is
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=')
        })
}

/// Build the `span` element standing in for a styled unit
///
/// The span carries the primary id under the configured attribute, all
/// covering ids space-separated, and the background for its active state.
pub fn highlight_span(segment: &Segment, config: &HighlightConfig) -> Element {
    let mut span = Element::new("span")
        .with_attribute(
            "style",
            format!("background: {};", config.color_for(segment.active)),
        )
        .with_attribute(IDS_ATTRIBUTE, segment.range_ids.join(" "))
        .with_children(vec![Node::Text(segment.text.clone())]);

    if let Some(primary) = segment.primary_id() {
        span = span.with_attribute(config.id_attribute.clone(), primary);
    }
    if let Some(class) = &config.class_name {
        span = span.with_attribute("class", class.clone());
    }

    span
}

/// Replace every styled unit of `node` with its `span` element
pub fn lower_highlights(node: &Node, config: &HighlightConfig) -> Node {
    match node {
        Node::Highlight(segment) => Node::Element(highlight_span(segment, config)),
        Node::Element(element) => Node::Element(Element {
            tag: element.tag.clone(),
            attributes: element.attributes.clone(),
            children: lower_all(&element.children, config),
        }),
        Node::Collection(children) => Node::Collection(lower_all(children, config)),
        Node::Text(_) | Node::Opaque(_) => node.clone(),
    }
}

fn lower_all(children: &[Node], config: &HighlightConfig) -> Vec<Node> {
    children
        .iter()
        .map(|child| lower_highlights(child, config))
        .collect()
}

/// Serialize a tree to HTML
///
/// Opaque nodes have no markup of their own and are skipped.
pub fn render_html(node: &Node, config: &HighlightConfig) -> String {
    let mut out = String::new();
    write_node(node, config, &mut out);
    out
}

fn write_node(node: &Node, config: &HighlightConfig, out: &mut String) {
    match node {
        Node::Text(content) => out.push_str(&encode_text(content)),
        Node::Highlight(segment) => write_element(&highlight_span(segment, config), config, out),
        Node::Element(element) => write_element(element, config, out),
        Node::Collection(children) => {
            for child in children {
                write_node(child, config, out);
            }
        }
        Node::Opaque(_) => {}
    }
}

fn write_element(element: &Element, config: &HighlightConfig, out: &mut String) {
    if !is_valid_name(&element.tag) {
        // Keep the text, drop the wrapper
        tracing::warn!("Dropping element with invalid tag name {:?}", element.tag);
        for child in &element.children {
            write_node(child, config, out);
        }
        return;
    }

    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        if !is_valid_name(name) {
            tracing::warn!("Skipping invalid attribute name {:?} on <{}>", name, element.tag);
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.tag.as_str()) {
        return;
    }

    for child in &element.children {
        write_node(child, config, out);
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::annotate;
    use crate::range::Range;
    use serde_json::json;

    fn config() -> HighlightConfig {
        HighlightConfig::default().with_colors("yellow", "orange")
    }

    #[test]
    fn test_render_single_highlight() {
        let tree = Node::element("p", vec![Node::text("Hello world")]);
        let annotated = annotate(&tree, &[Range::new("c1", 6, 11)], None);

        let html = render_html(&annotated, &config());
        assert_eq!(
            html,
            "<p>Hello <span data-comment-id=\"c1\" data-comment-ids=\"c1\" \
             style=\"background: yellow;\">world</span></p>"
        );
    }

    #[test]
    fn test_active_highlight_uses_active_color() {
        let tree = Node::text("abc");
        let annotated = annotate(
            &tree,
            &[Range::new("x", 0, 2), Range::new("y", 1, 3)],
            Some("y"),
        );

        let html = render_html(&annotated, &config());
        assert!(html.contains("data-comment-ids=\"x\" style=\"background: yellow;\">a<"));
        assert!(html.contains(
            "data-comment-id=\"x\" data-comment-ids=\"x y\" style=\"background: orange;\">b<"
        ));
        assert!(html.contains(
            "data-comment-id=\"y\" data-comment-ids=\"y\" style=\"background: orange;\">c<"
        ));
    }

    #[test]
    fn test_no_annotations() {
        let tree = Node::element("p", vec![Node::text("Hello world")]);
        let html = render_html(&annotate(&tree, &[], None), &config());
        assert_eq!(html, "<p>Hello world</p>");
    }

    #[test]
    fn test_escaping() {
        let tree = Node::Element(
            Element::new("a")
                .with_attribute("title", "say \"hi\"")
                .with_children(vec![Node::text("1 < 2 & 3")]),
        );

        let html = render_html(&tree, &config());
        assert_eq!(html, "<a title=\"say &quot;hi&quot;\">1 &lt; 2 &amp; 3</a>");
    }

    #[test]
    fn test_invalid_names_are_not_written() {
        let tree = Node::Element(
            Element::new("p")
                .with_attribute("x onmouseover=alert(1) y", "v")
                .with_attribute("title", "ok")
                .with_children(vec![
                    Node::text("t"),
                    Node::element("img src=x onerror=alert(1)", vec![Node::text("u")]),
                ]),
        );

        let html = render_html(&tree, &config());
        assert_eq!(html, "<p title=\"ok\">tu</p>");
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("data-comment-id"));
        assert!(is_valid_name("svg:rect"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a b"));
        assert!(!is_valid_name("a\"b"));
        assert!(!is_valid_name("a'b"));
        assert!(!is_valid_name("a>b"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("a=b"));
    }

    #[test]
    fn test_void_elements_and_opaque_nodes() {
        let tree = Node::element(
            "p",
            vec![
                Node::text("a"),
                Node::element("br", vec![]),
                Node::Opaque(json!({"type": "widget"})),
                Node::text("b"),
            ],
        );

        assert_eq!(render_html(&tree, &config()), "<p>a<br>b</p>");
    }

    #[test]
    fn test_lower_highlights_with_class() {
        let mut config = config();
        config.class_name = Some("mark".to_string());
        config.id_attribute = "data-annotation-id".to_string();

        let annotated = annotate(&Node::text("ab"), &[Range::new("n", 0, 1)], Some("n"));
        let lowered = lower_highlights(&annotated, &config);

        assert!(lowered.highlights().is_empty());
        let Node::Collection(children) = &lowered else {
            panic!("expected collection");
        };
        let Node::Element(span) = &children[0] else {
            panic!("expected span");
        };
        assert_eq!(span.tag, "span");
        assert_eq!(span.attribute("class"), Some("mark"));
        assert_eq!(span.attribute("data-annotation-id"), Some("n"));
        assert_eq!(span.attribute("style"), Some("background: orange;"));
        assert_eq!(span.children, vec![Node::text("a")]);
        assert_eq!(children[1], Node::text("b"));
    }
}
