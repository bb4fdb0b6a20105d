//! Compact HTML serializer for tree nodes.

use crate::node::{Node, NodeKind};

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Serialize a node and its subtree.
///
/// Attributes are emitted in insertion order, followed by `class` and
/// `style`. Childless elements are written self-closing (`<br />`).
pub fn to_html(node: &Node) -> String {
    match node.kind() {
        NodeKind::Text => escape_text(&node.data()),
        NodeKind::Document => node.child_nodes().iter().map(to_html).collect(),
        NodeKind::Element { tag } => {
            let mut attrs = node.attributes();
            for name in ["class", "style"] {
                if let Some(value) = node.get_attribute(name) {
                    attrs.push((name.to_owned(), value));
                }
            }
            let mut head = format!("<{tag}");
            for (k, v) in &attrs {
                head.push(' ');
                head.push_str(k);
                head.push_str("=\"");
                head.push_str(&escape_attr(v));
                head.push('"');
            }
            let children = node.child_nodes();
            if children.is_empty() {
                return format!("{head} />");
            }
            let inner: String = children.iter().map(to_html).collect();
            format!("{head}>{inner}</{tag}>")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str) -> Node {
        Node::new(NodeKind::Element { tag: tag.into() }, "")
    }

    #[test]
    fn test_empty_element() {
        assert_eq!(to_html(&el("br")), "<br />");
    }

    #[test]
    fn test_attributes_and_classes() {
        let a = el("a");
        a.set_attribute("href", "/x?a=1&b=\"2\"");
        a.class_list().add("link").unwrap();
        a.style().set_property("color", "red");
        a.append_child(&Node::new(NodeKind::Text, "1 < 2")).unwrap();
        assert_eq!(
            to_html(&a),
            concat!(
                "<a href=\"/x?a=1&amp;b=&quot;2&quot;\" class=\"link\"",
                " style=\"color: red;\">1 &lt; 2</a>"
            )
        );
    }

    #[test]
    fn test_nested() {
        let ul = el("ul");
        for label in ["a", "b"] {
            let li = el("li");
            li.set_text_content(label);
            ul.append_child(&li).unwrap();
        }
        assert_eq!(to_html(&ul), "<ul><li>a</li><li>b</li></ul>");
    }
}
