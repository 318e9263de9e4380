//! Write the offline tree back to HTML.

use std::fmt::Write;

use super::{Element, Node, RAW_TEXT_ELEMENTS, is_void};

/// Serialize nodes to HTML.
///
/// Void elements are written without an end tag, elements parsed as `<x/>`
/// keep that form, and `style`/`script` text is written verbatim.
pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::with_capacity(4096);
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(el) => write_element(el, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.tag);
    for (key, value) in &el.attrs {
        if value.is_empty() {
            write!(out, " {key}").unwrap();
        } else {
            write!(out, r#" {key}="{}""#, escape(value)).unwrap();
        }
    }

    if is_void(&el.tag) {
        out.push('>');
        return;
    }
    if el.self_closing && el.children.is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    let raw_text = RAW_TEXT_ELEMENTS.iter().any(|t| el.is(t));
    for child in &el.children {
        write_node(child, raw_text, out);
    }
    write!(out, "</{}>", el.tag).unwrap();
}

/// Escape text or a double-quoted attribute value.
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
