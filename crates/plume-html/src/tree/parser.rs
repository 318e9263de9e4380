//! Tolerant HTML fragment parser on top of the quick-xml tokenizer.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::entities::{convert_named_entities, decode_reference};
use super::{Element, Node, is_void};
use crate::error::TreeError;

/// Parse an HTML fragment into top-level nodes.
///
/// End tags without a matching open element are ignored, void elements never
/// take children, and elements still open at the end are closed.
pub fn parse_fragment(html: &str) -> Result<Vec<Node>, TreeError> {
    let html = convert_named_entities(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut root = Vec::new();
    let mut open: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let el = element_from(&reader, &e, false)?;
                if is_void(&el.tag) {
                    push_node(&mut open, &mut root, Node::Element(el));
                } else {
                    open.push(el);
                }
            }
            Event::Empty(e) => {
                let el = element_from(&reader, &e, true)?;
                push_node(&mut open, &mut root, Node::Element(el));
            }
            Event::End(e) => {
                let name = decode_name(&reader, e.name().as_ref());
                if let Some(pos) = open.iter().rposition(|el| el.tag.eq_ignore_ascii_case(&name)) {
                    while open.len() > pos {
                        close_top(&mut open, &mut root);
                    }
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                push_text(&mut open, &mut root, &text);
            }
            Event::GeneralRef(e) => {
                let name = reader.decoder().decode(&e)?;
                push_text(&mut open, &mut root, &decode_reference(&name));
            }
            Event::CData(e) => {
                push_text(&mut open, &mut root, &String::from_utf8_lossy(&e));
            }
            Event::Comment(e) => {
                let body = String::from_utf8_lossy(&e).into_owned();
                push_node(&mut open, &mut root, Node::Comment(body));
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    while !open.is_empty() {
        close_top(&mut open, &mut root);
    }
    Ok(root)
}

fn element_from(
    reader: &Reader<&[u8]>,
    e: &BytesStart,
    empty: bool,
) -> Result<Element, TreeError> {
    let tag = decode_name(reader, e.name().as_ref());
    let mut attrs = Vec::new();
    for attr in e.html_attributes() {
        let attr = attr?;
        let key = decode_name(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            std::borrow::Cow::into_owned,
        );
        attrs.push((key, value));
    }
    let self_closing = empty && !is_void(&tag);
    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
        self_closing,
    })
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn close_top(open: &mut Vec<Element>, root: &mut Vec<Node>) {
    if let Some(el) = open.pop() {
        push_node(open, root, Node::Element(el));
    }
}

fn push_node(open: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

/// Append text, merging with a preceding text node.
fn push_text(open: &mut [Element], root: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let Some(Node::Text(last)) = siblings.last_mut() {
        last.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_owned()));
    }
}
