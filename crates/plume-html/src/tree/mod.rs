//! Offline HTML tree.
//!
//! A small element/text/comment tree that HTML plugins parse, edit and write
//! back. It is not a browser DOM: parsing is tolerant of stray end tags and
//! HTML void elements, and text is stored decoded.

mod entities;
mod parser;
mod serializer;

pub use entities::convert_named_entities;
pub use parser::parse_fragment;
pub use serializer::{escape, serialize_nodes};

use crate::error::TreeError;

/// Elements that never have children or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is written without escaping.
pub(crate) const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Whether `tag` is an HTML void element.
#[must_use]
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// A node of the offline tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Decoded character data.
    Text(String),
    /// Comment body (without `<!--` and `-->`).
    Comment(String),
}

impl Node {
    /// Text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The element, if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The element, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Whether this is a text node holding only whitespace.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element. Attribute order is kept as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
    /// Written as `<tag/>` in the source (SVG shapes and similar).
    pub self_closing: bool,
}

impl Element {
    /// Empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Add an attribute (builder style).
    #[must_use]
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a child (builder style).
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append a text child (builder style).
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Whether the element has the given tag (ASCII case-insensitive).
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    /// Heading level for `h1`..`h6`.
    #[must_use]
    pub fn heading_level(&self) -> Option<u8> {
        let bytes = self.tag.as_bytes();
        match bytes {
            [b'h' | b'H', level @ b'1'..=b'6'] => Some(level - b'0'),
            _ => None,
        }
    }

    /// Attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_owned(), value)),
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).1)
    }

    /// Whitespace-separated classes.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Whether `class` lists the given class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Concatenated text of all descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements, mutably.
    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(Node::as_element_mut)
    }

    /// Position in `children` of the first child element matching `pred`.
    pub fn position_child(&self, pred: impl Fn(&Element) -> bool) -> Option<usize> {
        self.children
            .iter()
            .position(|n| n.as_element().is_some_and(&pred))
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}

/// What a selector may inspect about an ancestor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ancestor {
    /// Tag name.
    pub tag: String,
    /// `id` attribute.
    pub id: Option<String>,
    /// Classes.
    pub classes: Vec<String>,
}

impl Ancestor {
    fn of(el: &Element) -> Self {
        Self {
            tag: el.tag.clone(),
            id: el.attr("id").map(str::to_owned),
            classes: el.classes().map(str::to_owned).collect(),
        }
    }
}

/// A parsed HTML fragment: a list of top-level nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Top-level nodes.
    pub children: Vec<Node>,
}

impl Fragment {
    /// Parse an HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the markup cannot be tokenized at all.
    pub fn parse(html: &str) -> Result<Self, TreeError> {
        Ok(Self {
            children: parse_fragment(html)?,
        })
    }

    /// Write the fragment back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        serialize_nodes(&self.children)
    }

    /// Visit every element in document order (parents before children).
    ///
    /// The callback receives the element and the chain of its ancestors,
    /// outermost first. Ancestors are captured after they were visited.
    pub fn for_each_element_mut(&mut self, f: &mut impl FnMut(&mut Element, &[Ancestor])) {
        let mut ancestors = Vec::new();
        walk_mut(&mut self.children, &mut ancestors, f);
    }

    /// The single top-level element, ignoring whitespace around it.
    pub fn single_root_mut(&mut self) -> Option<&mut Element> {
        let mut elements = self.children.iter().filter(|n| !n.is_blank_text());
        let first = elements.next()?;
        if first.as_element().is_none() || elements.next().is_some() {
            return None;
        }
        self.children.iter_mut().find_map(Node::as_element_mut)
    }
}

fn walk_mut(
    nodes: &mut [Node],
    ancestors: &mut Vec<Ancestor>,
    f: &mut impl FnMut(&mut Element, &[Ancestor]),
) {
    for node in nodes {
        if let Node::Element(el) = node {
            f(el, ancestors);
            ancestors.push(Ancestor::of(el));
            walk_mut(&mut el.children, ancestors, f);
            ancestors.pop();
        }
    }
}
