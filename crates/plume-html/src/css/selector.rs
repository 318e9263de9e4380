//! Simple selectors: `tag`, `.class`, `#id`, `*`, and one descendant step
//! between two of those (`blockquote p`).

use crate::tree::{Ancestor, Element};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Simple {
    Universal,
    Tag(String),
    Class(String),
    Id(String),
}

impl Simple {
    fn parse(s: &str) -> Option<Self> {
        if s == "*" {
            return Some(Self::Universal);
        }
        match (s.strip_prefix('.'), s.strip_prefix('#')) {
            (Some(name), _) => is_ident(name).then(|| Self::Class(name.to_owned())),
            (_, Some(name)) => is_ident(name).then(|| Self::Id(name.to_owned())),
            _ => is_ident(s).then(|| Self::Tag(s.to_ascii_lowercase())),
        }
    }

    fn matches(&self, tag: &str, id: Option<&str>, has_class: impl Fn(&str) -> bool) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(t) => t.eq_ignore_ascii_case(tag),
            Self::Class(c) => has_class(c),
            Self::Id(want) => id == Some(want.as_str()),
        }
    }

    fn specificity(&self) -> (usize, usize, usize) {
        match self {
            Self::Universal => (0, 0, 0),
            Self::Tag(_) => (0, 0, 1),
            Self::Class(_) => (0, 1, 0),
            Self::Id(_) => (1, 0, 0),
        }
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// A selector the inliner can evaluate against the offline tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    ancestor: Option<Simple>,
    subject: Simple,
}

impl Selector {
    /// Parse a selector.
    ///
    /// Returns `None` outside the supported subset: pseudo-classes, attribute
    /// selectors, `>`/`+`/`~`, compounds such as `p.note`, and chains longer
    /// than one descendant step.
    #[must_use]
    pub fn parse(selector: &str) -> Option<Self> {
        let parts: Vec<&str> = selector.split_whitespace().collect();
        match parts.as_slice() {
            [subject] => Some(Self {
                ancestor: None,
                subject: Simple::parse(subject)?,
            }),
            [ancestor, subject] => Some(Self {
                ancestor: Some(Simple::parse(ancestor)?),
                subject: Simple::parse(subject)?,
            }),
            _ => None,
        }
    }

    /// Whether the selector matches `el`, given its ancestors.
    #[must_use]
    pub fn matches(&self, el: &Element, ancestors: &[Ancestor]) -> bool {
        if !self
            .subject
            .matches(&el.tag, el.attr("id"), |c| el.has_class(c))
        {
            return false;
        }
        match &self.ancestor {
            None => true,
            Some(simple) => ancestors.iter().any(|a| {
                simple.matches(&a.tag, a.id.as_deref(), |c| a.classes.iter().any(|x| x == c))
            }),
        }
    }

    /// `(ids, classes, tags)`, compared lexicographically.
    #[must_use]
    pub fn specificity(&self) -> (usize, usize, usize) {
        let (a, b, c) = self.subject.specificity();
        let (x, y, z) = self
            .ancestor
            .as_ref()
            .map_or((0, 0, 0), Simple::specificity);
        (a + x, b + y, c + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Fragment;

    fn matches_in(selector: &str, html: &str, target_tag: &str) -> bool {
        let selector = Selector::parse(selector).unwrap();
        let mut fragment = Fragment::parse(html).unwrap();
        let mut hit = false;
        fragment.for_each_element_mut(&mut |el, ancestors| {
            if el.is(target_tag) {
                hit |= selector.matches(el, ancestors);
            }
        });
        hit
    }

    #[test]
    fn test_parse_supported() {
        for s in ["p", "*", ".note", "#intro", "blockquote p", ".x em", "* p", "h1"] {
            assert!(Selector::parse(s).is_some(), "{s}");
        }
    }

    #[test]
    fn test_parse_unsupported() {
        for s in [
            "a:hover", "ul > li", "a b c", "input[type]", "p::before", "h1 + p", "p.note", "", ".",
        ] {
            assert!(Selector::parse(s).is_none(), "{s}");
        }
    }

    #[test]
    fn test_matching() {
        let html = r#"<blockquote class="q"><p id="x" class="a b">t</p></blockquote><p>u</p>"#;
        assert!(matches_in("p", html, "p"));
        assert!(matches_in("blockquote p", html, "p"));
        assert!(matches_in(".q .a", html, "p"));
        assert!(matches_in("#x", html, "p"));
        assert!(matches_in("*", html, "p"));
        assert!(!matches_in("div p", html, "p"));
        assert!(!matches_in(".c", html, "p"));
    }

    #[test]
    fn test_specificity_order() {
        let tag = Selector::parse("p").unwrap().specificity();
        let class = Selector::parse(".a").unwrap().specificity();
        let desc = Selector::parse("blockquote p").unwrap().specificity();
        let id = Selector::parse("#x").unwrap().specificity();
        assert!(tag < desc);
        assert!(desc < class);
        assert!(class < id);
    }
}
