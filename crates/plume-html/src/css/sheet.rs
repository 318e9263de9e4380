//! Stylesheet tokenizer.

use std::fmt::Write;

use super::declarations::Declarations;
use super::selector::Selector;
use super::{matching_close, split_top_level};
use crate::error::CssError;

/// Top-level stylesheet item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Item {
    /// `prelude { body }`
    Rule { prelude: String, body: String },
    /// `@prelude;` or `@prelude { body }`
    AtRule {
        prelude: String,
        body: Option<String>,
    },
}

/// Split a stylesheet into top-level items. Comments are dropped.
pub(crate) fn parse_items(css: &str) -> Result<Vec<Item>, CssError> {
    let css = strip_comments(css);
    let mut items = Vec::new();
    let mut rest = css.as_str();

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '}');
        if rest.is_empty() {
            break;
        }

        let at_rule = rest.starts_with('@');
        let brace = rest.find('{');
        let semi = rest.find(';');

        if at_rule && let Some(end) = semi.filter(|s| brace.is_none_or(|b| *s < b)) {
            items.push(Item::AtRule {
                prelude: rest[..end].trim().to_owned(),
                body: None,
            });
            rest = &rest[end + 1..];
            continue;
        }

        let Some(open) = brace else {
            // Trailing text without a block carries nothing.
            break;
        };
        let close = matching_close(rest, open, '{', '}').ok_or_else(|| {
            CssError::UnterminatedBlock(rest[..open].trim().to_owned())
        })?;
        let prelude = rest[..open].trim().to_owned();
        let body = rest[open + 1..close].trim().to_owned();
        items.push(if at_rule {
            Item::AtRule {
                prelude,
                body: Some(body),
            }
        } else {
            Item::Rule { prelude, body }
        });
        rest = &rest[close + 1..];
    }

    Ok(items)
}

/// Write items back in a canonical form.
pub(crate) fn write_items(items: &[Item]) -> String {
    let mut out = String::new();
    for item in items {
        match item {
            Item::Rule { prelude, body } => {
                writeln!(out, "{prelude} {{ {body} }}").unwrap();
            }
            Item::AtRule {
                prelude,
                body: None,
            } => {
                writeln!(out, "{prelude};").unwrap();
            }
            Item::AtRule {
                prelude,
                body: Some(body),
            } => {
                writeln!(out, "{prelude} {{\n{}}}", body.trim_start()).unwrap();
            }
        }
    }
    out
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// A style rule with a single supported selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleRule {
    /// Selector.
    pub selector: Selector,
    /// Declarations of the rule.
    pub declarations: Declarations,
    /// Position in the stylesheet; later rules win ties.
    pub order: usize,
}

/// Parse the rules of a stylesheet that can be applied inline.
///
/// At-rules are skipped. Selector lists are split so each selector becomes
/// its own rule; selectors outside the supported subset are dropped.
pub fn parse_rules(css: &str) -> Result<Vec<StyleRule>, CssError> {
    let mut rules = Vec::new();
    for item in parse_items(css)? {
        let Item::Rule { prelude, body } = item else {
            continue;
        };
        let declarations = Declarations::parse(&body);
        if declarations.is_empty() {
            continue;
        }
        for selector in split_top_level(&prelude, ',') {
            match Selector::parse(selector) {
                Some(selector) => rules.push(StyleRule {
                    selector,
                    declarations: declarations.clone(),
                    order: rules.len(),
                }),
                None => tracing::debug!(selector = selector.trim(), "Skipping unsupported selector"),
            }
        }
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_items() {
        let items = parse_items(
            "/* c */ @import url(x.css);\n:root { --a: 1; }\n@media (max-width: 1px) { p { b: 2 } }\np, .x { color: red }",
        )
        .unwrap();
        assert_eq!(
            items,
            vec![
                Item::AtRule {
                    prelude: "@import url(x.css)".to_owned(),
                    body: None
                },
                Item::Rule {
                    prelude: ":root".to_owned(),
                    body: "--a: 1;".to_owned()
                },
                Item::AtRule {
                    prelude: "@media (max-width: 1px)".to_owned(),
                    body: Some("p { b: 2 }".to_owned())
                },
                Item::Rule {
                    prelude: "p, .x".to_owned(),
                    body: "color: red".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_items("p { color: red").unwrap_err();
        assert_eq!(err, CssError::UnterminatedBlock("p".to_owned()));
    }

    #[test]
    fn test_parse_rules_skips_unsupported() {
        let rules = parse_rules(
            "@media print { p { color: black } }\np, a:hover, ul > li { color: red }\n.note { margin: 0 }",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, Selector::parse("p").unwrap());
        assert_eq!(rules[1].declarations.get("margin"), Some("0"));
        assert_eq!(rules[1].order, 1);
    }

    #[test]
    fn test_write_items() {
        let items = parse_items("p{color:red}\n@charset \"utf-8\";").unwrap();
        assert_eq!(write_items(&items), "p { color:red }\n@charset \"utf-8\";\n");
    }
}
