//! Heading styles, numbering and delimiter line breaks.

use std::mem;

use plume_config::{ConfigSchema, PluginConfig};

use super::{HtmlContext, HtmlPlugin, edit_elements};
use crate::error::HtmlError;
use crate::tree::{Element, Node};

const LEVELS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Styles `h1`-`h6`, optionally numbers one level and breaks long titles.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingStylePlugin;

impl HeadingStylePlugin {
    /// Settings key.
    pub const NAME: &'static str = "heading";
}

impl HtmlPlugin for HeadingStylePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Heading styles, numbering and line breaks at delimiters"
    }

    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new()
            .switch("numbering", "Number headings of one level", false)
            .select("numbering_level", "Level to number", LEVELS, "h2")
            .text(
                "numbering_template",
                "Number text; {number}, {index}, {roman}, {letter}",
                "{number}. ",
            )
            .text(
                "line_break_delimiters",
                "Characters after which a heading breaks onto a new line",
                "",
            )
            .switch("keep_delimiter", "Keep the delimiter before the break", true)
    }

    fn process(
        &self,
        html: &str,
        config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError> {
        let styles: Vec<String> = (1..=6).map(|level| heading_style(level, ctx)).collect();
        let numbered_level = config.bool("numbering").then(|| {
            config
                .text("numbering_level")
                .strip_prefix('h')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| (1..=6).contains(n))
                .unwrap_or(2)
        });
        let template = config.text("numbering_template");
        let delimiters: Vec<char> = config
            .text("line_break_delimiters")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let keep_delimiter = config.bool("keep_delimiter");

        let mut count = 0;
        edit_elements(html, |el, _| {
            let Some(level) = el.heading_level() else {
                return;
            };
            el.set_attr("style", styles[usize::from(level - 1)].clone());

            if numbered_level == Some(level) {
                count += 1;
                set_number(el, &render_number(template, count));
            }
            if !delimiters.is_empty() {
                let target = match el.position_child(|c| c.has_class("content")) {
                    Some(pos) => el.children[pos].as_element_mut(),
                    None => Some(el),
                };
                if let Some(target) = target {
                    break_at_delimiters(&mut target.children, &delimiters, keep_delimiter, true);
                }
            }
        })
    }
}

fn heading_style(level: u8, ctx: &HtmlContext) -> String {
    let accent = ctx.literal("--heading-color");
    match level {
        1 => format!(
            "margin: 1.2em 0 0.8em; font-size: 1.6em; font-weight: bold; line-height: 1.4; text-align: center; color: {accent};"
        ),
        2 => format!(
            "display: table; margin: 1.5em 0 0.8em; padding: 0.2em 0.8em; font-size: 1.35em; font-weight: bold; line-height: 1.4; color: #ffffff; background-color: {accent}; border-radius: 4px;"
        ),
        3 => format!(
            "margin: 1.2em 0 0.6em; padding-left: 8px; font-size: 1.2em; font-weight: bold; line-height: 1.4; color: {accent}; border-left: 4px solid {accent};"
        ),
        4 => format!(
            "margin: 1em 0 0.5em; font-size: 1.1em; font-weight: bold; color: {};",
            ctx.literal("--text-color")
        ),
        _ => format!(
            "margin: 1em 0 0.5em; font-size: 1em; font-weight: bold; color: {};",
            ctx.literal("--muted-color")
        ),
    }
}

/// Insert or update `span.heading-number` in front of `span.content`.
fn set_number(heading: &mut Element, text: &str) {
    if let Some(existing) = heading
        .child_elements_mut()
        .find(|c| c.has_class("heading-number"))
    {
        existing.children = vec![Node::text(text)];
        return;
    }
    let number = Element::new("span")
        .with_attr("class", "heading-number")
        .with_text(text);
    let pos = heading
        .position_child(|c| c.has_class("content"))
        .unwrap_or(0);
    heading.children.insert(pos, number.into());
}

fn render_number(template: &str, index: usize) -> String {
    template
        .replace("{number}", &format!("{index:02}"))
        .replace("{index}", &index.to_string())
        .replace("{roman}", &to_roman(index))
        .replace("{letter}", &to_letter(index))
}

fn to_roman(mut n: usize) -> String {
    const TABLE: &[(usize, &str)] = &[
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if n == 0 || n >= 4000 {
        return n.to_string();
    }
    let mut out = String::new();
    for &(value, numeral) in TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// `A`..`Z`, then `AA`, `AB`, ...
fn to_letter(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(char::from(b'A' + u8::try_from(n % 26).unwrap_or(0)));
        n /= 26;
    }
    out.iter().rev().collect()
}

/// Insert `<br>` after delimiters in every text node under `nodes`.
///
/// Elements are descended into but never split; the break goes right after the
/// delimiter, inside whatever element holds it. No break is added after the
/// final character of the content (`at_tail`), or where a `<br>` already
/// follows. The heading number is left alone.
fn break_at_delimiters(nodes: &mut Vec<Node>, delimiters: &[char], keep: bool, at_tail: bool) {
    let old = mem::take(nodes);
    let has_text: Vec<bool> = old.iter().map(has_text).collect();
    let followed_by_br: Vec<bool> = (0..old.len())
        .map(|i| {
            old.get(i + 1)
                .and_then(Node::as_element)
                .is_some_and(|el| el.is("br"))
        })
        .collect();

    for (i, node) in old.into_iter().enumerate() {
        let tail = at_tail && !has_text[i + 1..].contains(&true);
        let text = match node {
            Node::Text(text) => text,
            Node::Element(mut el) => {
                if !el.is("br") && !el.has_class("heading-number") {
                    break_at_delimiters(&mut el.children, delimiters, keep, tail);
                }
                nodes.push(el.into());
                continue;
            }
            other @ Node::Comment(_) => {
                nodes.push(other);
                continue;
            }
        };

        let mut segment = String::new();
        for (pos, c) in text.char_indices() {
            if !delimiters.contains(&c) {
                segment.push(c);
                continue;
            }
            let at_end = pos + c.len_utf8() == text.len();
            if at_end && (tail || followed_by_br[i]) {
                segment.push(c);
                continue;
            }
            if keep {
                segment.push(c);
            }
            if !segment.is_empty() {
                nodes.push(Node::Text(mem::take(&mut segment)));
            }
            nodes.push(Element::new("br").into());
        }
        if !segment.is_empty() {
            nodes.push(Node::Text(segment));
        }
    }
}

fn has_text(node: &Node) -> bool {
    match node {
        Node::Text(text) => !text.is_empty(),
        Node::Element(el) => !el.text_content().is_empty(),
        Node::Comment(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use plume_config::LinkDescriptionMode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::css::CssVariables;

    fn ctx() -> HtmlContext {
        HtmlContext::new(true, LinkDescriptionMode::Link, CssVariables::with_defaults(None))
    }

    fn config() -> PluginConfig {
        PluginConfig::with_defaults(&HeadingStylePlugin.schema())
    }

    fn heading(tag: &str, content: &str) -> String {
        format!(
            r#"<{tag} id="x"><span class="prefix"></span><span class="content">{content}</span><span class="suffix"></span></{tag}>"#
        )
    }

    fn run(html: &str, config: &PluginConfig) -> String {
        HeadingStylePlugin.process(html, config, &mut ctx()).unwrap()
    }

    #[test]
    fn test_styles_every_level() {
        let out = run("<h1>a</h1><h3>b</h3><h6>c</h6><p>d</p>", &config());
        assert!(out.contains(r#"<h1 style="margin: 1.2em 0 0.8em;"#));
        assert!(out.contains("border-left: 4px solid #0F4C81;"));
        assert!(out.contains("color: #888888;"));
        assert!(out.ends_with("<p>d</p>"));
    }

    #[test]
    fn test_numbering_inserts_before_content() {
        let html = format!("{}{}{}", heading("h2", "A"), heading("h3", "sub"), heading("h2", "B"));
        let out = run(&html, &config().with_value("numbering", true));
        assert!(out.contains(
            r#"<span class="prefix"></span><span class="heading-number">01. </span><span class="content">A</span>"#
        ));
        assert!(out.contains(r#"<span class="heading-number">02. </span><span class="content">B</span>"#));
        assert_eq!(out.matches("heading-number").count(), 2);
    }

    #[test]
    fn test_numbering_is_idempotent() {
        let config = config()
            .with_value("numbering", true)
            .with_value("numbering_template", "{roman}/{letter} ");
        let once = run(&heading("h2", "A"), &config);
        assert!(once.contains(">I/A </span>"));
        assert_eq!(run(&once, &config), once);
    }

    #[test]
    fn test_numbering_level() {
        let config = config()
            .with_value("numbering", true)
            .with_value("numbering_level", "h3")
            .with_value("numbering_template", "{index}) ");
        let out = run(&format!("{}{}", heading("h2", "A"), heading("h3", "B")), &config);
        assert_eq!(out.matches("heading-number").count(), 1);
        assert!(out.contains(r#"<span class="heading-number">1) </span><span class="content">B</span>"#));
    }

    #[test]
    fn test_delimiters_break_lines() {
        let config = config().with_value("line_break_delimiters", "，");
        let out = run(&heading("h2", "一，二，三，"), &config);
        assert!(out.contains(r#"<span class="content">一，<br>二，<br>三，</span>"#));
        assert_eq!(run(&out, &config), out);
    }

    #[test]
    fn test_delimiters_dropped_when_not_kept() {
        let config = config()
            .with_value("line_break_delimiters", "|")
            .with_value("keep_delimiter", false);
        let out = run(&heading("h3", "a|b <em>c|d</em>|e"), &config);
        assert!(out.contains(r#"<span class="content">a<br>b <em>c<br>d</em><br>e</span>"#));
        assert_eq!(run(&out, &config), out);
    }

    #[test]
    fn test_delimiters_inside_emphasis() {
        let config = config().with_value("line_break_delimiters", "，");
        let out = run(&heading("h2", "一，<strong>二，三</strong>，四"), &config);
        assert!(out.contains(
            r#"<span class="content">一，<br><strong>二，<br>三</strong>，<br>四</span>"#
        ));
        assert_eq!(run(&out, &config), out);
    }

    #[test]
    fn test_no_break_at_end_of_nested_content() {
        let config = config().with_value("line_break_delimiters", "，");
        let out = run(&heading("h2", "一，<em>二，</em>"), &config);
        assert!(out.contains(r#"<span class="content">一，<br><em>二，</em></span>"#));
    }

    #[test]
    fn test_delimiters_without_content_span() {
        let config = config()
            .with_value("line_break_delimiters", "，")
            .with_value("numbering", true)
            .with_value("numbering_template", "{number}，");
        let out = run("<h2>甲，乙</h2>", &config);
        assert!(out.contains(r#"<span class="heading-number">01，</span>甲，<br>乙</h2>"#));
        assert_eq!(run(&out, &config), out);
    }

    #[test]
    fn test_roman_and_letters() {
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_letter(1), "A");
        assert_eq!(to_letter(26), "Z");
        assert_eq!(to_letter(28), "AB");
    }
}
