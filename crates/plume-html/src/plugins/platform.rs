//! Rewrites for restricted publishing platforms.
//!
//! Such platforms strip `<style>` blocks, forbid most outbound links and
//! render footnote anchors as dead links. This plugin runs last and only in
//! constrained mode:
//!
//! 1. footnote anchors become bare superscripts, back-reference arrows go;
//! 2. external links become `text[n]` with the URL listed in a trailing
//!    `section.link-notes`;
//! 3. `<style>` rules are inlined into `style` attributes and the blocks are
//!    removed;
//! 4. bold text inside coloured `h1`/`h2` banners takes the banner colour.

use std::mem;

use plume_config::{ConfigSchema, LinkDescriptionMode, PluginConfig};

use super::{HtmlContext, HtmlPlugin};
use crate::css::{Declarations, StyleRule, parse_rules};
use crate::error::HtmlError;
use crate::tree::{Element, Fragment, Node};

/// Elements that can hold the link notes section when they wrap the document.
const CONTAINERS: &[&str] = &["section", "article", "div", "main"];

/// Prepares constrained output: links, footnotes and CSS inlining.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlatformAdapterPlugin;

impl PlatformAdapterPlugin {
    /// Settings key.
    pub const NAME: &'static str = "platform-adapter";
}

impl HtmlPlugin for PlatformAdapterPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Link notes, footnote superscripts and CSS inlining for constrained platforms"
    }

    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new().text(
            "allowed_domains",
            "Hosts whose links stay clickable (comma or space separated)",
            "",
        )
    }

    fn process(
        &self,
        html: &str,
        config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError> {
        if !ctx.constrained {
            return Ok(html.to_owned());
        }

        let mut fragment = Fragment::parse(html)?;
        let mut sheets = Vec::new();
        take_style_blocks(&mut fragment.children, &mut sheets);

        let mut notes = LinkNotes {
            allowed: parse_domains(config.text("allowed_domains")),
            mode: ctx.link_mode,
            muted: ctx.literal("--muted-color"),
            entries: Vec::new(),
        };
        fragment.children = notes.rewrite(mem::take(&mut fragment.children), false);
        if !notes.entries.is_empty() {
            let section = notes.section();
            let container = fragment
                .single_root_mut()
                .filter(|root| CONTAINERS.iter().any(|t| root.is(t)));
            match container {
                Some(root) => root.children.push(section.into()),
                None => fragment.children.push(section.into()),
            }
            ctx.add_link_notes(notes.entries.len());
        }

        let mut rules = Vec::new();
        for css in &sheets {
            match parse_rules(css) {
                Ok(parsed) => rules.extend(parsed),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping <style> block that cannot be inlined");
                    ctx.warn(format!("{}: {e}", Self::NAME));
                }
            }
        }
        inline_rules(&mut fragment, rules);

        fix_heading_contrast(&mut fragment);

        Ok(fragment.to_html())
    }
}

fn parse_domains(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|d| d.trim().trim_start_matches("*.").trim_start_matches('.'))
        .filter(|d| !d.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

/// Host of an absolute `http(s)` URL, lowercased.
fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?;
    Some(host.to_ascii_lowercase())
}

fn is_external(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

enum LinkKind {
    FootnoteRef,
    FootnoteBackref,
    External(String),
    Keep,
}

struct LinkNotes {
    allowed: Vec<String>,
    mode: LinkDescriptionMode,
    muted: String,
    /// `(url, text)` in first-seen order; the note number is the index + 1.
    entries: Vec<(String, String)>,
}

impl LinkNotes {
    fn classify(&self, a: &Element) -> LinkKind {
        let href = a.attr("href").unwrap_or("");
        if a.has_class("footnote-backref") || href.starts_with("#fnref-") {
            return LinkKind::FootnoteBackref;
        }
        if a.has_class("footnote-ref") || href.starts_with("#fn-") {
            return LinkKind::FootnoteRef;
        }
        if is_external(href) {
            let allowed = host_of(href).is_some_and(|host| {
                self.allowed
                    .iter()
                    .any(|d| host == *d || host.ends_with(&format!(".{d}")))
            });
            if !allowed {
                return LinkKind::External(href.trim().to_owned());
            }
        }
        LinkKind::Keep
    }

    fn number(&mut self, url: &str, text: &str) -> usize {
        if let Some(pos) = self.entries.iter().position(|(u, _)| u == url) {
            return pos + 1;
        }
        self.entries.push((url.to_owned(), text.trim().to_owned()));
        self.entries.len()
    }

    fn rewrite(&mut self, nodes: Vec<Node>, in_sup: bool) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            let Node::Element(mut el) = node else {
                out.push(node);
                continue;
            };

            if el.is("a") {
                match self.classify(&el) {
                    LinkKind::FootnoteBackref => continue,
                    LinkKind::FootnoteRef => {
                        let children = self.rewrite(mem::take(&mut el.children), true);
                        if in_sup {
                            out.extend(children);
                        } else {
                            let mut sup = Element::new("sup");
                            sup.children = children;
                            out.push(sup.into());
                        }
                        continue;
                    }
                    LinkKind::External(url) => {
                        let text = el.text_content();
                        let n = self.number(&url, &text);
                        out.extend(self.rewrite(mem::take(&mut el.children), in_sup));
                        out.push(
                            Element::new("sup")
                                .with_attr("class", "link-ref")
                                .with_attr("style", format!("color: {}; font-size: 0.75em;", self.muted))
                                .with_text(format!("[{n}]"))
                                .into(),
                        );
                        continue;
                    }
                    LinkKind::Keep => {}
                }
            }

            let is_sup = el.is("sup");
            el.children = self.rewrite(mem::take(&mut el.children), is_sup);
            out.push(el.into());
        }
        out
    }

    fn section(&self) -> Element {
        let mut section = Element::new("section")
            .with_attr("class", "link-notes")
            .with_attr(
                "style",
                format!(
                    "margin-top: 2em; padding-top: 1em; border-top: 1px solid #eeeeee; font-size: 12px; line-height: 1.6; color: {};",
                    self.muted
                ),
            );
        for (i, (url, text)) in self.entries.iter().enumerate() {
            let n = i + 1;
            let line = match self.mode {
                LinkDescriptionMode::Link if !text.is_empty() && text != url => {
                    format!("[{n}] {text}: {url}")
                }
                LinkDescriptionMode::Link | LinkDescriptionMode::Raw => format!("[{n}] {url}"),
            };
            section.children.push(
                Element::new("p")
                    .with_attr("style", "margin: 0.2em 0; word-break: break-all;")
                    .with_text(line)
                    .into(),
            );
        }
        section
    }
}

/// Remove every `<style>` element, collecting its text.
fn take_style_blocks(nodes: &mut Vec<Node>, sheets: &mut Vec<String>) {
    nodes.retain_mut(|node| match node {
        Node::Element(el) if el.is("style") => {
            sheets.push(el.text_content());
            false
        }
        Node::Element(el) => {
            take_style_blocks(&mut el.children, sheets);
            true
        }
        _ => true,
    });
}

/// Apply matching rules to every element; inline declarations win.
fn inline_rules(fragment: &mut Fragment, mut rules: Vec<StyleRule>) {
    if rules.is_empty() {
        return;
    }
    rules.sort_by_key(|r| (r.selector.specificity(), r.order));

    fragment.for_each_element_mut(&mut |el, ancestors| {
        let mut style = Declarations::new();
        for rule in rules.iter().filter(|r| r.selector.matches(el, ancestors)) {
            style.merge(&rule.declarations);
        }
        if style.is_empty() {
            return;
        }
        if let Some(inline) = el.attr("style") {
            style.merge(&Declarations::parse(inline));
        }
        el.set_attr("style", style.to_string());
    });
}

/// Bold text inside `h1`/`h2` banners takes the banner's text colour.
fn fix_heading_contrast(fragment: &mut Fragment) {
    fragment.for_each_element_mut(&mut |el, _| {
        if !(el.is("h1") || el.is("h2")) {
            return;
        }
        let decls = Declarations::parse(el.attr("style").unwrap_or(""));
        let has_background =
            decls.get("background").is_some() || decls.get("background-color").is_some();
        let Some(color) = decls.get("color").filter(|c| has_background && !c.contains("var(")) else {
            return;
        };
        recolor_bold(&mut el.children, color);
    });
}

fn recolor_bold(nodes: &mut [Node], color: &str) {
    for el in nodes.iter_mut().filter_map(Node::as_element_mut) {
        if el.is("strong") || el.is("b") {
            let mut style = Declarations::parse(el.attr("style").unwrap_or(""));
            style.set("color", color);
            el.set_attr("style", style.to_string());
        }
        recolor_bold(&mut el.children, color);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::css::CssVariables;

    fn run_with(html: &str, mode: LinkDescriptionMode, allowed: &str) -> (String, HtmlContext) {
        let mut ctx = HtmlContext::new(true, mode, CssVariables::with_defaults(None));
        let config = PluginConfig::with_defaults(&PlatformAdapterPlugin.schema())
            .with_value("allowed_domains", allowed);
        let out = PlatformAdapterPlugin.process(html, &config, &mut ctx).unwrap();
        (out, ctx)
    }

    fn run(html: &str) -> String {
        run_with(html, LinkDescriptionMode::Link, "").0
    }

    #[test]
    fn test_unconstrained_is_identity() {
        let mut ctx = HtmlContext::default();
        let html = r#"<style>p{color:red}</style><p><a href="https://x.io">x</a></p>"#;
        let out = PlatformAdapterPlugin
            .process(html, &PluginConfig::default(), &mut ctx)
            .unwrap();
        assert_eq!(out, html);
    }

    #[test]
    fn test_footnote_anchors_become_superscripts() {
        let html = r##"<p>a<sup class="footnote-ref"><a href="#fn-1" id="fnref-1">&#91;1&#93;</a></sup></p><section class="footnotes"><ol><li id="fn-1">Note <a href="#fnref-1" class="footnote-backref">↩</a></li></ol></section>"##;
        assert_eq!(
            run(html),
            r#"<p>a<sup class="footnote-ref">[1]</sup></p><section class="footnotes"><ol><li id="fn-1">Note </li></ol></section>"#
        );
    }

    #[test]
    fn test_footnote_anchor_outside_sup_gets_one() {
        assert_eq!(run(r##"<p>a<a href="#fn-2">2</a></p>"##), "<p>a<sup>2</sup></p>");
    }

    #[test]
    fn test_external_links_moved_to_notes() {
        let html = r#"<section id="plume"><p><a href="https://a.com/x">Docs</a> and <a href="https://a.com/x">again</a> and <a href="http://b.org">http://b.org</a> <a href="/local">here</a></p></section>"#;
        let (out, ctx) = run_with(html, LinkDescriptionMode::Link, "");
        assert_eq!(ctx.link_notes(), 2);
        assert!(out.contains(r#"Docs<sup class="link-ref" style="color: #888888; font-size: 0.75em;">[1]</sup> and again<sup class="link-ref""#));
        assert!(out.contains(r#"<a href="/local">here</a>"#));
        assert!(out.contains(">[1] Docs: https://a.com/x</p>"));
        assert!(out.contains(">[2] http://b.org</p>"));
        assert!(out.ends_with("</p></section></section>"));
    }

    #[test]
    fn test_raw_mode_lists_urls_only() {
        let (out, _) = run_with(
            r#"<p><a href="https://a.com">Docs</a></p>"#,
            LinkDescriptionMode::Raw,
            "",
        );
        assert!(out.contains(">[1] https://a.com</p>"));
        assert!(out.starts_with("<p>Docs<sup"));
    }

    #[test]
    fn test_allowed_domains_keep_links() {
        let html = r#"<p><a href="https://mp.weixin.qq.com/s/1">a</a><a href="https://qq.com.evil.io">b</a></p>"#;
        let (out, ctx) = run_with(html, LinkDescriptionMode::Link, "qq.com, example.org");
        assert!(out.contains(r#"<a href="https://mp.weixin.qq.com/s/1">a</a>"#));
        assert_eq!(ctx.link_notes(), 1);
    }

    #[test]
    fn test_css_inlining_specificity_and_inline_wins() {
        let html = r#"<style>p { color: red; margin: 0 } .lead { color: blue } blockquote p { margin: 4px } @media print { p { color: black } } a:hover { color: green }</style><p class="lead" style="margin: 9px">x</p><blockquote><p>y</p></blockquote>"#;
        assert_eq!(
            run(html),
            r#"<p class="lead" style="color: blue; margin: 9px;">x</p><blockquote><p style="color: red; margin: 4px;">y</p></blockquote>"#
        );
    }

    #[test]
    fn test_heading_contrast_fix() {
        let html = r#"<h2 style="background-color: #0F4C81; color: #ffffff;"><span class="content">A <strong>B</strong></span></h2><h3 style="color: #000;"><strong>C</strong></h3>"#;
        let out = run(html);
        assert!(out.contains(r#"<strong style="color: #ffffff;">B</strong>"#));
        assert!(out.contains("<strong>C</strong>"));
    }

    #[test]
    fn test_second_pass_is_identity() {
        let html = r##"<section id="plume"><style>h2 { color: #333 }</style><h2>T <strong>b</strong></h2><p><a href="https://a.com">a</a><sup class="footnote-ref"><a href="#fn-1">[1]</a></sup></p></section>"##;
        let once = run(html);
        assert_eq!(run(&once), once);
    }

    #[test]
    fn test_host_parsing() {
        assert_eq!(host_of("https://user@Example.COM:8080/p?q").as_deref(), Some("example.com"));
        assert_eq!(parse_domains(" *.a.com,b.org  .c.net"), vec!["a.com", "b.org", "c.net"]);
    }
}
