//! Footnotes: `[^id]` references and `[^id]: content` definitions.
//!
//! Definitions are pulled out of the source and references rewritten to
//! numbered superscripts before tokenization; the numbered list is appended
//! once the document is rendered. Numbers follow first-reference order.

use std::fmt::Write;
use std::sync::LazyLock;

use plume_config::{ConfigSchema, PluginConfig};
use regex::{Captures, Regex};

use crate::context::RenderContext;
use crate::fence::{FenceTracker, split_code_spans};
use crate::plugin::{MarkdownPipeline, MarkdownPlugin};
use crate::renderer::MarkdownRenderer;
use crate::state::escape_html;

/// Footnote definition line: `[^id]: content`.
static DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}\[\^([^\]\s]+)\]:[ \t]*(.*)$").unwrap());

/// Inline reference: `[^id]`.
static REFERENCE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\^([^\]\s]+)\]").unwrap());

/// Definition marker still inside blockquote markers (`> [^id]:`), left for
/// the nested render of the quote body.
static QUOTED_DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[ \t]*>)+[ \t]*\[\^[^\]\s]+\]:").unwrap());

/// Markdown link syntax `[text](url)`.
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]\([^)\s]+[^)]*\)").unwrap());

/// A single URL with no link syntax around it.
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<?(?:https?|ftp)://\S+?>?$").unwrap());

const DEFAULT_PLACEHOLDER: &str = "footnote not defined";

/// Footnote extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct FootnotePlugin;

impl FootnotePlugin {
    /// Settings key.
    pub const NAME: &'static str = "footnote";
}

impl MarkdownPlugin for FootnotePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Numbered [^id] footnotes collected at the end of the document"
    }

    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new()
            .text(
                "placeholder",
                "Text shown for references without a definition",
                DEFAULT_PLACEHOLDER,
            )
            .switch("backrefs", "Link each footnote back to its reference", true)
    }

    fn prepare(&self, ctx: &mut RenderContext) {
        ctx.footnotes_mut().clear();
    }

    fn preprocess(
        &self,
        markdown: &str,
        _config: &PluginConfig,
        ctx: &mut RenderContext,
        _pipeline: &MarkdownPipeline,
    ) -> String {
        let (body, definitions) = extract_definitions(markdown);
        for (id, content) in definitions {
            if is_bare_url(&content) {
                tracing::debug!(id = %id, "Dropping footnote whose definition is a bare URL");
                continue;
            }
            ctx.footnotes_mut().define(id, content);
        }
        rewrite_references(&body, ctx)
    }

    fn postprocess(&self, html: String, config: &PluginConfig, ctx: &mut RenderContext) -> String {
        let unused: Vec<String> = ctx.footnotes().unreferenced().map(str::to_owned).collect();
        for id in unused {
            ctx.warn(format!("footnote [^{id}] is defined but never referenced"));
        }

        if ctx.footnotes().is_empty() {
            return html;
        }

        let placeholder = match config.text("placeholder") {
            "" => DEFAULT_PLACEHOLDER,
            text => text,
        };
        let backrefs = config.get("backrefs").is_none() || config.bool("backrefs");

        let mut missing = Vec::new();
        let mut section = String::from(r#"<section class="footnotes"><ol>"#);
        for (i, id) in ctx.footnotes().references().iter().enumerate() {
            let n = i + 1;
            let content = match ctx.footnotes().definition(id) {
                Some(text) if LINK_RE.is_match(text) => MarkdownRenderer::render_inline(text),
                Some(text) => escape_html(text),
                None => {
                    missing.push(id.clone());
                    escape_html(placeholder)
                }
            };
            let _ = write!(section, r#"<li id="fn-{n}">{content}"#);
            if backrefs {
                let _ = write!(
                    section,
                    r##" <a href="#fnref-{n}" class="footnote-backref">↩</a>"##
                );
            }
            section.push_str("</li>");
        }
        section.push_str("</ol></section>");

        for id in missing {
            ctx.warn(format!("footnote [^{id}] is referenced but not defined"));
        }

        let mut html = html;
        if !html.is_empty() && !html.ends_with('\n') {
            html.push('\n');
        }
        html.push_str(&section);
        html
    }
}

/// Remove definition blocks from the source.
///
/// A definition runs from its `[^id]:` line through the next blank line or the
/// next definition line; continuation lines are joined with spaces.
fn extract_definitions(markdown: &str) -> (String, Vec<(String, String)>) {
    let mut fence = FenceTracker::new();
    let mut body = Vec::new();
    let mut definitions: Vec<(String, String)> = Vec::new();
    let mut in_definition = false;

    for line in markdown.lines() {
        if !fence.in_fence()
            && let Some(caps) = DEFINITION_RE.captures(line)
        {
            definitions.push((caps[1].to_owned(), caps[2].trim().to_owned()));
            in_definition = true;
            continue;
        }

        if in_definition {
            if line.trim().is_empty() {
                in_definition = false;
            } else if let Some((_, content)) = definitions.last_mut() {
                if !content.is_empty() {
                    content.push(' ');
                }
                content.push_str(line.trim());
                continue;
            }
        }

        fence.update(line);
        body.push(line);
    }

    let mut body = body.join("\n");
    if markdown.ends_with('\n') {
        body.push('\n');
    }
    (body, definitions)
}

/// Rewrite references outside code to numbered superscripts.
fn rewrite_references(markdown: &str, ctx: &mut RenderContext) -> String {
    if !markdown.contains("[^") {
        return markdown.to_owned();
    }

    let mut fence = FenceTracker::new();
    let mut out = String::with_capacity(markdown.len());

    for (i, line) in markdown.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if fence.update(line) || fence.in_fence() {
            out.push_str(line);
            continue;
        }

        // Keep a quoted definition marker intact for the nested render.
        let skip = QUOTED_DEFINITION_RE.find(line).map_or(0, |m| m.end());
        out.push_str(&line[..skip]);

        for (is_code, segment) in split_code_spans(&line[skip..]) {
            if is_code {
                out.push_str(segment);
            } else {
                let replaced = REFERENCE_RE.replace_all(segment, |caps: &Captures<'_>| {
                    let (n, first) = ctx.footnotes_mut().reference(&caps[1]);
                    reference_html(n, first)
                });
                out.push_str(&replaced);
            }
        }
    }

    if markdown.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Superscript anchor for reference number `n`.
///
/// Brackets are written as character references so pulldown-cmark never reads
/// them as link syntax.
fn reference_html(n: usize, first: bool) -> String {
    if first {
        format!(r##"<sup class="footnote-ref"><a href="#fn-{n}" id="fnref-{n}">&#91;{n}&#93;</a></sup>"##)
    } else {
        format!(r##"<sup class="footnote-ref"><a href="#fn-{n}">&#91;{n}&#93;</a></sup>"##)
    }
}

fn is_bare_url(content: &str) -> bool {
    !LINK_RE.is_match(content) && BARE_URL_RE.is_match(content.trim())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> (String, RenderContext) {
        let plugin = FootnotePlugin;
        let config = PluginConfig::with_defaults(&plugin.schema());
        let pipeline = MarkdownPipeline::new().with_plugin(Arc::new(plugin), config);
        let mut ctx = RenderContext::new();
        let html = pipeline.render(markdown, &mut ctx);
        (html, ctx)
    }

    #[test]
    fn test_numbering_follows_first_reference() {
        let (html, ctx) = render("b[^beta] a[^alpha] b again[^beta]\n\n[^alpha]: A\n[^beta]: B\n");
        assert_eq!(ctx.footnotes().references(), ["beta".to_owned(), "alpha".to_owned()]);
        let first = html.find(r##"href="#fn-1""##).unwrap();
        let second = html.find(r##"href="#fn-2""##).unwrap();
        assert!(first < second);
        assert!(html.contains(r#"<li id="fn-1">B "#));
        assert!(html.contains(r#"<li id="fn-2">A "#));
    }

    #[test]
    fn test_undefined_reference_gets_placeholder() {
        let (html, ctx) = render("a[^1]b[^2]\n\n[^2]: two\n");
        assert!(html.contains(
            r##"a<sup class="footnote-ref"><a href="#fn-1" id="fnref-1">[1]</a></sup>b"##
        ));
        assert!(html.contains(r#"<li id="fn-1">footnote not defined "#));
        assert!(html.contains(r#"<li id="fn-2">two "#));
        assert_eq!(ctx.warnings(), ["footnote [^1] is referenced but not defined".to_owned()]);
    }

    #[test]
    fn test_no_references_is_noop() {
        let (html, _) = render("plain text");
        assert_eq!(html, "<p>plain text</p>");
    }

    #[test]
    fn test_definition_removed_from_body() {
        let (html, _) = render("x[^n]\n\n[^n]: first line\n  continued\n\nafter\n");
        assert!(!html.contains("[^n]:"));
        assert!(html.contains("<li id=\"fn-1\">first line continued "));
        assert!(html.contains("<p>after</p>"));
    }

    #[test]
    fn test_next_definition_ends_previous() {
        let (body, defs) = extract_definitions("[^a]: one\n[^b]: two\ntext");
        assert_eq!(
            defs,
            vec![
                ("a".to_owned(), "one".to_owned()),
                ("b".to_owned(), "two text".to_owned())
            ]
        );
        assert_eq!(body, "");
    }

    #[test]
    fn test_bare_url_definition_dropped() {
        let (html, _) = render("see[^u]\n\n[^u]: https://example.com/page\n");
        assert!(html.contains(r#"<li id="fn-1">footnote not defined "#));
    }

    #[test]
    fn test_link_definition_rendered_inline() {
        let (html, _) = render("see[^u]\n\n[^u]: [Example](https://example.com)\n");
        assert!(html.contains(r#"<li id="fn-1"><a href="https://example.com">Example</a> "#));
    }

    #[test]
    fn test_plain_definition_escaped() {
        let (html, _) = render("x[^1]\n\n[^1]: a <b> tag\n");
        assert!(html.contains("a &lt;b&gt; tag"));
    }

    #[test]
    fn test_code_is_not_rewritten() {
        let (html, ctx) = render("`[^1]` and\n\n```\n[^2]\n[^3]: no\n```\n");
        assert!(ctx.footnotes().is_empty());
        assert!(html.contains("<code>[^1]</code>"));
        assert!(html.contains("[^2]\n[^3]: no"));
    }

    #[test]
    fn test_repeat_reference_reuses_number() {
        let (html, _) = render("a[^x] b[^x]\n\n[^x]: ex\n");
        assert_eq!(html.matches(r##"href="#fn-1""##).count(), 2);
        assert_eq!(html.matches(r#"id="fnref-1""#).count(), 1);
        assert!(!html.contains("fn-2"));
    }

    #[test]
    fn test_unused_definition_warns() {
        let (html, ctx) = render("text\n\n[^spare]: unused\n");
        assert_eq!(html, "<p>text</p>");
        assert_eq!(ctx.warnings(), ["footnote [^spare] is defined but never referenced".to_owned()]);
    }

    #[test]
    fn test_backrefs_can_be_disabled() {
        let plugin = FootnotePlugin;
        let config = PluginConfig::with_defaults(&plugin.schema()).with_value("backrefs", false);
        let pipeline = MarkdownPipeline::new().with_plugin(Arc::new(plugin), config);
        let mut ctx = RenderContext::new();
        let html = pipeline.render("a[^1]\n\n[^1]: one\n", &mut ctx);
        assert!(!html.contains("footnote-backref"));
    }

    #[test]
    fn test_prepare_resets_between_renders() {
        let plugin = FootnotePlugin;
        let mut ctx = RenderContext::new();
        ctx.footnotes_mut().reference("stale");
        plugin.prepare(&mut ctx);
        assert!(ctx.footnotes().is_empty());
    }

    #[test]
    fn test_quoted_definition_marker_kept() {
        let mut ctx = RenderContext::new();
        let out = rewrite_references("> [^q]: quoted\n> see[^q]", &mut ctx);
        assert!(out.starts_with("> [^q]: quoted\n"));
        assert!(out.contains(r##"href="#fn-1""##));
    }
}
