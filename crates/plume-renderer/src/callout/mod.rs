//! Callouts: blockquotes opening with `[!type]`.
//!
//! ```markdown
//! > [!tip]- Pro Tip
//! > Body, rendered as regular Markdown.
//! ```
//!
//! The block is rendered to a self-contained, inline-styled `div` during
//! preprocessing and replaced by a fragment placeholder, so its HTML reaches
//! the output untouched by the surrounding Markdown.

mod types;

use std::fmt::Write;
use std::sync::{Arc, LazyLock};

use plume_assets::{AssetLoader, NoAssets};
use plume_config::PluginConfig;
use regex::Regex;

pub use types::{CalloutStyle, aliases, fallback, lookup};

use crate::context::RenderContext;
use crate::fence::{FenceTracker, strip_block_indent};
use crate::plugin::{MarkdownPipeline, MarkdownPlugin};
use crate::state::escape_html;

/// Marker line: `[!type]`, optional fold marker, optional title.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([\w-]+)\]([+-])?(?:[ \t]+(.*?))?[ \t]*$").unwrap());

/// Ordered list marker at the start of a line (`1.` / `1)`).
static ORDERED_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,9}[.)](?:\s|$)").unwrap());

/// Footnote reference markup already written into a title by the footnote plugin.
static FOOTNOTE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"<sup class="footnote-ref"><a href="#fn-\d+"(?: id="fnref-\d+")?>&#91;\d+&#93;</a></sup>"##)
        .unwrap()
});

/// Fold preference written after the type marker.
///
/// Parsed and kept on the header; rendering is the same either way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fold {
    /// `+`: shown expanded.
    Expanded,
    /// `-`: shown collapsed.
    Collapsed,
}

/// Parsed callout marker line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalloutHeader {
    /// Type as written.
    pub kind: String,
    /// Fold marker, if any.
    pub fold: Option<Fold>,
    /// Custom title, if any.
    pub title: Option<String>,
}

impl CalloutHeader {
    /// Parse the first line of a blockquote (with the `>` already removed).
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADER_RE.captures(line.trim())?;
        let fold = caps.get(2).map(|m| {
            if m.as_str() == "-" {
                Fold::Collapsed
            } else {
                Fold::Expanded
            }
        });
        let title = caps
            .get(3)
            .map(|m| m.as_str().trim().to_owned())
            .filter(|t| !t.is_empty());
        Some(Self {
            kind: caps[1].to_owned(),
            fold,
            title,
        })
    }

    /// Custom title, or the type with its first letter upper-cased.
    #[must_use]
    pub fn display_title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        let lower = self.kind.to_lowercase();
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Callout extension.
pub struct CalloutPlugin {
    assets: Arc<dyn AssetLoader>,
}

impl CalloutPlugin {
    /// Settings key.
    pub const NAME: &'static str = "callout";

    /// Create the plugin; `assets` provides icons for types outside the built-in table.
    #[must_use]
    pub fn new(assets: Arc<dyn AssetLoader>) -> Self {
        Self { assets }
    }

    /// Render one callout.
    fn render_callout(
        &self,
        header: &CalloutHeader,
        body: &str,
        ctx: &mut RenderContext,
        pipeline: &MarkdownPipeline,
    ) -> String {
        let data_type = header.kind.to_lowercase();
        let (style, icon) = match lookup(&data_type) {
            Some(style) => (style, style.icon.to_owned()),
            None => {
                let icon = self.assets.load_icon(&data_type);
                if icon.is_none() {
                    tracing::debug!(kind = %data_type, "Unknown callout type, using note icon");
                }
                let style = fallback();
                (style, icon.unwrap_or_else(|| style.icon.to_owned()))
            }
        };

        ctx.record_callout(&data_type);
        let content = pipeline.render_fragment(body, ctx);

        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="callout" data-type="{}" style="margin: 1em 0; padding: 12px 16px; border-left: 4px solid {color}; border-radius: 4px; background-color: {background};">"#,
            escape_html(&data_type),
            color = style.color,
            background = style.background,
        );
        let _ = write!(
            html,
            r#"<div class="callout-header" style="display: flex; align-items: center; gap: 8px; color: {}; font-weight: 600; line-height: 1.5;">"#,
            style.color
        );
        let _ = write!(
            html,
            r#"<span class="callout-icon" style="display: inline-flex; align-items: center; width: 18px; height: 18px;">{icon}</span>"#
        );
        let _ = write!(
            html,
            r#"<span class="callout-title" style="font-weight: 600; color: {};">{}</span></div>"#,
            style.color,
            title_html(&header.display_title())
        );
        let _ = write!(
            html,
            r#"<div class="callout-content" style="margin-top: 8px; color: #333333;">{}</div></div>"#,
            content.trim()
        );
        html
    }
}

impl Default for CalloutPlugin {
    fn default() -> Self {
        Self::new(Arc::new(NoAssets))
    }
}

impl MarkdownPlugin for CalloutPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "> [!type] callout blocks with icon, title and inline styles"
    }

    fn preprocess(
        &self,
        markdown: &str,
        _config: &PluginConfig,
        ctx: &mut RenderContext,
        pipeline: &MarkdownPipeline,
    ) -> String {
        if !markdown.contains("[!") {
            return markdown.to_owned();
        }

        let lines: Vec<&str> = markdown.lines().collect();
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut fence = FenceTracker::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            if fence.update(line) || fence.in_fence() {
                out.push(line.to_owned());
                i += 1;
                continue;
            }

            let Some((indent, rest)) = strip_block_indent(line) else {
                out.push(line.to_owned());
                i += 1;
                continue;
            };
            if !rest.starts_with('>') {
                out.push(line.to_owned());
                i += 1;
                continue;
            }

            let end = quote_block_end(&lines, i);
            let inner: Vec<&str> = lines[i..end].iter().map(|l| strip_quote_marker(l)).collect();

            match inner.first().and_then(|first| CalloutHeader::parse(first)) {
                Some(header) => {
                    let body = inner[1..].join("\n");
                    let html = self.render_callout(&header, &body, ctx, pipeline);
                    out.push(format!("{indent}{}", ctx.store_fragment(html)));
                }
                None => out.extend(lines[i..end].iter().map(|l| (*l).to_owned())),
            }
            i = end;
        }

        let mut result = out.join("\n");
        if markdown.ends_with('\n') {
            result.push('\n');
        }
        result
    }
}

/// Index one past the last line of the blockquote starting at `start`.
///
/// The block holds `>` lines plus lazy paragraph continuation lines.
/// Escape a callout title, keeping footnote references rendered.
fn title_html(title: &str) -> String {
    let mut html = String::with_capacity(title.len());
    let mut last = 0;
    for m in FOOTNOTE_REF_RE.find_iter(title) {
        html.push_str(&escape_html(&title[last..m.start()]));
        html.push_str(m.as_str());
        last = m.end();
    }
    html.push_str(&escape_html(&title[last..]));
    html
}

fn quote_block_end(lines: &[&str], start: usize) -> usize {
    let mut end = start + 1;
    let mut open_paragraph = !strip_quote_marker(lines[start]).trim().is_empty();

    while end < lines.len() {
        let line = lines[end];
        if is_quote_line(line) {
            open_paragraph = !strip_quote_marker(line).trim().is_empty();
        } else if open_paragraph && is_lazy_continuation(line) {
            // Lazy line continues the open paragraph.
        } else {
            break;
        }
        end += 1;
    }
    end
}

fn is_quote_line(line: &str) -> bool {
    strip_block_indent(line).is_some_and(|(_, rest)| rest.starts_with('>'))
}

/// Remove one level of `>` (and one following space) from a quote line.
///
/// Lazy continuation lines are returned unchanged.
fn strip_quote_marker(line: &str) -> &str {
    match strip_block_indent(line) {
        Some((_, rest)) if rest.starts_with('>') => {
            let rest = &rest[1..];
            rest.strip_prefix(' ')
                .or_else(|| rest.strip_prefix('\t'))
                .unwrap_or(rest)
        }
        _ => line,
    }
}

/// A non-blank line that does not start a new block of its own.
fn is_lazy_continuation(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || line.len() - trimmed.len() > 3 {
        return false;
    }
    let starts_block = trimmed.starts_with(['#', '`', '~', '<', '|'])
        || ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m))
        || ["-", "*", "+"].contains(&trimmed)
        || ORDERED_ITEM_RE.is_match(trimmed)
        || is_thematic_break(trimmed);
    !starts_block
}

fn is_thematic_break(trimmed: &str) -> bool {
    let mut marks = trimmed.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    matches!(first, '-' | '*' | '_') && count >= 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct OneIcon;

    impl AssetLoader for OneIcon {
        fn load_icon(&self, name: &str) -> Option<String> {
            (name == "rocket").then(|| "<svg>rocket</svg>".to_owned())
        }

        fn highlight(&self, _name: &str) -> Option<String> {
            None
        }
    }

    fn pipeline_with(plugin: CalloutPlugin) -> MarkdownPipeline {
        MarkdownPipeline::new().with_plugin(Arc::new(plugin), PluginConfig::default())
    }

    fn render(markdown: &str) -> (String, RenderContext) {
        let mut ctx = RenderContext::new();
        let html = pipeline_with(CalloutPlugin::default()).render(markdown, &mut ctx);
        (html, ctx)
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(
            CalloutHeader::parse("[!tip]- Pro Tip"),
            Some(CalloutHeader {
                kind: "tip".to_owned(),
                fold: Some(Fold::Collapsed),
                title: Some("Pro Tip".to_owned()),
            })
        );
        assert_eq!(
            CalloutHeader::parse("[!NOTE]+").unwrap().fold,
            Some(Fold::Expanded)
        );
        assert_eq!(CalloutHeader::parse("[!note]").unwrap().title, None);
        assert!(CalloutHeader::parse("plain quote").is_none());
        assert!(CalloutHeader::parse("[!] empty").is_none());
    }

    #[test]
    fn test_display_title() {
        assert_eq!(CalloutHeader::parse("[!mytype]").unwrap().display_title(), "Mytype");
        assert_eq!(CalloutHeader::parse("[!WARNING]").unwrap().display_title(), "Warning");
        assert_eq!(
            CalloutHeader::parse("[!tip] keep AS is").unwrap().display_title(),
            "keep AS is"
        );
    }

    #[test]
    fn test_tip_with_title() {
        let (html, ctx) = render("> [!tip] Pro Tip\n> Use X.");
        assert!(html.starts_with(r#"<div class="callout" data-type="tip" style="#));
        assert!(html.contains(r#"<span class="callout-title" style="font-weight: 600; color: #00BFBC;">Pro Tip</span>"#));
        assert!(html.contains(r#"<div class="callout-content" style="margin-top: 8px; color: #333333;"><p>Use X.</p></div>"#));
        assert!(html.contains(r#"class="callout-icon""#));
        assert_eq!(ctx.callout_count(), 1);
    }

    #[test]
    fn test_unknown_type_uses_note() {
        let (html, _) = render("> [!mytype]\n> body");
        assert!(html.contains(r#"data-type="mytype""#));
        assert!(html.contains(">Mytype</span>"));
        assert!(html.contains(fallback().icon));
        assert!(html.contains(fallback().color));
    }

    #[test]
    fn test_unknown_type_icon_from_loader() {
        let mut ctx = RenderContext::new();
        let html = pipeline_with(CalloutPlugin::new(Arc::new(OneIcon)))
            .render("> [!rocket] Launch\n> go", &mut ctx);
        assert!(html.contains("<svg>rocket</svg>"));
        assert!(html.contains(fallback().color));
    }

    #[test]
    fn test_plain_blockquote_untouched() {
        let (html, ctx) = render("> just a quote\n> [!tip] not first line");
        assert!(html.starts_with("<blockquote><p>just a quote"));
        assert_eq!(ctx.callout_count(), 0);
    }

    #[test]
    fn test_body_is_markdown() {
        let (html, _) = render("> [!example]\n> - one\n> - two\n>\n> ```rust\n> let x = 1;\n> ```");
        assert!(html.contains("<ul><li>one</li><li>two</li></ul>"));
        assert!(html.contains(r#"<pre><code class="hljs language-rust">let x = 1;"#));
    }

    #[test]
    fn test_nested_callouts() {
        let (html, ctx) = render("> [!note] Outer\n> > [!warning] Inner\n> > careful");
        assert_eq!(ctx.callout_count(), 2);
        let outer = html.find(r#"data-type="note""#).unwrap();
        let inner = html.find(r#"data-type="warning""#).unwrap();
        assert!(outer < inner);
        assert!(html.contains("<p>careful</p>"));
        assert!(!html.contains("plume-fragment"));
    }

    #[test]
    fn test_lazy_continuation_joins_callout() {
        let (html, _) = render("> [!info]\n> first\nlazy\n\nafter");
        assert!(html.contains("<p>first\nlazy</p></div></div>"));
        assert!(html.ends_with("<p>after</p>"));
    }

    #[test]
    fn test_fenced_quote_ignored() {
        let (html, ctx) = render("```\n> [!tip]\n```");
        assert_eq!(ctx.callout_count(), 0);
        assert!(html.contains("&gt; [!tip]"));
    }

    #[test]
    fn test_title_is_escaped() {
        let (html, _) = render("> [!note] <b>bold</b>\n> x");
        assert!(html.contains(">&lt;b&gt;bold&lt;/b&gt;</span>"));
    }

    #[test]
    fn test_footnote_in_title() {
        let pipeline = MarkdownPipeline::new()
            .with_plugin(Arc::new(crate::FootnotePlugin), PluginConfig::default())
            .with_plugin(Arc::new(CalloutPlugin::default()), PluginConfig::default());
        let mut ctx = RenderContext::new();
        let html = pipeline.render("> [!tip] See <this>[^1]\n> body\n\n[^1]: note\n", &mut ctx);
        assert!(html.contains(
            r##">See &lt;this&gt;<sup class="footnote-ref"><a href="#fn-1" id="fnref-1">&#91;1&#93;</a></sup></span>"##
        ));
        assert!(!html.contains("&lt;sup"));
        assert!(html.contains(r#"<li id="fn-1">note"#));
    }

    #[test]
    fn test_heading_ids_unique_across_callouts() {
        let (html, _) = render("> [!note]\n> ## FAQ\n\n## FAQ\n");
        assert!(html.contains(r#"<h2 id="faq""#));
        assert!(html.contains(r#"<h2 id="faq-1""#));
    }

    #[test]
    fn test_surrounding_content_kept() {
        let (html, _) = render("before\n\n> [!tip]\n> inside\n\nafter");
        assert!(html.starts_with("<p>before</p>"));
        assert!(html.contains("<p>inside</p>"));
        assert!(html.trim_end().ends_with("<p>after</p>"));
    }

    #[test]
    fn test_lazy_continuation_rules() {
        assert!(is_lazy_continuation("more text"));
        assert!(!is_lazy_continuation("# heading"));
        assert!(!is_lazy_continuation("- item"));
        assert!(!is_lazy_continuation("1. item"));
        assert!(!is_lazy_continuation("---"));
        assert!(!is_lazy_continuation(""));
    }
}
