//! pulldown-cmark event renderer.
//!
//! Produces the HTML the HTML-phase plugins expect:
//!
//! - headings wrapped as `<hN id="..."><span class="prefix"></span><span class="content">...</span><span class="suffix"></span></hN>`
//! - code blocks as `<pre><code class="hljs language-x">`
//! - table cell alignment as inline `style`

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::state::{CodeBlockState, HeadingIds, HeadingState, ImageState, TableState, escape_html};

/// Parser options used for every document and fragment.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Markdown to HTML renderer over pulldown-cmark events.
///
/// Footnote and callout syntax never reaches this renderer: the markdown
/// plugins rewrite it in the source beforehand.
#[derive(Default)]
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
}

impl MarkdownRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a renderer that continues numbering from already used heading ids.
    #[must_use]
    pub fn with_heading_ids(ids: HeadingIds) -> Self {
        Self {
            heading: HeadingState::with_ids(ids),
            ..Self::default()
        }
    }

    /// Consume the renderer, returning the heading ids it handed out.
    #[must_use]
    pub fn into_heading_ids(self) -> HeadingIds {
        self.heading.into_ids()
    }

    /// Parse and render `markdown`.
    pub fn render_markdown(&mut self, markdown: &str) -> String {
        self.render(Parser::new_ext(markdown, parser_options()))
    }

    /// Render a single line of inline markdown, without the paragraph wrapper.
    #[must_use]
    pub fn render_inline(markdown: &str) -> String {
        let html = Self::new().render_markdown(markdown);
        let trimmed = html.trim();
        trimmed
            .strip_prefix("<p>")
            .and_then(|s| s.strip_suffix("</p>"))
            .unwrap_or(trimmed)
            .to_owned()
    }

    /// Render markdown events.
    pub fn render<'a, I>(&mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        std::mem::take(&mut self.output)
    }

    /// Push content to output or heading buffer based on context.
    ///
    /// Markup inside an image is dropped: alt text is plain text only.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) => self.output.push_str(&html),
            Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => {
                self.output.push_str(if checked {
                    r#"<input type="checkbox" checked disabled> "#
                } else {
                    r#"<input type="checkbox" disabled> "#
                });
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => self.heading.start(heading_level_to_num(level)),
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .filter(|l| !l.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                let _ = write!(self.output, "<{tag}{align}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<del>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = format!(r#"<a href="{}""#, escape_html(&dest_url));
                if !title.is_empty() {
                    let _ = write!(link, r#" title="{}""#, escape_html(&title));
                }
                link.push('>');
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(dest_url.into_string(), title.into_string()),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete() {
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}"><span class="prefix"></span><span class="content">{}</span><span class="suffix"></span></h{level}>"#,
                        html.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                match lang {
                    Some(lang) => {
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="hljs language-{}">{}</code></pre>"#,
                            escape_html(&lang),
                            escape_html(&content)
                        );
                    }
                    None => {
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="hljs">{}</code></pre>"#,
                            escape_html(&content)
                        );
                    }
                }
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.table.is_in_head() { "</th>" } else { "</td>" });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</del>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    let mut img = format!(r#"<img src="{}" alt="{}""#, escape_html(&src), escape_html(&alt));
                    if !title.is_empty() {
                        let _ = write!(img, r#" title="{}""#, escape_html(&title));
                    }
                    img.push('>');
                    self.push_inline(&img);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > heading > normal text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html(" ");
        } else {
            self.output.push('\n');
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> String {
        MarkdownRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_paragraph() {
        assert_eq!(render("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_structure() {
        assert_eq!(
            render("## Section *One*"),
            r#"<h2 id="section-one"><span class="prefix"></span><span class="content">Section <em>One</em></span><span class="suffix"></span></h2>"#
        );
    }

    #[test]
    fn test_heading_with_inline_code() {
        let html = render("## Install `npm`");
        assert!(html.contains(r#"id="install-npm""#));
        assert!(html.contains("<code>npm</code>"));
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            render("```rust\nfn main() {}\n```"),
            "<pre><code class=\"hljs language-rust\">fn main() {}\n</code></pre>"
        );
        assert_eq!(
            render("```\n<b>\n```"),
            "<pre><code class=\"hljs\">&lt;b&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(render("> Note"), "<blockquote><p>Note</p></blockquote>");
    }

    #[test]
    fn test_table() {
        let html = render("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            html,
            concat!(
                r#"<table><thead><tr><th style="text-align: left;">A</th><th style="text-align: right;">B</th></tr></thead>"#,
                r#"<tbody><tr><td style="text-align: left;">1</td><td style="text-align: right;">2</td></tr></tbody></table>"#
            )
        );
    }

    #[test]
    fn test_link_and_image() {
        assert_eq!(
            render(r#"[Rust](https://www.rust-lang.org "home")"#),
            r#"<p><a href="https://www.rust-lang.org" title="home">Rust</a></p>"#
        );
        assert_eq!(
            render("![A cat](cat.png)"),
            r#"<p><img src="cat.png" alt="A cat"></p>"#
        );
    }

    #[test]
    fn test_image_alt_is_plain_text() {
        assert_eq!(
            render("![An *odd* `cat`](cat.png)"),
            r#"<p><img src="cat.png" alt="An odd cat"></p>"#
        );
        assert_eq!(
            render("## ![**Logo**](logo.png) Home"),
            r#"<h2 id="home"><span class="prefix"></span><span class="content"><img src="logo.png" alt="Logo"> Home</span><span class="suffix"></span></h2>"#
        );
    }

    #[test]
    fn test_heading_ids_carry_over() {
        let mut first = MarkdownRenderer::new();
        first.render_markdown("## FAQ");
        let mut second = MarkdownRenderer::with_heading_ids(first.into_heading_ids());
        assert!(second.render_markdown("## FAQ").contains(r#"id="faq-1""#));
    }

    #[test]
    fn test_inline_html_passes_through() {
        assert_eq!(
            render(r#"a<sup class="x">1</sup>b"#),
            r#"<p>a<sup class="x">1</sup>b</p>"#
        );
    }

    #[test]
    fn test_task_list() {
        let html = render("- [ ] todo\n- [x] done");
        assert!(html.contains(r#"<input type="checkbox" disabled> todo"#));
        assert!(html.contains(r#"<input type="checkbox" checked disabled> done"#));
    }

    #[test]
    fn test_strikethrough() {
        assert_eq!(render("~~gone~~"), "<p><del>gone</del></p>");
    }

    #[test]
    fn test_render_inline() {
        assert_eq!(
            MarkdownRenderer::render_inline("see [docs](https://docs.rs)"),
            r#"see <a href="https://docs.rs">docs</a>"#
        );
    }
}
