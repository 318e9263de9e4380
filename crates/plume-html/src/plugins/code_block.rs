//! Code styles for blocks and inline spans.

use std::mem;

use plume_config::{ConfigSchema, PluginConfig};

use super::{HtmlContext, HtmlPlugin, edit_elements};
use crate::error::HtmlError;
use crate::tree::{Element, Node};

const MONOSPACE: &str = r#"Menlo, Monaco, Consolas, "Courier New", monospace"#;

/// Styles `pre`, `pre > code` and inline `code`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeBlockPlugin;

impl CodeBlockPlugin {
    /// Settings key.
    pub const NAME: &'static str = "code-block";
}

impl HtmlPlugin for CodeBlockPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Code block and inline code styles"
    }

    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new().switch(
            "preserve_whitespace",
            "Write line breaks and indentation explicitly for platforms that collapse whitespace",
            false,
        )
    }

    fn process(
        &self,
        html: &str,
        config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError> {
        let pre_style = format!(
            "margin: 1em 0; padding: 12px 16px; border-radius: 6px; overflow-x: auto; font-size: 13px; line-height: 1.6; background-color: {};",
            ctx.literal("--code-background")
        );
        let block_code_style = format!(
            "font-family: {MONOSPACE}; color: {}; background: none; white-space: pre;",
            ctx.literal("--code-color")
        );
        let inline_code_style = format!(
            "margin: 0 2px; padding: 2px 4px; border-radius: 3px; font-family: {MONOSPACE}; font-size: 90%; color: {}; background-color: rgba(27, 31, 35, 0.05);",
            ctx.literal("--primary-color")
        );
        let preserve = config.bool("preserve_whitespace");

        edit_elements(html, |el, ancestors| {
            if el.is("pre") {
                el.set_attr("style", pre_style.as_str());
                if preserve {
                    for code in el.child_elements_mut().filter(|c| c.is("code")) {
                        preserve_layout(code);
                    }
                }
            } else if el.is("code") {
                let in_pre = ancestors.iter().any(|a| a.tag.eq_ignore_ascii_case("pre"));
                let style = if in_pre {
                    &block_code_style
                } else {
                    &inline_code_style
                };
                el.set_attr("style", style.as_str());
            }
        })
    }
}

/// Replace newlines with `<br>` and leading spaces with non-breaking spaces.
fn preserve_layout(code: &mut Element) {
    if let Some(Node::Text(last)) = code.children.last_mut()
        && last.ends_with('\n')
    {
        last.pop();
    }
    let mut at_line_start = true;
    rewrite_whitespace(&mut code.children, &mut at_line_start);
}

fn rewrite_whitespace(nodes: &mut Vec<Node>, at_line_start: &mut bool) {
    for node in mem::take(nodes) {
        match node {
            Node::Text(text) => {
                let mut segment = String::with_capacity(text.len());
                for c in text.chars() {
                    match c {
                        '\n' => {
                            if !segment.is_empty() {
                                nodes.push(Node::Text(mem::take(&mut segment)));
                            }
                            nodes.push(Element::new("br").into());
                            *at_line_start = true;
                        }
                        ' ' if *at_line_start => segment.push('\u{a0}'),
                        '\t' if *at_line_start => segment.push_str("\u{a0}\u{a0}\u{a0}\u{a0}"),
                        _ => {
                            *at_line_start = false;
                            segment.push(c);
                        }
                    }
                }
                if !segment.is_empty() {
                    nodes.push(Node::Text(segment));
                }
            }
            Node::Element(mut el) => {
                if el.is("br") {
                    *at_line_start = true;
                } else {
                    rewrite_whitespace(&mut el.children, at_line_start);
                }
                nodes.push(Node::Element(el));
            }
            Node::Comment(_) => nodes.push(node),
        }
    }
}
