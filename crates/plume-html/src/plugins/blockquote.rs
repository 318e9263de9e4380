//! Blockquote styles.

use plume_config::PluginConfig;

use super::{HtmlContext, HtmlPlugin, edit_elements};
use crate::error::HtmlError;

/// Styles `blockquote` and its direct `p` children.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockquotePlugin;

impl BlockquotePlugin {
    /// Settings key.
    pub const NAME: &'static str = "blockquote";
}

impl HtmlPlugin for BlockquotePlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Blockquote styles"
    }

    fn process(
        &self,
        html: &str,
        _config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError> {
        let quote_style = format!(
            "margin: 1em 0; padding: 10px 16px; border-left: 4px solid {}; border-radius: 2px; background-color: {}; color: #555555;",
            ctx.literal("--blockquote-border"),
            ctx.literal("--blockquote-background"),
        );
        let paragraph_style = format!(
            "margin: 0.5em 0; line-height: {};",
            ctx.literal("--line-height")
        );

        edit_elements(html, |el, _| {
            if !el.is("blockquote") {
                return;
            }
            el.set_attr("style", quote_style.as_str());
            for p in el.child_elements_mut().filter(|c| c.is("p")) {
                p.set_attr("style", paragraph_style.as_str());
            }
        })
    }
}
