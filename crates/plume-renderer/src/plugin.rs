//! Markdown-phase plugin API.
//!
//! Markdown plugins use the same two-phase model as the renderer's source
//! rewriting: they rewrite the raw Markdown before pulldown-cmark sees it
//! ([`MarkdownPlugin::preprocess`]) and may finish the rendered HTML once the
//! whole document is done ([`MarkdownPlugin::postprocess`]).

use std::sync::Arc;

use plume_config::{ConfigSchema, PluginConfig};

use crate::context::RenderContext;
use crate::renderer::MarkdownRenderer;

/// Nesting limit for fragment renders (callouts inside callouts).
pub const MAX_FRAGMENT_DEPTH: usize = 16;

/// A Markdown-phase extension.
///
/// Plugins hold configuration only. Everything that changes during a render
/// lives in the [`RenderContext`] passed to each call.
pub trait MarkdownPlugin: Send + Sync {
    /// Unique plugin name, used as the `[plugins.<name>]` settings key.
    fn name(&self) -> &'static str;

    /// One-line description for listings.
    fn description(&self) -> &'static str {
        ""
    }

    /// Configurable fields.
    fn schema(&self) -> ConfigSchema {
        ConfigSchema::new()
    }

    /// Reset per-render state. Called once per top-level render, before
    /// any preprocessing.
    fn prepare(&self, _ctx: &mut RenderContext) {}

    /// Rewrite raw Markdown before tokenization.
    ///
    /// Called for the document and again for every nested fragment rendered
    /// through `pipeline`.
    fn preprocess(
        &self,
        markdown: &str,
        config: &PluginConfig,
        ctx: &mut RenderContext,
        pipeline: &MarkdownPipeline,
    ) -> String;

    /// Finish the rendered document. Called once per top-level render.
    fn postprocess(&self, html: String, _config: &PluginConfig, _ctx: &mut RenderContext) -> String {
        html
    }
}

/// Ordered set of enabled markdown plugins with their resolved configuration.
#[derive(Clone, Default)]
pub struct MarkdownPipeline {
    plugins: Vec<(Arc<dyn MarkdownPlugin>, PluginConfig)>,
}

impl MarkdownPipeline {
    /// Create an empty pipeline (plain Markdown rendering).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a plugin (builder style).
    #[must_use]
    pub fn with_plugin(mut self, plugin: Arc<dyn MarkdownPlugin>, config: PluginConfig) -> Self {
        self.push(plugin, config);
        self
    }

    /// Append a plugin. Plugins run in the order they are pushed.
    pub fn push(&mut self, plugin: Arc<dyn MarkdownPlugin>, config: PluginConfig) {
        self.plugins.push((plugin, config));
    }

    /// Names of the plugins in execution order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.iter().map(|(p, _)| p.name())
    }

    /// Render a whole document.
    ///
    /// `ctx` should be fresh; every plugin's `prepare` runs first and every
    /// plugin's `postprocess` runs last.
    pub fn render(&self, markdown: &str, ctx: &mut RenderContext) -> String {
        for (plugin, _) in &self.plugins {
            plugin.prepare(ctx);
        }

        let mut html = self.render_fragment(markdown, ctx);

        for (plugin, config) in &self.plugins {
            html = plugin.postprocess(html, config, ctx);
        }
        tracing::debug!(context = %ctx, "Rendered markdown");
        html
    }

    /// Render a piece of Markdown through the preprocess chain and the renderer.
    ///
    /// Used for the document body and, recursively, for nested content such as
    /// callout bodies. Postprocessing is not applied.
    pub fn render_fragment(&self, markdown: &str, ctx: &mut RenderContext) -> String {
        let source = if ctx.depth() >= MAX_FRAGMENT_DEPTH {
            ctx.warn(format!(
                "nesting deeper than {MAX_FRAGMENT_DEPTH} levels rendered without extensions"
            ));
            markdown.to_owned()
        } else {
            ctx.enter();
            let mut source = markdown.to_owned();
            for (plugin, config) in &self.plugins {
                source = plugin.preprocess(&source, config, ctx, self);
            }
            ctx.leave();
            source
        };

        let mut renderer = MarkdownRenderer::with_heading_ids(ctx.take_heading_ids());
        let html = renderer.render_markdown(&source);
        ctx.restore_heading_ids(renderer.into_heading_ids());
        ctx.substitute_fragments(&html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Uppercases the word `shout` and reports how often it ran.
    struct Shout;

    impl MarkdownPlugin for Shout {
        fn name(&self) -> &'static str {
            "shout"
        }

        fn preprocess(
            &self,
            markdown: &str,
            _config: &PluginConfig,
            ctx: &mut RenderContext,
            _pipeline: &MarkdownPipeline,
        ) -> String {
            ctx.warn("shout ran");
            markdown.replace("shout", "SHOUT")
        }

        fn postprocess(&self, html: String, _config: &PluginConfig, _ctx: &mut RenderContext) -> String {
            format!("{html}<!-- end -->")
        }
    }

    /// Wraps the whole source as a fragment, rendering it recursively.
    struct Wrap;

    impl MarkdownPlugin for Wrap {
        fn name(&self) -> &'static str {
            "wrap"
        }

        fn preprocess(
            &self,
            markdown: &str,
            _config: &PluginConfig,
            ctx: &mut RenderContext,
            pipeline: &MarkdownPipeline,
        ) -> String {
            let Some(inner) = markdown.strip_prefix("wrap:") else {
                return markdown.to_owned();
            };
            let body = pipeline.render_fragment(inner, ctx);
            ctx.store_fragment(format!("<div>{body}</div>"))
        }
    }

    #[test]
    fn test_empty_pipeline_renders_plain_markdown() {
        let mut ctx = RenderContext::new();
        assert_eq!(MarkdownPipeline::new().render("*a*", &mut ctx), "<p><em>a</em></p>");
    }

    #[test]
    fn test_preprocess_and_postprocess_run() {
        let pipeline = MarkdownPipeline::new().with_plugin(Arc::new(Shout), PluginConfig::default());
        let mut ctx = RenderContext::new();
        let html = pipeline.render("shout", &mut ctx);
        assert_eq!(html, "<p>SHOUT</p><!-- end -->");
        assert_eq!(ctx.warnings(), ["shout ran".to_owned()]);
    }

    #[test]
    fn test_fragments_nest() {
        let pipeline = MarkdownPipeline::new().with_plugin(Arc::new(Wrap), PluginConfig::default());
        let mut ctx = RenderContext::new();
        let html = pipeline.render("wrap:wrap:**x**", &mut ctx);
        assert_eq!(html, "<div><div><p><strong>x</strong></p></div></div>");
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_depth_limit() {
        let pipeline = MarkdownPipeline::new().with_plugin(Arc::new(Wrap), PluginConfig::default());
        let mut ctx = RenderContext::new();
        let source = "wrap:".repeat(MAX_FRAGMENT_DEPTH + 2);
        let html = pipeline.render(&source, &mut ctx);
        assert_eq!(html.matches("<div>").count(), MAX_FRAGMENT_DEPTH);
        assert_eq!(ctx.warnings().len(), 1);
    }

    #[test]
    fn test_names_in_order() {
        let pipeline = MarkdownPipeline::new()
            .with_plugin(Arc::new(Wrap), PluginConfig::default())
            .with_plugin(Arc::new(Shout), PluginConfig::default());
        assert_eq!(pipeline.names().collect::<Vec<_>>(), vec!["wrap", "shout"]);
    }
}
