//! Document publisher.
//!
//! Runs the Markdown phase, wraps the result in the page container and runs
//! the HTML phase with both CSS variable passes.

use std::sync::Arc;

use plume_assets::AssetLoader;
use plume_config::{ConfigManager, LinkDescriptionMode, Settings};
use plume_html::HtmlContext;
use plume_html::css::{CssVariables, resolve_inline_styles, resolve_style_blocks};
use plume_renderer::RenderContext;

use crate::registry::{PluginManager, PluginRegistry};

/// Id of the element wrapping the rendered document.
pub const CONTAINER_ID: &str = "plume";

/// Result of rendering one document.
#[derive(Clone, Debug, Default)]
pub struct RenderOutput {
    /// Final HTML.
    pub html: String,
    /// Non-fatal problems, in the order they were found.
    pub warnings: Vec<String>,
    /// Numbered footnotes.
    pub footnote_count: usize,
    /// Rendered callouts, nested ones included.
    pub callout_count: usize,
    /// External links moved to the notes section.
    pub link_note_count: usize,
}

/// Renders Markdown documents with a fixed set of settings.
///
/// Holds configuration only; every call to [`Publisher::render`] allocates
/// its own render state, so one publisher can serve several threads.
pub struct Publisher {
    manager: PluginManager,
    constrained: bool,
    link_mode: LinkDescriptionMode,
    theme_color: Option<String>,
    theme_css: Option<String>,
    highlight_css: Option<String>,
    setup_warnings: Vec<String>,
}

impl Publisher {
    /// Create a publisher with the built-in plugins.
    #[must_use]
    pub fn new(settings: &Settings, assets: Arc<dyn AssetLoader>) -> Self {
        let registry = PluginRegistry::with_builtins(Arc::clone(&assets));
        Self::with_registry(settings, &registry, assets.as_ref())
    }

    /// Create a publisher over a custom registry.
    #[must_use]
    pub fn with_registry(
        settings: &Settings,
        registry: &PluginRegistry,
        assets: &dyn AssetLoader,
    ) -> Self {
        let manager = PluginManager::new(registry, &ConfigManager::from_settings(settings));
        let constrained = settings.platform_constrained_mode;

        let mut setup_warnings = Vec::new();
        let style = settings.default_highlight_style.trim();
        let highlight_css = if constrained && !style.is_empty() {
            let css = assets.highlight(style);
            if css.is_none() {
                tracing::warn!(style, "Highlight style not found");
                setup_warnings.push(format!("highlight style {style:?} not found"));
            }
            css
        } else {
            None
        };

        Self {
            manager,
            constrained,
            link_mode: settings.link_description_mode,
            theme_color: settings
                .enable_theme_color
                .then(|| settings.theme_color.clone()),
            theme_css: None,
            highlight_css,
            setup_warnings,
        }
    }

    /// Add a theme stylesheet, placed in a `<style>` block before the content.
    #[must_use]
    pub fn with_theme_css(mut self, css: impl Into<String>) -> Self {
        self.theme_css = Some(css.into());
        self
    }

    /// Resolved plugins, for listings.
    #[must_use]
    pub fn manager(&self) -> &PluginManager {
        &self.manager
    }

    /// Render a Markdown document (front matter already stripped).
    #[must_use]
    pub fn render(&self, markdown: &str) -> RenderOutput {
        let mut ctx = RenderContext::new();
        let body = self.manager.markdown().render(markdown, &mut ctx);
        let footnote_count = ctx.footnotes().references().len();
        let callout_count = ctx.callout_count();

        let mut warnings = self.setup_warnings.clone();
        warnings.extend(ctx.into_warnings());

        let (html, html_ctx) = self.run_html(self.wrap(&body));
        warnings.extend_from_slice(html_ctx.warnings());

        tracing::debug!(
            footnotes = footnote_count,
            callouts = callout_count,
            link_notes = html_ctx.link_notes(),
            warnings = warnings.len(),
            "Rendered document"
        );

        RenderOutput {
            html,
            warnings,
            footnote_count,
            callout_count,
            link_note_count: html_ctx.link_notes(),
        }
    }

    /// Run only the HTML phase over already rendered HTML.
    #[must_use]
    pub fn process_html(&self, html: &str) -> RenderOutput {
        let (html, ctx) = self.run_html(html.to_owned());
        let mut warnings = self.setup_warnings.clone();
        warnings.extend_from_slice(ctx.warnings());
        RenderOutput {
            html,
            warnings,
            link_note_count: ctx.link_notes(),
            ..RenderOutput::default()
        }
    }

    fn wrap(&self, body: &str) -> String {
        let mut html = String::new();
        if let Some(css) = &self.theme_css {
            html.push_str("<style>");
            if !self.constrained {
                let vars = CssVariables::with_defaults(self.theme_color.as_deref());
                html.push_str(&vars.root_block());
                html.push('\n');
            }
            html.push_str(css);
            html.push_str("</style>");
        }
        html.push_str(&format!(r#"<section id="{CONTAINER_ID}">{body}</section>"#));
        html
    }

    fn run_html(&self, mut html: String) -> (String, HtmlContext) {
        if let Some(css) = &self.highlight_css {
            html = format!("<style>{css}</style>{html}");
        }

        // The theme's `:root` block is gone from already processed HTML, so it
        // is collected here as well to keep a second pass stable.
        let mut vars = CssVariables::with_defaults(self.theme_color.as_deref());
        if let Some(css) = &self.theme_css
            && let Err(e) = vars.collect_root(css)
        {
            tracing::warn!(error = %e, "Ignoring unreadable theme variables");
        }
        vars.collect_from_html(&html);
        if self.constrained {
            html = resolve_style_blocks(&html, &vars);
        }

        let mut ctx = HtmlContext::new(self.constrained, self.link_mode, vars);
        html = self.manager.run_html(html, &mut ctx);

        if self.constrained {
            html = resolve_inline_styles(&html, &ctx.vars);
        }
        (html, ctx)
    }
}
