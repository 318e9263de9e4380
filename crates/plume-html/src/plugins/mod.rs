//! HTML-phase plugin API and the built-in plugins.

mod blockquote;
mod code_block;
mod heading;
mod platform;
mod table;

pub use blockquote::BlockquotePlugin;
pub use code_block::CodeBlockPlugin;
pub use heading::HeadingStylePlugin;
pub use platform::PlatformAdapterPlugin;
pub use table::TablePlugin;

use plume_config::{ConfigSchema, LinkDescriptionMode, PluginConfig};

use crate::css::CssVariables;
use crate::error::HtmlError;
use crate::tree::{Ancestor, Element, Fragment};

/// Per-render state of the HTML phase.
#[derive(Clone, Debug, Default)]
pub struct HtmlContext {
    /// Platform-constrained output (inline styles only).
    pub constrained: bool,
    /// How external links are described in the notes section.
    pub link_mode: LinkDescriptionMode,
    /// Variable table of this render.
    pub vars: CssVariables,
    link_notes: usize,
    warnings: Vec<String>,
}

impl HtmlContext {
    /// Create a context for one render.
    #[must_use]
    pub fn new(constrained: bool, link_mode: LinkDescriptionMode, vars: CssVariables) -> Self {
        Self {
            constrained,
            link_mode,
            vars,
            link_notes: 0,
            warnings: Vec::new(),
        }
    }

    /// Literal value of a variable, for stylers that write fixed styles.
    #[must_use]
    pub fn literal(&self, name: &str) -> String {
        self.vars.literal(name)
    }

    /// Record external links moved to the notes section.
    pub fn add_link_notes(&mut self, count: usize) {
        self.link_notes += count;
    }

    /// Number of link notes produced so far.
    #[must_use]
    pub fn link_notes(&self) -> usize {
        self.link_notes
    }

    /// Record a non-fatal problem.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// An HTML-phase transformation.
///
/// Plugins hold configuration only and see the whole document as a string.
/// Errors are caught by [`apply`], which keeps the plugin's input.
pub trait HtmlPlugin: Send + Sync {
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

    /// Transform the document.
    fn process(
        &self,
        html: &str,
        config: &PluginConfig,
        ctx: &mut HtmlContext,
    ) -> Result<String, HtmlError>;
}

/// Run a plugin, failing open.
///
/// A disabled plugin returns its input untouched. A failing plugin logs a
/// warning and returns its input untouched; later plugins still run.
pub fn apply(
    plugin: &dyn HtmlPlugin,
    html: String,
    config: &PluginConfig,
    ctx: &mut HtmlContext,
) -> String {
    if !config.enabled {
        return html;
    }
    match plugin.process(&html, config, ctx) {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!(plugin = plugin.name(), error = %e, "HTML plugin failed, keeping its input");
            ctx.warn(format!("{}: {e}", plugin.name()));
            html
        }
    }
}

/// Parse, visit every element, serialize.
pub(crate) fn edit_elements(
    html: &str,
    mut f: impl FnMut(&mut Element, &[Ancestor]),
) -> Result<String, HtmlError> {
    let mut fragment = Fragment::parse(html)?;
    fragment.for_each_element_mut(&mut f);
    Ok(fragment.to_html())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl HtmlPlugin for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn process(
            &self,
            _html: &str,
            _config: &PluginConfig,
            _ctx: &mut HtmlContext,
        ) -> Result<String, HtmlError> {
            Err(crate::error::CssError::UnterminatedBlock("p".to_owned()).into())
        }
    }

    struct Upper;

    impl HtmlPlugin for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn process(
            &self,
            html: &str,
            _config: &PluginConfig,
            _ctx: &mut HtmlContext,
        ) -> Result<String, HtmlError> {
            Ok(html.to_uppercase())
        }
    }

    #[test]
    fn test_failing_plugin_keeps_input() {
        let mut ctx = HtmlContext::default();
        let config = PluginConfig::new(true, Default::default());
        let out = apply(&Broken, "<p>x</p>".to_owned(), &config, &mut ctx);
        assert_eq!(out, "<p>x</p>");
        assert_eq!(ctx.warnings().len(), 1);
        assert!(ctx.warnings()[0].starts_with("broken:"));
    }

    #[test]
    fn test_disabled_plugin_is_identity() {
        let mut ctx = HtmlContext::default();
        let out = apply(&Upper, "<p>x</p>".to_owned(), &PluginConfig::default(), &mut ctx);
        assert_eq!(out, "<p>x</p>");
        let enabled = PluginConfig::new(true, Default::default());
        assert_eq!(apply(&Upper, "<p>x</p>".to_owned(), &enabled, &mut ctx), "<P>X</P>");
    }
}
