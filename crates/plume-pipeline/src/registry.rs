//! Plugin registration and per-plugin configuration.

use std::fmt;
use std::sync::Arc;

use plume_assets::AssetLoader;
use plume_config::{ConfigManager, ConfigSchema, PluginConfig};
use plume_html::{
    BlockquotePlugin, CodeBlockPlugin, HeadingStylePlugin, HtmlContext, HtmlPlugin,
    PlatformAdapterPlugin, TablePlugin, apply,
};
use plume_renderer::{CalloutPlugin, FootnotePlugin, MarkdownPipeline, MarkdownPlugin};

/// Phase a plugin runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Before and after Markdown rendering.
    Markdown,
    /// On the rendered HTML.
    Html,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
        })
    }
}

/// A registered plugin of either phase.
#[derive(Clone)]
pub enum Plugin {
    /// Markdown-phase plugin.
    Markdown(Arc<dyn MarkdownPlugin>),
    /// HTML-phase plugin.
    Html(Arc<dyn HtmlPlugin>),
}

impl Plugin {
    /// Settings key of the plugin.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Markdown(p) => p.name(),
            Self::Html(p) => p.name(),
        }
    }

    /// One-line description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Markdown(p) => p.description(),
            Self::Html(p) => p.description(),
        }
    }

    /// Declared configuration fields.
    #[must_use]
    pub fn schema(&self) -> ConfigSchema {
        match self {
            Self::Markdown(p) => p.schema(),
            Self::Html(p) => p.schema(),
        }
    }

    /// Phase the plugin runs in.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::Markdown(_) => Phase::Markdown,
            Self::Html(_) => Phase::Html,
        }
    }
}

/// Ordered list of plugins. Execution order is registration order.
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
}

impl PluginRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in plugin in its default order.
    ///
    /// Footnotes run before callouts so footnote numbers follow the text order
    /// of the whole document, including references inside callouts.
    #[must_use]
    pub fn with_builtins(assets: Arc<dyn AssetLoader>) -> Self {
        Self::new()
            .with_markdown(Arc::new(FootnotePlugin))
            .with_markdown(Arc::new(CalloutPlugin::new(assets)))
            .with_html(Arc::new(HeadingStylePlugin))
            .with_html(Arc::new(BlockquotePlugin))
            .with_html(Arc::new(TablePlugin))
            .with_html(Arc::new(CodeBlockPlugin))
            .with_html(Arc::new(PlatformAdapterPlugin))
    }

    /// Register a markdown plugin (builder style).
    #[must_use]
    pub fn with_markdown(mut self, plugin: Arc<dyn MarkdownPlugin>) -> Self {
        self.register(Plugin::Markdown(plugin));
        self
    }

    /// Register an HTML plugin (builder style).
    #[must_use]
    pub fn with_html(mut self, plugin: Arc<dyn HtmlPlugin>) -> Self {
        self.register(Plugin::Html(plugin));
        self
    }

    /// Register a plugin at the end of the order.
    ///
    /// A plugin with the same name replaces the earlier one in place.
    pub fn register(&mut self, plugin: Plugin) {
        if let Some(existing) = self.plugins.iter_mut().find(|p| p.name() == plugin.name()) {
            tracing::warn!(plugin = plugin.name(), "Replacing already registered plugin");
            *existing = plugin;
        } else {
            self.plugins.push(plugin);
        }
    }

    /// Look up a plugin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.name() == name)
    }

    /// Plugins in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.iter()
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// A plugin with its resolved configuration, for listings.
#[derive(Clone)]
pub struct PluginInfo {
    /// The plugin.
    pub plugin: Plugin,
    /// Declared fields.
    pub schema: ConfigSchema,
    /// Effective configuration (includes the enable flag).
    pub config: PluginConfig,
}

/// Registry plus resolved configuration, ready to run both phases.
///
/// Configuration is resolved once at construction; the manager holds no
/// per-render state and can be shared between threads.
#[derive(Clone)]
pub struct PluginManager {
    plugins: Vec<PluginInfo>,
    markdown: MarkdownPipeline,
}

impl PluginManager {
    /// Resolve every registered plugin's configuration.
    #[must_use]
    pub fn new(registry: &PluginRegistry, config: &ConfigManager) -> Self {
        for name in config.configured() {
            if registry.get(name).is_none() {
                tracing::warn!(plugin = name, "Settings for unknown plugin ignored");
            }
        }

        let plugins: Vec<PluginInfo> = registry
            .iter()
            .map(|plugin| {
                let schema = plugin.schema();
                let config = config.resolve(plugin.name(), &schema, true);
                PluginInfo {
                    plugin: plugin.clone(),
                    schema,
                    config,
                }
            })
            .collect();

        let mut markdown = MarkdownPipeline::new();
        for info in &plugins {
            if let Plugin::Markdown(plugin) = &info.plugin
                && info.config.enabled
            {
                markdown.push(Arc::clone(plugin), info.config.clone());
            }
        }

        Self { plugins, markdown }
    }

    /// Every plugin in execution order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginInfo> {
        self.plugins.iter()
    }

    /// Pipeline of the enabled markdown plugins.
    #[must_use]
    pub fn markdown(&self) -> &MarkdownPipeline {
        &self.markdown
    }

    /// Fold the HTML plugins over `html` in registration order.
    ///
    /// Disabled plugins are skipped; a failing plugin keeps its input.
    pub fn run_html(&self, mut html: String, ctx: &mut HtmlContext) -> String {
        for info in &self.plugins {
            if let Plugin::Html(plugin) = &info.plugin {
                html = apply(plugin.as_ref(), html, &info.config, ctx);
            }
        }
        html
    }
}
