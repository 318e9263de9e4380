//! Markdown phase of the plume pipeline.
//!
//! Renders Markdown with pulldown-cmark and extends it through
//! [`MarkdownPlugin`]s:
//!
//! - [`FootnotePlugin`]: `[^id]` references numbered in first-reference order
//! - [`CalloutPlugin`]: `> [!type] Title` blocks rendered as inline-styled boxes
//!
//! All per-render state lives in a [`RenderContext`] allocated for each
//! top-level render.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use plume_config::PluginConfig;
//! use plume_renderer::{CalloutPlugin, FootnotePlugin, MarkdownPipeline, RenderContext};
//!
//! let pipeline = MarkdownPipeline::new()
//!     .with_plugin(Arc::new(FootnotePlugin), PluginConfig::default())
//!     .with_plugin(Arc::new(CalloutPlugin::default()), PluginConfig::default());
//!
//! let mut ctx = RenderContext::new();
//! let html = pipeline.render("> [!tip] Pro Tip\n> Use X.[^1]\n\n[^1]: Really.", &mut ctx);
//! assert!(html.contains(r#"data-type="tip""#));
//! assert!(html.contains(r#"<li id="fn-1">Really."#));
//! ```

pub mod callout;
mod context;
mod fence;
mod footnote;
mod plugin;
mod renderer;
mod state;

pub use callout::{CalloutHeader, CalloutPlugin, Fold};
pub use context::{FootnoteTable, RenderContext};
pub use footnote::FootnotePlugin;
pub use plugin::{MAX_FRAGMENT_DEPTH, MarkdownPipeline, MarkdownPlugin};
pub use renderer::{MarkdownRenderer, parser_options};
pub use state::{HeadingIds, escape_html, slugify};
