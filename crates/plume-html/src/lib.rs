//! HTML phase of the plume pipeline.
//!
//! Rendered Markdown is rewritten by an ordered list of [`HtmlPlugin`]s working
//! on an offline [`tree`]. For platform-constrained output, [`css`] resolves
//! `var()` references before and after the plugins run, and the
//! [`PlatformAdapterPlugin`] inlines the remaining stylesheet rules.
//!
//! # Example
//!
//! ```
//! use plume_config::{LinkDescriptionMode, PluginConfig};
//! use plume_html::css::CssVariables;
//! use plume_html::{BlockquotePlugin, HtmlContext, HtmlPlugin, apply};
//!
//! let mut ctx = HtmlContext::new(true, LinkDescriptionMode::Link, CssVariables::with_defaults(None));
//! let config = PluginConfig::with_defaults(&BlockquotePlugin.schema());
//! let html = apply(&BlockquotePlugin, "<blockquote><p>hi</p></blockquote>".to_owned(), &config, &mut ctx);
//! assert!(html.starts_with(r#"<blockquote style="margin: 1em 0;"#));
//! ```

pub mod css;
mod error;
mod plugins;
pub mod tree;

pub use error::{CssError, HtmlError, TreeError};
pub use plugins::{
    BlockquotePlugin, CodeBlockPlugin, HeadingStylePlugin, HtmlContext, HtmlPlugin,
    PlatformAdapterPlugin, TablePlugin, apply,
};
