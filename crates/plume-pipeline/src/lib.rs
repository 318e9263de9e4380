//! Plugin registry and document publisher for plume.
//!
//! Ties the Markdown phase (`plume-renderer`) and the HTML phase
//! (`plume-html`) together:
//!
//! 1. markdown plugins preprocess the source, pulldown-cmark renders it and
//!    the plugins finish the HTML
//! 2. the result is wrapped in `<section id="plume">`, after the optional
//!    theme stylesheet
//! 3. in platform-constrained mode the highlight stylesheet is injected and
//!    CSS variables in `<style>` blocks are resolved
//! 4. the HTML plugins run in registration order
//! 5. in platform-constrained mode remaining `var()` in inline styles are
//!    resolved
//!
//! ```
//! use std::sync::Arc;
//!
//! use plume_assets::NoAssets;
//! use plume_config::Settings;
//! use plume_pipeline::Publisher;
//!
//! let publisher = Publisher::new(&Settings::default(), Arc::new(NoAssets));
//! let out = publisher.render("## Hello\n\nSee [docs](https://example.com).\n");
//! assert!(out.html.starts_with(r#"<section id="plume">"#));
//! assert_eq!(out.link_note_count, 1);
//! ```

mod publisher;
mod registry;

pub use publisher::{CONTAINER_ID, Publisher, RenderOutput};
pub use registry::{Phase, Plugin, PluginInfo, PluginManager, PluginRegistry};
