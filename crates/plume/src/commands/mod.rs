//! CLI command implementations.

mod highlights;
mod plugins;
mod render;

use std::sync::Arc;

use plume_assets::{AssetLoader, BundledAssets, ChainAssets, DirAssets};
use plume_config::Settings;

pub(crate) use highlights::HighlightsArgs;
pub(crate) use plugins::PluginsArgs;
pub(crate) use render::RenderArgs;

/// User assets directory first, built-in assets second.
fn asset_loader(settings: &Settings) -> Arc<dyn AssetLoader> {
    let mut chain = ChainAssets::new();
    if let Some(dir) = &settings.assets_path {
        chain = chain.with(DirAssets::new(dir));
    }
    Arc::new(chain.with(BundledAssets))
}
