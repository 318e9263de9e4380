//! Built-in assets shipped with plume.
//!
//! - **`embed` feature on**: compiled into the binary via `rust-embed`
//! - **`embed` feature off**: read from the crate's `assets/` directory at runtime

use crate::AssetLoader;

#[cfg(feature = "embed")]
use crate::{asset_path, highlight_name};

/// Embedded assets (only available with `embed` feature).
#[cfg(feature = "embed")]
#[derive(rust_embed::RustEmbed)]
#[folder = "assets"]
#[prefix = ""]
struct Assets;

/// Directory for filesystem-based assets (dev mode).
#[cfg(not(feature = "embed"))]
const DEV_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Loader for the built-in highlight themes and icons.
#[derive(Clone, Copy, Debug, Default)]
pub struct BundledAssets;

#[cfg(feature = "embed")]
impl BundledAssets {
    fn get(dir: &str, name: &str, ext: &str) -> Option<String> {
        let path = asset_path(dir, name, ext).ok()?;
        let file = Assets::get(&path)?;
        match String::from_utf8(file.data.into_owned()) {
            Ok(content) => Some(content),
            Err(_) => {
                tracing::warn!(path = %path, "Embedded asset is not valid UTF-8");
                None
            }
        }
    }
}

#[cfg(feature = "embed")]
impl AssetLoader for BundledAssets {
    fn load_icon(&self, name: &str) -> Option<String> {
        Self::get("icons", name, "svg")
    }

    fn highlight(&self, name: &str) -> Option<String> {
        Self::get("highlight", name, "css")
    }

    fn highlights(&self) -> Vec<String> {
        let mut names: Vec<String> = Assets::iter().filter_map(|p| highlight_name(&p)).collect();
        names.sort();
        names
    }
}

#[cfg(not(feature = "embed"))]
impl BundledAssets {
    fn dir() -> crate::DirAssets {
        crate::DirAssets::new(DEV_DIR)
    }
}

#[cfg(not(feature = "embed"))]
impl AssetLoader for BundledAssets {
    fn load_icon(&self, name: &str) -> Option<String> {
        Self::dir().load_icon(name)
    }

    fn highlight(&self, name: &str) -> Option<String> {
        Self::dir().highlight(name)
    }

    fn highlights(&self) -> Vec<String> {
        Self::dir().highlights()
    }
}
