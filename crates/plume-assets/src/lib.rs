//! Icon and highlight stylesheet loading for plume.
//!
//! The renderer consumes assets through the [`AssetLoader`] trait:
//!
//! - callout icons for types missing from the built-in table (`icons/<name>.svg`)
//! - code highlight stylesheets (`highlight/<name>.css`)
//!
//! Loaders:
//!
//! - [`DirAssets`]: reads assets from a user directory at runtime
//! - [`BundledAssets`]: built-in highlight themes, compiled into the binary when
//!   the `embed` feature is on, read from the crate's `assets/` directory otherwise
//! - [`ChainAssets`]: asks several loaders in order
//! - [`NoAssets`]: never finds anything

mod bundled;
mod dir;

pub use bundled::BundledAssets;
pub use dir::DirAssets;

/// Asset lookup error.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset name that could escape the asset directory.
    #[error("Invalid asset name: {0:?}")]
    InvalidName(String),
    /// I/O error while reading an asset.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Asset path relative to the loader root.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Asset file is not valid UTF-8.
    #[error("Asset {0} is not valid UTF-8")]
    Encoding(String),
}

/// Source of icons and highlight stylesheets.
///
/// Lookups are synchronous and infallible from the caller's point of view:
/// a missing or unreadable asset is `None`. Bounding slow lookups is the
/// implementation's responsibility.
pub trait AssetLoader: Send + Sync {
    /// SVG markup of the icon named `name`.
    fn load_icon(&self, name: &str) -> Option<String>;

    /// Highlight stylesheet named `name`.
    fn highlight(&self, name: &str) -> Option<String>;

    /// Names of the highlight stylesheets this loader can provide.
    fn highlights(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Loader that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetLoader for NoAssets {
    fn load_icon(&self, _name: &str) -> Option<String> {
        None
    }

    fn highlight(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Loader asking each inner loader in order, returning the first hit.
#[derive(Default)]
pub struct ChainAssets {
    loaders: Vec<Box<dyn AssetLoader>>,
}

impl ChainAssets {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader (builder style).
    #[must_use]
    pub fn with(mut self, loader: impl AssetLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl AssetLoader for ChainAssets {
    fn load_icon(&self, name: &str) -> Option<String> {
        self.loaders.iter().find_map(|l| l.load_icon(name))
    }

    fn highlight(&self, name: &str) -> Option<String> {
        self.loaders.iter().find_map(|l| l.highlight(name))
    }

    fn highlights(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaders.iter().flat_map(|l| l.highlights()).collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Build the relative path of an asset, rejecting names that are not a single
/// plain file name.
pub(crate) fn asset_path(dir: &str, name: &str, ext: &str) -> Result<String, AssetError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..");
    if valid {
        Ok(format!("{dir}/{name}.{ext}"))
    } else {
        Err(AssetError::InvalidName(name.to_owned()))
    }
}

/// Strip `.css` from the file names of a highlight directory listing.
pub(crate) fn highlight_name(file: &str) -> Option<String> {
    file.strip_prefix("highlight/")
        .and_then(|f| f.strip_suffix(".css"))
        .filter(|f| !f.contains('/'))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixed(&'static str);

    impl AssetLoader for Fixed {
        fn load_icon(&self, name: &str) -> Option<String> {
            (name == self.0).then(|| format!("<svg>{name}</svg>"))
        }

        fn highlight(&self, _name: &str) -> Option<String> {
            None
        }

        fn highlights(&self) -> Vec<String> {
            vec![self.0.to_owned()]
        }
    }

    #[test]
    fn test_asset_path() {
        assert_eq!(asset_path("icons", "pin", "svg").unwrap(), "icons/pin.svg");
        assert!(asset_path("icons", "../secret", "svg").is_err());
        assert!(asset_path("icons", "a/b", "svg").is_err());
        assert!(asset_path("icons", ".hidden", "svg").is_err());
        assert!(asset_path("icons", "", "svg").is_err());
    }

    #[test]
    fn test_highlight_name() {
        assert_eq!(highlight_name("highlight/github.css"), Some("github".to_owned()));
        assert_eq!(highlight_name("icons/pin.svg"), None);
        assert_eq!(highlight_name("highlight/nested/x.css"), None);
    }

    #[test]
    fn test_no_assets() {
        assert!(NoAssets.load_icon("note").is_none());
        assert!(NoAssets.highlight("github").is_none());
        assert!(NoAssets.highlights().is_empty());
    }

    #[test]
    fn test_chain_first_hit_wins() {
        let chain = ChainAssets::new().with(Fixed("pin")).with(Fixed("star"));
        assert_eq!(chain.load_icon("star"), Some("<svg>star</svg>".to_owned()));
        assert_eq!(chain.load_icon("moon"), None);
    }

    #[test]
    fn test_chain_highlights_deduplicated() {
        let chain = ChainAssets::new().with(Fixed("b")).with(Fixed("a")).with(Fixed("b"));
        assert_eq!(chain.highlights(), vec!["a".to_owned(), "b".to_owned()]);
    }
}
