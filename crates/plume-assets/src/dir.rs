//! Assets read from a user directory.

use std::path::{Path, PathBuf};

use crate::{AssetError, AssetLoader, asset_path, highlight_name};

/// Loader reading `icons/<name>.svg` and `highlight/<name>.css` under a root
/// directory.
#[derive(Clone, Debug)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    /// Create a loader rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read an asset, `Ok(None)` when the file does not exist.
    fn read(&self, dir: &str, name: &str, ext: &str) -> Result<Option<String>, AssetError> {
        let rel = asset_path(dir, name, ext)?;
        match std::fs::read_to_string(self.root.join(&rel)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(AssetError::Encoding(rel)),
            Err(source) => Err(AssetError::Io { path: rel, source }),
        }
    }

    fn read_logged(&self, dir: &str, name: &str, ext: &str) -> Option<String> {
        self.read(dir, name, ext).unwrap_or_else(|e| {
            tracing::warn!(root = %self.root.display(), error = %e, "Failed to load asset");
            None
        })
    }
}

impl AssetLoader for DirAssets {
    fn load_icon(&self, name: &str) -> Option<String> {
        self.read_logged("icons", name, "svg")
    }

    fn highlight(&self, name: &str) -> Option<String> {
        self.read_logged("highlight", name, "css")
    }

    fn highlights(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.root.join("highlight")) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| {
                let file = entry.file_name();
                highlight_name(&format!("highlight/{}", file.to_string_lossy()))
            })
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("icons")).unwrap();
        std::fs::create_dir_all(dir.path().join("highlight")).unwrap();
        std::fs::write(dir.path().join("icons/rocket.svg"), "<svg>rocket</svg>").unwrap();
        std::fs::write(dir.path().join("highlight/solar.css"), ".hljs { color: red; }").unwrap();
        std::fs::write(dir.path().join("highlight/mono.css"), ".hljs { color: black; }").unwrap();
        std::fs::write(dir.path().join("highlight/README.md"), "not a theme").unwrap();
        dir
    }

    #[test]
    fn test_load_icon() {
        let dir = fixture();
        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.load_icon("rocket"), Some("<svg>rocket</svg>".to_owned()));
        assert_eq!(assets.load_icon("missing"), None);
    }

    #[test]
    fn test_load_highlight() {
        let dir = fixture();
        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.highlight("solar"), Some(".hljs { color: red; }".to_owned()));
    }

    #[test]
    fn test_traversal_rejected() {
        let dir = fixture();
        let assets = DirAssets::new(dir.path().join("icons"));
        assert_eq!(assets.load_icon("../icons/rocket"), None);
        assert!(matches!(
            assets.read("icons", "../x", "svg"),
            Err(AssetError::InvalidName(_))
        ));
    }

    #[test]
    fn test_highlights_listing() {
        let dir = fixture();
        let assets = DirAssets::new(dir.path());
        assert_eq!(assets.highlights(), vec!["mono".to_owned(), "solar".to_owned()]);
    }

    #[test]
    fn test_missing_root() {
        let assets = DirAssets::new("/nonexistent/plume/assets");
        assert!(assets.highlights().is_empty());
        assert!(assets.highlight("github").is_none());
    }
}
