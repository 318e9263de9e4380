//! Configuration management for plume.
//!
//! Parses `plume.toml` settings files with serde and provides auto-discovery
//! of the settings file in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! Plugin configuration is declared by each plugin as a [`ConfigSchema`] and
//! resolved against the user's `[plugins.<name>]` tables by [`ConfigManager`].
//!
//! ## Environment Variable Expansion
//!
//! Path settings support `~`, `${VAR}` and `${VAR:-default}` expansion:
//!
//! - `theme`
//! - `assets_dir`

mod expand;
mod manager;
mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub use manager::ConfigManager;
pub use schema::{ConfigSchema, ConfigValue, FieldSpec, PluginConfig, SchemaField};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "plume.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override platform-constrained mode.
    pub platform_constrained_mode: Option<bool>,
    /// Override the theme stylesheet path.
    pub theme: Option<PathBuf>,
    /// Override the assets directory.
    pub assets_dir: Option<PathBuf>,
    /// Override the code highlight style name.
    pub default_highlight_style: Option<String>,
}

/// How moved external links are described in the trailing notes section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDescriptionMode {
    /// `[n] url`
    Raw,
    /// `[n] text: url`
    #[default]
    Link,
}

/// User settings for one plugin (`[plugins.<name>]`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PluginSettings {
    /// Explicit enable flag; `None` keeps the plugin default.
    pub enabled: Option<bool>,
    /// Raw configuration values, validated later against the plugin schema.
    pub config: BTreeMap<String, ConfigValue>,
}

/// Render settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target a restricted publishing surface: resolve CSS variables, inline
    /// all styles and normalize links.
    pub platform_constrained_mode: bool,
    /// How external links are listed in the notes section.
    pub link_description_mode: LinkDescriptionMode,
    /// Name of the code highlight stylesheet.
    pub default_highlight_style: String,
    /// Whether `theme_color` replaces the default primary colour.
    pub enable_theme_color: bool,
    /// Primary colour used when `enable_theme_color` is set.
    pub theme_color: String,
    /// Theme stylesheet path as written in the file.
    theme: Option<String>,
    /// Assets directory as written in the file.
    assets_dir: Option<String>,
    /// Per-plugin settings keyed by plugin name.
    pub plugins: BTreeMap<String, PluginSettings>,

    /// Resolved theme stylesheet path (set after loading).
    #[serde(skip)]
    pub theme_path: Option<PathBuf>,
    /// Resolved assets directory (set after loading).
    #[serde(skip)]
    pub assets_path: Option<PathBuf>,
    /// Path to the settings file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            platform_constrained_mode: true,
            link_description_mode: LinkDescriptionMode::default(),
            default_highlight_style: "github".to_owned(),
            enable_theme_color: false,
            theme_color: "#0F4C81".to_owned(),
            theme: None,
            assets_dir: None,
            plugins: BTreeMap::new(),
            theme_path: None,
            assets_path: None,
            config_path: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Setting name (e.g., "`theme`").
        field: String,
        /// Error message (e.g., "${`THEME_DIR`} not set").
        message: String,
    },
}

impl Settings {
    /// Load settings from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `plume.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut settings = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(cli) = cli_settings {
            settings.apply_cli_settings(cli);
        }

        Ok(settings)
    }

    /// Parse settings from TOML text without path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, cli: &CliSettings) {
        if let Some(constrained) = cli.platform_constrained_mode {
            self.platform_constrained_mode = constrained;
        }
        if let Some(theme) = &cli.theme {
            self.theme_path = Some(theme.clone());
        }
        if let Some(assets_dir) = &cli.assets_dir {
            self.assets_path = Some(assets_dir.clone());
        }
        if let Some(style) = &cli.default_highlight_style {
            self.default_highlight_style.clone_from(style);
        }
    }

    /// Search for settings file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        discover_from(&current)
    }

    /// Load settings from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: Self = toml::from_str(&content)?;

        settings.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        settings.resolve_paths(config_dir);
        settings.config_path = Some(path.to_path_buf());

        settings.validate()?;

        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Validate settings values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_highlight_style.trim().is_empty() {
            return Err(ConfigError::Validation(
                "default_highlight_style cannot be empty".to_owned(),
            ));
        }
        if self.enable_theme_color && !is_hex_color(&self.theme_color) {
            return Err(ConfigError::Validation(format!(
                "theme_color must be a hex colour like #0F4C81, got \"{}\"",
                self.theme_color
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in path settings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref theme) = self.theme {
            self.theme = Some(expand::expand_env(theme, "theme")?);
        }
        if let Some(ref assets_dir) = self.assets_dir {
            self.assets_dir = Some(expand::expand_env(assets_dir, "assets_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the settings file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.theme_path = self.theme.as_deref().map(|t| config_dir.join(t));
        self.assets_path = self.assets_dir.as_deref().map(|a| config_dir.join(a));
    }
}

/// Walk up from `start` looking for `plume.toml`.
fn discover_from(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Check for `#RGB` or `#RRGGBB`.
fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
