//! Per-plugin configuration store.

use std::collections::BTreeMap;

use crate::schema::{ConfigSchema, ConfigValue, PluginConfig};
use crate::{PluginSettings, Settings};

/// Holds user-provided plugin settings and resolves them against declared schemas.
///
/// This is the only state that lives across renders. Values that are missing or
/// fail validation fall back to the schema default and produce a warning; they
/// never make resolution fail.
#[derive(Clone, Debug, Default)]
pub struct ConfigManager {
    plugins: BTreeMap<String, PluginSettings>,
}

impl ConfigManager {
    /// Create an empty manager (every plugin uses its defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager from the `[plugins.*]` tables of loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            plugins: settings.plugins.clone(),
        }
    }

    /// Set the enable flag of a plugin.
    pub fn set_enabled(&mut self, plugin: &str, enabled: bool) {
        self.plugins.entry(plugin.to_owned()).or_default().enabled = Some(enabled);
    }

    /// Set a single configuration value of a plugin.
    pub fn set_value(&mut self, plugin: &str, key: &str, value: impl Into<ConfigValue>) {
        self.plugins
            .entry(plugin.to_owned())
            .or_default()
            .config
            .insert(key.to_owned(), value.into());
    }

    /// Names of the plugins that have user settings.
    pub fn configured(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Enable flag explicitly set by the user, if any.
    #[must_use]
    pub fn enabled_override(&self, plugin: &str) -> Option<bool> {
        self.plugins.get(plugin).and_then(|p| p.enabled)
    }

    /// Resolve the effective configuration of a plugin.
    ///
    /// `default_enabled` is used when the user did not set `enabled`.
    #[must_use]
    pub fn resolve(&self, plugin: &str, schema: &ConfigSchema, default_enabled: bool) -> PluginConfig {
        let mut values = schema.defaults();
        let user = self.plugins.get(plugin);

        if let Some(user) = user {
            for (key, value) in &user.config {
                let Some(field) = schema.get(key) else {
                    tracing::warn!(plugin, key = %key, "Ignoring unknown plugin setting");
                    continue;
                };
                match field.spec.validate(key, value) {
                    Ok(valid) => {
                        values.insert(key.clone(), valid);
                    }
                    Err(e) => {
                        tracing::warn!(plugin, error = %e, "Invalid plugin setting, using default");
                    }
                }
            }
        }

        let enabled = self.enabled_override(plugin).unwrap_or(default_enabled);
        PluginConfig::new(enabled, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ConfigSchema {
        ConfigSchema::new()
            .switch("striped", "Zebra rows", true)
            .select("mode", "Mode", &["raw", "link"], "link")
    }

    #[test]
    fn test_defaults_when_unset() {
        let manager = ConfigManager::new();
        let config = manager.resolve("table", &schema(), true);
        assert!(config.enabled);
        assert!(config.bool("striped"));
        assert_eq!(config.text("mode"), "link");
    }

    #[test]
    fn test_user_values_override_defaults() {
        let mut manager = ConfigManager::new();
        manager.set_value("table", "striped", false);
        manager.set_enabled("table", false);
        let config = manager.resolve("table", &schema(), true);
        assert!(!config.enabled);
        assert!(!config.bool("striped"));
    }

    #[test]
    fn test_invalid_value_falls_back() {
        let mut manager = ConfigManager::new();
        manager.set_value("table", "mode", "fancy");
        manager.set_value("table", "striped", "yes");
        let config = manager.resolve("table", &schema(), true);
        assert_eq!(config.text("mode"), "link");
        assert!(config.bool("striped"));
    }

    #[test]
    fn test_unknown_key_ignored() {
        let mut manager = ConfigManager::new();
        manager.set_value("table", "colour", "red");
        let config = manager.resolve("table", &schema(), true);
        assert!(config.get("colour").is_none());
    }

    #[test]
    fn test_enable_flag_overrides_default() {
        let mut manager = ConfigManager::new();
        manager.set_enabled("table", true);
        assert_eq!(manager.enabled_override("table"), Some(true));
        assert_eq!(manager.enabled_override("heading"), None);
        assert!(manager.resolve("table", &schema(), false).enabled);
        assert!(!manager.resolve("heading", &schema(), false).enabled);
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::from_toml_str(
            r#"
[plugins.table]
enabled = false
[plugins.table.config]
mode = "raw"
"#,
        )
        .unwrap();
        let manager = ConfigManager::from_settings(&settings);
        assert_eq!(manager.enabled_override("table"), Some(false));
        assert_eq!(manager.configured().collect::<Vec<_>>(), vec!["table"]);
        let config = manager.resolve("table", &schema(), true);
        assert_eq!(config.text("mode"), "raw");
    }
}
