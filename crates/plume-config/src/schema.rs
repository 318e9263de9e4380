//! Declared configuration schema for plugins.
//!
//! Every plugin declares its configurable fields as a [`ConfigSchema`]. User
//! values from `plume.toml` are validated against the declared [`FieldSpec`]
//! and fall back to the field default when missing or invalid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A single configuration value as written in `plume.toml`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Boolean value (`switch` fields).
    Bool(bool),
    /// Integer value, accepted by `text` fields and converted to its decimal form.
    Integer(i64),
    /// String value (`select` and `text` fields).
    Text(String),
}

impl ConfigValue {
    /// Return the boolean value, if this is a `Bool`.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the string value, if this is a `Text`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Kind and default of a configurable plugin field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSpec {
    /// On/off toggle.
    Switch {
        /// Value used when the user sets nothing (or something invalid).
        default: bool,
    },
    /// One value out of a fixed list of options.
    Select {
        /// Allowed values.
        options: &'static [&'static str],
        /// Value used when the user sets nothing (or something invalid).
        default: &'static str,
    },
    /// Free-form text.
    Text {
        /// Value used when the user sets nothing.
        default: &'static str,
    },
}

impl FieldSpec {
    /// Default value for this field.
    #[must_use]
    pub fn default_value(&self) -> ConfigValue {
        match self {
            Self::Switch { default } => ConfigValue::Bool(*default),
            Self::Select { default, .. } | Self::Text { default } => {
                ConfigValue::Text((*default).to_owned())
            }
        }
    }

    /// Short name of the field kind, used in listings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Switch { .. } => "switch",
            Self::Select { .. } => "select",
            Self::Text { .. } => "text",
        }
    }

    /// Validate a user value against this field.
    ///
    /// Returns the normalized value on success.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` when the value has the wrong type or is not
    /// one of the declared options.
    pub fn validate(&self, key: &str, value: &ConfigValue) -> Result<ConfigValue, ConfigError> {
        match (self, value) {
            (Self::Switch { .. }, ConfigValue::Bool(b)) => Ok(ConfigValue::Bool(*b)),
            (Self::Switch { .. }, other) => Err(ConfigError::Validation(format!(
                "{key} expects true or false, got {other:?}"
            ))),
            (Self::Select { options, .. }, ConfigValue::Text(s)) => {
                if options.contains(&s.as_str()) {
                    Ok(ConfigValue::Text(s.clone()))
                } else {
                    Err(ConfigError::Validation(format!(
                        "{key} must be one of {}, got \"{s}\"",
                        options.join(", ")
                    )))
                }
            }
            (Self::Select { .. }, other) => Err(ConfigError::Validation(format!(
                "{key} expects a string option, got {other:?}"
            ))),
            (Self::Text { .. }, ConfigValue::Text(s)) => Ok(ConfigValue::Text(s.clone())),
            (Self::Text { .. }, ConfigValue::Integer(n)) => Ok(ConfigValue::Text(n.to_string())),
            (Self::Text { .. }, ConfigValue::Bool(b)) => Err(ConfigError::Validation(format!(
                "{key} expects text, got {b}"
            ))),
        }
    }
}

/// A declared, labelled field of a plugin schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaField {
    /// Key used in `plume.toml`.
    pub key: &'static str,
    /// Human-readable description.
    pub label: &'static str,
    /// Kind and default.
    pub spec: FieldSpec,
}

/// Ordered set of fields a plugin accepts.
///
/// # Example
///
/// ```
/// use plume_config::{ConfigSchema, ConfigValue};
///
/// let schema = ConfigSchema::new()
///     .switch("numbering", "Number headings", false)
///     .select("numbering_level", "Level to number", &["h1", "h2", "h3"], "h2");
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(
///     schema.get("numbering_level").unwrap().spec.default_value(),
///     ConfigValue::Text("h2".to_owned())
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigSchema {
    fields: Vec<SchemaField>,
}

impl ConfigSchema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `switch` field.
    #[must_use]
    pub fn switch(self, key: &'static str, label: &'static str, default: bool) -> Self {
        self.field(key, label, FieldSpec::Switch { default })
    }

    /// Add a `select` field.
    #[must_use]
    pub fn select(
        self,
        key: &'static str,
        label: &'static str,
        options: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        self.field(key, label, FieldSpec::Select { options, default })
    }

    /// Add a `text` field.
    #[must_use]
    pub fn text(self, key: &'static str, label: &'static str, default: &'static str) -> Self {
        self.field(key, label, FieldSpec::Text { default })
    }

    fn field(mut self, key: &'static str, label: &'static str, spec: FieldSpec) -> Self {
        self.fields.push(SchemaField { key, label, spec });
        self
    }

    /// Look up a field by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Iterate fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter()
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Default values for every declared field.
    #[must_use]
    pub fn defaults(&self) -> BTreeMap<String, ConfigValue> {
        self.fields
            .iter()
            .map(|f| (f.key.to_owned(), f.spec.default_value()))
            .collect()
    }
}

/// Resolved configuration handed to a plugin: enable flag plus one value per
/// declared field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PluginConfig {
    /// Whether the plugin runs.
    pub enabled: bool,
    values: BTreeMap<String, ConfigValue>,
}

impl PluginConfig {
    /// Create a config from explicit values.
    #[must_use]
    pub fn new(enabled: bool, values: BTreeMap<String, ConfigValue>) -> Self {
        Self { enabled, values }
    }

    /// Enabled config holding the schema defaults.
    #[must_use]
    pub fn with_defaults(schema: &ConfigSchema) -> Self {
        Self::new(true, schema.defaults())
    }

    /// Override a single value (builder style).
    #[must_use]
    pub fn with_value(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.to_owned(), value.into());
        self
    }

    /// Raw value lookup.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Boolean value of a `switch` field; `false` when absent.
    #[must_use]
    pub fn bool(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(false)
    }

    /// String value of a `select` or `text` field; empty when absent.
    #[must_use]
    pub fn text(&self, key: &str) -> &str {
        self.values
            .get(key)
            .and_then(ConfigValue::as_str)
            .unwrap_or("")
    }

    /// Iterate all values in key order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading_schema() -> ConfigSchema {
        ConfigSchema::new()
            .switch("numbering", "Number headings", false)
            .select("numbering_level", "Level", &["h1", "h2", "h3"], "h2")
            .text("numbering_template", "Template", "{number}. ")
    }

    #[test]
    fn test_defaults_follow_declaration() {
        let defaults = heading_schema().defaults();
        assert_eq!(defaults["numbering"], ConfigValue::Bool(false));
        assert_eq!(defaults["numbering_level"], ConfigValue::from("h2"));
        assert_eq!(defaults["numbering_template"], ConfigValue::from("{number}. "));
    }

    #[test]
    fn test_switch_rejects_text() {
        let spec = FieldSpec::Switch { default: true };
        let err = spec.validate("numbering", &ConfigValue::from("yes")).unwrap_err();
        assert!(err.to_string().contains("numbering"));
    }

    #[test]
    fn test_select_rejects_unknown_option() {
        let spec = FieldSpec::Select {
            options: &["raw", "link"],
            default: "link",
        };
        assert_eq!(
            spec.validate("mode", &ConfigValue::from("raw")).unwrap(),
            ConfigValue::from("raw")
        );
        assert!(spec.validate("mode", &ConfigValue::from("fancy")).is_err());
    }

    #[test]
    fn test_text_accepts_integer() {
        let spec = FieldSpec::Text { default: "" };
        assert_eq!(
            spec.validate("width", &ConfigValue::Integer(42)).unwrap(),
            ConfigValue::from("42")
        );
    }

    #[test]
    fn test_plugin_config_getters() {
        let config = PluginConfig::with_defaults(&heading_schema()).with_value("numbering", true);
        assert!(config.bool("numbering"));
        assert_eq!(config.text("numbering_level"), "h2");
        assert_eq!(config.text("missing"), "");
        assert!(!config.bool("missing"));
    }

    #[test]
    fn test_schema_lookup() {
        let schema = heading_schema();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.get("numbering").unwrap().spec.kind(), "switch");
        assert!(schema.get("nope").is_none());
    }
}
