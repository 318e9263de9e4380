//! `plume plugins` command implementation.

use std::path::PathBuf;

use clap::Args;
use plume_config::{ConfigValue, FieldSpec, Settings};
use plume_pipeline::{PluginInfo, Publisher};

use super::asset_loader;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the plugins command.
#[derive(Args)]
pub(crate) struct PluginsArgs {
    /// Path to configuration file (default: auto-discover plume.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl PluginsArgs {
    /// Execute the plugins command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let settings = Settings::load(self.config.as_deref(), None)?;
        let publisher = Publisher::new(&settings, asset_loader(&settings));

        let output = Output::stdout();
        for info in publisher.manager().plugins() {
            print_plugin(&output, info);
        }
        Ok(())
    }
}

fn print_plugin(output: &Output, info: &PluginInfo) {
    let state = if info.config.enabled {
        "enabled"
    } else {
        "disabled"
    };
    output.highlight(&format!(
        "{} [{}] {state}",
        info.plugin.name(),
        info.plugin.phase()
    ));
    let description = info.plugin.description();
    if !description.is_empty() {
        output.muted(&format!("  {description}"));
    }
    for field in info.schema.iter() {
        let current = info
            .config
            .get(field.key)
            .map_or_else(|| "-".to_owned(), display_value);
        output.info(&format!(
            "  {} = {current}  ({}{})",
            field.key,
            describe_spec(&field.spec),
            if field.label.is_empty() {
                String::new()
            } else {
                format!("; {}", field.label)
            }
        ));
    }
}

fn describe_spec(spec: &FieldSpec) -> String {
    let default = display_value(&spec.default_value());
    match spec {
        FieldSpec::Select { options, .. } => {
            format!("select {}, default {default}", options.join("|"))
        }
        other => format!("{}, default {default}", other.kind()),
    }
}

fn display_value(value: &ConfigValue) -> String {
    match value {
        ConfigValue::Bool(b) => b.to_string(),
        ConfigValue::Integer(n) => n.to_string(),
        ConfigValue::Text(s) => format!("{s:?}"),
    }
}
