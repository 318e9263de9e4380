//! `plume highlights` command implementation.

use std::path::PathBuf;

use clap::Args;
use plume_config::{CliSettings, Settings};

use super::asset_loader;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the highlights command.
#[derive(Args)]
pub(crate) struct HighlightsArgs {
    /// Path to configuration file (default: auto-discover plume.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory with `highlight/` stylesheets (overrides config).
    #[arg(long)]
    assets: Option<PathBuf>,
}

impl HighlightsArgs {
    /// Execute the highlights command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings cannot be loaded.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            assets_dir: self.assets,
            ..CliSettings::default()
        };
        let settings = Settings::load(self.config.as_deref(), Some(&cli_settings))?;
        let names = asset_loader(&settings).highlights();

        if names.is_empty() {
            Output::new().warning("No highlight styles found");
            return Ok(());
        }
        let output = Output::stdout();
        for name in names {
            if name == settings.default_highlight_style {
                output.success(&format!("{name} (default)"));
            } else {
                output.info(&name);
            }
        }
        Ok(())
    }
}
