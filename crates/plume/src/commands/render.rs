//! `plume render` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use plume_config::{CliSettings, Settings};
use plume_pipeline::{Publisher, RenderOutput};

use super::asset_loader;
use crate::error::CliError;
use crate::front_matter::strip_front_matter;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to the markdown file.
    input: PathBuf,

    /// Write HTML to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover plume.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inline all styles and normalize links (overrides config).
    #[arg(long)]
    constrained: bool,

    /// Keep stylesheets, variables and links as they are.
    #[arg(long, conflicts_with = "constrained")]
    no_constrained: bool,

    /// Theme stylesheet (overrides config).
    #[arg(long)]
    theme: Option<PathBuf>,

    /// Directory with `icons/` and `highlight/` assets (overrides config).
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Code highlight style name (overrides config).
    #[arg(long)]
    highlight: Option<String>,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if settings, input or theme cannot be read, or the
    /// output cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            platform_constrained_mode: self.resolve_constrained(),
            theme: self.theme.clone(),
            assets_dir: self.assets.clone(),
            default_highlight_style: self.highlight.clone(),
        };
        let settings = Settings::load(self.config.as_deref(), Some(&cli_settings))?;

        let markdown = read(&self.input)?;
        let mut publisher = Publisher::new(&settings, asset_loader(&settings));
        if let Some(path) = &settings.theme_path {
            publisher = publisher.with_theme_css(read(path)?);
        }

        tracing::info!(
            input = %self.input.display(),
            constrained = settings.platform_constrained_mode,
            "Rendering"
        );
        let result = publisher.render(strip_front_matter(&markdown));

        for warning in &result.warnings {
            output.warning(&format!("Warning: {warning}"));
        }

        match &self.output {
            Some(path) => {
                std::fs::write(path, &result.html).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?;
                output.success(&format!("Wrote {}", path.display()));
                print_summary(&output, &result);
            }
            None => Output::stdout().raw(&result.html)?,
        }
        Ok(())
    }

    fn resolve_constrained(&self) -> Option<bool> {
        if self.constrained {
            Some(true)
        } else if self.no_constrained {
            Some(false)
        } else {
            None
        }
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn print_summary(output: &Output, result: &RenderOutput) {
    output.info(&format!(
        "  {} footnotes, {} callouts, {} link notes",
        result.footnote_count, result.callout_count, result.link_note_count
    ));
}
