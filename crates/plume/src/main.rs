//! plume CLI - Markdown to platform-constrained HTML.
//!
//! Provides commands for:
//! - `render`: Render a Markdown file to HTML
//! - `plugins`: List plugins with their state and configuration
//! - `highlights`: List available code highlight styles

mod commands;
mod error;
mod front_matter;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{HighlightsArgs, PluginsArgs, RenderArgs};
use output::Output;

/// plume - Markdown to platform-constrained HTML.
#[derive(Parser)]
#[command(name = "plume", version, about)]
struct Cli {
    /// Enable verbose output (info-level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file to HTML.
    Render(RenderArgs),
    /// List plugins, their phase, state and configuration.
    Plugins(PluginsArgs),
    /// List available code highlight styles.
    Highlights(HighlightsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Plugins(args) => args.execute(),
        Commands::Highlights(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
