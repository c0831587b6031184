//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Preview a Markdown file in the browser
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Markdown file to preview (default: README.md in the current directory)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Re-render and reload the browser when the file changes
    #[arg(short, long)]
    pub watch: bool,

    /// Host name or address to bind (e.g., localhost, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Do not open the browser at startup
    #[arg(long)]
    pub no_open: bool,

    /// Config file path (default: mdpeek.toml, optional)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Show debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
