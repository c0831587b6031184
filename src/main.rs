//! mdpeek - preview a Markdown file in the browser, with live reload.

mod cli;
mod config;
mod core;
mod document;
mod embed;
mod logger;
mod preview;
mod utils;
mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PreviewConfig;
use document::Document;
use preview::Preview;

fn main() {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    if let Err(e) = run(&cli) {
        log!("error"; "{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    core::setup_shutdown_handler()?;

    let config = PreviewConfig::load(cli)?;
    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    let document = Document::resolve(cli.file.as_deref(), &cwd, cli.watch)?;
    let preview = Arc::new(Preview::open(document)?);

    let bound = cli::serve::bind_server(&config.serve)?;
    core::register_server(Arc::clone(bound.server()), Arc::clone(preview.hub()));

    if preview.is_watching() {
        cli::serve::spawn_watcher(Arc::clone(&preview), config.watch.timing())?;
    }

    log!("serve"; "{} at {}", preview.document().title(), bound.url());
    if preview.is_watching() {
        log!("watch"; "watching {} for changes", preview.document().path().display());
    }
    if config.serve.open {
        cli::serve::open_browser(bound.url());
    }

    bound.run(preview, config.serve.heartbeat())
}
