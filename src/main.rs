use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod domain;
mod services;

use cli::Cli;
use commands::{handle_form_commands, handle_history_commands, handle_runtime_commands};
use config::load_settings;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stderr only, so `--json` stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if handle_form_commands(&cli)? {
        return Ok(());
    }
    if handle_history_commands(&cli)? {
        return Ok(());
    }

    let settings = load_settings(cli.api.as_deref())?;
    handle_runtime_commands(&cli, &settings)
}
