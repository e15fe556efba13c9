//! layerpad command line
//!
//! Inspects, edits, simulates and deploys keypad configurations.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use layerpad::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --log-level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.unwrap_or_else(Config::default_path);

    match cli.command {
        // === Inspect ===
        Commands::Check => commands::inspect::check(&config_path),
        Commands::Show { layer } => commands::inspect::show(&config_path, layer),
        Commands::Leds { layer, held } => commands::inspect::leds(&config_path, layer, held),
        Commands::Resolve { code } => commands::inspect::resolve(&code),
        Commands::Simulate { script, reports } => {
            commands::simulate::run(&config_path, &script, reports)
        }
        Commands::Press { layer, key } => commands::simulate::press(&config_path, layer, key),

        // === Edit ===
        Commands::SetKey {
            layer,
            key,
            code,
            shortcut,
            command,
            color,
        } => commands::edit::set_key(&config_path, layer, key, code, shortcut, command, color),
        Commands::ClearKey { layer, key } => commands::edit::clear_key(&config_path, layer, key),
        Commands::SetLayer {
            layer,
            name,
            color,
            remove,
        } => commands::edit::set_layer(&config_path, layer, name.as_deref(), color, remove),
        Commands::Init { force } => commands::edit::init(&config_path, force),

        // === Device ===
        Commands::Deploy { volume } => commands::deploy::run(&config_path, volume.as_deref()),
    }
}
