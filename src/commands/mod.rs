//! Command handlers for the CLI application.
//!
//! - `inspect`: read-only commands (check, show, leds, resolve)
//! - `simulate`: scripted replay against a virtual keypad
//! - `edit`: document edits (set-key, clear-key, set-layer, init)
//! - `deploy`: copy onto the keypad volume

pub mod deploy;
pub mod edit;
pub mod inspect;
pub mod simulate;

use anyhow::{Context, Result};
use layerpad::Config;
use std::path::Path;

/// Load a configuration, naming the file on failure
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Cannot use configuration {}", path.display()))
}

/// Print load warnings to stderr, one per line
pub fn print_warnings(config: &Config) {
    for warning in config.warnings() {
        eprintln!("warning: {warning}");
    }
}
