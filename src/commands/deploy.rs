//! Copy the configuration onto the keypad volume

use super::print_warnings;
use anyhow::Result;
use layerpad::deploy;
use std::path::Path;

pub fn run(config_path: &Path, volume: Option<&Path>) -> Result<()> {
    let (target, config) = deploy::deploy(config_path, volume)?;
    print_warnings(&config);
    println!("Copied {} to {}", config_path.display(), target.display());
    Ok(())
}
