//! Document edits: set-key, clear-key, set-layer, init

use anyhow::{bail, Result};
use layerpad::editor::{BindingSpec, ConfigDocument};
use layerpad::Rgb;
use std::path::Path;

/// Open the document (or start an empty one), apply an edit, save it back
fn edit_file<F>(path: &Path, edit: F) -> Result<()>
where
    F: FnOnce(&mut ConfigDocument) -> Result<(), layerpad::EditError>,
{
    let mut doc = if path.exists() {
        ConfigDocument::load(path)?
    } else {
        ConfigDocument::new()
    };
    edit(&mut doc)?;
    let config = doc.save(path)?;
    println!(
        "Saved {} ({} layer(s))",
        path.display(),
        config.layers().count()
    );
    Ok(())
}

pub fn set_key(
    path: &Path,
    layer: u8,
    key: u8,
    code: Option<String>,
    shortcut: Option<String>,
    command: Option<String>,
    color: Option<Rgb>,
) -> Result<()> {
    let spec = match code {
        Some(code) => BindingSpec::Code { code, color },
        None if shortcut.is_some() || command.is_some() => BindingSpec::App {
            shortcut,
            command,
            color,
        },
        None => bail!("Give --code, or --shortcut and/or --command"),
    };
    edit_file(path, |doc| doc.set_key(layer, key, &spec))
}

pub fn clear_key(path: &Path, layer: u8, key: u8) -> Result<()> {
    edit_file(path, |doc| doc.clear_key(layer, key))
}

pub fn set_layer(
    path: &Path,
    layer: u8,
    name: Option<&str>,
    color: Option<Rgb>,
    remove: bool,
) -> Result<()> {
    if remove {
        return edit_file(path, |doc| doc.remove_layer(layer));
    }
    if name.is_none() && color.is_none() {
        bail!("Nothing to change, give --name and/or --color");
    }
    edit_file(path, |doc| doc.set_layer(layer, name, color))
}

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to replace it", path.display());
    }
    let config = ConfigDocument::starter().save(path)?;
    println!(
        "Wrote starter configuration to {} ({} layer(s))",
        path.display(),
        config.layers().count()
    );
    Ok(())
}
