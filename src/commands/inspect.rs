//! Read-only commands: check, show, leds, resolve

use super::{load_config, print_warnings};
use anyhow::{bail, Result};
use crossterm::style::{Color, Stylize};
use layerpad::code;
use layerpad::config::{Layer, LayerId, MODIFIER_KEY};
use layerpad::led::{self, LedState};
use layerpad::Rgb;
use std::path::Path;

/// Width of each LED cell in characters.
const CELL_W: usize = 6;
/// Keys per row on the pad
const COLS: usize = 4;

pub fn check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    print_warnings(&config);

    let keys: usize = config.layers().map(|(_, l)| l.keys.len()).sum();
    println!(
        "{}: {} layer(s), {} binding(s), {} warning(s)",
        path.display(),
        config.layers().count(),
        keys,
        config.warnings().len()
    );
    Ok(())
}

pub fn show(path: &Path, only: Option<LayerId>) -> Result<()> {
    let config = load_config(path)?;
    print_warnings(&config);

    if let Some(id) = only {
        let Some(layer) = config.layer(id) else {
            bail!("Layer {id} is not configured");
        };
        print_layer(id, layer);
        return Ok(());
    }

    if config.is_empty() {
        println!("No layers configured");
    }
    for (id, layer) in config.layers() {
        print_layer(id, layer);
    }
    Ok(())
}

fn print_layer(id: LayerId, layer: &Layer) {
    let color = layer
        .selector_color()
        .map_or_else(|| "off".to_string(), |c| c.to_string());
    println!("Layer {id}: {} (color {color})", layer.display_name(id));
    if layer.keys.is_empty() {
        println!("  (no bindings)");
    }
    for (key, entry) in &layer.keys {
        let led = layer
            .key_color(entry)
            .map_or_else(|| "off".to_string(), |c| c.to_string());
        println!(
            "  {key:>2}  {:<40} {:?}  led {led}",
            entry.binding.to_string(),
            entry.binding.debounce()
        );
    }
}

pub fn leds(path: &Path, layer: LayerId, held: bool) -> Result<()> {
    let config = load_config(path)?;
    let frame = led::frame(&config, layer, held);

    println!(
        "Layer {layer}, modifier {}",
        if held { "held" } else { "up" }
    );
    for row in frame.chunks(COLS) {
        let line: String = row.iter().map(|&state| cell(state)).collect();
        println!("{line}");
    }
    for (key, state) in frame.iter().enumerate() {
        if *state != LedState::Off {
            let role = if key == usize::from(MODIFIER_KEY) { "modifier" } else { "" };
            println!("  {key:>2} {state:?} {role}");
        }
    }
    Ok(())
}

fn cell(state: LedState) -> String {
    match state.color() {
        Some(Rgb { r, g, b }) => {
            let lum = (u16::from(r) + u16::from(g) + u16::from(b)) / 3;
            let fg = if lum > 128 { Color::Black } else { Color::White };
            format!("{:^width$}", label(state), width = CELL_W)
                .with(fg)
                .on(Color::Rgb { r, g, b })
                .to_string()
        }
        None => format!("{:^width$}", ".", width = CELL_W)
            .with(Color::DarkGrey)
            .to_string(),
    }
}

fn label(state: LedState) -> &'static str {
    match state {
        LedState::Off => ".",
        LedState::SelectorFull(_) => "sel",
        LedState::SelectorDim(_) => "cur",
        LedState::ContentBound(_) => "key",
        LedState::Ready => "mod",
    }
}

pub fn resolve(raw: &str) -> Result<()> {
    let resolved = code::resolve(raw);
    println!("{raw:?} -> {resolved} ({:?} debounce)", resolved.debounce());
    Ok(())
}
