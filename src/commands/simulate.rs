//! Scripted replay against a virtual keypad, and single-key firing

use super::{load_config, print_warnings};
use anyhow::{bail, Context, Result};
use layerpad::config::{KeyIndex, LayerId};
use layerpad::engine;
use layerpad::sim::{self, Script, SimEvent};
use layerpad_hid::TracingSink;
use std::path::Path;

pub fn run(config_path: &Path, script_path: &Path, reports: bool) -> Result<()> {
    let config = load_config(config_path)?;
    print_warnings(&config);
    let script = Script::load(script_path)?;

    let report = sim::run(config, &script);
    for event in &report.events {
        println!("{event}");
        if !reports {
            continue;
        }
        if let SimEvent::Output { event, .. } = event {
            let expanded = event
                .to_reports()
                .with_context(|| format!("Cannot encode {event}"))?;
            for r in expanded {
                println!("                {r}");
            }
        }
    }

    let lit = report.leds.iter().filter(|l| l.is_some()).count();
    println!(
        "{} poll(s), {}ms, ended on layer {}, {lit} LED(s) lit",
        report.polls,
        report.elapsed.as_millis(),
        report.final_layer
    );
    Ok(())
}

pub fn press(config_path: &Path, layer: LayerId, key: KeyIndex) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(entry) = config.binding(layer, key) else {
        bail!("Layer {layer} has no binding on key {key}");
    };
    // Pauses are logged, not slept
    let class = engine::fire(layer, key, entry, config.timing(), &mut TracingSink)?;
    println!("Fired {} ({class:?} debounce)", entry.binding);
    Ok(())
}
