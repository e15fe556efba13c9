//! Integration tests for scripted simulation against the demo configuration.

use layerpad::sim::{self, Script, SimEvent};
use layerpad::{Config, Rgb};
use layerpad_hid::codes::usage;
use layerpad_hid::HidEvent;
use std::path::PathBuf;
use std::time::Duration;

fn demo(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(path)
}

fn demo_config() -> Config {
    let config = Config::load(demo("config.json")).unwrap();
    assert!(config.warnings().is_empty(), "{:?}", config.warnings());
    config
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn switch_layer_then_type() {
    let script = Script::load(demo("scripts/switch_layer.toml")).unwrap();
    let report = sim::run(demo_config(), &script);

    assert_eq!(
        report.events,
        [
            SimEvent::LayerChange { at: ms(50), layer: 3 },
            SimEvent::Output {
                at: ms(200),
                key: Some(9),
                event: HidEvent::Text("git status".into()),
            },
            SimEvent::Output {
                at: ms(500),
                key: Some(10),
                event: HidEvent::Key(usage::ENTER),
            },
        ]
    );
    assert_eq!(report.final_layer, 3);
    assert_eq!(report.leds[0], Some(Rgb::GREEN));
    assert_eq!(report.leds[1], None);
    assert_eq!(report.leds[3], Some(Rgb::new(63, 32, 0)));
    assert_eq!(report.leds[9], Some(Rgb::new(255, 128, 0)));
    assert_eq!(report.leds[10], Some(Rgb::new(255, 255, 255)));
    assert_eq!(report.leds[12], None);
    assert_eq!(report.leds[15], Some(Rgb::new(255, 128, 0)));
}

#[test]
fn launch_app_macro_timeline() {
    let script = Script::load(demo("scripts/launch_app.toml")).unwrap();
    let report = sim::run(demo_config(), &script);

    assert_eq!(report.layer_changes().collect::<Vec<_>>(), [2]);
    let outputs: Vec<(u128, &HidEvent)> = report
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Output { at, event, .. } => Some((at.as_millis(), event)),
            SimEvent::LayerChange { .. } => None,
        })
        .collect();
    assert_eq!(
        outputs,
        [
            (100, &HidEvent::Press(vec![usage::LEFT_GUI, 0x15])),
            (200, &HidEvent::ReleaseAll),
            (700, &HidEvent::Text("notepad".into())),
            (700, &HidEvent::Key(usage::ENTER)),
        ]
    );
}

#[test]
fn held_key_fires_once() {
    let script = Script::load(demo("scripts/held_key.toml")).unwrap();
    let report = sim::run(demo_config(), &script);
    assert_eq!(
        report.outputs().cloned().collect::<Vec<_>>(),
        [HidEvent::Consumer(0x00CD)]
    );
    assert!(report.polls > 400);
}

#[test]
fn outputs_encode_to_reports() {
    let script = Script::load(demo("scripts/launch_app.toml")).unwrap();
    let report = sim::run(demo_config(), &script);
    for event in report.outputs() {
        assert!(!event.to_reports().unwrap().is_empty(), "{event}");
    }
}

#[test]
fn inline_script() {
    let config = Config::from_json(r#"{"layers":{"1":{"keys":{"9":"A","10":"B"}}}}"#).unwrap();
    let script = Script::from_toml(
        r#"
        poll_interval_ms = 1
        tail_ms = 10

        [[step]]
        at_ms = 5
        press = [9, 10]
        "#,
    )
    .unwrap();
    let report = sim::run(config, &script);
    // Simultaneous presses resolve to the lowest key index
    assert_eq!(
        report.outputs().cloned().collect::<Vec<_>>(),
        [HidEvent::Key(0x04)]
    );
}
