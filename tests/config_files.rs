//! Integration tests for configuration files on disk: load, edit, save,
//! deploy, and loading the result back into an engine.

use layerpad::config::KeyBinding;
use layerpad::editor::{BindingSpec, ConfigDocument};
use layerpad::hal::VirtualKeypad;
use layerpad::{deploy, Config, ConfigError, EditError, LayerEngine, Rgb};
use layerpad_hid::{HidEvent, RecordingSink};
use std::time::Duration;

#[test]
fn missing_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("config.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn garbage_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "layers: 1").unwrap();
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn edit_save_and_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");

    let mut doc = ConfigDocument::new();
    doc.set_layer(1, Some("Main"), Some(Rgb::new(40, 40, 40))).unwrap();
    doc.set_key(
        1,
        9,
        &BindingSpec::Code {
            code: "F5".into(),
            color: None,
        },
    )
    .unwrap();
    doc.set_key(
        1,
        10,
        &BindingSpec::App {
            shortcut: Some("CTRL+ALT+T".into()),
            command: None,
            color: Some(Rgb::new(1, 2, 3)),
        },
    )
    .unwrap();
    doc.save(&path).unwrap();

    let reopened = ConfigDocument::load(&path).unwrap();
    assert_eq!(reopened, doc);

    let config = Config::load(&path).unwrap();
    assert!(config.warnings().is_empty());
    assert_eq!(config.layer(1).unwrap().display_name(1), "Main");
    assert!(matches!(
        config.binding(1, 10).unwrap().binding,
        KeyBinding::App(_)
    ));

    let mut pad = VirtualKeypad::new();
    let mut sink = RecordingSink::new();
    let mut engine = LayerEngine::new(config);
    engine.start(&mut pad);
    assert_eq!(pad.led(9), Some(Rgb::new(40, 40, 40)));
    assert_eq!(pad.led(10), Some(Rgb::new(1, 2, 3)));

    pad.press(9);
    pad.advance(Duration::from_millis(10));
    engine.poll(&mut pad, &mut sink);
    assert_eq!(sink.events(), &[HidEvent::Key(0x3E)]);
}

#[test]
fn rejected_edit_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    ConfigDocument::starter().save(&path).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let mut doc = ConfigDocument::load(&path).unwrap();
    let err = doc
        .set_key(
            1,
            15,
            &BindingSpec::App {
                shortcut: Some("NOTHING".into()),
                command: None,
                color: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, EditError::Rejected(_)));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn deploy_saved_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    ConfigDocument::starter().save(&path).unwrap();
    let volume = dir.path().join("CIRCUITPY");
    std::fs::create_dir(&volume).unwrap();

    let (target, config) = deploy::deploy(&path, Some(&volume)).unwrap();
    assert_eq!(config.layers().count(), 2);
    assert_eq!(Config::load(&target).unwrap().layers().count(), 2);
}
