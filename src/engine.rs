//! Layer/event engine
//!
//! One [`LayerEngine::poll`] is one pass of the keypad loop:
//!
//! 1. refresh the facade
//! 2. modifier gesture: selector LEDs, layer switch
//! 3. fire at most one bound content key
//! 4. repaint content LEDs when the layer changed
//! 5. clear the fired latch once the debounce window has passed
//!
//! Per-key failures are logged and skipped; a poll never fails.

use crate::config::{Config, Debounce, KeyBinding, KeyEntry, KeyIndex, LayerId, Timing};
use crate::config::{CONTENT_KEYS, KEY_COUNT, MODIFIER_KEY, SELECTOR_KEYS};
use crate::error::DispatchError;
use crate::hal::Keypad;
use crate::led::{self, LedState};
use layerpad_hid::HidSink;
use tracing::{debug, info, warn};

/// Layer selected at power-up
pub const START_LAYER: LayerId = 1;

/// What happened during one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cycle {
    /// Layer picked with the modifier gesture
    pub selected: Option<LayerId>,
    /// Content key whose binding fired
    pub dispatched: Option<KeyIndex>,
    /// The fired latch was cleared at the end of the poll
    pub rearmed: bool,
}

/// Owns the active layer and debounce state for one keypad
#[derive(Debug)]
pub struct LayerEngine {
    config: Config,
    current_layer: LayerId,
    fired: bool,
    debounce: Debounce,
}

impl LayerEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            current_layer: START_LAYER,
            fired: false,
            debounce: Debounce::Short,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_layer(&self) -> LayerId {
        self.current_layer
    }

    /// True while a dispatched action is still inside its debounce window
    pub fn is_fired(&self) -> bool {
        self.fired
    }

    pub fn debounce(&self) -> Debounce {
        self.debounce
    }

    fn timing(&self) -> &Timing {
        self.config.timing()
    }

    /// Paint the content LEDs for the starting layer
    pub fn start<K: Keypad + ?Sized>(&mut self, keypad: &mut K) {
        info!(
            "Starting on layer {} ({} layer(s) configured)",
            self.current_layer,
            self.config.layers().count()
        );
        self.paint_content(keypad);
    }

    /// Swap in a new configuration, keeping the current layer
    pub fn reload<K: Keypad + ?Sized>(&mut self, config: Config, keypad: &mut K) {
        info!("Configuration reloaded");
        self.config = config;
        self.paint_content(keypad);
    }

    /// Run one polling cycle
    pub fn poll<K, S>(&mut self, keypad: &mut K, sink: &mut S) -> Cycle
    where
        K: Keypad + ?Sized,
        S: HidSink + ?Sized,
    {
        keypad.update();

        let selected = self.handle_gesture(keypad);
        let dispatched = self.dispatch_pressed(keypad, sink);

        let mut rearmed = false;
        if self.fired && keypad.since_last_transition() > self.timing().interval(self.debounce) {
            self.fired = false;
            rearmed = true;
        }

        Cycle {
            selected,
            dispatched,
            rearmed,
        }
    }

    fn handle_gesture<K: Keypad + ?Sized>(&mut self, keypad: &mut K) -> Option<LayerId> {
        let held = keypad.is_held(MODIFIER_KEY);
        led::apply(keypad, MODIFIER_KEY, led::modifier_led(held));

        let mut selected = None;
        for id in SELECTOR_KEYS {
            let state = led::selector_led(&self.config, id, self.current_layer, held);
            led::apply(keypad, id, state);

            if held && keypad.is_pressed(id) && self.config.layer(id).is_some() {
                debug!("Layer {} -> {}", self.current_layer, id);
                self.current_layer = id;
                self.paint_content(keypad);
                selected = Some(id);
            }
        }
        selected
    }

    fn dispatch_pressed<K, S>(&mut self, keypad: &K, sink: &mut S) -> Option<KeyIndex>
    where
        K: Keypad + ?Sized,
        S: HidSink + ?Sized,
    {
        if self.fired {
            return None;
        }
        let layer = self.current_layer;
        let (&key, entry) = self
            .config
            .layer(layer)?
            .keys
            .iter()
            .find(|&(key, _)| keypad.is_pressed(*key))?;

        let class = entry.binding.debounce();
        if let Err(e) = fire(layer, key, entry, self.config.timing(), sink) {
            warn!("{e}");
        }
        self.fired = true;
        self.debounce = class;
        Some(key)
    }

    fn paint_content<K: Keypad + ?Sized>(&self, keypad: &mut K) {
        let states = led::content_leds(self.config.layer(self.current_layer));
        for (key, state) in CONTENT_KEYS.zip(states) {
            led::apply(keypad, key, state);
        }
    }

    /// LED states the pad should be showing right now
    pub fn frame(&self, modifier_held: bool) -> [LedState; KEY_COUNT] {
        led::frame(&self.config, self.current_layer, modifier_held)
    }
}

/// Send one binding through the sink
pub fn fire<S: HidSink + ?Sized>(
    layer: LayerId,
    key: KeyIndex,
    entry: &KeyEntry,
    timing: &Timing,
    sink: &mut S,
) -> Result<Debounce, DispatchError> {
    debug!("Layer {layer} key {key}: {}", entry.binding);
    let sent = match &entry.binding {
        KeyBinding::App(app) => app.run(sink, timing),
        KeyBinding::Plain(code) | KeyBinding::Code(code) => code.send(sink),
    };
    sent.map(|()| entry.binding.debounce())
        .map_err(|source| DispatchError { layer, key, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::hal::VirtualKeypad;
    use layerpad_hid::{HidError, HidEvent, RecordingSink};
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(10);

    fn engine(json: &str) -> (LayerEngine, VirtualKeypad) {
        let mut engine = LayerEngine::new(Config::from_json(json).unwrap());
        let mut pad = VirtualKeypad::new();
        engine.start(&mut pad);
        (engine, pad)
    }

    fn tick(engine: &mut LayerEngine, pad: &mut VirtualKeypad, sink: &mut RecordingSink) -> Cycle {
        pad.advance(TICK);
        engine.poll(pad, sink)
    }

    #[test]
    fn starts_on_layer_one() {
        let (engine, pad) = engine(r#"{"layers": {"1": {"keys": {"9": "A"}}}}"#);
        assert_eq!(engine.current_layer(), 1);
        assert!(!engine.is_fired());
        assert_eq!(pad.led(9), Some(Rgb::BLUE));
        assert_eq!(pad.led(10), None);
    }

    #[test]
    fn held_key_fires_once() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"9": "A"}}}}"#);
        let mut sink = RecordingSink::new();

        pad.press(9);
        for _ in 0..50 {
            tick(&mut engine, &mut pad, &mut sink);
        }
        assert_eq!(sink.events(), &[HidEvent::Key(0x04)]);

        pad.release(9);
        for _ in 0..10 {
            tick(&mut engine, &mut pad, &mut sink);
        }
        pad.press(9);
        tick(&mut engine, &mut pad, &mut sink);
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn latch_blocks_other_keys_until_debounce_passes() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"9": "A", "10": "B"}}}}"#);
        let mut sink = RecordingSink::new();

        pad.press(9);
        assert_eq!(tick(&mut engine, &mut pad, &mut sink).dispatched, Some(9));
        pad.release(9);
        pad.press(10);
        // Transition resets the clock, latch still set
        assert_eq!(tick(&mut engine, &mut pad, &mut sink).dispatched, None);
        assert!(engine.is_fired());
        assert_eq!(sink.events(), &[HidEvent::Key(0x04)]);
    }

    #[test]
    fn simultaneous_presses_fire_lowest_index() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"15": "A", "11": "B"}}}}"#);
        let mut sink = RecordingSink::new();
        pad.press(15);
        pad.press(11);
        let cycle = tick(&mut engine, &mut pad, &mut sink);
        assert_eq!(cycle.dispatched, Some(11));
        assert_eq!(sink.events(), &[HidEvent::Key(0x05)]);
    }

    #[test]
    fn rearm_after_debounce_interval() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"9": "A"}}}}"#);
        let mut sink = RecordingSink::new();
        pad.press(9);
        tick(&mut engine, &mut pad, &mut sink);
        assert_eq!(engine.debounce(), Debounce::Short);

        // 30ms short window: 10, 20, 30 are not past it, 40 is
        for _ in 0..3 {
            assert!(!tick(&mut engine, &mut pad, &mut sink).rearmed);
        }
        assert!(tick(&mut engine, &mut pad, &mut sink).rearmed);
        assert!(!engine.is_fired());
    }

    #[test]
    fn selector_ignored_without_modifier() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {}, "2": {}}}"#);
        let mut sink = RecordingSink::new();
        pad.press(2);
        assert_eq!(tick(&mut engine, &mut pad, &mut sink).selected, None);
        assert_eq!(engine.current_layer(), 1);
    }

    #[test]
    fn unconfigured_selector_does_not_switch() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {}}}"#);
        let mut sink = RecordingSink::new();
        pad.press(0);
        tick(&mut engine, &mut pad, &mut sink);
        pad.press(4);
        assert_eq!(tick(&mut engine, &mut pad, &mut sink).selected, None);
        assert_eq!(engine.current_layer(), 1);
        assert_eq!(pad.led(4), None);
    }

    #[test]
    fn switching_repaints_content() {
        let (mut engine, mut pad) = engine(
            r#"{"layers": {
                "1": {"keys": {"9": "A", "10": "B"}},
                "2": {"color": [200, 0, 0], "keys": {"12": "C"}}
            }}"#,
        );
        let mut sink = RecordingSink::new();
        pad.press(0);
        tick(&mut engine, &mut pad, &mut sink);
        pad.press(2);
        let cycle = tick(&mut engine, &mut pad, &mut sink);
        assert_eq!(cycle.selected, Some(2));
        assert_eq!(engine.current_layer(), 2);
        assert_eq!(pad.led(9), None);
        assert_eq!(pad.led(10), None);
        assert_eq!(pad.led(12), Some(Rgb::new(200, 0, 0)));

        pad.release(0);
        pad.release(2);
        tick(&mut engine, &mut pad, &mut sink);
        assert_eq!(pad.led(2), Some(Rgb::new(50, 0, 0)));
        assert_eq!(pad.led(0), Some(Rgb::GREEN));
        assert!(sink.events().is_empty());
    }

    struct FailingSink;

    impl HidSink for FailingSink {
        fn send_key(&mut self, _: u8) -> Result<(), HidError> {
            Err(HidError::NotReady("unplugged".into()))
        }
        fn send_consumer(&mut self, _: u16) -> Result<(), HidError> {
            Err(HidError::NotReady("unplugged".into()))
        }
        fn type_text(&mut self, _: &str) -> Result<(), HidError> {
            Err(HidError::NotReady("unplugged".into()))
        }
        fn press(&mut self, _: &[u8]) -> Result<(), HidError> {
            Err(HidError::NotReady("unplugged".into()))
        }
        fn release_all(&mut self) -> Result<(), HidError> {
            Ok(())
        }
        fn pause(&mut self, _: Duration) {}
    }

    #[test]
    fn sink_errors_do_not_abort_the_cycle() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"9": "hello"}}}}"#);
        pad.press(9);
        pad.advance(TICK);
        let cycle = engine.poll(&mut pad, &mut FailingSink);
        assert_eq!(cycle.dispatched, Some(9));
        assert!(engine.is_fired());
        assert_eq!(engine.debounce(), Debounce::Long);
    }

    #[test]
    fn fire_reports_the_failing_key() {
        let config = Config::from_json(r#"{"layers": {"3": {"keys": {"14": "A"}}}}"#).unwrap();
        let entry = config.binding(3, 14).unwrap();
        let err = fire(3, 14, entry, config.timing(), &mut FailingSink).unwrap_err();
        assert_eq!((err.layer, err.key), (3, 14));
        assert!(err.to_string().starts_with("Key 14 on layer 3"));
    }

    #[test]
    fn reload_keeps_layer_and_repaints() {
        let (mut engine, mut pad) = engine(r#"{"layers": {"1": {"keys": {"9": "A"}}}}"#);
        let next = Config::from_json(r#"{"layers": {"1": {"keys": {"11": "B"}}}}"#).unwrap();
        engine.reload(next, &mut pad);
        assert_eq!(engine.current_layer(), 1);
        assert_eq!(pad.led(9), None);
        assert_eq!(pad.led(11), Some(Rgb::BLUE));
    }
}
