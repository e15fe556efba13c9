//! LED state machine
//!
//! Every LED is a pure function of (modifier held, current layer, config).
//! Nothing here remembers what was last written, so recomputing a frame
//! twice is harmless.

use crate::color::Rgb;
use crate::config::{Config, KeyIndex, Layer, LayerId, CONTENT_KEYS, KEY_COUNT, MODIFIER_KEY};
use crate::hal::Keypad;

/// What a single LED is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedState {
    Off,
    /// Selector of a configured layer while the modifier is held
    SelectorFull(Rgb),
    /// Selector of the current layer while the modifier is up
    SelectorDim(Rgb),
    /// Content key bound in the active layer
    ContentBound(Rgb),
    /// Modifier at rest
    Ready,
}

impl LedState {
    /// Color to write; `None` turns the LED off
    pub fn color(self) -> Option<Rgb> {
        match self {
            LedState::Off => None,
            LedState::SelectorFull(c) | LedState::ContentBound(c) => Some(c),
            LedState::SelectorDim(c) => Some(c.dim()),
            LedState::Ready => Some(Rgb::GREEN),
        }
    }
}

/// Modifier goes dark while held to show the pad is armed
pub fn modifier_led(held: bool) -> LedState {
    if held {
        LedState::Off
    } else {
        LedState::Ready
    }
}

/// State of the selector for `layer`
pub fn selector_led(config: &Config, layer: LayerId, current: LayerId, held: bool) -> LedState {
    let Some(color) = config.layer(layer).and_then(Layer::selector_color) else {
        return LedState::Off;
    };
    if held {
        LedState::SelectorFull(color)
    } else if layer == current {
        LedState::SelectorDim(color)
    } else {
        LedState::Off
    }
}

/// Selector states for keys 1..=8
pub fn selector_leds(config: &Config, current: LayerId, held: bool) -> [LedState; 8] {
    std::array::from_fn(|i| selector_led(config, i as LayerId + 1, current, held))
}

/// State of one content key within a layer
pub fn content_led(layer: Option<&Layer>, key: KeyIndex) -> LedState {
    layer
        .and_then(|layer| {
            let entry = layer.keys.get(&key)?;
            layer.key_color(entry)
        })
        .map_or(LedState::Off, LedState::ContentBound)
}

/// Content states for keys 9..=15
pub fn content_leds(layer: Option<&Layer>) -> [LedState; 7] {
    std::array::from_fn(|i| content_led(layer, *CONTENT_KEYS.start() + i as KeyIndex))
}

/// Whole-pad frame indexed by key
pub fn frame(config: &Config, current: LayerId, held: bool) -> [LedState; KEY_COUNT] {
    let mut frame = [LedState::Off; KEY_COUNT];
    frame[usize::from(MODIFIER_KEY)] = modifier_led(held);
    for (i, state) in selector_leds(config, current, held).into_iter().enumerate() {
        frame[i + 1] = state;
    }
    for (i, state) in content_leds(config.layer(current)).into_iter().enumerate() {
        frame[usize::from(*CONTENT_KEYS.start()) + i] = state;
    }
    frame
}

/// Write one state through the facade
pub fn apply<K: Keypad + ?Sized>(keypad: &mut K, key: KeyIndex, state: LedState) {
    match state.color() {
        Some(color) => keypad.set_led(key, color),
        None => keypad.led_off(key),
    }
}
