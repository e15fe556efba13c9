// In-memory keypad driven by a virtual clock

use super::Keypad;
use crate::color::Rgb;
use crate::config::{KeyIndex, KEY_COUNT};
use std::time::Duration;
use tracing::trace;

/// Keypad whose switches are set from code and whose clock only moves on
/// [`advance`](VirtualKeypad::advance)
///
/// Physical changes made with [`press`](VirtualKeypad::press) and
/// [`release`](VirtualKeypad::release) become visible to the engine on the
/// next [`update`](Keypad::update), the same way a real matrix scan works.
#[derive(Debug, Clone)]
pub struct VirtualKeypad {
    physical: [bool; KEY_COUNT],
    held: [bool; KEY_COUNT],
    pressed: [bool; KEY_COUNT],
    leds: [Option<Rgb>; KEY_COUNT],
    now: Duration,
    last_transition: Duration,
}

impl Default for VirtualKeypad {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualKeypad {
    pub fn new() -> Self {
        Self {
            physical: [false; KEY_COUNT],
            held: [false; KEY_COUNT],
            pressed: [false; KEY_COUNT],
            leds: [None; KEY_COUNT],
            now: Duration::ZERO,
            last_transition: Duration::ZERO,
        }
    }

    /// Put a switch down; out-of-range indices are ignored
    pub fn press(&mut self, key: KeyIndex) {
        if let Some(slot) = self.physical.get_mut(usize::from(key)) {
            *slot = true;
        }
    }

    pub fn release(&mut self, key: KeyIndex) {
        if let Some(slot) = self.physical.get_mut(usize::from(key)) {
            *slot = false;
        }
    }

    /// Move the virtual clock forward
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current LED color; `None` is off
    pub fn led(&self, key: KeyIndex) -> Option<Rgb> {
        self.leds.get(usize::from(key)).copied().flatten()
    }

    pub fn leds(&self) -> [Option<Rgb>; KEY_COUNT] {
        self.leds
    }
}

impl Keypad for VirtualKeypad {
    fn update(&mut self) {
        for i in 0..KEY_COUNT {
            let down = self.physical[i];
            if down != self.held[i] {
                self.last_transition = self.now;
                trace!(key = i, down, "transition");
            }
            self.pressed[i] = down && !self.held[i];
            self.held[i] = down;
        }
    }

    fn is_pressed(&self, key: KeyIndex) -> bool {
        self.pressed.get(usize::from(key)).copied().unwrap_or(false)
    }

    fn is_held(&self, key: KeyIndex) -> bool {
        self.held.get(usize::from(key)).copied().unwrap_or(false)
    }

    fn set_led(&mut self, key: KeyIndex, color: Rgb) {
        if let Some(slot) = self.leds.get_mut(usize::from(key)) {
            // A black write is indistinguishable from off on the hardware
            *slot = (color != Rgb::BLACK).then_some(color);
        }
    }

    fn led_off(&mut self, key: KeyIndex) {
        if let Some(slot) = self.leds.get_mut(usize::from(key)) {
            *slot = None;
        }
    }

    fn since_last_transition(&self) -> Duration {
        self.now.saturating_sub(self.last_transition)
    }
}
