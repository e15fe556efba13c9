//! Hardware facade
//!
//! The engine only ever sees the pad through [`Keypad`]: edge and level key
//! state for the current poll, the time since the last physical transition,
//! and a per-key RGB write.

mod virtual_keypad;

pub use virtual_keypad::VirtualKeypad;

use crate::color::Rgb;
use crate::config::KeyIndex;
use std::time::Duration;

/// Key matrix plus per-key LEDs
pub trait Keypad {
    /// Latch physical state for this poll; edges are computed here
    fn update(&mut self);

    /// True only on the poll where the key went down
    fn is_pressed(&self, key: KeyIndex) -> bool;

    /// True on every poll while the key is down
    fn is_held(&self, key: KeyIndex) -> bool;

    fn set_led(&mut self, key: KeyIndex, color: Rgb);

    fn led_off(&mut self, key: KeyIndex);

    /// Elapsed time since any key last changed state
    fn since_last_transition(&self) -> Duration;
}

impl<K: Keypad + ?Sized> Keypad for &mut K {
    fn update(&mut self) {
        (**self).update()
    }

    fn is_pressed(&self, key: KeyIndex) -> bool {
        (**self).is_pressed(key)
    }

    fn is_held(&self, key: KeyIndex) -> bool {
        (**self).is_held(key)
    }

    fn set_led(&mut self, key: KeyIndex, color: Rgb) {
        (**self).set_led(key, color)
    }

    fn led_off(&mut self, key: KeyIndex) {
        (**self).led_off(key)
    }

    fn since_last_transition(&self) -> Duration {
        (**self).since_last_transition()
    }
}
