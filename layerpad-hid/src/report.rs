//! USB report encoding
//!
//! Boot-protocol keyboard reports are `[modifier, reserved, k0..k5]`;
//! consumer reports carry one little-endian 16-bit usage.

use crate::codes::{char_to_hid, is_modifier, modifier_bit, mods};
use crate::error::HidError;
use std::fmt;

/// Maximum non-modifier keys in a boot keyboard report
pub const ROLLOVER: usize = 6;

/// 8-byte boot keyboard report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifier: u8,
    pub keycodes: [u8; ROLLOVER],
}

impl KeyboardReport {
    /// Report with every key released
    pub const EMPTY: Self = Self {
        modifier: 0,
        keycodes: [0; ROLLOVER],
    };

    /// Build a report holding the given usages down
    ///
    /// Modifier usages go to the bitmask; the rest fill the key slots in order.
    pub fn from_usages(usages: &[u8]) -> Result<Self, HidError> {
        let mut report = Self::EMPTY;
        let mut slot = 0;
        for &code in usages {
            if let Some(bit) = modifier_bit(code) {
                report.modifier |= bit;
                continue;
            }
            if report.keycodes[..slot].contains(&code) {
                continue;
            }
            if slot == ROLLOVER {
                let held = usages.iter().filter(|&&c| !is_modifier(c)).count();
                return Err(HidError::Rollover(held));
            }
            report.keycodes[slot] = code;
            slot += 1;
        }
        Ok(report)
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let k = &self.keycodes;
        [self.modifier, 0, k[0], k[1], k[2], k[3], k[4], k[5]]
    }
}

/// 2-byte consumer-control report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerReport {
    pub usage: u16,
}

impl ConsumerReport {
    pub fn to_bytes(&self) -> [u8; 2] {
        self.usage.to_le_bytes()
    }
}

/// A report destined for one of the keypad's HID interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Keyboard(KeyboardReport),
    Consumer(ConsumerReport),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (label, bytes): (&str, Vec<u8>) = match self {
            Report::Keyboard(r) => ("kbd", r.to_bytes().to_vec()),
            Report::Consumer(r) => ("cc ", r.to_bytes().to_vec()),
        };
        write!(f, "{label}")?;
        for b in bytes {
            write!(f, " {b:02x}")?;
        }
        Ok(())
    }
}

/// Expand text into press/release report pairs, one pair per character
pub fn text_reports(text: &str) -> Result<Vec<KeyboardReport>, HidError> {
    let mut reports = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let (code, shift) = char_to_hid(ch).ok_or(HidError::UnsupportedChar(ch))?;
        let mut down = KeyboardReport::EMPTY;
        down.keycodes[0] = code;
        if shift {
            down.modifier = mods::LSHIFT;
        }
        reports.push(down);
        reports.push(KeyboardReport::EMPTY);
    }
    Ok(reports)
}
