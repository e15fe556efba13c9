//! HID output error types

use thiserror::Error;

/// Errors from emitting HID output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    /// Character cannot be typed on the US layout
    #[error("Character {0:?} has no key on the US layout")]
    UnsupportedChar(char),

    /// More non-modifier keys held than a boot keyboard report can carry
    #[error("Too many keys held at once: {0} (boot reports carry 6)")]
    Rollover(usize),

    /// The USB endpoint refused the report
    #[error("HID endpoint not ready: {0}")]
    NotReady(String),
}
