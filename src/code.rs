//! Code resolution
//!
//! A binding's code string is classified once, in fixed priority order:
//! keyboard usage name, then consumer-control name, then literal text.
//! Every string lands somewhere, so resolution cannot fail.

use crate::config::Debounce;
use layerpad_hid::{consumer_code_from_name, consumer_name, key_name, keycode_from_name};
use layerpad_hid::{HidError, HidSink};
use std::fmt;

/// What a code string turns into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Keyboard page usage, sent as a single tap
    Key(u8),
    /// Consumer page usage (media keys)
    Consumer(u16),
    /// Anything else is typed verbatim
    Text(String),
}

/// Classify a code string
pub fn resolve(code: &str) -> Resolved {
    if let Some(key) = keycode_from_name(code) {
        Resolved::Key(key)
    } else if let Some(usage) = consumer_code_from_name(code) {
        Resolved::Consumer(usage)
    } else {
        Resolved::Text(code.to_string())
    }
}

impl Resolved {
    /// Direct sends settle quickly; typing takes as long as the text is
    pub fn debounce(&self) -> Debounce {
        match self {
            Resolved::Key(_) | Resolved::Consumer(_) => Debounce::Short,
            Resolved::Text(_) => Debounce::Long,
        }
    }

    /// Emit through a sink
    pub fn send<S: HidSink + ?Sized>(&self, sink: &mut S) -> Result<(), HidError> {
        match self {
            Resolved::Key(code) => sink.send_key(*code),
            Resolved::Consumer(code) => sink.send_consumer(*code),
            Resolved::Text(text) => sink.type_text(text),
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Key(code) => write!(f, "key {}", key_name(*code)),
            Resolved::Consumer(code) => match consumer_name(*code) {
                Some(name) => write!(f, "media {name}"),
                None => write!(f, "media 0x{code:04X}"),
            },
            Resolved::Text(text) => write!(f, "text {text:?}"),
        }
    }
}
