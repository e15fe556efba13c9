//! App-launch macro
//!
//! A shortcut such as `WIN+R` is held briefly, then an optional command is
//! typed into whatever the shortcut opened and confirmed with Enter.
//!
//! # Shortcut syntax
//!
//! ```text
//! WIN+R        → LEFT_GUI + R
//! ctrl+alt+t   → LEFT_CONTROL + LEFT_ALT + T
//! CTRL+SHIFT+? → LEFT_CONTROL + LEFT_SHIFT + /
//! ```
//!
//! Modifiers are found anywhere in the string, case-insensitively; the
//! main key is whatever follows the last `+`.

use crate::config::Timing;
use layerpad_hid::codes::usage;
use layerpad_hid::{char_to_hid, key_name, keycode_from_name, HidError, HidSink};
use std::fmt;

const MODIFIERS: [(&str, u8); 4] = [
    ("WIN", usage::LEFT_GUI),
    ("CTRL", usage::LEFT_CONTROL),
    ("ALT", usage::LEFT_ALT),
    ("SHIFT", usage::LEFT_SHIFT),
];

/// A parsed key combination, pressed all at once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    raw: String,
    keys: Vec<u8>,
}

impl Shortcut {
    /// Parse a shortcut string; unknown parts are dropped
    pub fn parse(raw: &str) -> Self {
        let upper = raw.to_ascii_uppercase();
        let mut keys = Vec::new();

        for (needle, code) in MODIFIERS {
            if upper.contains(needle) {
                push_unique(&mut keys, code);
            }
        }

        let main = raw.rsplit('+').next().unwrap_or_default().trim();
        if let Some(code) = keycode_from_name(main) {
            push_unique(&mut keys, code);
        } else if let Some(ch) = single_char(main) {
            if let Some((code, shifted)) = char_to_hid(ch) {
                // Letters name the key, so case does not imply Shift
                if shifted && !ch.is_ascii_alphabetic() {
                    push_unique(&mut keys, usage::LEFT_SHIFT);
                }
                push_unique(&mut keys, code);
            }
        }

        Self {
            raw: raw.to_string(),
            keys,
        }
    }

    /// Usages in press order: modifiers first, then the main key
    pub fn keys(&self) -> &[u8] {
        &self.keys
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when nothing in the string named a key
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.keys.iter().map(|&k| key_name(k)).collect();
        write!(f, "{} ({})", self.raw, names.join("+"))
    }
}

fn push_unique(keys: &mut Vec<u8>, code: u8) {
    if !keys.contains(&code) {
        keys.push(code);
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

/// `{type: "app", shortcut?, command?}`
///
/// At least one of the two parts is present; the configuration loader
/// rejects app bindings with neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMacro {
    pub shortcut: Option<Shortcut>,
    pub command: Option<String>,
}

impl AppMacro {
    pub fn new(shortcut: Option<&str>, command: Option<&str>) -> Self {
        Self {
            shortcut: shortcut.map(Shortcut::parse),
            command: command.map(str::to_string),
        }
    }

    /// Play the macro through a sink
    ///
    /// Blocks for the configured hold and launcher wait via [`HidSink::pause`].
    pub fn run<S: HidSink + ?Sized>(&self, sink: &mut S, timing: &Timing) -> Result<(), HidError> {
        if let Some(shortcut) = &self.shortcut {
            if !shortcut.is_empty() {
                if let Err(e) = sink.press(shortcut.keys()) {
                    // Never leave modifiers stuck down
                    let _ = sink.release_all();
                    return Err(e);
                }
                sink.pause(timing.shortcut_hold);
                sink.release_all()?;
            }
        }

        if let Some(command) = &self.command {
            if self.shortcut.is_some() {
                sink.pause(timing.launcher_wait);
            }
            sink.type_text(command)?;
            sink.send_key(usage::ENTER)?;
        }

        Ok(())
    }
}

impl fmt::Display for AppMacro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app")?;
        if let Some(shortcut) = &self.shortcut {
            write!(f, " {}", shortcut.as_str())?;
        }
        if let Some(command) = &self.command {
            write!(f, " then {command:?}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layerpad_hid::{HidEvent, RecordingSink};
    use std::time::Duration;

    #[test]
    fn win_r() {
        let s = Shortcut::parse("WIN+R");
        assert_eq!(s.keys(), &[usage::LEFT_GUI, 0x15]);
    }

    #[test]
    fn modifiers_are_case_insensitive_substrings() {
        let s = Shortcut::parse("ctrl+alt+t");
        assert_eq!(s.keys(), &[usage::LEFT_CONTROL, usage::LEFT_ALT, 0x17]);

        // Press order is fixed regardless of how the string is written
        let s = Shortcut::parse("Shift+Win+E");
        assert_eq!(s.keys(), &[usage::LEFT_GUI, usage::LEFT_SHIFT, 0x08]);
    }

    #[test]
    fn main_key_by_name() {
        let s = Shortcut::parse("ALT+F4");
        assert_eq!(s.keys(), &[usage::LEFT_ALT, 0x3D]);
        let s = Shortcut::parse("CTRL+ESCAPE");
        assert_eq!(s.keys(), &[usage::LEFT_CONTROL, 0x29]);
    }

    #[test]
    fn shifted_punctuation_adds_shift_once() {
        let s = Shortcut::parse("CTRL+SHIFT+?");
        assert_eq!(s.keys(), &[usage::LEFT_CONTROL, usage::LEFT_SHIFT, 0x38]);
        let s = Shortcut::parse("CTRL+!");
        assert_eq!(s.keys(), &[usage::LEFT_CONTROL, usage::LEFT_SHIFT, 0x1E]);
    }

    #[test]
    fn modifier_only_and_unknown() {
        assert_eq!(Shortcut::parse("WIN").keys(), &[usage::LEFT_GUI]);
        // SHIFT as the main key is also a named key; it is pressed once
        assert_eq!(
            Shortcut::parse("CTRL+SHIFT").keys(),
            &[usage::LEFT_CONTROL, usage::LEFT_SHIFT]
        );
        assert!(Shortcut::parse("HYPER+FOO").is_empty());
    }

    #[test]
    fn full_macro_sequence() {
        let timing = Timing::default();
        let app = AppMacro::new(Some("WIN+R"), Some("notepad"));
        let mut sink = RecordingSink::new();
        app.run(&mut sink, &timing).unwrap();
        assert_eq!(
            sink.events(),
            &[
                HidEvent::Press(vec![usage::LEFT_GUI, 0x15]),
                HidEvent::Pause(Duration::from_millis(100)),
                HidEvent::ReleaseAll,
                HidEvent::Pause(Duration::from_millis(500)),
                HidEvent::Text("notepad".into()),
                HidEvent::Key(usage::ENTER),
            ]
        );
    }

    #[test]
    fn shortcut_without_command() {
        let app = AppMacro::new(Some("CTRL+ALT+T"), None);
        let mut sink = RecordingSink::new();
        app.run(&mut sink, &Timing::default()).unwrap();
        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.events()[2], HidEvent::ReleaseAll);
    }

    #[test]
    fn command_only_types_then_enter() {
        let app = AppMacro::new(None, Some("calc"));
        let mut sink = RecordingSink::new();
        app.run(&mut sink, &Timing::default()).unwrap();
        assert_eq!(
            sink.events(),
            &[HidEvent::Text("calc".into()), HidEvent::Key(usage::ENTER)]
        );
        assert_eq!(sink.paused(), Duration::ZERO);
    }

    #[test]
    fn empty_shortcut_still_waits_for_launcher() {
        let app = AppMacro::new(Some("HYPER"), Some("x"));
        let mut sink = RecordingSink::new();
        app.run(&mut sink, &Timing::default()).unwrap();
        assert_eq!(sink.events()[0], HidEvent::Pause(Duration::from_millis(500)));
    }

    struct StuckSink {
        released: bool,
    }

    impl HidSink for StuckSink {
        fn send_key(&mut self, _: u8) -> Result<(), HidError> {
            Ok(())
        }
        fn send_consumer(&mut self, _: u16) -> Result<(), HidError> {
            Ok(())
        }
        fn type_text(&mut self, _: &str) -> Result<(), HidError> {
            Ok(())
        }
        fn press(&mut self, codes: &[u8]) -> Result<(), HidError> {
            Err(HidError::Rollover(codes.len()))
        }
        fn release_all(&mut self) -> Result<(), HidError> {
            self.released = true;
            Ok(())
        }
        fn pause(&mut self, _: Duration) {}
    }

    #[test]
    fn failed_press_releases() {
        let app = AppMacro::new(Some("WIN+R"), Some("notepad"));
        let mut sink = StuckSink { released: false };
        assert!(app.run(&mut sink, &Timing::default()).is_err());
        assert!(sink.released);
    }
}
