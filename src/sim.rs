//! Scripted keypad simulation
//!
//! Replays a TOML script of key presses against a [`VirtualKeypad`] and a
//! [`RecordingSink`] on a virtual clock, so whole gestures can be checked
//! without hardware:
//!
//! ```toml
//! poll_interval_ms = 10
//! tail_ms = 300
//!
//! [[step]]
//! at_ms = 0
//! press = [0]
//!
//! [[step]]
//! at_ms = 50
//! press = [2]
//! release = [0]
//! ```
//!
//! Macro holds recorded by the sink move the clock forward after the poll
//! that fired them.

use crate::color::Rgb;
use crate::config::{Config, KeyIndex, LayerId, KEY_COUNT};
use crate::engine::LayerEngine;
use crate::error::ScriptError;
use crate::hal::VirtualKeypad;
use layerpad_hid::{HidEvent, RecordingSink};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// One timed change to the physical switches
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub at_ms: u64,
    #[serde(default)]
    pub press: Vec<KeyIndex>,
    #[serde(default)]
    pub release: Vec<KeyIndex>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Script {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// How long to keep polling after the last step
    #[serde(default = "default_tail")]
    pub tail_ms: u64,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_poll_interval() -> u64 {
    10
}

fn default_tail() -> u64 {
    300
}

/// Longest virtual run a script may ask for (one day)
pub const MAX_SCRIPT_MS: u64 = 24 * 60 * 60 * 1000;

impl Script {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ScriptError> {
        let mut script: Script = toml::from_str(content)?;
        if script.poll_interval_ms == 0 {
            return Err(ScriptError::PollInterval);
        }
        for step in &script.steps {
            if let Some(&key) = step
                .press
                .iter()
                .chain(&step.release)
                .find(|&&k| usize::from(k) >= KEY_COUNT)
            {
                return Err(ScriptError::KeyIndex {
                    at_ms: step.at_ms,
                    key,
                });
            }
        }
        script.steps.sort_by_key(|s| s.at_ms);

        let last = script.steps.last().map_or(0, |s| s.at_ms);
        match last.checked_add(script.tail_ms) {
            Some(end) if end <= MAX_SCRIPT_MS => Ok(script),
            _ => Err(ScriptError::TooLong {
                last_ms: last,
                tail_ms: script.tail_ms,
            }),
        }
    }

    fn end(&self) -> Duration {
        let last = self.steps.last().map_or(0, |s| s.at_ms);
        Duration::from_millis(last.saturating_add(self.tail_ms))
    }
}

/// Something observable that happened during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    /// HID output, stamped with the time it left the sink
    Output {
        at: Duration,
        key: Option<KeyIndex>,
        event: HidEvent,
    },
    LayerChange { at: Duration, layer: LayerId },
}

impl SimEvent {
    pub fn at(&self) -> Duration {
        match self {
            SimEvent::Output { at, .. } | SimEvent::LayerChange { at, .. } => *at,
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.at().as_millis();
        match self {
            SimEvent::Output {
                key: Some(key),
                event,
                ..
            } => write!(f, "{ms:>6}ms  key {key:>2}  {event}"),
            SimEvent::Output { key: None, event, .. } => write!(f, "{ms:>6}ms          {event}"),
            SimEvent::LayerChange { layer, .. } => write!(f, "{ms:>6}ms  layer -> {layer}"),
        }
    }
}

/// Outcome of a simulation run
#[derive(Debug, Clone)]
pub struct SimReport {
    pub events: Vec<SimEvent>,
    pub final_layer: LayerId,
    pub leds: [Option<Rgb>; KEY_COUNT],
    pub polls: usize,
    pub elapsed: Duration,
}

impl SimReport {
    /// HID events only, without timestamps
    pub fn outputs(&self) -> impl Iterator<Item = &HidEvent> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimEvent::Output { event, .. } => Some(event),
            SimEvent::LayerChange { .. } => None,
        })
    }

    pub fn layer_changes(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.events.iter().filter_map(|e| match e {
            SimEvent::LayerChange { layer, .. } => Some(*layer),
            SimEvent::Output { .. } => None,
        })
    }
}

/// Run a script against a configuration
pub fn run(config: Config, script: &Script) -> SimReport {
    let interval = Duration::from_millis(script.poll_interval_ms);
    let end = script.end();

    let mut pad = VirtualKeypad::new();
    let mut sink = RecordingSink::new();
    let mut engine = LayerEngine::new(config);
    engine.start(&mut pad);

    let mut steps = script.steps.iter().peekable();
    let mut events = Vec::new();
    let mut polls = 0;

    while pad.now() <= end {
        while let Some(step) = steps.next_if(|s| Duration::from_millis(s.at_ms) <= pad.now()) {
            step.press.iter().for_each(|&k| pad.press(k));
            step.release.iter().for_each(|&k| pad.release(k));
        }

        let started = pad.now();
        let cycle = engine.poll(&mut pad, &mut sink);
        polls += 1;

        if let Some(layer) = cycle.selected {
            events.push(SimEvent::LayerChange { at: started, layer });
        }

        let mut at = started;
        for event in sink.take_events() {
            match event {
                HidEvent::Pause(d) => at += d,
                event => events.push(SimEvent::Output {
                    at,
                    key: cycle.dispatched,
                    event,
                }),
            }
        }

        pad.advance(sink.take_paused());
        pad.advance(interval);
    }

    debug!("Simulation finished after {polls} polls");
    SimReport {
        events,
        final_layer: engine.current_layer(),
        leds: pad.leds(),
        polls,
        elapsed: pad.now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let script = Script::from_toml("").unwrap();
        assert_eq!(script.poll_interval_ms, 10);
        assert_eq!(script.tail_ms, 300);
        assert!(script.steps.is_empty());
    }

    #[test]
    fn steps_are_sorted() {
        let script = Script::from_toml(
            r#"
            [[step]]
            at_ms = 50
            release = [9]

            [[step]]
            at_ms = 0
            press = [9]
            "#,
        )
        .unwrap();
        assert_eq!(script.steps[0].at_ms, 0);
        assert_eq!(script.end(), Duration::from_millis(350));
    }

    #[test]
    fn rejects_bad_scripts() {
        assert!(matches!(
            Script::from_toml("poll_interval_ms = 0"),
            Err(ScriptError::PollInterval)
        ));
        assert!(matches!(
            Script::from_toml("[[step]]\nat_ms = 5\npress = [16]"),
            Err(ScriptError::KeyIndex { at_ms: 5, key: 16 })
        ));
        assert!(matches!(
            Script::from_toml("step = 3"),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn rejects_runs_longer_than_a_day() {
        let err = Script::from_toml(
            "tail_ms = 9223372036854775807\n[[step]]\nat_ms = 9223372036854775807\npress = [9]",
        )
        .unwrap_err();
        assert!(matches!(err, ScriptError::TooLong { .. }));

        let err = Script::from_toml("tail_ms = 86400001").unwrap_err();
        assert!(matches!(err, ScriptError::TooLong { last_ms: 0, .. }));

        let script = Script::from_toml("tail_ms = 0\n[[step]]\nat_ms = 86400000").unwrap();
        assert_eq!(script.end(), Duration::from_millis(MAX_SCRIPT_MS));
    }

    #[test]
    fn tap_fires_once_and_leds_settle() {
        let config = Config::from_json(r#"{"layers": {"1": {"keys": {"9": "MUTE"}}}}"#).unwrap();
        let script = Script::from_toml(
            r#"
            [[step]]
            at_ms = 20
            press = [9]
            [[step]]
            at_ms = 200
            release = [9]
            "#,
        )
        .unwrap();
        let report = run(config, &script);
        assert_eq!(
            report.outputs().cloned().collect::<Vec<_>>(),
            [HidEvent::Consumer(0x00E2)]
        );
        assert_eq!(report.events[0].at(), Duration::from_millis(20));
        assert_eq!(report.leds[0], Some(Rgb::GREEN));
        assert_eq!(report.leds[1], None);
        assert_eq!(report.leds[9], Some(Rgb::BLUE));
    }

    #[test]
    fn macro_pauses_move_the_clock() {
        let config = Config::from_json(
            r#"{"layers": {"1": {"keys": {"10": {"type": "app", "shortcut": "WIN+R", "command": "notepad"}}}}}"#,
        )
        .unwrap();
        let script = Script::from_toml("tail_ms = 0\n[[step]]\nat_ms = 0\npress = [10]").unwrap();
        let report = run(config, &script);
        let stamps: Vec<u128> = report.events.iter().map(|e| e.at().as_millis()).collect();
        // press, release after the hold, then text and enter after the launcher wait
        assert_eq!(stamps, [0, 100, 600, 600]);
        assert!(report.elapsed >= Duration::from_millis(600));
    }
}
