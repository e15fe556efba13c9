//! HID output sinks
//!
//! [`HidSink`] is the seam between the layer engine and whatever actually
//! emits USB reports. The sinks here record or log output instead of
//! touching hardware.

use crate::codes::{consumer_name, key_name};
use crate::error::HidError;
use crate::report::{text_reports, ConsumerReport, KeyboardReport, Report};
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Destination for keyboard, media and text output
pub trait HidSink {
    /// Tap a single keyboard usage (press + release)
    fn send_key(&mut self, code: u8) -> Result<(), HidError>;

    /// Tap a consumer-control usage
    fn send_consumer(&mut self, code: u16) -> Result<(), HidError>;

    /// Type text character by character
    fn type_text(&mut self, text: &str) -> Result<(), HidError>;

    /// Hold a set of keyboard usages down together
    fn press(&mut self, codes: &[u8]) -> Result<(), HidError>;

    /// Release every held key
    fn release_all(&mut self) -> Result<(), HidError>;

    /// Block for a fixed hold inside a macro
    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<S: HidSink + ?Sized> HidSink for &mut S {
    fn send_key(&mut self, code: u8) -> Result<(), HidError> {
        (**self).send_key(code)
    }

    fn send_consumer(&mut self, code: u16) -> Result<(), HidError> {
        (**self).send_consumer(code)
    }

    fn type_text(&mut self, text: &str) -> Result<(), HidError> {
        (**self).type_text(text)
    }

    fn press(&mut self, codes: &[u8]) -> Result<(), HidError> {
        (**self).press(codes)
    }

    fn release_all(&mut self) -> Result<(), HidError> {
        (**self).release_all()
    }

    fn pause(&mut self, duration: Duration) {
        (**self).pause(duration)
    }
}

/// One call made on a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HidEvent {
    Key(u8),
    Consumer(u16),
    Text(String),
    Press(Vec<u8>),
    ReleaseAll,
    Pause(Duration),
}

impl HidEvent {
    /// Expand the event into the reports a USB keyboard would send
    pub fn to_reports(&self) -> Result<Vec<Report>, HidError> {
        let reports = match self {
            HidEvent::Key(code) => vec![
                Report::Keyboard(KeyboardReport::from_usages(&[*code])?),
                Report::Keyboard(KeyboardReport::EMPTY),
            ],
            HidEvent::Consumer(code) => vec![
                Report::Consumer(ConsumerReport { usage: *code }),
                Report::Consumer(ConsumerReport::default()),
            ],
            HidEvent::Text(text) => text_reports(text)?
                .into_iter()
                .map(Report::Keyboard)
                .collect(),
            HidEvent::Press(codes) => vec![Report::Keyboard(KeyboardReport::from_usages(codes)?)],
            HidEvent::ReleaseAll => vec![Report::Keyboard(KeyboardReport::EMPTY)],
            HidEvent::Pause(_) => Vec::new(),
        };
        Ok(reports)
    }
}

impl fmt::Display for HidEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HidEvent::Key(code) => write!(f, "key {}", key_name(*code)),
            HidEvent::Consumer(code) => match consumer_name(*code) {
                Some(name) => write!(f, "media {name}"),
                None => write!(f, "media 0x{code:04X}"),
            },
            HidEvent::Text(text) => write!(f, "type {text:?}"),
            HidEvent::Press(codes) => {
                let names: Vec<&str> = codes.iter().map(|&c| key_name(c)).collect();
                write!(f, "press {}", names.join("+"))
            }
            HidEvent::ReleaseAll => write!(f, "release all"),
            HidEvent::Pause(d) => write!(f, "pause {}ms", d.as_millis()),
        }
    }
}

/// Sink that records every call and never sleeps
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<HidEvent>,
    paused: Duration,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, in call order
    pub fn events(&self) -> &[HidEvent] {
        &self.events
    }

    /// Drain recorded events
    pub fn take_events(&mut self) -> Vec<HidEvent> {
        std::mem::take(&mut self.events)
    }

    /// Total time macros asked to pause
    pub fn paused(&self) -> Duration {
        self.paused
    }

    /// Drain the pause accumulator
    pub fn take_paused(&mut self) -> Duration {
        std::mem::take(&mut self.paused)
    }
}

impl HidSink for RecordingSink {
    fn send_key(&mut self, code: u8) -> Result<(), HidError> {
        self.events.push(HidEvent::Key(code));
        Ok(())
    }

    fn send_consumer(&mut self, code: u16) -> Result<(), HidError> {
        self.events.push(HidEvent::Consumer(code));
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), HidError> {
        self.events.push(HidEvent::Text(text.to_string()));
        Ok(())
    }

    fn press(&mut self, codes: &[u8]) -> Result<(), HidError> {
        self.events.push(HidEvent::Press(codes.to_vec()));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), HidError> {
        self.events.push(HidEvent::ReleaseAll);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.paused += duration;
        self.events.push(HidEvent::Pause(duration));
    }
}

/// Sink that logs each call through `tracing` and otherwise does nothing
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    fn emit(&self, event: HidEvent) {
        info!(target: "layerpad_hid::out", "{event}");
    }
}

impl HidSink for TracingSink {
    fn send_key(&mut self, code: u8) -> Result<(), HidError> {
        self.emit(HidEvent::Key(code));
        Ok(())
    }

    fn send_consumer(&mut self, code: u16) -> Result<(), HidError> {
        self.emit(HidEvent::Consumer(code));
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), HidError> {
        self.emit(HidEvent::Text(text.to_string()));
        Ok(())
    }

    fn press(&mut self, codes: &[u8]) -> Result<(), HidError> {
        self.emit(HidEvent::Press(codes.to_vec()));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), HidError> {
        self.emit(HidEvent::ReleaseAll);
        Ok(())
    }

    fn pause(&mut self, duration: Duration) {
        self.emit(HidEvent::Pause(duration));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order_and_pauses() {
        let mut sink = RecordingSink::new();
        sink.press(&[0xE3, 0x15]).unwrap();
        sink.pause(Duration::from_millis(100));
        sink.release_all().unwrap();
        assert_eq!(
            sink.events(),
            &[
                HidEvent::Press(vec![0xE3, 0x15]),
                HidEvent::Pause(Duration::from_millis(100)),
                HidEvent::ReleaseAll,
            ]
        );
        assert_eq!(sink.take_paused(), Duration::from_millis(100));
        assert_eq!(sink.paused(), Duration::ZERO);
    }

    #[test]
    fn forwarding_through_mut_ref() {
        fn tap<S: HidSink>(mut sink: S) {
            sink.send_key(0x04).unwrap();
        }
        let mut sink = RecordingSink::new();
        tap(&mut sink);
        assert_eq!(sink.events(), &[HidEvent::Key(0x04)]);
    }

    #[test]
    fn event_display() {
        assert_eq!(HidEvent::Key(0x28).to_string(), "key ENTER");
        assert_eq!(HidEvent::Consumer(0x00E9).to_string(), "media VOLUME_INCREMENT");
        assert_eq!(HidEvent::Press(vec![0xE3, 0x15]).to_string(), "press LEFT_GUI+R");
        assert_eq!(HidEvent::Text("hi".into()).to_string(), "type \"hi\"");
    }

    #[test]
    fn key_event_expands_to_press_and_release() {
        let reports = HidEvent::Key(0x04).to_reports().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1], Report::Keyboard(KeyboardReport::EMPTY));
        assert!(HidEvent::Pause(Duration::from_millis(5))
            .to_reports()
            .unwrap()
            .is_empty());
    }

    #[test]
    fn tracing_sink_never_fails() {
        let mut sink = TracingSink;
        sink.press(&[0xE0, 0xE2, 0x17]).unwrap();
        sink.pause(Duration::from_secs(5));
        sink.release_all().unwrap();
        sink.type_text("anything at all").unwrap();
        sink.send_consumer(0x00E2).unwrap();
    }
}
