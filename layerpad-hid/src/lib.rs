//! HID output side of the layerpad macro keypad
//!
//! This crate knows how keys are named, how text maps onto a US keyboard
//! layout and how key presses become USB boot keyboard / consumer reports.
//! The engine talks to it only through the [`HidSink`] trait.

pub mod codes;
pub mod error;
pub mod report;
pub mod sink;

pub use codes::{char_to_hid, consumer_code_from_name, consumer_name, key_name, keycode_from_name};
pub use error::HidError;
pub use report::{ConsumerReport, KeyboardReport, Report};
pub use sink::{HidEvent, HidSink, RecordingSink, TracingSink};
