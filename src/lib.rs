//! Layer and key-event engine for a 16-key macro keypad
//!
//! Key 0 is a modifier; holding it and tapping keys 1-8 switches between up
//! to eight layers described in a JSON configuration. Keys 9-15 fire the
//! active layer's bindings (keys, media controls, typed text, app-launch
//! macros) through a [`layerpad_hid::HidSink`], and every key's LED tracks
//! the engine state.

pub mod app_launch;
pub mod code;
pub mod color;
pub mod config;
pub mod deploy;
pub mod editor;
pub mod engine;
pub mod error;
pub mod hal;
pub mod led;
pub mod sim;

pub use color::{ColorSetting, Rgb};
pub use config::{Config, ConfigWarning, Debounce, KeyBinding, KeyEntry, Layer, Timing};
pub use engine::{Cycle, LayerEngine};
pub use error::{ConfigError, DeployError, DispatchError, EditError, ScriptError};
pub use hal::{Keypad, VirtualKeypad};
pub use led::LedState;
