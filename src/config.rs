//! Keypad configuration model
//!
//! Parses the `config.json` document into layers of typed key bindings.
//! Only an unreadable or non-JSON document is fatal; anything wrong inside
//! a single layer or key is dropped with a [`ConfigWarning`] so the rest of
//! the keypad keeps working.
//!
//! ```json
//! {
//!   "layers": {
//!     "1": {
//!       "name": "Media",
//!       "color": [0, 0, 255],
//!       "keys": {
//!         "9": "PLAY_PAUSE",
//!         "10": { "code": "VOLUME_INCREMENT", "color": [0, 255, 0] },
//!         "11": { "type": "app", "shortcut": "WIN+R", "command": "notepad" }
//!       }
//!     }
//!   }
//! }
//! ```

use crate::app_launch::AppMacro;
use crate::code::{resolve, Resolved};
use crate::color::{ColorSetting, Rgb};
use crate::error::ConfigError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Layer identifier (1-8)
pub type LayerId = u8;

/// Physical key index (0-15)
pub type KeyIndex = u8;

/// Number of physical keys on the pad
pub const KEY_COUNT: usize = 16;

/// The key that arms layer selection while held
pub const MODIFIER_KEY: KeyIndex = 0;

/// Keys that pick a layer while the modifier is held; key N selects layer N
pub const SELECTOR_KEYS: RangeInclusive<KeyIndex> = 1..=8;

/// Keys bound to actions within the active layer
pub const CONTENT_KEYS: RangeInclusive<KeyIndex> = 9..=15;

/// Debounce class of a dispatched action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Debounce {
    /// Single key or media send
    Short,
    /// Typed text or app-launch macro
    Long,
}

/// Timing constants for debounce and macro holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub short_debounce: Duration,
    pub long_debounce: Duration,
    pub shortcut_hold: Duration,
    pub launcher_wait: Duration,
}

impl Timing {
    pub fn interval(&self, class: Debounce) -> Duration {
        match class {
            Debounce::Short => self.short_debounce,
            Debounce::Long => self.long_debounce,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        RawTiming::default().into()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTiming {
    short_debounce_ms: u64,
    long_debounce_ms: u64,
    shortcut_hold_ms: u64,
    launcher_wait_ms: u64,
}

impl Default for RawTiming {
    fn default() -> Self {
        Self {
            short_debounce_ms: 30,
            long_debounce_ms: 150,
            shortcut_hold_ms: 100,
            launcher_wait_ms: 500,
        }
    }
}

impl From<RawTiming> for Timing {
    fn from(raw: RawTiming) -> Self {
        Self {
            short_debounce: Duration::from_millis(raw.short_debounce_ms),
            long_debounce: Duration::from_millis(raw.long_debounce_ms),
            shortcut_hold: Duration::from_millis(raw.shortcut_hold_ms),
            launcher_wait: Duration::from_millis(raw.launcher_wait_ms),
        }
    }
}

/// What a content key does when pressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    /// Bare string: `"A"`, `"MUTE"`, `"hello"`
    Plain(Resolved),
    /// `{ "code": ..., "color"?: [r, g, b] }`
    Code(Resolved),
    /// `{ "type": "app", "shortcut"?: ..., "command"?: ..., "color"?: [r, g, b] }`
    App(AppMacro),
}

impl KeyBinding {
    /// Debounce class the engine arms after firing this binding
    pub fn debounce(&self) -> Debounce {
        match self {
            KeyBinding::Plain(resolved) | KeyBinding::Code(resolved) => resolved.debounce(),
            KeyBinding::App(_) => Debounce::Long,
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyBinding::Plain(resolved) | KeyBinding::Code(resolved) => write!(f, "{resolved}"),
            KeyBinding::App(app) => write!(f, "{app}"),
        }
    }
}

/// A bound content key: action plus optional LED override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub binding: KeyBinding,
    pub color: ColorSetting,
}

/// One layer of bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub name: Option<String>,
    pub color: ColorSetting,
    /// Content keys in ascending index order
    pub keys: BTreeMap<KeyIndex, KeyEntry>,
}

impl Layer {
    /// Fallback LED color for content keys without their own color
    pub const DEFAULT_CONTENT_COLOR: Rgb = Rgb::BLUE;

    /// Color shown on this layer's selector key; `None` keeps it dark
    pub fn selector_color(&self) -> Option<Rgb> {
        self.color.resolve(Rgb::BLACK)
    }

    /// Default content-key color; `None` keeps inheriting keys dark
    pub fn content_color(&self) -> Option<Rgb> {
        self.color.resolve(Self::DEFAULT_CONTENT_COLOR)
    }

    /// LED color of a bound key: its own override, else the layer default
    pub fn key_color(&self, entry: &KeyEntry) -> Option<Rgb> {
        match &entry.color {
            ColorSetting::Unset => self.content_color(),
            own => own.resolve(Self::DEFAULT_CONTENT_COLOR),
        }
    }

    pub fn display_name(&self, id: LayerId) -> String {
        self.name.clone().unwrap_or_else(|| format!("Layer {id}"))
    }
}

/// Something in the document that was skipped rather than loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Layer key is not one of "1" to "8"
    LayerId { raw: String },
    /// Layer body is not an object, or its `keys` is not an object
    MalformedLayer { layer: LayerId, reason: String },
    /// Key index is not an integer in 9-15
    KeyIndex { layer: LayerId, raw: String },
    /// Binding does not match any binding shape
    MalformedKey {
        layer: LayerId,
        key: KeyIndex,
        reason: String,
    },
    /// Color is not three integers in 0-255; the LED stays dark
    InvalidColor {
        layer: LayerId,
        key: Option<KeyIndex>,
        raw: String,
    },
    /// App shortcut names no key; only the command part will run
    EmptyShortcut {
        layer: LayerId,
        key: KeyIndex,
        raw: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayerId { raw } => {
                write!(f, "layer \"{raw}\": id must be one of \"1\" to \"8\", ignored")
            }
            Self::MalformedLayer { layer, reason } => write!(f, "layer {layer}: {reason}"),
            Self::KeyIndex { layer, raw } => write!(
                f,
                "layer {layer} key \"{raw}\": index must be an integer 9-15, ignored"
            ),
            Self::MalformedKey { layer, key, reason } => {
                write!(f, "layer {layer} key {key}: {reason}, ignored")
            }
            Self::InvalidColor {
                layer,
                key: Some(key),
                raw,
            } => write!(f, "layer {layer} key {key}: invalid color {raw}, LED off"),
            Self::InvalidColor {
                layer,
                key: None,
                raw,
            } => write!(f, "layer {layer}: invalid color {raw}, LEDs off"),
            Self::EmptyShortcut { layer, key, raw } => {
                write!(f, "layer {layer} key {key}: shortcut \"{raw}\" names no key")
            }
        }
    }
}

/// Shape of a single binding as written in JSON
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBinding {
    Plain(String),
    App {
        #[serde(rename = "type")]
        _kind: AppTag,
        #[serde(default)]
        shortcut: Option<String>,
        #[serde(default)]
        command: Option<String>,
        #[serde(default)]
        color: Option<Value>,
    },
    Code {
        code: String,
        #[serde(default)]
        color: Option<Value>,
    },
}

#[derive(Deserialize)]
enum AppTag {
    #[serde(rename = "app")]
    App,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    layers: Value,
    #[serde(default)]
    timing: Option<Value>,
}

/// Parsed keypad configuration
///
/// Immutable once loaded; a reload replaces it wholesale.
#[derive(Debug, Clone, Default)]
pub struct Config {
    layers: BTreeMap<LayerId, Layer>,
    timing: Timing,
    warnings: Vec<ConfigWarning>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("layerpad")
            .join("config.json")
    }

    /// Load and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {} bytes from {}", text.len(), path.display());
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let raw: RawConfig = serde_json::from_value(value)?;

        let timing = match raw.timing {
            None | Some(Value::Null) => Timing::default(),
            Some(t) => serde_json::from_value::<RawTiming>(t)
                .map_err(ConfigError::Timing)?
                .into(),
        };

        let mut config = Config {
            layers: BTreeMap::new(),
            timing,
            warnings: Vec::new(),
        };

        match raw.layers {
            Value::Null => {}
            Value::Object(layers) => {
                for (raw_id, body) in layers {
                    config.add_layer(&raw_id, body);
                }
            }
            other => config.warnings.push(ConfigWarning::LayerId {
                raw: format!("layers = {other}"),
            }),
        }

        for warning in &config.warnings {
            warn!("{warning}");
        }
        debug!(
            "Configuration has {} layer(s), {} warning(s)",
            config.layers.len(),
            config.warnings.len()
        );
        Ok(config)
    }

    fn add_layer(&mut self, raw_id: &str, body: Value) {
        let Some(id) = parse_layer_id(raw_id) else {
            self.warnings.push(ConfigWarning::LayerId {
                raw: raw_id.to_string(),
            });
            return;
        };

        let Value::Object(mut body) = body else {
            self.warnings.push(ConfigWarning::MalformedLayer {
                layer: id,
                reason: "layer must be an object".into(),
            });
            return;
        };

        let color = ColorSetting::from_json(body.get("color"));
        if let ColorSetting::Invalid(raw) = &color {
            self.warnings.push(ConfigWarning::InvalidColor {
                layer: id,
                key: None,
                raw: raw.clone(),
            });
        }

        let mut layer = Layer {
            name: body.get("name").and_then(Value::as_str).map(str::to_string),
            color,
            keys: BTreeMap::new(),
        };

        match body.remove("keys") {
            None | Some(Value::Null) => {}
            Some(Value::Object(keys)) => {
                for (raw_key, binding) in keys {
                    self.add_key(id, &mut layer, &raw_key, binding);
                }
            }
            Some(_) => self.warnings.push(ConfigWarning::MalformedLayer {
                layer: id,
                reason: "\"keys\" must be an object, layer has no bindings".into(),
            }),
        }

        self.layers.insert(id, layer);
    }

    fn add_key(&mut self, layer_id: LayerId, layer: &mut Layer, raw_key: &str, value: Value) {
        let Some(key) = parse_index(raw_key, CONTENT_KEYS) else {
            self.warnings.push(ConfigWarning::KeyIndex {
                layer: layer_id,
                raw: raw_key.to_string(),
            });
            return;
        };

        let reason = describe_malformed(&value);
        let (binding, color) = match serde_json::from_value::<RawBinding>(value) {
            Ok(RawBinding::Plain(code)) => (KeyBinding::Plain(resolve(&code)), None),
            Ok(RawBinding::Code { code, color }) => (KeyBinding::Code(resolve(&code)), color),
            Ok(RawBinding::App {
                shortcut: None,
                command: None,
                ..
            }) => {
                self.warnings.push(ConfigWarning::MalformedKey {
                    layer: layer_id,
                    key,
                    reason: "app binding needs a shortcut or a command".into(),
                });
                return;
            }
            Ok(RawBinding::App {
                shortcut,
                command,
                color,
                ..
            }) => {
                let app = AppMacro::new(shortcut.as_deref(), command.as_deref());
                if let Some(s) = app.shortcut.as_ref().filter(|s| s.is_empty()) {
                    self.warnings.push(ConfigWarning::EmptyShortcut {
                        layer: layer_id,
                        key,
                        raw: s.as_str().to_string(),
                    });
                }
                (KeyBinding::App(app), color)
            }
            Err(_) => {
                self.warnings.push(ConfigWarning::MalformedKey {
                    layer: layer_id,
                    key,
                    reason,
                });
                return;
            }
        };

        let color = ColorSetting::from_json(color.as_ref());
        if let ColorSetting::Invalid(raw) = &color {
            self.warnings.push(ConfigWarning::InvalidColor {
                layer: layer_id,
                key: Some(key),
                raw: raw.clone(),
            });
        }

        layer.keys.insert(key, KeyEntry { binding, color });
    }

    /// Look up a layer; absent is a normal outcome
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    /// Look up a key binding within a layer; absent is a normal outcome
    pub fn binding(&self, layer: LayerId, key: KeyIndex) -> Option<&KeyEntry> {
        self.layer(layer)?.keys.get(&key)
    }

    /// Configured layers in ascending id order
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().map(|(&id, layer)| (id, layer))
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Entries skipped or degraded while loading
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }
}

/// Layer ids are matched as written: "01" is not layer 1
fn parse_layer_id(raw: &str) -> Option<LayerId> {
    parse_index(raw, SELECTOR_KEYS).filter(|id| id.to_string() == raw)
}

fn parse_index(raw: &str, range: RangeInclusive<u8>) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|n| range.contains(n))
}

fn describe_malformed(value: &Value) -> String {
    match value {
        Value::Object(obj) if is_app(obj) => {
            "app binding needs string \"shortcut\"/\"command\" fields".into()
        }
        Value::Object(obj) if obj.contains_key("code") => "\"code\" must be a string".into(),
        Value::Object(_) => "object binding needs a \"code\" or \"type\": \"app\"".into(),
        other => format!("expected a string or object, got {other}"),
    }
}

fn is_app(obj: &Map<String, Value>) -> bool {
    obj.get("type").and_then(Value::as_str) == Some("app")
}
