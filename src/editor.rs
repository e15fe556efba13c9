//! In-place editing of the configuration document
//!
//! Edits work on the raw JSON rather than on [`Config`], so fields the
//! keypad ignores (and the user's own additions) survive a round trip.
//! Every edit is checked by loading the result; an edit that would add a
//! load warning is refused and the document is left unchanged.

use crate::color::Rgb;
use crate::config::{Config, KeyIndex, LayerId, CONTENT_KEYS, SELECTOR_KEYS};
use crate::error::{ConfigError, EditError};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// A binding as entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSpec {
    Code {
        code: String,
        color: Option<Rgb>,
    },
    App {
        shortcut: Option<String>,
        command: Option<String>,
        color: Option<Rgb>,
    },
}

impl BindingSpec {
    /// JSON form; a code without a color is written as a bare string
    pub fn to_json(&self) -> Result<Value, EditError> {
        match self {
            BindingSpec::Code { code, color: None } => Ok(Value::from(code.as_str())),
            BindingSpec::Code {
                code,
                color: Some(color),
            } => Ok(json!({ "code": code, "color": color.to_array() })),
            BindingSpec::App {
                shortcut: None,
                command: None,
                ..
            } => Err(EditError::EmptyApp),
            BindingSpec::App {
                shortcut,
                command,
                color,
            } => {
                let mut obj = Map::new();
                obj.insert("type".into(), "app".into());
                if let Some(shortcut) = shortcut {
                    obj.insert("shortcut".into(), shortcut.as_str().into());
                }
                if let Some(command) = command {
                    obj.insert("command".into(), command.as_str().into());
                }
                if let Some(color) = color {
                    obj.insert("color".into(), json!(color.to_array()));
                }
                Ok(Value::Object(obj))
            }
        }
    }
}

/// Editable configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl Default for ConfigDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigDocument {
    /// Empty document with no layers
    pub fn new() -> Self {
        let mut root = Map::new();
        root.insert("layers".into(), Value::Object(Map::new()));
        Self { root }
    }

    /// A small working layout to start from
    pub fn starter() -> Self {
        let value = json!({
            "layers": {
                "1": {
                    "name": "Media",
                    "color": [0, 0, 255],
                    "keys": {
                        "9": "SCAN_PREVIOUS_TRACK",
                        "10": "PLAY_PAUSE",
                        "11": "SCAN_NEXT_TRACK",
                        "12": { "code": "MUTE", "color": [255, 0, 0] },
                        "13": "VOLUME_DECREMENT",
                        "14": "VOLUME_INCREMENT"
                    }
                },
                "2": {
                    "name": "Apps",
                    "color": [0, 255, 0],
                    "keys": {
                        "9": { "type": "app", "shortcut": "WIN+R", "command": "notepad" },
                        "10": { "type": "app", "shortcut": "CTRL+ALT+T" },
                        "15": { "code": "git status", "color": [255, 255, 0] }
                    }
                }
            }
        });
        match value {
            Value::Object(root) => Self { root },
            _ => Self::new(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, EditError> {
        match serde_json::from_str::<Value>(text).map_err(ConfigError::Parse)? {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(ConfigError::NotAnObject.into()),
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Parse the document the way the keypad will
    pub fn validate(&self) -> Result<Config, EditError> {
        Ok(Config::from_value(self.as_value())?)
    }

    /// Bind a content key, creating the layer if needed
    pub fn set_key(
        &mut self,
        layer: LayerId,
        key: KeyIndex,
        spec: &BindingSpec,
    ) -> Result<(), EditError> {
        check_layer(layer)?;
        check_key(key)?;
        let binding = spec.to_json()?;
        self.apply(|root| {
            keys_mut(layer_mut(root, layer, true)?)?.insert(key.to_string(), binding);
            Ok(())
        })?;
        info!("Layer {layer} key {key} bound");
        Ok(())
    }

    pub fn clear_key(&mut self, layer: LayerId, key: KeyIndex) -> Result<(), EditError> {
        check_layer(layer)?;
        check_key(key)?;
        self.apply(|root| {
            let keys = keys_mut(layer_mut(root, layer, false)?)?;
            keys.remove(&key.to_string())
                .map(drop)
                .ok_or(EditError::NoSuchKey { layer, key })
        })?;
        info!("Layer {layer} key {key} cleared");
        Ok(())
    }

    /// Set a layer's name and/or default color, creating the layer if needed
    pub fn set_layer(
        &mut self,
        layer: LayerId,
        name: Option<&str>,
        color: Option<Rgb>,
    ) -> Result<(), EditError> {
        check_layer(layer)?;
        self.apply(|root| {
            let body = layer_mut(root, layer, true)?;
            if let Some(name) = name {
                body.insert("name".into(), name.into());
            }
            if let Some(color) = color {
                body.insert("color".into(), json!(color.to_array()));
            }
            body.entry("keys").or_insert_with(|| Value::Object(Map::new()));
            Ok(())
        })?;
        info!("Layer {layer} updated");
        Ok(())
    }

    pub fn remove_layer(&mut self, layer: LayerId) -> Result<(), EditError> {
        check_layer(layer)?;
        self.apply(|root| {
            layers_mut(root)?
                .remove(&layer.to_string())
                .map(drop)
                .ok_or(EditError::NoSuchLayer(layer))
        })?;
        info!("Layer {layer} removed");
        Ok(())
    }

    /// Pretty JSON with two-space indentation
    pub fn to_pretty(&self) -> String {
        format!("{:#}\n", self.as_value())
    }

    /// Validate then write, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<Config, EditError> {
        let path = path.as_ref();
        let config = self.validate()?;
        let write_err = |source| EditError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, self.to_pretty()).map_err(write_err)?;
        debug!("Wrote {}", path.display());
        Ok(config)
    }

    /// Run an edit on a copy and keep it only if it loads without new warnings
    fn apply<F>(&mut self, edit: F) -> Result<(), EditError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<(), EditError>,
    {
        let before: Vec<String> = match self.validate() {
            Ok(config) => config.warnings().iter().map(ToString::to_string).collect(),
            Err(_) => Vec::new(),
        };

        let mut next = self.root.clone();
        edit(&mut next)?;
        let config = Config::from_value(Value::Object(next.clone()))?;
        if let Some(new) = config
            .warnings()
            .iter()
            .map(ToString::to_string)
            .find(|w| !before.contains(w))
        {
            return Err(EditError::Rejected(new));
        }

        self.root = next;
        Ok(())
    }
}

fn check_layer(layer: LayerId) -> Result<(), EditError> {
    if SELECTOR_KEYS.contains(&layer) {
        Ok(())
    } else {
        Err(EditError::LayerId(layer))
    }
}

fn check_key(key: KeyIndex) -> Result<(), EditError> {
    if CONTENT_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(EditError::KeyIndex(key))
    }
}

fn layers_mut(root: &mut Map<String, Value>) -> Result<&mut Map<String, Value>, EditError> {
    root.entry("layers")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| EditError::Rejected("\"layers\" is not an object".into()))
}

fn layer_mut(
    root: &mut Map<String, Value>,
    layer: LayerId,
    create: bool,
) -> Result<&mut Map<String, Value>, EditError> {
    let layers = layers_mut(root)?;
    let id = layer.to_string();
    if !layers.contains_key(&id) {
        if !create {
            return Err(EditError::NoSuchLayer(layer));
        }
        layers.insert(id.clone(), json!({ "keys": {} }));
    }
    layers
        .get_mut(&id)
        .and_then(Value::as_object_mut)
        .ok_or_else(|| EditError::Rejected(format!("layer {layer} is not an object")))
}

fn keys_mut(layer: &mut Map<String, Value>) -> Result<&mut Map<String, Value>, EditError> {
    layer
        .entry("keys")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| EditError::Rejected("\"keys\" is not an object".into()))
}
