//! Error types shared across the engine

use crate::config::{KeyIndex, LayerId};
use layerpad_hid::HidError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors: the keypad refuses to start on any of these
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Source could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source is not JSON
    #[error("Configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Source is JSON but not an object at the top level
    #[error("Configuration root must be a JSON object")]
    NotAnObject,

    /// `timing` section present but unusable
    #[error("Invalid timing section: {0}")]
    Timing(#[source] serde_json::Error),
}

/// A bound key whose action could not be delivered
///
/// Never aborts a polling cycle; the engine logs it and keeps going.
#[derive(Error, Debug)]
#[error("Key {key} on layer {layer}: {source}")]
pub struct DispatchError {
    pub layer: LayerId,
    pub key: KeyIndex,
    #[source]
    pub source: HidError,
}

/// Simulator script could not be used
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to read script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Step at {at_ms}ms names key {key}, keys are 0-15")]
    KeyIndex { at_ms: u64, key: u8 },

    #[error("poll_interval_ms must be at least 1")]
    PollInterval,

    #[error("Script runs too long (last step at {last_ms}ms, tail {tail_ms}ms), limit is 24h")]
    TooLong { last_ms: u64, tail_ms: u64 },
}

/// A configuration edit was refused
#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Layer {0} is outside 1-8")]
    LayerId(LayerId),

    #[error("Key {0} is not a content key (9-15)")]
    KeyIndex(KeyIndex),

    #[error("Layer {0} is not configured")]
    NoSuchLayer(LayerId),

    #[error("Layer {layer} has no binding on key {key}")]
    NoSuchKey { layer: LayerId, key: KeyIndex },

    #[error("An app binding needs a shortcut or a command")]
    EmptyApp,

    #[error("Edited document would not load: {0}")]
    Rejected(String),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copying the configuration onto the keypad failed
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No CIRCUITPY volume found, plug in the keypad or pass --volume")]
    NoVolume,

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
