// CLI definitions using clap

use clap::{Parser, Subcommand};
use layerpad::color::{parse_rgb_arg, Rgb};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "layerpad")]
#[command(author, version, about = "Layered macro keypad configuration tool")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/layerpad/config.json)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // === Inspect ===
    /// Load the configuration and list anything that was skipped
    #[command(visible_alias = "c")]
    Check,

    /// Show layers and their bindings
    #[command(visible_alias = "s")]
    Show {
        /// Only this layer
        #[arg(short, long)]
        layer: Option<u8>,
    },

    /// Render the LED frame for a layer
    Leds {
        /// Current layer
        #[arg(short, long, default_value_t = 1)]
        layer: u8,
        /// Render as if the modifier key were held
        #[arg(long)]
        held: bool,
    },

    /// Show how a code string is interpreted
    Resolve {
        /// Key name, media name or text
        code: String,
    },

    /// Replay a TOML key script against the configuration
    #[command(visible_alias = "sim")]
    Simulate {
        /// Script file
        script: PathBuf,
        /// Also print the raw HID reports for each output
        #[arg(long)]
        reports: bool,
    },

    /// Fire one binding, logging the HID output instead of sending it
    /// (shown at --log-level info)
    Press {
        /// Layer (1-8)
        layer: u8,
        /// Content key (9-15)
        key: u8,
    },

    // === Edit ===
    /// Bind a content key
    SetKey {
        /// Layer (1-8)
        layer: u8,
        /// Content key (9-15)
        key: u8,
        /// Key name, media name or text to type
        #[arg(long, conflicts_with_all = ["shortcut", "command"])]
        code: Option<String>,
        /// App launch: key combination such as WIN+R
        #[arg(long)]
        shortcut: Option<String>,
        /// App launch: text typed after the shortcut, followed by Enter
        #[arg(long)]
        command: Option<String>,
        /// LED color override as r,g,b
        #[arg(long, value_parser = parse_rgb_arg)]
        color: Option<Rgb>,
    },

    /// Remove a content key binding
    ClearKey {
        /// Layer (1-8)
        layer: u8,
        /// Content key (9-15)
        key: u8,
    },

    /// Set a layer's name or default color
    SetLayer {
        /// Layer (1-8)
        layer: u8,
        #[arg(long)]
        name: Option<String>,
        /// Default color as r,g,b
        #[arg(long, value_parser = parse_rgb_arg)]
        color: Option<Rgb>,
        /// Delete the layer instead
        #[arg(long, conflicts_with_all = ["name", "color"])]
        remove: bool,
    },

    /// Write a starter configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    // === Device ===
    /// Copy the configuration onto the keypad's CIRCUITPY volume
    Deploy {
        /// Mounted volume (auto-detected when omitted)
        #[arg(long)]
        volume: Option<PathBuf>,
    },
}
