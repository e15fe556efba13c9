// Color values for the per-key LEDs

use serde_json::Value;
use std::fmt;

/// RGB color value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Quarter brightness, truncating each channel
    pub const fn dim(self) -> Self {
        Self {
            r: self.r / 4,
            g: self.g / 4,
            b: self.b / 4,
        }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// A color as written in the configuration
///
/// Colors are kept even when they are unusable so the LED for that key can
/// go dark without the rest of the binding being lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColorSetting {
    /// No color given; the caller's fallback applies
    #[default]
    Unset,
    Rgb(Rgb),
    /// Present but not three integers in 0-255
    Invalid(String),
}

impl ColorSetting {
    /// Interpret an optional JSON value as a color
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => ColorSetting::Unset,
            Some(v) => match parse_rgb(v) {
                Some(rgb) => ColorSetting::Rgb(rgb),
                None => ColorSetting::Invalid(v.to_string()),
            },
        }
    }

    /// Resolve against a fallback: `None` means the LED must stay dark
    pub fn resolve(&self, fallback: Rgb) -> Option<Rgb> {
        match self {
            ColorSetting::Unset => Some(fallback),
            ColorSetting::Rgb(rgb) => Some(*rgb),
            ColorSetting::Invalid(_) => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ColorSetting::Invalid(_))
    }
}

fn parse_rgb(value: &Value) -> Option<Rgb> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let mut channels = [0u8; 3];
    for (slot, item) in channels.iter_mut().zip(items) {
        *slot = u8::try_from(item.as_u64()?).ok()?;
    }
    Some(Rgb::from(channels))
}

/// Parse `r,g,b` as typed on the command line
pub fn parse_rgb_arg(s: &str) -> Result<Rgb, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected r,g,b but got \"{s}\""));
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("channel \"{part}\" is not in 0-255"))?;
    }
    Ok(Rgb::from(channels))
}
