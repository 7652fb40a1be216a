mod background;
mod note;

pub use background::Background;
pub use note::{Note, Position};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PostitError;

/// Opaque note identifier, assigned once at creation and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form used in listings (first 7 characters)
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl From<String> for NoteId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Packed ARGB color. Stored as a signed 64-bit integer so the full
/// 32-bit alpha+RGB value stays positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub i64);

impl Color {
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub fn argb(self) -> u32 {
        (self.0 & 0xFFFF_FFFF) as u32
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.argb())
    }
}

impl FromStr for Color {
    type Err = PostitError;

    /// Accepts `#AARRGGBB`, `#RRGGBB` (opaque), `0xAARRGGBB` or a decimal value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || PostitError::InvalidColor(s.to_string());

        if let Some(hex) = trimmed.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return match hex.len() {
                6 => Ok(Color(i64::from(0xFF00_0000 | value))),
                8 => Ok(Color(i64::from(value))),
                _ => Err(invalid()),
            };
        }

        if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return Ok(Color(i64::from(value)));
        }

        trimmed.parse::<i64>().map(Color).map_err(|_| invalid())
    }
}

/// Colors a new note is drawn from, uniformly at random.
pub const NOTE_COLORS: [Color; 8] = [
    Color(0xFFFF_B3BA), // Light pink
    Color(0xFFBA_E1FF), // Light blue
    Color(0xFFBA_FFBA), // Light green
    Color(0xFFFF_E4BA), // Light orange
    Color(0xFFE2_BAFF), // Light purple
    Color(0xFFFF_FFBA), // Light yellow
    Color(0xFFFF_B3E6), // Light magenta
    Color(0xFFB3_FFE6), // Light cyan
];

/// Preset solid backgrounds offered by the background picker.
pub const BACKGROUND_COLORS: [Color; 8] = [
    Color(0xFFFF_FFFF), // White
    Color(0xFFF0_F0F0), // Light gray
    Color(0xFFFF_F8DC), // Cornsilk
    Color(0xFFF0_FFFF), // Azure
    Color(0xFFF5_F5DC), // Beige
    Color(0xFFFF_FAF0), // Floral white
    Color(0xFFF0_FFF0), // Honeydew
    Color(0xFFFF_F0F5), // Lavender blush
];
