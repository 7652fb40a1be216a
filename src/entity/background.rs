use std::fmt;

use serde::{Deserialize, Serialize};

use super::Color;

/// The canvas backdrop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    SolidColor { color: Color },
    ImageReference { uri: String },
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Background::SolidColor { color }
    }

    pub fn image(uri: impl Into<String>) -> Self {
        Background::ImageReference { uri: uri.into() }
    }

    /// Discriminator value written to the durable store
    pub fn kind(&self) -> &'static str {
        match self {
            Background::SolidColor { .. } => "color",
            Background::ImageReference { .. } => "image",
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::solid(Color::WHITE)
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::SolidColor { color } => write!(f, "color {}", color),
            Background::ImageReference { uri } => write!(f, "image {}", uri),
        }
    }
}
