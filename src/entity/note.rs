// src/entity/note.rs
use serde::{Deserialize, Serialize};

use super::{Color, NoteId};

/// Canvas coordinates. No bounds are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// JSON has no encoding for infinities or NaN
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single sticky note. Persisted as `{id, content, x, y, color}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    #[serde(flatten)]
    pub position: Position,
    pub color: Color,
}

impl Note {
    pub fn new(content: String, position: Position, color: Color) -> Self {
        Self {
            id: NoteId::generate(),
            content,
            position,
            color,
        }
    }
}
