//! Cursor state
//!
//! Coordinates are signed: the interpreter computes positions that are
//! transiently out of range (CUU above the top margin, autowrap past the
//! right edge) before `Screen::move_to` normalizes them.

use serde::{Deserialize, Serialize};

use crate::cell::CellAttributes;

/// Cursor state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Column (0-indexed)
    pub x: i32,
    /// Row (0-indexed)
    pub y: i32,
    /// Attributes applied to newly written characters
    pub attrs: CellAttributes,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the home position without touching attributes
    pub fn home(&mut self) {
        self.x = 0;
        self.y = 0;
    }
}

/// Saved cursor record for DECSC/DECRC. Created on demand; absent means
/// DECRC homes the cursor with no other restoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub x: i32,
    pub y: i32,
    pub attrs: CellAttributes,
    /// The charset designator slot in use at save time
    pub charset_slot: usize,
    /// Origin mode at save time
    pub origin_mode: bool,
}
