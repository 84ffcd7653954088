//! Terminal cell representation
//!
//! Each cell in the screen grid holds the raw octet written by the host,
//! the character set it was written under, and its display attributes.
//! Translating the octet to a glyph is the renderer's job (see
//! [`crate::charset::font_index`]).

use serde::{Deserialize, Serialize};

use crate::charset::Charset;

/// Attributes that affect how a cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAttributes {
    /// Bold intensity (SGR 1)
    pub bold: bool,
    /// Underlined (SGR 4)
    pub underline: bool,
    /// Blinking (SGR 5)
    pub blink: bool,
    /// Reverse video (SGR 7)
    pub reverse: bool,
}

impl CellAttributes {
    /// Create new default attributes
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all attributes to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check whether any attribute is set
    pub fn any(&self) -> bool {
        self.bold || self.underline || self.blink || self.reverse
    }
}

/// A single cell in the screen grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The raw byte stored in this cell
    pub ch: u8,
    /// The character set the byte was written under
    pub charset: Charset,
    /// Display attributes
    pub attrs: CellAttributes,
}

impl Cell {
    /// Create a blank cell in the given character set
    pub fn blank(charset: Charset) -> Self {
        Self {
            ch: b' ',
            charset,
            attrs: CellAttributes::default(),
        }
    }

    /// Check if the cell holds a plain space
    pub fn is_blank(&self) -> bool {
        self.ch == b' '
    }

    /// The cell's byte as a displayable character, substituting a space
    /// for anything outside the printable ASCII range
    pub fn display_char(&self) -> char {
        if (0x20..0x7F).contains(&self.ch) {
            self.ch as char
        } else {
            ' '
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(Charset::UnitedStates)
    }
}
