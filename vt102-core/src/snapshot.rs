//! Screen snapshot for rendering and testing
//!
//! A serializable, read-only view of the screen: dimensions, cursor,
//! per-row text, and the flags a renderer needs. Deterministic for a
//! given screen state.

use serde::{Deserialize, Serialize};

use crate::screen::Screen;

/// A complete snapshot of visible screen state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: i32,
    pub rows: i32,
    pub cursor_x: i32,
    pub cursor_y: i32,
    /// DECSCNM - whole-screen reverse video
    pub reverse_screen: bool,
    /// Text of each row, trailing blanks trimmed
    pub screen: Vec<String>,
}

impl Snapshot {
    /// Capture the current screen
    pub fn capture(screen: &Screen) -> Self {
        let screen_text = (0..screen.rows())
            .map(|y| screen.line(y).text(screen.cols() as usize))
            .collect();
        Self {
            cols: screen.cols(),
            rows: screen.rows(),
            cursor_x: screen.cursor.x,
            cursor_y: screen.cursor.y,
            reverse_screen: screen.modes.reverse_screen,
            screen: screen_text,
        }
    }

    /// The whole screen as one newline-joined string
    pub fn screen_text(&self) -> String {
        self.screen.join("\n")
    }

    /// Text of one row
    pub fn row_text(&self, y: usize) -> &str {
        &self.screen[y]
    }
}
