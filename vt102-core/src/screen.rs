//! The screen model
//!
//! A fixed grid of 24 lines, the cursor, the scrolling region, tab stops,
//! and character-set state, with the primitive operations the byte
//! interpreter is built from. Coordinates are signed throughout: callers
//! may compute positions that are transiently out of range and the
//! normalizing `move_to` puts them back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cell::{Cell, CellAttributes};
use crate::charset::Charsets;
use crate::cursor::Cursor;
use crate::line::{Line, LineAttr, LINE_WIDTH};
use crate::modes::Modes;

/// Rows on a VT102 screen
pub const ROWS: i32 = 24;

/// Erase extent for ED/EL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseMode {
    /// From the cursor to the end of the screen/line
    ToEnd,
    /// From the start of the screen/line through the cursor
    ToStart,
    /// The whole screen/line
    All,
}

/// Render-time query outside the visible screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cell ({x}, {y}) out of range for {cols}x{rows} screen")]
pub struct OutOfRange {
    pub x: i32,
    pub y: i32,
    pub cols: i32,
    pub rows: i32,
}

/// The complete screen state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    lines: Vec<Line>,
    /// Visible columns (80 or 132); lines always store 132 cells
    cols: i32,
    rows: i32,
    /// Cursor position and active attributes
    pub cursor: Cursor,
    /// Scrolling region, inclusive, `top < bottom`
    pub scroll_top: i32,
    pub scroll_bottom: i32,
    /// Tab stops over the full 132 columns
    pub tab_stops: Vec<bool>,
    /// G0-G3 designators and SI/SO/single-shift state
    pub charsets: Charsets,
    /// Mode registers
    pub modes: Modes,
}

impl Screen {
    /// Create a screen with power-up defaults: 80 columns, cursor home,
    /// scroll region covering the full screen, tab stops every 8 columns.
    pub fn new() -> Self {
        let charsets = Charsets::new();
        let lines = (0..ROWS).map(|_| Line::blank(charsets.g[0])).collect();
        Self {
            lines,
            cols: 80,
            rows: ROWS,
            cursor: Cursor::new(),
            scroll_top: 0,
            scroll_bottom: ROWS - 1,
            tab_stops: default_tab_stops(),
            charsets,
            modes: Modes::new(),
        }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Line at row, panics if out of bounds
    pub fn line(&self, y: i32) -> &Line {
        &self.lines[y as usize]
    }

    /// Mutable line at row, panics if out of bounds
    pub fn line_mut(&mut self, y: i32) -> &mut Line {
        &mut self.lines[y as usize]
    }

    /// All lines, for session snapshots
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Replace the grid contents wholesale (SET-UP exit restores the
    /// saved screen this way). Ignored if the row count does not match.
    pub fn restore_lines(&mut self, lines: Vec<Line>) {
        if lines.len() == self.lines.len() {
            self.lines = lines;
        }
    }

    /// Bounds-checked cell lookup for renderers
    pub fn cell_at(&self, x: i32, y: i32) -> Result<&Cell, OutOfRange> {
        if x < 0 || x >= self.cols || y < 0 || y >= self.rows {
            return Err(OutOfRange {
                x,
                y,
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(self.lines[y as usize].cell(x as usize))
    }

    /// Check whether a position is on the visible screen
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.cols && y >= 0 && y < self.rows
    }

    /// Erase one cell to a blank in G0 with all attributes reset.
    /// Out-of-range positions are a no-op.
    pub fn erase(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let blank = Cell::blank(self.charsets.g[0]);
            *self.lines[y as usize].cell_mut(x as usize) = blank;
        }
    }

    /// Write a character at the cursor, honoring IRM, autowrap, the
    /// active attributes, and a pending single shift.
    pub fn put(&mut self, ch: u8) {
        // A previous wrap may have left the cursor below the region;
        // scroll it back before writing.
        if self.modes.auto_wrap && self.cursor.y > self.scroll_bottom {
            self.scroll(self.scroll_bottom - self.cursor.y);
        }

        let (x, y) = (self.cursor.x, self.cursor.y);
        if !self.in_bounds(x, y) {
            return;
        }

        if self.modes.insert_mode {
            let line = &mut self.lines[y as usize];
            for i in (x..self.cols - 1).rev() {
                *line.cell_mut(i as usize + 1) = *line.cell(i as usize);
            }
        }

        self.erase(x, y);

        let charset = self.charsets.take_current();
        let attrs = self.cursor.attrs;
        let cell = self.lines[y as usize].cell_mut(x as usize);
        cell.ch = ch;
        cell.charset = charset;
        cell.attrs = attrs;

        if x + 1 >= self.cols {
            if self.modes.auto_wrap {
                // The wrap is recorded now; scrolling waits for the
                // next put.
                self.cursor.x = 0;
                self.cursor.y += 1;
            }
        } else {
            self.move_to(x + 1, y);
        }
    }

    /// Delete the character at (x, y), shifting the rest of the line
    /// left. The vacated cell keeps its attribute bits.
    pub fn del_char(&mut self, x: i32, y: i32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let active = self.charsets.g[self.charsets.active];
        let line = &mut self.lines[y as usize];
        for i in x..self.cols - 1 {
            *line.cell_mut(i as usize) = *line.cell(i as usize + 1);
        }
        let last = line.cell_mut(self.cols as usize - 1);
        last.ch = b' ';
        last.charset = active;
    }

    /// Insert a blank line at row y, shifting lines below it down; the
    /// bottom line falls off the screen. Ignored when y is outside the
    /// scrolling region.
    pub fn ins_line(&mut self, y: i32) {
        if y < self.scroll_top || y > self.scroll_bottom {
            return;
        }
        for i in (y..self.rows - 1).rev() {
            self.lines[i as usize + 1] = self.lines[i as usize].clone();
        }
        for x in 0..LINE_WIDTH as i32 {
            self.erase(x, y);
        }
        self.lines[y as usize].attr = LineAttr::Normal;
    }

    /// Delete the line at row y, shifting lines below it up. The vacated
    /// bottom line keeps its attribute bits. Ignored when y is outside
    /// the scrolling region.
    pub fn del_line(&mut self, y: i32) {
        if y < self.scroll_top || y > self.scroll_bottom {
            return;
        }
        for i in y..self.rows - 1 {
            self.lines[i as usize] = self.lines[i as usize + 1].clone();
        }
        let active = self.charsets.g[self.charsets.active];
        let last = self.rows as usize - 1;
        for cell in self.lines[last].iter_mut() {
            cell.ch = b' ';
            cell.charset = active;
        }
    }

    /// Scroll the region by n lines (negative scrolls up) and carry the
    /// cursor with it. Vacated lines are reset to blanks in G0 with all
    /// attributes cleared.
    pub fn scroll(&mut self, n: i32) {
        self.cursor.y += n;
        let blank = Cell::blank(self.charsets.g[0]);
        if n < 0 {
            for _ in 0..-n {
                for j in self.scroll_top..self.scroll_bottom {
                    self.lines[j as usize] = self.lines[j as usize + 1].clone();
                }
                for cell in self.lines[self.scroll_bottom as usize].iter_mut() {
                    *cell = blank;
                }
            }
        } else {
            for _ in 0..n {
                for j in (self.scroll_top..self.scroll_bottom).rev() {
                    self.lines[j as usize + 1] = self.lines[j as usize].clone();
                }
                for cell in self.lines[self.scroll_top as usize].iter_mut() {
                    *cell = blank;
                }
            }
        }
    }

    /// Normalizing cursor move: assign, then wrap or clamp into the
    /// usable region.
    pub fn move_to(&mut self, x: i32, y: i32) {
        self.cursor.x = x;
        self.cursor.y = y;

        if self.cursor.x >= self.cols {
            if self.modes.auto_wrap {
                self.cursor.x = 0;
                self.cursor.y += 1;
            } else {
                self.cursor.x = self.cols - 1;
            }
        }
        if self.cursor.x < 0 {
            self.cursor.x = 0;
        }
        if self.cursor.y > self.scroll_bottom {
            if self.modes.auto_wrap {
                self.scroll(self.scroll_bottom - self.cursor.y);
            } else {
                self.cursor.y = self.scroll_bottom;
            }
        }
        if self.cursor.y < self.scroll_top {
            self.cursor.y = self.scroll_top;
        }
    }

    /// Move the cursor to the home position of the current origin
    pub fn move_home(&mut self) {
        let top = if self.modes.origin_mode {
            self.scroll_top
        } else {
            0
        };
        self.move_to(0, top);
    }

    /// BS - step left, stopping at the margin
    pub fn backspace(&mut self) {
        if self.cursor.x > 0 {
            self.cursor.x -= 1;
        }
    }

    /// CR - return to column 0
    pub fn carriage_return(&mut self) {
        self.cursor.x = 0;
    }

    /// HT - advance to the next tab stop, or the right margin if there
    /// are no more
    pub fn tab(&mut self) {
        let start = self.cursor.x;
        self.cursor.x = self.cols - 1;
        for x in start + 1..self.cols {
            if self.tab_stops[x as usize] {
                self.cursor.x = x;
                break;
            }
        }
    }

    /// HTS - set a tab stop at the cursor column
    pub fn set_tab_stop(&mut self) {
        let x = self.cursor.x;
        if (0..LINE_WIDTH as i32).contains(&x) {
            self.tab_stops[x as usize] = true;
        }
    }

    /// TBC 0 - clear the tab stop at the cursor column
    pub fn clear_tab_stop(&mut self) {
        let x = self.cursor.x;
        if (0..LINE_WIDTH as i32).contains(&x) {
            self.tab_stops[x as usize] = false;
        }
    }

    /// TBC 3 - clear every tab stop
    pub fn clear_all_tab_stops(&mut self) {
        for stop in &mut self.tab_stops {
            *stop = false;
        }
    }

    /// Restore the power-up tab stops (every eighth column)
    pub fn default_tab_stops(&mut self) {
        self.tab_stops = default_tab_stops();
    }

    /// ED - erase in display. Erased lines have their rendition reset to
    /// normal.
    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let (cx, cy) = (self.cursor.x, self.cursor.y);
        match mode {
            EraseMode::ToEnd => {
                for y in cy..self.rows {
                    let from = if y == cy { cx } else { 0 };
                    for x in from..self.cols {
                        self.erase(x, y);
                    }
                    self.lines[y as usize].attr = LineAttr::Normal;
                }
            }
            EraseMode::ToStart => {
                for y in 0..=cy {
                    let to = if y == cy { cx } else { self.cols - 1 };
                    for x in 0..=to {
                        self.erase(x, y);
                    }
                    self.lines[y as usize].attr = LineAttr::Normal;
                }
            }
            EraseMode::All => {
                for y in 0..self.rows {
                    for x in 0..self.cols {
                        self.erase(x, y);
                    }
                    self.lines[y as usize].attr = LineAttr::Normal;
                }
            }
        }
    }

    /// EL - erase in line. Line rendition is untouched.
    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let (cx, cy) = (self.cursor.x, self.cursor.y);
        match mode {
            EraseMode::ToEnd => {
                for x in cx..self.cols {
                    self.erase(x, cy);
                }
            }
            EraseMode::ToStart => {
                for x in 0..=cx {
                    self.erase(x, cy);
                }
            }
            EraseMode::All => {
                for x in 0..self.cols {
                    self.erase(x, cy);
                }
            }
        }
    }

    /// DECCOLM - switch between 80 and 132 columns. The visible screen
    /// is erased and the cursor homes; hidden cells keep their contents.
    pub fn set_column_mode(&mut self, wide: bool) {
        self.modes.column_132 = wide;
        self.cols = if wide { 132 } else { 80 };
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.erase(x, y);
            }
        }
        self.move_home();
    }

    /// DECALN - fill the screen with 'E' through the ordinary write
    /// path, then home the cursor.
    pub fn alignment_test(&mut self) {
        for y in 0..self.rows {
            for x in 0..self.cols {
                self.cursor.x = x;
                self.cursor.y = y;
                self.put(b'E');
            }
        }
        self.move_to(0, 0);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

fn default_tab_stops() -> Vec<bool> {
    (0..LINE_WIDTH).map(|x| x != 0 && x % 8 == 0).collect()
}
