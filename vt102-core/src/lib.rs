//! VT102 Core
//!
//! The platform-independent screen model of a VT102 terminal:
//! - Character cells with display attributes and character sets
//! - Lines with per-line renditions (double width/height)
//! - The cursor, scrolling region, and tab stops
//! - All ANSI and DEC private mode registers
//! - The SET-UP parameter record
//! - Deterministic snapshots for rendering and testing
//!
//! This crate performs no I/O and can be driven headlessly.

pub mod cell;
pub mod charset;
pub mod cursor;
pub mod line;
pub mod modes;
pub mod screen;
pub mod setup;
pub mod snapshot;

pub use cell::{Cell, CellAttributes};
pub use charset::{font_index, Charset, Charsets};
pub use cursor::{Cursor, SavedCursor};
pub use line::{Line, LineAttr, LINE_WIDTH};
pub use modes::{KeypadMode, Modes};
pub use screen::{EraseMode, OutOfRange, Screen, ROWS};
pub use setup::{ModemSettings, PrinterSettings, SetupModel, ANSWERBACK_LEN};
pub use snapshot::Snapshot;
