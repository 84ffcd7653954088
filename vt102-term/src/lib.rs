//! VT102 Terminal Emulator
//!
//! The emulation engine of a VT102-compatible terminal: a byte-stream
//! interpreter over a screen model, a keyboard translator, an
//! interactive SET-UP mode, and an XON/XOFF-gated output buffer.
//!
//! # Architecture
//!
//! - [`vt102_core`]: the platform-independent screen model
//! - [`vt102_parser`]: the escape-sequence state machine
//! - [`Emulator`]: ties them together and owns all session state
//!
//! # Example
//!
//! ```
//! use vt102_term::Emulator;
//!
//! let mut emu = Emulator::new();
//! for byte in b"\x1b[5;10HHello" {
//!     emu.interpret(*byte).unwrap();
//! }
//! assert_eq!(emu.snapshot().row_text(4).trim_start(), "Hello");
//! assert_eq!((emu.cursor_x(), emu.cursor_y()), (14, 4));
//! ```

pub mod config;
pub mod emulator;
pub mod error;
pub mod keyboard;
pub mod setup_mode;

pub use config::{CliArgs, Config, ConfigError};
pub use emulator::{Emulator, Session};
pub use error::{Error, Result};
pub use keyboard::{Key, Modifiers};
