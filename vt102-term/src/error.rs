//! Error types for the emulator
//!
//! Every failure aborts only the byte or event that produced it; the
//! interpreter is back in its ground state by the time the error is
//! returned, so the outer shell can log and continue.

use thiserror::Error;

use vt102_core::screen::OutOfRange;
use vt102_parser::ParseError;

/// Emulator error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parse-level failure (undefined escape, malformed sequence)
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A command received a parameter count it does not define
    #[error("wrong number of parameters for {0}")]
    BadParameterCount(&'static str),

    /// A well-formed sequence this terminal does not define
    #[error("undefined control sequence `{0}`")]
    UndefinedSequence(String),

    /// Input selecting a feature the terminal reports but does not honor
    #[error("{0} not implemented")]
    NotImplemented(&'static str),

    /// Render-time query outside the visible screen
    #[error(transparent)]
    OutOfRange(#[from] OutOfRange),
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, Error>;
