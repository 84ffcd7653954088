//! The escape-sequence state machine
//!
//! Consumes host output one byte at a time and yields at most one
//! [`Action`] per byte. The layers mirror the VT102: a control-character
//! layer that runs even while a sequence is in flight, the escape layer,
//! the CSI parameter accumulator, the `#` line-attribute layer, and the
//! G0/G1 designation layers.
//!
//! On any parse failure the machine resets itself to ground before
//! returning the error, so a bad sequence never wedges the stream.

use log::trace;
use thiserror::Error;

use crate::action::{Action, CsiAction, EscAction};
use crate::params::Params;

/// Parse failures. Each aborts only the byte that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// ESC (or ESC-intermediate) followed by an unrecognized byte
    #[error("undefined escape sequence `{0}`")]
    UndefinedEscape(String),
    /// A control sequence this terminal does not define
    #[error("undefined control sequence `{0}`")]
    UndefinedSequence(String),
    /// Input selecting a feature the terminal reports but does not honor
    #[error("{0} not implemented")]
    NotImplemented(&'static str),
}

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Ordinary text and control characters
    #[default]
    Ground,
    /// After ESC
    Escape,
    /// Accumulating a control sequence (after ESC `[`)
    CtrlSeq,
    /// After ESC `#`
    Pound,
    /// After ESC `(`
    G0Select,
    /// After ESC `)`
    G1Select,
}

/// The streaming parser
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parser {
    state: State,
    params: Params,
    current: u16,
    has_current: bool,
    private: bool,
    malformed: bool,
    intermediates: Vec<u8>,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state (for session snapshots and tests)
    pub fn state(&self) -> State {
        self.state
    }

    /// True while an escape or control sequence is in flight
    pub fn in_sequence(&self) -> bool {
        self.state != State::Ground
    }

    /// Drop any in-flight sequence and return to ground
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.clear_sequence();
    }

    fn clear_sequence(&mut self) {
        self.params = Params::new();
        self.current = 0;
        self.has_current = false;
        self.private = false;
        self.malformed = false;
        self.intermediates.clear();
    }

    /// Reset to ground and fail the current byte
    fn fail(&mut self, err: ParseError) -> Result<Option<Action>, ParseError> {
        self.reset();
        Err(err)
    }

    /// Advance by one byte
    pub fn advance(&mut self, byte: u8) -> Result<Option<Action>, ParseError> {
        match self.state {
            State::Ground => self.control_or_print(byte),
            State::Escape => self.escape(byte),
            State::CtrlSeq => self.ctrl_seq(byte),
            State::Pound => self.pound(byte),
            State::G0Select => self.designate(byte, true),
            State::G1Select => self.designate(byte, false),
        }
    }

    /// Feed a whole chunk, collecting actions and stopping at the first
    /// error. Intended for tests and tools; interactive callers drive
    /// `advance` directly so they can log and continue.
    pub fn parse_collect(&mut self, data: &[u8]) -> Result<Vec<Action>, ParseError> {
        let mut actions = Vec::new();
        for &byte in data {
            if let Some(action) = self.advance(byte)? {
                actions.push(action);
            }
        }
        Ok(actions)
    }

    /// The control-character layer. Runs in ground, and as the escape
    /// hatch for non-sequence bytes while a control sequence is in
    /// flight.
    fn control_or_print(&mut self, byte: u8) -> Result<Option<Action>, ParseError> {
        match byte {
            0x00 => {
                trace!("NUL ignored");
                Ok(None)
            }
            0x03 => self.fail(ParseError::NotImplemented("ETX")),
            0x04 => self.fail(ParseError::NotImplemented("EOT")),
            0x05 | 0x07..=0x0F | 0x11 | 0x13 => Ok(Some(Action::Control(byte))),
            0x18 | 0x1A => {
                // CAN and SUB cancel an in-flight sequence and display
                // the substitution character.
                if self.in_sequence() {
                    self.reset();
                    Ok(Some(Action::Print(0x1A)))
                } else {
                    Ok(None)
                }
            }
            0x1B => {
                self.reset();
                self.state = State::Escape;
                Ok(None)
            }
            0x7F => {
                trace!("DEL ignored");
                Ok(None)
            }
            _ => Ok(Some(Action::Print(byte))),
        }
    }

    fn escape(&mut self, byte: u8) -> Result<Option<Action>, ParseError> {
        self.state = State::Ground;
        let esc = match byte {
            0x18 | 0x1A => return Ok(Some(Action::Print(0x1A))),
            0x1B => {
                self.state = State::Escape;
                return Ok(None);
            }
            b'c' => return self.fail(ParseError::NotImplemented("RIS")),
            b'D' => EscAction::Index,
            b'E' => EscAction::NextLine,
            b'H' => EscAction::TabSet,
            b'M' => EscAction::ReverseIndex,
            b'N' => EscAction::SingleShiftG2,
            b'Z' => EscAction::Identify,
            b'0' => EscAction::SingleShiftG3,
            b'7' => EscAction::SaveCursor,
            b'8' => EscAction::RestoreCursor,
            b'[' => {
                self.clear_sequence();
                self.state = State::CtrlSeq;
                return Ok(None);
            }
            b'#' => {
                self.state = State::Pound;
                return Ok(None);
            }
            b'(' => {
                self.state = State::G0Select;
                return Ok(None);
            }
            b')' => {
                self.state = State::G1Select;
                return Ok(None);
            }
            b'>' => EscAction::KeypadNumeric,
            b'=' => EscAction::KeypadApplication,
            _ => {
                return self.fail(ParseError::UndefinedEscape(format!(
                    "ESC {}",
                    printable(byte)
                )))
            }
        };
        Ok(Some(Action::Esc(esc)))
    }

    fn ctrl_seq(&mut self, byte: u8) -> Result<Option<Action>, ParseError> {
        match byte {
            0x20..=0x2F => {
                self.intermediates.push(byte);
                Ok(None)
            }
            0x30..=0x3F => {
                self.param_byte(byte);
                Ok(None)
            }
            0x40..=0x7E => self.finish_ctrl_seq(byte),
            // Everything else runs through the control layer without
            // disturbing the sequence (CAN/SUB/ESC reset it there).
            _ => self.control_or_print(byte),
        }
    }

    fn param_byte(&mut self, byte: u8) {
        match byte {
            b'0'..=b'9' => {
                self.current = self
                    .current
                    .saturating_mul(10)
                    .saturating_add((byte - b'0') as u16);
                self.has_current = true;
            }
            b';' => {
                let value = if self.has_current { self.current } else { 0 };
                self.params.push(value);
                self.current = 0;
                self.has_current = false;
            }
            b'?' => {
                // Only meaningful as the very first parameter byte.
                if self.params.is_empty() && !self.has_current && !self.private {
                    self.private = true;
                } else {
                    self.malformed = true;
                }
            }
            _ => {
                // ':', '<', '=', '>' have no meaning on a VT102
                self.malformed = true;
            }
        }
    }

    fn finish_ctrl_seq(&mut self, final_byte: u8) -> Result<Option<Action>, ParseError> {
        if self.has_current || !self.params.is_empty() {
            let value = if self.has_current { self.current } else { 0 };
            self.params.push(value);
        }

        if self.malformed || !self.intermediates.is_empty() {
            let desc = format!(
                "ESC [ {}{}",
                String::from_utf8_lossy(&self.intermediates),
                printable(final_byte)
            );
            return self.fail(ParseError::UndefinedSequence(desc));
        }

        let action = CsiAction {
            params: std::mem::take(&mut self.params),
            final_byte,
            private: self.private,
        };
        self.reset();
        Ok(Some(Action::Csi(action)))
    }

    fn pound(&mut self, byte: u8) -> Result<Option<Action>, ParseError> {
        self.state = State::Ground;
        let esc = match byte {
            b'3' => EscAction::DoubleHeightTop,
            b'4' => EscAction::DoubleHeightBottom,
            b'5' => EscAction::SingleWidth,
            b'6' => EscAction::DoubleWidth,
            b'8' => EscAction::AlignmentTest,
            _ => {
                return self.fail(ParseError::UndefinedEscape(format!(
                    "ESC # {}",
                    printable(byte)
                )))
            }
        };
        Ok(Some(Action::Esc(esc)))
    }

    fn designate(&mut self, byte: u8, g0: bool) -> Result<Option<Action>, ParseError> {
        self.state = State::Ground;
        match byte {
            b'A' | b'B' | b'0' | b'1' | b'2' => Ok(Some(Action::Esc(if g0 {
                EscAction::DesignateG0(byte)
            } else {
                EscAction::DesignateG1(byte)
            }))),
            _ => self.fail(ParseError::UndefinedEscape(format!(
                "ESC {} {}",
                if g0 { "(" } else { ")" },
                printable(byte)
            ))),
        }
    }
}

fn printable(byte: u8) -> String {
    if (0x20..0x7F).contains(&byte) {
        (byte as char).to_string()
    } else {
        format!("0x{byte:02X}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::c0;

    fn collect(input: &[u8]) -> Vec<Action> {
        Parser::new().parse_collect(input).unwrap()
    }

    #[test]
    fn test_print() {
        let actions = collect(b"Hello");
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Print(b'H'));
        assert_eq!(actions[4], Action::Print(b'o'));
    }

    #[test]
    fn test_control_characters() {
        let actions = collect(b"\x07\x08\x09\x0A\x0D");
        assert_eq!(
            actions,
            vec![
                Action::Control(c0::BEL),
                Action::Control(c0::BS),
                Action::Control(c0::HT),
                Action::Control(c0::LF),
                Action::Control(c0::CR),
            ]
        );
    }

    #[test]
    fn test_nul_and_del_ignored() {
        assert!(collect(b"\x00\x7F").is_empty());
    }

    #[test]
    fn test_csi_cursor_position() {
        let actions = collect(b"\x1b[10;20H");
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Csi(csi) => {
                assert_eq!(csi.final_byte, b'H');
                assert_eq!(csi.param_or(0, 1), 10);
                assert_eq!(csi.param_or(1, 1), 20);
                assert!(!csi.private);
            }
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_csi_private_mode() {
        let actions = collect(b"\x1b[?6h");
        match &actions[0] {
            Action::Csi(csi) => {
                assert!(csi.private);
                assert_eq!(csi.params.len(), 1);
                assert_eq!(csi.params.raw(0), 6);
            }
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_csi_empty_params() {
        let actions = collect(b"\x1b[H");
        match &actions[0] {
            Action::Csi(csi) => assert!(csi.params.is_empty()),
            other => panic!("expected CSI, got {other:?}"),
        }

        // a trailing separator produces a trailing empty parameter
        let actions = collect(b"\x1b[5;H");
        match &actions[0] {
            Action::Csi(csi) => {
                assert_eq!(csi.params.len(), 2);
                assert_eq!(csi.params.raw(0), 5);
                assert_eq!(csi.params.raw(1), 0);
            }
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_csi_param_overflow_saturates() {
        let actions = collect(b"\x1b[99999A");
        match &actions[0] {
            Action::Csi(csi) => assert_eq!(csi.params.raw(0), u16::MAX),
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_streaming_across_chunks() {
        let mut parser = Parser::new();
        assert!(parser.parse_collect(b"\x1b[10").unwrap().is_empty());
        let actions = parser.parse_collect(b";20H").unwrap();
        assert_eq!(actions.len(), 1);
        match &actions[0] {
            Action::Csi(csi) => {
                assert_eq!(csi.param_or(0, 1), 10);
                assert_eq!(csi.param_or(1, 1), 20);
            }
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_esc_sequences() {
        let actions = collect(b"\x1bD\x1bM\x1bE\x1b7\x1b8\x1bZ");
        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::Index),
                Action::Esc(EscAction::ReverseIndex),
                Action::Esc(EscAction::NextLine),
                Action::Esc(EscAction::SaveCursor),
                Action::Esc(EscAction::RestoreCursor),
                Action::Esc(EscAction::Identify),
            ]
        );
    }

    #[test]
    fn test_keypad_modes() {
        let actions = collect(b"\x1b=\x1b>");
        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::KeypadApplication),
                Action::Esc(EscAction::KeypadNumeric),
            ]
        );
    }

    #[test]
    fn test_single_shifts() {
        let actions = collect(b"\x1bN\x1b0");
        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::SingleShiftG2),
                Action::Esc(EscAction::SingleShiftG3),
            ]
        );
    }

    #[test]
    fn test_pound_layer() {
        let actions = collect(b"\x1b#3\x1b#4\x1b#5\x1b#6\x1b#8");
        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::DoubleHeightTop),
                Action::Esc(EscAction::DoubleHeightBottom),
                Action::Esc(EscAction::SingleWidth),
                Action::Esc(EscAction::DoubleWidth),
                Action::Esc(EscAction::AlignmentTest),
            ]
        );
    }

    #[test]
    fn test_designators() {
        let actions = collect(b"\x1b(B\x1b)0");
        assert_eq!(
            actions,
            vec![
                Action::Esc(EscAction::DesignateG0(b'B')),
                Action::Esc(EscAction::DesignateG1(b'0')),
            ]
        );
    }

    #[test]
    fn test_cancel_in_flight_sequence() {
        let mut parser = Parser::new();
        assert!(parser.parse_collect(b"\x1b[12").unwrap().is_empty());
        let actions = parser.parse_collect(b"\x18").unwrap();
        // CAN displays the substitution character and drops the sequence
        assert_eq!(actions, vec![Action::Print(0x1A)]);
        assert_eq!(parser.state(), State::Ground);

        let actions = parser.parse_collect(b"A").unwrap();
        assert_eq!(actions, vec![Action::Print(b'A')]);
    }

    #[test]
    fn test_cancel_in_ground_is_noop() {
        assert!(collect(b"\x18\x1a").is_empty());
    }

    #[test]
    fn test_esc_restarts_sequence() {
        let mut parser = Parser::new();
        assert!(parser.parse_collect(b"\x1b[12\x1b").unwrap().is_empty());
        let actions = parser.parse_collect(b"D").unwrap();
        assert_eq!(actions, vec![Action::Esc(EscAction::Index)]);
    }

    #[test]
    fn test_control_during_ctrl_seq() {
        // a CR in the middle of a sequence executes without dropping it
        let mut parser = Parser::new();
        let actions = parser.parse_collect(b"\x1b[1\x0d0A").unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], Action::Control(c0::CR));
        match &actions[1] {
            Action::Csi(csi) => assert_eq!(csi.params.raw(0), 10),
            other => panic!("expected CSI, got {other:?}"),
        }
    }

    #[test]
    fn test_undefined_escape() {
        let mut parser = Parser::new();
        let err = parser.parse_collect(b"\x1bq").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedEscape(_)));
        // the parser is usable again immediately
        assert_eq!(parser.state(), State::Ground);
        assert_eq!(
            parser.parse_collect(b"A").unwrap(),
            vec![Action::Print(b'A')]
        );
    }

    #[test]
    fn test_undefined_pound() {
        let err = Parser::new().parse_collect(b"\x1b#7").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedEscape(_)));
    }

    #[test]
    fn test_undefined_designator() {
        let err = Parser::new().parse_collect(b"\x1b(Z").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedEscape(_)));
    }

    #[test]
    fn test_intermediates_rejected() {
        let err = Parser::new().parse_collect(b"\x1b[1 q").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedSequence(_)));
    }

    #[test]
    fn test_misplaced_private_marker() {
        let err = Parser::new().parse_collect(b"\x1b[1?h").unwrap_err();
        assert!(matches!(err, ParseError::UndefinedSequence(_)));
    }

    #[test]
    fn test_ris_not_implemented() {
        let err = Parser::new().parse_collect(b"\x1bc").unwrap_err();
        assert_eq!(err, ParseError::NotImplemented("RIS"));
    }

    #[test]
    fn test_etx_eot_not_implemented() {
        assert_eq!(
            Parser::new().parse_collect(b"\x03").unwrap_err(),
            ParseError::NotImplemented("ETX")
        );
        assert_eq!(
            Parser::new().parse_collect(b"\x04").unwrap_err(),
            ParseError::NotImplemented("EOT")
        );
    }
}
