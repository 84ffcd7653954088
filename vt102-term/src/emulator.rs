//! The emulator
//!
//! [`Emulator`] owns the screen, the parser, the output buffer, and the
//! SET-UP parameter records, and dispatches parsed actions onto them.
//! Host bytes enter through [`Emulator::interpret`]; replies (ENQ
//! answerback, DA/DECID, DSR) and keyboard-generated sequences leave
//! through the XON/XOFF-gated output buffer, drained by the shell.

use log::{debug, trace};

use vt102_core::charset::Charset;
use vt102_core::cursor::SavedCursor;
use vt102_core::line::LineAttr;
use vt102_core::screen::{EraseMode, OutOfRange, Screen};
use vt102_core::setup::SetupModel;
use vt102_core::{Cell, KeypadMode, Snapshot};
use vt102_parser::{c0, Action, CsiAction, EscAction, Parser};

use crate::error::{Error, Result};
use crate::setup_mode::SetupSnapshot;

/// Session-level state: online, or one of the SET-UP displays. While
/// SET-UP is active, host bytes are dropped and keys drive the
/// configuration display instead of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Online,
    SetUpA,
    SetUpB,
    CreateAnswerback,
}

/// The VT102 emulator. A value type: cloning yields an independent,
/// structurally equal session.
#[derive(Debug, Clone, PartialEq)]
pub struct Emulator {
    /// The screen model, including modes, tab stops, and charsets
    pub screen: Screen,
    pub(crate) parser: Parser,
    pub(crate) session: Session,
    /// DECSC record; absent means DECRC homes the cursor
    pub(crate) saved_cursor: Option<SavedCursor>,
    pub(crate) outbuffer: Vec<u8>,
    pub(crate) xon: bool,
    /// Live SET-UP parameters
    pub setup: SetupModel,
    /// The last saved copy (SHIFT-S / SHIFT-R)
    pub user_setup: SetupModel,
    /// Which side of SET-UP B is selected (modem vs printer)
    pub(crate) modem_selected: bool,
    /// Screen and parser state captured on SET-UP entry
    pub(crate) saved_session: Option<Box<SetupSnapshot>>,
    /// Delimiter armed by the first CreateAnswerback key
    pub(crate) answerback_delimiter: Option<u8>,
}

impl Emulator {
    pub fn new() -> Self {
        Self {
            screen: Screen::new(),
            parser: Parser::new(),
            session: Session::Online,
            saved_cursor: None,
            outbuffer: Vec::new(),
            xon: true,
            setup: SetupModel::new(),
            user_setup: SetupModel::new(),
            modem_selected: true,
            saved_session: None,
            answerback_delimiter: None,
        }
    }

    /// Interpret one host byte. On error the interpreter is already back
    /// in its ground state and only this byte's effect is lost.
    pub fn interpret(&mut self, byte: u8) -> Result<()> {
        if self.session != Session::Online {
            trace!("SET-UP active, dropping host byte 0x{byte:02X}");
            return Ok(());
        }
        match self.parser.advance(byte)? {
            Some(action) => self.perform(action),
            None => Ok(()),
        }
    }

    /// Interpret a byte string, stopping at the first failure
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.interpret(byte)?;
        }
        Ok(())
    }

    /// Append bytes to the output buffer. While XOFF is in force only
    /// XON/XOFF themselves get through.
    pub(crate) fn output(&mut self, bytes: &[u8]) {
        if self.xon {
            self.outbuffer.extend_from_slice(bytes);
        } else {
            self.outbuffer
                .extend(bytes.iter().copied().filter(|&b| b == 0x11 || b == 0x13));
        }
    }

    /// Take everything queued for the host
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.outbuffer)
    }

    /// Bytes queued for the host without draining them
    pub fn pending_output(&self) -> &[u8] {
        &self.outbuffer
    }

    /// Whether transmission is currently enabled
    pub fn xon(&self) -> bool {
        self.xon
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Replace the answerback message (truncated to its maximum length)
    pub fn set_answerback(&mut self, message: &[u8]) {
        self.setup.answerback.clear();
        for &b in message {
            if !self.setup.push_answerback(b) {
                break;
            }
        }
    }

    // Render interface

    pub fn cols(&self) -> i32 {
        self.screen.cols()
    }

    pub fn rows(&self) -> i32 {
        self.screen.rows()
    }

    pub fn cursor_x(&self) -> i32 {
        self.screen.cursor.x
    }

    pub fn cursor_y(&self) -> i32 {
        self.screen.cursor.y
    }

    /// Block (vs underline) cursor, a SET-UP selection
    pub fn block_cursor(&self) -> bool {
        self.setup.block_cursor
    }

    /// DECSCNM - whole-screen reverse video
    pub fn reverse_screen(&self) -> bool {
        self.screen.modes.reverse_screen
    }

    pub fn brightness(&self) -> f64 {
        self.setup.brightness
    }

    /// Bounds-checked cell lookup
    pub fn cell_at(&self, x: i32, y: i32) -> std::result::Result<&Cell, OutOfRange> {
        self.screen.cell_at(x, y)
    }

    /// Rendition of a row
    pub fn line_attr(&self, y: i32) -> std::result::Result<LineAttr, OutOfRange> {
        if y < 0 || y >= self.screen.rows() {
            return Err(OutOfRange {
                x: 0,
                y,
                cols: self.screen.cols(),
                rows: self.screen.rows(),
            });
        }
        Ok(self.screen.line(y).attr)
    }

    /// Deterministic view of the visible screen
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.screen)
    }

    // Action dispatch

    fn perform(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Print(byte) => {
                self.screen.put(byte);
                Ok(())
            }
            Action::Control(byte) => self.control(byte),
            Action::Esc(esc) => self.esc_dispatch(esc),
            Action::Csi(csi) => self.csi_dispatch(csi),
        }
    }

    fn control(&mut self, byte: u8) -> Result<()> {
        match byte {
            c0::ENQ => {
                trace!("ENQ");
                let answerback = self.setup.answerback.clone();
                self.output(&answerback);
            }
            c0::BEL => {
                // the bell is the shell's concern
                debug!("BEL");
            }
            c0::BS => self.screen.backspace(),
            c0::HT => self.screen.tab(),
            c0::LF | c0::VT | c0::FF => {
                let (x, y) = (self.screen.cursor.x, self.screen.cursor.y);
                if self.screen.modes.linefeed_mode {
                    self.screen.move_to(0, y + 1);
                } else {
                    self.screen.move_to(x, y + 1);
                }
            }
            c0::CR => self.screen.carriage_return(),
            c0::SO => self.screen.charsets.shift_out(),
            c0::SI => self.screen.charsets.shift_in(),
            c0::DC1 => {
                if self.setup.auto_xon_xoff {
                    trace!("DC1, transmission resumed");
                    self.xon = true;
                }
            }
            c0::DC3 => {
                if self.setup.auto_xon_xoff {
                    trace!("DC3, transmission held");
                    self.xon = false;
                }
            }
            _ => trace!("unhandled control 0x{byte:02X}"),
        }
        Ok(())
    }

    fn esc_dispatch(&mut self, esc: EscAction) -> Result<()> {
        match esc {
            EscAction::Index => {
                trace!("IND");
                self.index();
            }
            EscAction::NextLine => {
                trace!("NEL");
                self.screen.carriage_return();
                self.index();
            }
            EscAction::ReverseIndex => {
                trace!("RI");
                self.screen.cursor.y -= 1;
                if self.screen.cursor.y < self.screen.scroll_top {
                    self.screen.scroll(1);
                }
            }
            EscAction::TabSet => {
                trace!("HTS");
                self.screen.set_tab_stop();
            }
            EscAction::SaveCursor => {
                trace!("DECSC");
                self.saved_cursor = Some(SavedCursor {
                    x: self.screen.cursor.x,
                    y: self.screen.cursor.y,
                    attrs: self.screen.cursor.attrs,
                    charset_slot: self.screen.charsets.effective_slot(),
                    origin_mode: self.screen.modes.origin_mode,
                });
            }
            EscAction::RestoreCursor => {
                trace!("DECRC");
                match self.saved_cursor.take() {
                    Some(saved) => {
                        self.screen.cursor.x = saved.x;
                        self.screen.cursor.y = saved.y;
                        self.screen.cursor.attrs = saved.attrs;
                        self.screen.modes.origin_mode = saved.origin_mode;
                        self.screen.charsets.active = saved.charset_slot;
                    }
                    None => self.screen.cursor.home(),
                }
            }
            EscAction::Identify => {
                trace!("DECID");
                self.output(b"\x1b[?6c");
            }
            EscAction::SingleShiftG2 => self.screen.charsets.single_shift(2),
            EscAction::SingleShiftG3 => self.screen.charsets.single_shift(3),
            EscAction::KeypadApplication => {
                trace!("DECKPAM");
                self.screen.modes.keypad = KeypadMode::Application;
            }
            EscAction::KeypadNumeric => {
                trace!("DECKPNM");
                self.screen.modes.keypad = KeypadMode::Numeric;
            }
            EscAction::DoubleHeightTop => self.set_line_attr(LineAttr::DoubleHeightUpper),
            EscAction::DoubleHeightBottom => self.set_line_attr(LineAttr::DoubleHeightLower),
            EscAction::SingleWidth => self.set_line_attr(LineAttr::Normal),
            EscAction::DoubleWidth => self.set_line_attr(LineAttr::DoubleWidth),
            EscAction::AlignmentTest => {
                trace!("DECALN");
                self.screen.alignment_test();
            }
            EscAction::DesignateG0(byte) => {
                if let Some(set) = Charset::from_designator(byte) {
                    self.screen.charsets.g[0] = set;
                }
            }
            EscAction::DesignateG1(byte) => {
                if let Some(set) = Charset::from_designator(byte) {
                    self.screen.charsets.g[1] = set;
                }
            }
        }
        Ok(())
    }

    /// IND: cursor down one line, scrolling at the bottom margin
    fn index(&mut self) {
        self.screen.cursor.y += 1;
        if self.screen.cursor.y > self.screen.scroll_bottom {
            self.screen.scroll(-1);
        }
    }

    fn set_line_attr(&mut self, attr: LineAttr) {
        let y = self.screen.cursor.y;
        if y >= 0 && y < self.screen.rows() {
            self.screen.line_mut(y).attr = attr;
        }
    }

    fn csi_dispatch(&mut self, csi: CsiAction) -> Result<()> {
        if csi.private && !matches!(csi.final_byte, b'h' | b'l' | b'n' | b'c') {
            return Err(Error::UndefinedSequence(format!(
                "ESC [ ? {}",
                csi.final_byte as char
            )));
        }

        let (x, y) = (self.screen.cursor.x, self.screen.cursor.y);
        match csi.final_byte {
            b'A' => {
                at_most(&csi, 1, "CUU")?;
                let mut delta = csi.pn() as i32;
                if y - delta < self.screen.scroll_top {
                    delta = y - self.screen.scroll_top;
                }
                trace!("CUU {delta}");
                self.screen.move_to(x, y - delta);
            }
            b'B' => {
                at_most(&csi, 1, "CUD")?;
                let mut delta = csi.pn() as i32;
                if y + delta > self.screen.scroll_bottom {
                    delta = self.screen.scroll_bottom - y;
                }
                trace!("CUD {delta}");
                self.screen.move_to(x, y + delta);
            }
            b'C' => {
                at_most(&csi, 1, "CUF")?;
                let mut delta = csi.pn() as i32;
                if x + delta >= self.screen.cols() {
                    delta = self.screen.cols() - 1 - x;
                }
                trace!("CUF {delta}");
                self.screen.move_to(x + delta, y);
            }
            b'D' => {
                at_most(&csi, 1, "CUB")?;
                let mut delta = csi.pn() as i32;
                if x - delta < 0 {
                    delta = x;
                }
                trace!("CUB {delta}");
                self.screen.move_to(x - delta, y);
            }
            b'H' | b'f' => {
                at_most(&csi, 2, if csi.final_byte == b'H' { "CUP" } else { "HVP" })?;
                let row = csi.param_or(0, 1) as i32 - 1;
                let col = csi.param_or(1, 1) as i32 - 1;
                trace!("CUP {row} {col}");
                // Not a normalizing move: CUP and HVP place the cursor
                // directly, anywhere on-screen, without autowrap.
                self.screen.cursor.x = col.clamp(0, self.screen.cols() - 1);
                self.screen.cursor.y = if self.screen.modes.origin_mode {
                    (self.screen.scroll_top + row)
                        .clamp(self.screen.scroll_top, self.screen.scroll_bottom)
                } else {
                    row.clamp(0, self.screen.rows() - 1)
                };
            }
            b'J' => {
                at_most(&csi, 1, "ED")?;
                let mode = erase_mode(csi.params.raw(0), "ED")?;
                trace!("ED {:?}", mode);
                self.screen.erase_in_display(mode);
            }
            b'K' => {
                at_most(&csi, 1, "EL")?;
                let mode = erase_mode(csi.params.raw(0), "EL")?;
                trace!("EL {:?}", mode);
                self.screen.erase_in_line(mode);
            }
            b'L' => {
                at_most(&csi, 1, "IL")?;
                let n = csi.pn();
                trace!("IL {n}");
                for _ in 0..n {
                    self.screen.ins_line(y);
                }
            }
            b'M' => {
                at_most(&csi, 1, "DL")?;
                let n = csi.pn();
                trace!("DL {n}");
                for _ in 0..n {
                    self.screen.del_line(y);
                }
            }
            b'P' => {
                at_most(&csi, 1, "DCH")?;
                let n = csi.pn();
                trace!("DCH {n}");
                for _ in 0..n {
                    let cx = self.screen.cursor.x;
                    let cy = self.screen.cursor.y;
                    self.screen.del_char(cx, cy);
                }
            }
            b'c' => {
                trace!("DA");
                self.output(b"\x1b[?6c");
            }
            b'g' => {
                at_most(&csi, 1, "TBC")?;
                match csi.params.raw(0) {
                    0 => {
                        trace!("TBC current column");
                        self.screen.clear_tab_stop();
                    }
                    3 => {
                        trace!("TBC all");
                        self.screen.clear_all_tab_stops();
                    }
                    // TBC ignores undefined parameters
                    other => trace!("TBC {other} ignored"),
                }
            }
            b'h' | b'l' => self.set_reset_mode(&csi)?,
            b'i' => {
                // MC - media copy, ignored by this emulator
                trace!("MC ignored");
            }
            b'm' => self.select_graphic_rendition(&csi)?,
            b'n' => self.device_status_report(&csi)?,
            b'q' => {
                if csi.params.len() != 1 {
                    return Err(Error::BadParameterCount("DECLL"));
                }
                match csi.params.raw(0) {
                    0 | 1 => trace!("DECLL (no LEDs fitted)"),
                    other => {
                        return Err(Error::UndefinedSequence(format!("DECLL {other}")));
                    }
                }
            }
            b'r' => self.set_scrolling_region(&csi)?,
            b'y' => return Err(Error::NotImplemented("DECTST")),
            other => {
                return Err(Error::UndefinedSequence(format!(
                    "ESC [ {}",
                    other as char
                )));
            }
        }
        Ok(())
    }

    /// SM/RM, including the DEC private modes
    fn set_reset_mode(&mut self, csi: &CsiAction) -> Result<()> {
        let set = csi.final_byte == b'h';
        if csi.params.len() != 1 {
            return Err(Error::BadParameterCount(if set { "SM" } else { "RM" }));
        }
        let mode = csi.params.raw(0);

        if csi.private {
            match mode {
                1 => {
                    trace!("DECCKM {set}");
                    // With the keypad in numeric mode DECCKM stays reset
                    self.screen.modes.cursor_keys_application =
                        set && self.screen.modes.keypad == KeypadMode::Application;
                }
                2 => {
                    trace!("DECANM {set}");
                    if !set {
                        return Err(Error::NotImplemented("VT52 mode"));
                    }
                    self.screen.modes.ansi_mode = true;
                }
                3 => {
                    trace!("DECCOLM {set}");
                    self.screen.set_column_mode(set);
                }
                4 => {
                    trace!("DECSCLM {set}");
                    self.screen.modes.smooth_scroll = set;
                }
                5 => {
                    trace!("DECSCNM {set}");
                    self.screen.modes.reverse_screen = set;
                }
                6 => {
                    trace!("DECOM {set}");
                    self.screen.modes.origin_mode = set;
                    self.screen.move_home();
                }
                7 => {
                    trace!("DECAWM {set}");
                    self.screen.modes.auto_wrap = set;
                }
                8 => {
                    trace!("DECARM {set}");
                    self.screen.modes.auto_repeat = set;
                }
                18 => {
                    trace!("DECPFF {set}");
                    self.screen.modes.print_form_feed = set;
                }
                19 => {
                    trace!("DECPEX {set}");
                    self.screen.modes.print_full_screen = set;
                }
                other => {
                    return Err(Error::UndefinedSequence(format!(
                        "DEC private mode {other}"
                    )));
                }
            }
        } else {
            match mode {
                2 => {
                    trace!("KAM {set}");
                    self.screen.modes.keyboard_locked = set;
                }
                4 => {
                    trace!("IRM {set}");
                    self.screen.modes.insert_mode = set;
                }
                12 => {
                    trace!("SRM {set}");
                    self.screen.modes.send_receive = set;
                }
                20 => {
                    trace!("LNM {set}");
                    self.screen.modes.linefeed_mode = set;
                }
                other => {
                    return Err(Error::UndefinedSequence(format!("ANSI mode {other}")));
                }
            }
        }
        Ok(())
    }

    /// SGR - the VT102 renders bold, underline, blink, and reverse
    fn select_graphic_rendition(&mut self, csi: &CsiAction) -> Result<()> {
        if csi.params.is_empty() {
            trace!("SGR off");
            self.screen.cursor.attrs.reset();
            return Ok(());
        }
        for param in csi.params.iter() {
            match param {
                0 => self.screen.cursor.attrs.reset(),
                1 => self.screen.cursor.attrs.bold = true,
                4 => self.screen.cursor.attrs.underline = true,
                5 => self.screen.cursor.attrs.blink = true,
                7 => self.screen.cursor.attrs.reverse = true,
                other => {
                    return Err(Error::UndefinedSequence(format!("SGR {other}")));
                }
            }
        }
        Ok(())
    }

    fn device_status_report(&mut self, csi: &CsiAction) -> Result<()> {
        if csi.params.len() != 1 {
            return Err(Error::BadParameterCount("DSR"));
        }
        let code = csi.params.raw(0);
        if csi.private {
            if code == 15 {
                // no printer connected
                trace!("DSR printer status");
                self.output(b"\x1b[?13n");
            } else {
                trace!("DSR ?{code} ignored");
            }
            return Ok(());
        }
        match code {
            5 => {
                // ready, no malfunctions
                trace!("DSR status");
                self.output(b"\x1b[0n");
            }
            6 => {
                trace!("DSR cursor position");
                let row = self.screen.scroll_top + self.screen.cursor.y + 1;
                let col = self.screen.cursor.x + 1;
                let report = format!("\x1b[{row};{col}R");
                self.output(report.as_bytes());
            }
            other => trace!("DSR {other} ignored"),
        }
        Ok(())
    }

    fn set_scrolling_region(&mut self, csi: &CsiAction) -> Result<()> {
        at_most(csi, 2, "DECSTBM")?;
        let rows = self.screen.rows();
        let (top, bottom) = match csi.params.len() {
            0 => (0, rows - 1),
            1 => (csi.params.raw(0) as i32 - 1, rows - 1),
            _ => (
                csi.params.raw(0) as i32 - 1,
                csi.params.raw(1) as i32 - 1,
            ),
        };
        trace!("DECSTBM {top} {bottom}");
        // the scrolling region is at least 2 lines
        if top < bottom && top >= 0 && bottom < rows {
            self.screen.scroll_top = top;
            self.screen.scroll_bottom = bottom;
            self.screen.move_home();
        }
        Ok(())
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

fn at_most(csi: &CsiAction, n: usize, name: &'static str) -> Result<()> {
    if csi.params.len() > n {
        Err(Error::BadParameterCount(name))
    } else {
        Ok(())
    }
}

fn erase_mode(param: u16, name: &'static str) -> Result<EraseMode> {
    match param {
        0 => Ok(EraseMode::ToEnd),
        1 => Ok(EraseMode::ToStart),
        2 => Ok(EraseMode::All),
        other => Err(Error::UndefinedSequence(format!("{name} {other}"))),
    }
}
