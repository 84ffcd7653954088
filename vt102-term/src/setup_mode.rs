//! The SET-UP subsystem
//!
//! The SET-UP key snapshots the screen, paints a configuration display
//! in its place, and routes keys to parameter changes until SET-UP is
//! pressed again. All drawing goes through the ordinary screen write
//! path, so the render interface needs nothing special.

use log::{debug, trace};

use vt102_core::charset::Charsets;
use vt102_core::cursor::Cursor;
use vt102_core::line::{Line, LineAttr};
use vt102_core::screen::EraseMode;
use vt102_core::setup::{
    SetupModel, ANSWERBACK_LEN, DATA_PARITY, MODEM_CONTROL, SPEEDS, TURNAROUND_CHARS,
};
use vt102_parser::Parser;

use crate::emulator::{Emulator, Session};
use crate::keyboard::{chart_translate, Key, Modifiers};

/// Screen and interpreter state captured on SET-UP entry and put back
/// on exit. Modes and tab stops are deliberately not part of it: SET-UP
/// exists to change them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SetupSnapshot {
    pub(crate) lines: Vec<Line>,
    pub(crate) cursor: Cursor,
    pub(crate) charsets: Charsets,
    pub(crate) parser: Parser,
}

/// Row the SET-UP A tab-stop cursor lives on
const TAB_ROW: i32 = 22;
/// Column ruler row in SET-UP A
const RULER_ROW: i32 = 23;
/// Row the SET-UP B feature cursor lives on
const FEATURE_ROW: i32 = 23;
/// Bank labels row in SET-UP B
const BANK_LABEL_ROW: i32 = 22;
/// Horizontal pitch of the feature banks
const BANK_PITCH: i32 = 8;

/// One toggleable SET-UP B feature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    SmoothScroll,
    AutoRepeat,
    ReverseScreen,
    BlockCursor,
    MarginBell,
    Keyclick,
    AnsiMode,
    AutoXonXoff,
    UkCharset,
    AutoWrap,
    NewLine,
    Power50Hz,
    PrintFormFeed,
    PrintExtent,
    StopBits,
    ReceiveParity,
    BreakEnable,
    DisconnectCharEnable,
    DisconnectDelay,
    AutoAnswerback,
    InitialDirection,
    AutoTurnaround,
    WpsTerminalKbd,
}

/// The seven banks of toggles on the SET-UP B bottom row. The cursor
/// column selects a bank (every eighth column) and a bit within it.
const FEATURE_BANKS: [[Option<Feature>; 4]; 7] = [
    [
        Some(Feature::SmoothScroll),
        Some(Feature::AutoRepeat),
        Some(Feature::ReverseScreen),
        Some(Feature::BlockCursor),
    ],
    [
        Some(Feature::MarginBell),
        Some(Feature::Keyclick),
        Some(Feature::AnsiMode),
        Some(Feature::AutoXonXoff),
    ],
    [
        Some(Feature::UkCharset),
        Some(Feature::AutoWrap),
        Some(Feature::NewLine),
        Some(Feature::Power50Hz),
    ],
    [
        Some(Feature::PrintFormFeed),
        Some(Feature::PrintExtent),
        None,
        None,
    ],
    [
        Some(Feature::StopBits),
        Some(Feature::ReceiveParity),
        Some(Feature::BreakEnable),
        Some(Feature::DisconnectCharEnable),
    ],
    [
        Some(Feature::DisconnectDelay),
        Some(Feature::AutoAnswerback),
        Some(Feature::InitialDirection),
        Some(Feature::AutoTurnaround),
    ],
    [Some(Feature::WpsTerminalKbd), None, None, None],
];

impl Emulator {
    pub(crate) fn enter_setup(&mut self) {
        trace!("entering SET-UP");
        self.saved_session = Some(Box::new(SetupSnapshot {
            lines: self.screen.lines().to_vec(),
            cursor: self.screen.cursor,
            charsets: self.screen.charsets.clone(),
            parser: self.parser.clone(),
        }));
        self.session = Session::SetUpA;
        // the display paints in plain US text
        self.screen.charsets = Charsets::new();
        self.screen.cursor.attrs.reset();
        self.paint_setup();
        self.screen.cursor.x = 0;
        self.screen.cursor.y = self.interactive_row();
    }

    fn exit_setup(&mut self) {
        trace!("leaving SET-UP");
        if let Some(snap) = self.saved_session.take() {
            self.screen.restore_lines(snap.lines);
            self.screen.cursor = snap.cursor;
            self.screen.charsets = snap.charsets;
            self.parser = snap.parser;
        }
        // SET-UP may have narrowed the screen under the saved cursor
        self.screen.cursor.x = self.screen.cursor.x.min(self.screen.cols() - 1);
        self.session = Session::Online;
    }

    fn interactive_row(&self) -> i32 {
        match self.session {
            Session::SetUpA => TAB_ROW,
            _ => FEATURE_ROW,
        }
    }

    /// Route one key while SET-UP is active
    pub(crate) fn setup_key(&mut self, key: Key, mods: Modifiers) {
        use Key::*;

        if key == SetUp {
            self.exit_setup();
            return;
        }

        if self.session == Session::CreateAnswerback {
            self.answerback_key(key, mods);
            self.paint_setup();
            if self.session != Session::CreateAnswerback {
                self.screen.cursor.x = 0;
                self.screen.cursor.y = self.interactive_row();
            }
            return;
        }

        let mut new_x = self.screen.cursor.x;
        match key {
            Digit5 => {
                self.session = match self.session {
                    Session::SetUpA => Session::SetUpB,
                    _ => Session::SetUpA,
                };
                new_x = 0;
            }
            Digit4 => {
                self.setup.online = !self.setup.online;
                trace!("online = {}", self.setup.online);
            }
            Digit2 if self.session == Session::SetUpA => {
                let x = new_x as usize;
                if x < self.screen.tab_stops.len() {
                    self.screen.tab_stops[x] = !self.screen.tab_stops[x];
                }
            }
            Digit3 if self.session == Session::SetUpA => {
                self.screen.clear_all_tab_stops();
            }
            Digit6 if self.session == Session::SetUpB => {
                self.toggle_feature_at(new_x);
            }
            Digit7 if self.session == Session::SetUpB => {
                if self.modem_selected {
                    self.setup.modem.tx_speed = (self.setup.modem.tx_speed + 1) % SPEEDS.len();
                } else {
                    self.setup.printer.tx_rx_speed =
                        (self.setup.printer.tx_rx_speed + 1) % SPEEDS.len();
                }
            }
            Digit8 if self.session == Session::SetUpB => {
                if self.modem_selected {
                    self.setup.modem.rx_speed = (self.setup.modem.rx_speed + 1) % SPEEDS.len();
                } else {
                    self.setup.printer.tx_rx_speed =
                        (self.setup.printer.tx_rx_speed + 1) % SPEEDS.len();
                }
            }
            Digit9 => {
                let wide = !self.screen.modes.column_132;
                self.screen.set_column_mode(wide);
                new_x = 0;
            }
            Digit0 => debug!("SET-UP reset (stub)"),
            Up => self.setup.adjust_brightness(0.1),
            Down => self.setup.adjust_brightness(-0.1),
            Left | Right if mods.shift && self.session == Session::SetUpB => {
                self.modem_selected = !self.modem_selected;
            }
            Left => new_x -= 1,
            Right => new_x += 1,
            A if mods.shift && self.session == Session::SetUpB => {
                self.session = Session::CreateAnswerback;
                self.setup.answerback.clear();
                self.answerback_delimiter = None;
            }
            C if mods.shift => {
                self.setup.modem.turnaround_disconnect_char =
                    (self.setup.modem.turnaround_disconnect_char + 1) % TURNAROUND_CHARS.len();
            }
            D if mods.shift => self.setup_defaults(),
            M if mods.shift => {
                self.setup.modem.control = (self.setup.modem.control + 1) % MODEM_CONTROL.len();
            }
            P if mods.shift => {
                if self.modem_selected {
                    self.setup.modem.data_parity_bits =
                        (self.setup.modem.data_parity_bits + 1) % DATA_PARITY.len();
                } else {
                    self.setup.printer.data_parity_bits =
                        (self.setup.printer.data_parity_bits + 1) % DATA_PARITY.len();
                }
            }
            R if mods.shift => self.load_user_setup(),
            S if mods.shift => self.save_user_setup(),
            T => self.screen.default_tab_stops(),
            other => trace!("SET-UP ignores {other:?}"),
        }

        self.paint_setup();
        if self.session == Session::CreateAnswerback {
            // the answerback painter leaves the cursor at the prompt
            return;
        }
        self.screen.cursor.x = new_x.clamp(0, self.screen.cols() - 1);
        self.screen.cursor.y = self.interactive_row();
    }

    /// CreateAnswerback: the first key fixes the delimiter, then keys
    /// accumulate until the delimiter repeats or the buffer fills.
    fn answerback_key(&mut self, key: Key, mods: Modifiers) {
        let Some(byte) = chart_translate(key, mods) else {
            trace!("answerback ignores {key:?}");
            return;
        };
        match self.answerback_delimiter {
            None => {
                self.answerback_delimiter = Some(byte);
                self.setup.delimiter = byte;
            }
            Some(delimiter) if byte == delimiter => {
                self.answerback_delimiter = None;
                self.session = Session::SetUpB;
            }
            Some(_) => {
                self.setup.push_answerback(byte);
                if self.setup.answerback.len() >= ANSWERBACK_LEN {
                    self.answerback_delimiter = None;
                    self.session = Session::SetUpB;
                }
            }
        }
    }

    /// Restore factory settings: the SET-UP record and the mode flags
    /// it fronts for.
    fn setup_defaults(&mut self) {
        self.setup = SetupModel::default();
        self.screen.tab_stops = self.setup.tab_stops.clone();
        let modes = &mut self.screen.modes;
        modes.smooth_scroll = false;
        modes.auto_repeat = false;
        modes.reverse_screen = false;
        modes.ansi_mode = true;
        modes.auto_wrap = true;
        modes.linefeed_mode = false;
        modes.print_form_feed = false;
        modes.print_full_screen = false;
        self.modem_selected = true;
    }

    /// SHIFT-S: deep-copy the live settings into the user profile
    fn save_user_setup(&mut self) {
        self.setup.tab_stops = self.screen.tab_stops.clone();
        self.user_setup = self.setup.clone();
        trace!("SET-UP saved");
    }

    /// SHIFT-R: recall the user profile into the live settings
    fn load_user_setup(&mut self) {
        self.setup = self.user_setup.clone();
        self.screen.tab_stops = self.setup.tab_stops.clone();
        trace!("SET-UP recalled");
    }

    fn feature_at(&self, x: i32) -> Option<Feature> {
        if x < 0 {
            return None;
        }
        let bank = (x / BANK_PITCH) as usize;
        let bit = (x % BANK_PITCH) as usize;
        if bank >= FEATURE_BANKS.len() || bit >= 4 {
            return None;
        }
        FEATURE_BANKS[bank][bit]
    }

    fn toggle_feature_at(&mut self, x: i32) {
        let Some(feature) = self.feature_at(x) else {
            trace!("no switch under column {x}");
            return;
        };
        let value = !self.feature_get(feature);
        trace!("{feature:?} = {value}");
        self.feature_set(feature, value);
    }

    fn feature_get(&self, feature: Feature) -> bool {
        let modes = &self.screen.modes;
        match feature {
            Feature::SmoothScroll => modes.smooth_scroll,
            Feature::AutoRepeat => modes.auto_repeat,
            Feature::ReverseScreen => modes.reverse_screen,
            Feature::BlockCursor => self.setup.block_cursor,
            Feature::MarginBell => self.setup.margin_bell,
            Feature::Keyclick => self.setup.keyclick,
            Feature::AnsiMode => modes.ansi_mode,
            Feature::AutoXonXoff => self.setup.auto_xon_xoff,
            Feature::UkCharset => self.setup.uk_charset,
            Feature::AutoWrap => modes.auto_wrap,
            Feature::NewLine => modes.linefeed_mode,
            Feature::Power50Hz => self.setup.power_50hz,
            Feature::PrintFormFeed => modes.print_form_feed,
            Feature::PrintExtent => modes.print_full_screen,
            Feature::StopBits => self.setup.stop_bits,
            Feature::ReceiveParity => self.setup.receive_parity,
            Feature::BreakEnable => self.setup.break_enable,
            Feature::DisconnectCharEnable => self.setup.disconnect_char_enable,
            Feature::DisconnectDelay => self.setup.disconnect_delay,
            Feature::AutoAnswerback => self.setup.auto_answerback,
            Feature::InitialDirection => self.setup.initial_direction,
            Feature::AutoTurnaround => self.setup.auto_turnaround,
            Feature::WpsTerminalKbd => self.setup.wps_terminal_kbd,
        }
    }

    fn feature_set(&mut self, feature: Feature, value: bool) {
        let modes = &mut self.screen.modes;
        match feature {
            Feature::SmoothScroll => modes.smooth_scroll = value,
            Feature::AutoRepeat => modes.auto_repeat = value,
            Feature::ReverseScreen => modes.reverse_screen = value,
            Feature::BlockCursor => self.setup.block_cursor = value,
            Feature::MarginBell => self.setup.margin_bell = value,
            Feature::Keyclick => self.setup.keyclick = value,
            Feature::AnsiMode => modes.ansi_mode = value,
            Feature::AutoXonXoff => self.setup.auto_xon_xoff = value,
            Feature::UkCharset => self.setup.uk_charset = value,
            Feature::AutoWrap => modes.auto_wrap = value,
            Feature::NewLine => modes.linefeed_mode = value,
            Feature::Power50Hz => self.setup.power_50hz = value,
            Feature::PrintFormFeed => modes.print_form_feed = value,
            Feature::PrintExtent => modes.print_full_screen = value,
            Feature::StopBits => self.setup.stop_bits = value,
            Feature::ReceiveParity => self.setup.receive_parity = value,
            Feature::BreakEnable => self.setup.break_enable = value,
            Feature::DisconnectCharEnable => self.setup.disconnect_char_enable = value,
            Feature::DisconnectDelay => self.setup.disconnect_delay = value,
            Feature::AutoAnswerback => self.setup.auto_answerback = value,
            Feature::InitialDirection => self.setup.initial_direction = value,
            Feature::AutoTurnaround => self.setup.auto_turnaround = value,
            Feature::WpsTerminalKbd => self.setup.wps_terminal_kbd = value,
        }
    }

    // Painting. Everything goes through the screen's ordinary write
    // path, one byte at a time.

    fn paint_at(&mut self, x: i32, y: i32, text: &str) {
        self.screen.cursor.x = x;
        self.screen.cursor.y = y;
        for byte in text.bytes() {
            self.screen.put(byte);
        }
    }

    pub(crate) fn paint_setup(&mut self) {
        let insert = self.screen.modes.insert_mode;
        self.screen.modes.insert_mode = false;
        self.screen.erase_in_display(EraseMode::All);

        match self.session {
            Session::SetUpA => self.paint_setup_a(),
            Session::SetUpB => self.paint_setup_b(),
            Session::CreateAnswerback => self.paint_answerback(),
            Session::Online => {}
        }

        self.screen.modes.insert_mode = insert;
    }

    fn paint_title(&mut self, title: &str) {
        self.paint_at(0, 0, title);
        self.paint_at(0, 1, title);
        self.screen.line_mut(0).attr = LineAttr::DoubleHeightUpper;
        self.screen.line_mut(1).attr = LineAttr::DoubleHeightLower;
        self.paint_at(0, 3, "TO EXIT PRESS \"SET-UP\"");
    }

    fn paint_setup_a(&mut self) {
        self.paint_title("SET-UP A");

        let cols = self.screen.cols();
        let tabs: String = (0..cols)
            .map(|x| {
                if self.screen.tab_stops[x as usize] {
                    'T'
                } else {
                    ' '
                }
            })
            .collect();
        self.paint_at(0, TAB_ROW, &tabs);

        let ruler: String = (0..cols)
            .map(|x| char::from_digit(((x + 1) % 10) as u32, 10).unwrap_or('0'))
            .collect();
        self.paint_at(0, RULER_ROW, &ruler);
    }

    fn paint_setup_b(&mut self) {
        self.paint_title("SET-UP B");
        self.paint_at(0, 5, "VT102 V1.0");
        self.paint_at(
            14,
            5,
            if self.setup.online { "ON LINE" } else { "LOCAL" },
        );

        let modem = self.setup.modem;
        self.screen.cursor.attrs.reverse = self.modem_selected;
        self.paint_at(0, 7, "MODEM");
        self.screen.cursor.attrs.reverse = false;
        let speeds = format!(
            "T SPEED {:>6}  R SPEED {:>6}",
            SPEEDS[modem.tx_speed], SPEEDS[modem.rx_speed]
        );
        self.paint_at(0, 8, &speeds);
        let line = format!(
            "BITS/PARITY {}  CONTROL {}  TURNAROUND {}",
            DATA_PARITY[modem.data_parity_bits],
            MODEM_CONTROL[modem.control],
            TURNAROUND_CHARS[modem.turnaround_disconnect_char]
        );
        self.paint_at(0, 9, &line);

        let printer = self.setup.printer;
        self.screen.cursor.attrs.reverse = !self.modem_selected;
        self.paint_at(0, 11, "PRINTER");
        self.screen.cursor.attrs.reverse = false;
        let line = format!(
            "T/R SPEED {:>6}  BITS/PARITY {}",
            SPEEDS[printer.tx_rx_speed], DATA_PARITY[printer.data_parity_bits]
        );
        self.paint_at(0, 12, &line);

        for (bank, switches) in FEATURE_BANKS.iter().enumerate() {
            let x = bank as i32 * BANK_PITCH;
            self.paint_at(x, BANK_LABEL_ROW, &(bank + 1).to_string());
            let digits: String = switches
                .iter()
                .map(|switch| match switch {
                    Some(feature) => {
                        if self.feature_get(*feature) {
                            '1'
                        } else {
                            '0'
                        }
                    }
                    None => ' ',
                })
                .collect();
            self.paint_at(x, FEATURE_ROW, &digits);
        }
    }

    fn paint_answerback(&mut self) {
        self.paint_title("SET-UP B");
        self.paint_at(0, 5, "ANSWERBACK  ");
        if let Some(delimiter) = self.answerback_delimiter {
            self.screen.put(delimiter);
            let message = self.setup.answerback.clone();
            for byte in message {
                self.screen.put(byte);
            }
        }
    }
}
