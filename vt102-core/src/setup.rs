//! The SET-UP parameter record
//!
//! A value-copyable snapshot of every user-visible SET-UP parameter.
//! The emulator keeps two of these: `setup` (live) and `user_setup`
//! (the last saved copy, restored with SHIFT-R).

use serde::{Deserialize, Serialize};

use crate::line::LINE_WIDTH;

/// Maximum answerback message length
pub const ANSWERBACK_LEN: usize = 20;

/// The sixteen transmit/receive speed selections, in cycling order
pub const SPEEDS: [&str; 16] = [
    "50", "75", "110", "134.5", "150", "200", "300", "600", "1200", "1800", "2000", "2400",
    "3600", "4800", "9600", "19200",
];

/// The eight data-bits/parity combinations
pub const DATA_PARITY: [&str; 8] = [
    "7M", "7S", "7O", "7E", "8N", "8O", "8E", "7N",
];

/// The five modem-control selections
pub const MODEM_CONTROL: [&str; 5] = ["FDX A", "FDX B", "FDX C", "HDX A", "HDX B"];

/// The five turnaround/disconnect character selections
pub const TURNAROUND_CHARS: [&str; 5] = ["NONE", "FF", "ETX", "EOT", "CR"];

/// Communication parameters for the modem port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModemSettings {
    /// Index into [`DATA_PARITY`]
    pub data_parity_bits: usize,
    /// Index into [`SPEEDS`]
    pub tx_speed: usize,
    /// Index into [`SPEEDS`]
    pub rx_speed: usize,
    /// Index into [`MODEM_CONTROL`]
    pub control: usize,
    /// Index into [`TURNAROUND_CHARS`]
    pub turnaround_disconnect_char: usize,
}

impl Default for ModemSettings {
    fn default() -> Self {
        Self {
            data_parity_bits: 3,
            tx_speed: 14,
            rx_speed: 14,
            control: 0,
            turnaround_disconnect_char: 0,
        }
    }
}

/// Communication parameters for the printer port. Transmit and receive
/// share one speed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Index into [`DATA_PARITY`]
    pub data_parity_bits: usize,
    /// Index into [`SPEEDS`]
    pub tx_rx_speed: usize,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        Self {
            data_parity_bits: 3,
            tx_rx_speed: 14,
        }
    }
}

/// Every user-visible SET-UP parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupModel {
    pub online: bool,
    /// Block (vs underline) cursor
    pub block_cursor: bool,
    pub margin_bell: bool,
    pub keyclick: bool,
    /// Honor DC1/DC3 from the host
    pub auto_xon_xoff: bool,
    /// Power-up G0 is the UK set
    pub uk_charset: bool,
    pub stop_bits: bool,
    pub receive_parity: bool,
    pub break_enable: bool,
    pub disconnect_char_enable: bool,
    pub disconnect_delay: bool,
    pub auto_answerback: bool,
    pub initial_direction: bool,
    pub auto_turnaround: bool,
    /// Line power at 50 (vs 60) Hz
    pub power_50hz: bool,
    /// Word-processing keyboard dialect
    pub wps_terminal_kbd: bool,
    /// Answerback delimiter octet
    pub delimiter: u8,
    /// Screen brightness, in (0, 1]
    pub brightness: f64,
    /// The answerback message, at most [`ANSWERBACK_LEN`] bytes
    pub answerback: Vec<u8>,
    /// Saved tab stops
    pub tab_stops: Vec<bool>,
    pub modem: ModemSettings,
    pub printer: PrinterSettings,
}

impl Default for SetupModel {
    fn default() -> Self {
        Self {
            online: true,
            block_cursor: true,
            margin_bell: false,
            keyclick: true,
            auto_xon_xoff: true,
            uk_charset: false,
            stop_bits: false,
            receive_parity: false,
            break_enable: false,
            disconnect_char_enable: false,
            disconnect_delay: false,
            auto_answerback: false,
            initial_direction: false,
            auto_turnaround: false,
            power_50hz: false,
            wps_terminal_kbd: false,
            delimiter: 0,
            brightness: 1.0,
            answerback: Vec::new(),
            tab_stops: (0..LINE_WIDTH).map(|x| x != 0 && x % 8 == 0).collect(),
            modem: ModemSettings::default(),
            printer: PrinterSettings::default(),
        }
    }
}

impl SetupModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte to the answerback message; returns false once the
    /// buffer is full.
    pub fn push_answerback(&mut self, byte: u8) -> bool {
        if self.answerback.len() < ANSWERBACK_LEN {
            self.answerback.push(byte);
            true
        } else {
            false
        }
    }

    /// Step brightness by a tenth, clamped into (0, 1]
    pub fn adjust_brightness(&mut self, delta: f64) {
        self.brightness = (self.brightness + delta).clamp(0.1, 1.0);
    }
}
