//! Terminal mode registers
//!
//! All VT102 mode flags: the four ANSI modes, the DEC private modes, and
//! the keypad mode. Unknown mode numbers are rejected at dispatch time by
//! the interpreter, so there is no catch-all setter here.

use serde::{Deserialize, Serialize};

/// Keypad mode selected by DECKPNM/DECKPAM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeypadMode {
    #[default]
    Numeric,
    Application,
}

/// Terminal mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modes {
    // ANSI modes
    /// KAM - keyboard locked; all key events are discarded
    pub keyboard_locked: bool,
    /// IRM - insert mode; writes shift existing characters right
    pub insert_mode: bool,
    /// SRM - send/receive mode; set suppresses local echo
    pub send_receive: bool,
    /// LNM - linefeed/newline mode; LF implies CR
    pub linefeed_mode: bool,

    // DEC private modes
    /// DECCKM - cursor keys send application sequences
    pub cursor_keys_application: bool,
    /// DECANM - ANSI (vs VT52) mode
    pub ansi_mode: bool,
    /// DECCOLM - 132-column mode
    pub column_132: bool,
    /// DECSCLM - smooth scrolling
    pub smooth_scroll: bool,
    /// DECSCNM - reverse-video screen
    pub reverse_screen: bool,
    /// DECOM - origin mode; addressing is relative to the scroll region
    pub origin_mode: bool,
    /// DECAWM - autowrap at the right margin
    pub auto_wrap: bool,
    /// DECARM - keyboard auto-repeat
    pub auto_repeat: bool,
    /// DECPFF - print form feed
    pub print_form_feed: bool,
    /// DECPEX - print extent is the full screen (vs scroll region)
    pub print_full_screen: bool,

    /// Keypad mode (DECKPNM/DECKPAM)
    pub keypad: KeypadMode,
}

impl Modes {
    pub fn new() -> Self {
        Self {
            keyboard_locked: false,
            insert_mode: false,
            send_receive: false,
            linefeed_mode: false,
            cursor_keys_application: false,
            ansi_mode: true,
            column_132: false,
            smooth_scroll: false,
            reverse_screen: false,
            origin_mode: false,
            auto_wrap: true,
            auto_repeat: false,
            print_form_feed: false,
            print_full_screen: false,
            keypad: KeypadMode::Numeric,
        }
    }

    /// Reset all modes to power-up defaults
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}
