//! Keyboard translation
//!
//! Maps (keycap, modifiers) pairs to the byte sequences the terminal
//! transmits. Most keys go through a static unshifted/shifted/control
//! chart; arrows, the keypad, and a handful of function keys have their
//! own encodings that depend on the current mode registers.

use log::{debug, trace};

use vt102_core::KeypadMode;

use crate::emulator::{Emulator, Session};

/// Every keycap on a VT102 keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    SetUp,
    Up,
    Down,
    Left,
    Right,

    Escape,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Digit0,
    Minus,
    Equals,
    Backtick,
    Backspace,
    Break,

    Tab,
    Q,
    W,
    E,
    R,
    T,
    Y,
    U,
    I,
    O,
    P,
    LeftBracket,
    RightBracket,
    Return,
    Delete,

    A,
    S,
    D,
    F,
    G,
    H,
    J,
    K,
    L,
    Semicolon,
    Quote,
    Backslash,

    NoScroll,
    Z,
    X,
    C,
    V,
    B,
    N,
    M,
    Comma,
    Period,
    Slash,
    LineFeed,

    Space,

    Pf1,
    Pf2,
    Pf3,
    Pf4,

    Kp0,
    Kp1,
    Kp2,
    Kp3,
    Kp4,
    Kp5,
    Kp6,
    Kp7,
    Kp8,
    Kp9,
    KpMinus,
    KpComma,
    KpPeriod,
    KpEnter,
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub caps_lock: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        caps_lock: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        shift: true,
        caps_lock: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        shift: false,
        caps_lock: false,
    };
}

/// The unshifted/shifted/control chart. -1 suppresses output for a
/// chord the terminal has no code for.
fn chart(key: Key) -> Option<[i16; 3]> {
    use Key::*;
    Some(match key {
        Digit1 => [b'1' as i16, b'!' as i16, -1],
        Digit2 => [b'2' as i16, b'@' as i16, -1],
        Digit3 => [b'3' as i16, b'#' as i16, -1],
        Digit4 => [b'4' as i16, b'$' as i16, -1],
        Digit5 => [b'5' as i16, b'%' as i16, -1],
        Digit6 => [b'6' as i16, b'^' as i16, -1],
        Digit7 => [b'7' as i16, b'&' as i16, -1],
        Digit8 => [b'8' as i16, b'*' as i16, -1],
        Digit9 => [b'9' as i16, b'(' as i16, -1],
        Digit0 => [b'0' as i16, b')' as i16, -1],
        Minus => [b'-' as i16, b'_' as i16, -1],
        Equals => [b'=' as i16, b'+' as i16, -1],
        Backtick => [b'`' as i16, b'~' as i16, 0x1E],
        Q => [b'q' as i16, b'Q' as i16, 0x11],
        W => [b'w' as i16, b'W' as i16, 0x17],
        E => [b'e' as i16, b'E' as i16, 0x05],
        R => [b'r' as i16, b'R' as i16, 0x12],
        T => [b't' as i16, b'T' as i16, 0x14],
        Y => [b'y' as i16, b'Y' as i16, 0x19],
        U => [b'u' as i16, b'U' as i16, 0x15],
        I => [b'i' as i16, b'I' as i16, 0x09],
        O => [b'o' as i16, b'O' as i16, 0x0F],
        P => [b'p' as i16, b'P' as i16, 0x10],
        LeftBracket => [b'[' as i16, b'{' as i16, 0x1B],
        RightBracket => [b']' as i16, b'}' as i16, 0x1D],
        A => [b'a' as i16, b'A' as i16, 0x01],
        S => [b's' as i16, b'S' as i16, 0x13],
        D => [b'd' as i16, b'D' as i16, 0x04],
        F => [b'f' as i16, b'F' as i16, 0x06],
        G => [b'g' as i16, b'G' as i16, 0x07],
        H => [b'h' as i16, b'H' as i16, 0x08],
        J => [b'j' as i16, b'J' as i16, 0x0A],
        K => [b'k' as i16, b'K' as i16, 0x0B],
        L => [b'l' as i16, b'L' as i16, 0x0C],
        Semicolon => [b';' as i16, b':' as i16, -1],
        Quote => [b'\'' as i16, b'"' as i16, -1],
        Backslash => [b'\\' as i16, b'|' as i16, 0x1C],
        Z => [b'z' as i16, b'Z' as i16, 0x1A],
        X => [b'x' as i16, b'X' as i16, 0x18],
        C => [b'c' as i16, b'C' as i16, 0x03],
        V => [b'v' as i16, b'V' as i16, 0x16],
        B => [b'b' as i16, b'B' as i16, 0x02],
        N => [b'n' as i16, b'N' as i16, 0x0E],
        M => [b'm' as i16, b'M' as i16, 0x0D],
        Comma => [b',' as i16, b'<' as i16, -1],
        Period => [b'.' as i16, b'>' as i16, -1],
        Slash => [b'/' as i16, b'?' as i16, 0x1F],
        Space => [b' ' as i16, b' ' as i16, 0x00],
        Escape => [0x1B, 0x1B, 0x1B],
        Tab => [0x09, 0x09, 0x09],
        Backspace => [0x08, 0x08, 0x08],
        LineFeed => [0x0A, 0x0A, 0x0A],
        Delete => [0x7F, 0x7F, 0x7F],
        _ => return None,
    })
}

/// Translate a key through the chart. Control overrides shift.
pub(crate) fn chart_translate(key: Key, mods: Modifiers) -> Option<u8> {
    let columns = chart(key)?;
    let idx = if mods.ctrl {
        2
    } else if mods.shift || mods.caps_lock {
        1
    } else {
        0
    };
    u8::try_from(columns[idx]).ok()
}

/// Numeric-keypad key as (literal byte, application-mode final byte)
fn keypad_chart(key: Key) -> Option<(u8, u8)> {
    use Key::*;
    Some(match key {
        Kp0 => (b'0', b'p'),
        Kp1 => (b'1', b'q'),
        Kp2 => (b'2', b'r'),
        Kp3 => (b'3', b's'),
        Kp4 => (b'4', b't'),
        Kp5 => (b'5', b'u'),
        Kp6 => (b'6', b'v'),
        Kp7 => (b'7', b'w'),
        Kp8 => (b'8', b'x'),
        Kp9 => (b'9', b'y'),
        KpMinus => (b'-', b'm'),
        KpComma => (b',', b'l'),
        KpPeriod => (b'.', b'n'),
        _ => return None,
    })
}

impl Emulator {
    /// Process one key press
    pub fn key_press(&mut self, key: Key, mods: Modifiers) {
        if self.session != Session::Online {
            self.setup_key(key, mods);
            return;
        }
        if self.screen.modes.keyboard_locked {
            trace!("keyboard locked (KAM), key dropped");
            return;
        }

        match key {
            Key::SetUp => self.enter_setup(),
            Key::Up => self.send_arrow(b'A'),
            Key::Down => self.send_arrow(b'B'),
            Key::Right => self.send_arrow(b'C'),
            Key::Left => self.send_arrow(b'D'),
            Key::Return => self.send_return(),
            Key::KpEnter => {
                if mods.ctrl {
                    debug!("auto print toggle (stub)");
                } else if mods.shift {
                    debug!("print screen (stub)");
                } else if self.screen.modes.keypad == KeypadMode::Application {
                    self.output(b"\x1b0M");
                } else {
                    self.send_return();
                }
            }
            Key::NoScroll => {
                self.xon = !self.xon;
                trace!("NO SCROLL, xon = {}", self.xon);
            }
            Key::Pf1 => self.output(b"\x1bOP"),
            Key::Pf2 => self.output(b"\x1bOQ"),
            Key::Pf3 => self.output(b"\x1bOR"),
            Key::Pf4 => self.output(b"\x1bOS"),
            Key::Break => {
                // break timing belongs to the line discipline
                debug!("BREAK (stub)");
            }
            _ => {
                if let Some((literal, app_final)) = keypad_chart(key) {
                    if self.screen.modes.keypad == KeypadMode::Application {
                        self.output(&[0x1B, b'0', app_final]);
                    } else {
                        self.output(&[literal]);
                    }
                } else if let Some(byte) = chart_translate(key, mods) {
                    self.output(&[byte]);
                } else {
                    trace!("key {key:?} has no code, dropped");
                }
            }
        }
    }

    /// Process an auto-repeated key event. DECARM gates repeats; the
    /// initial press always goes through `key_press`.
    pub fn key_repeat(&mut self, key: Key, mods: Modifiers) {
        if self.session == Session::Online && !self.screen.modes.auto_repeat {
            trace!("auto-repeat disabled (DECARM), repeat dropped");
            return;
        }
        self.key_press(key, mods);
    }

    fn send_arrow(&mut self, dir: u8) {
        let second = if self.screen.modes.cursor_keys_application {
            b'O'
        } else {
            b'['
        };
        self.output(&[0x1B, second, dir]);
    }

    fn send_return(&mut self) {
        self.output(b"\r");
        if self.screen.modes.linefeed_mode {
            self.output(b"\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_characters() {
        let mut emu = Emulator::new();
        emu.key_press(Key::H, Modifiers::NONE);
        emu.key_press(Key::I, Modifiers::SHIFT);
        assert_eq!(emu.drain(), b"hI");
    }

    #[test]
    fn test_caps_lock_selects_shifted_column() {
        let mut emu = Emulator::new();
        let caps = Modifiers {
            caps_lock: true,
            ..Modifiers::NONE
        };
        emu.key_press(Key::A, caps);
        assert_eq!(emu.drain(), b"A");
    }

    #[test]
    fn test_control_codes() {
        let mut emu = Emulator::new();
        emu.key_press(Key::C, Modifiers::CTRL);
        emu.key_press(Key::Z, Modifiers::CTRL);
        emu.key_press(Key::Space, Modifiers::CTRL);
        assert_eq!(emu.drain(), vec![0x03, 0x1A, 0x00]);
    }

    #[test]
    fn test_control_overrides_shift() {
        let mut emu = Emulator::new();
        let both = Modifiers {
            ctrl: true,
            shift: true,
            caps_lock: false,
        };
        emu.key_press(Key::C, both);
        assert_eq!(emu.drain(), vec![0x03]);
    }

    #[test]
    fn test_suppressed_chords() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Digit1, Modifiers::CTRL);
        emu.key_press(Key::Semicolon, Modifiers::CTRL);
        assert!(emu.drain().is_empty());
    }

    #[test]
    fn test_shifted_digits() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Digit1, Modifiers::SHIFT);
        emu.key_press(Key::Digit3, Modifiers::SHIFT);
        assert_eq!(emu.drain(), b"!#");
    }

    #[test]
    fn test_arrows_depend_on_decckm() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Up, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1b[A");

        emu.feed(b"\x1b=\x1b[?1h").unwrap();
        emu.key_press(Key::Up, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1bOA");
        emu.key_press(Key::Left, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1bOD");
    }

    #[test]
    fn test_return_honors_lnm() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Return, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\r");

        emu.feed(b"\x1b[20h").unwrap();
        emu.key_press(Key::Return, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\r\n");
    }

    #[test]
    fn test_keypad_numeric_sends_literals() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Kp7, Modifiers::NONE);
        emu.key_press(Key::KpMinus, Modifiers::NONE);
        emu.key_press(Key::KpPeriod, Modifiers::NONE);
        assert_eq!(emu.drain(), b"7-.");
    }

    #[test]
    fn test_keypad_application_sequences() {
        let mut emu = Emulator::new();
        emu.feed(b"\x1b=").unwrap();
        emu.key_press(Key::Kp0, Modifiers::NONE);
        emu.key_press(Key::Kp9, Modifiers::NONE);
        emu.key_press(Key::KpComma, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1b0p\x1b0y\x1b0l");
    }

    #[test]
    fn test_kp_enter_modes() {
        let mut emu = Emulator::new();
        emu.key_press(Key::KpEnter, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\r");

        emu.feed(b"\x1b=").unwrap();
        emu.key_press(Key::KpEnter, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1b0M");
    }

    #[test]
    fn test_pf_keys() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Pf1, Modifiers::NONE);
        emu.key_press(Key::Pf4, Modifiers::NONE);
        assert_eq!(emu.drain(), b"\x1bOP\x1bOS");
    }

    #[test]
    fn test_kam_drops_keys() {
        let mut emu = Emulator::new();
        emu.feed(b"\x1b[2h").unwrap();
        emu.key_press(Key::A, Modifiers::NONE);
        emu.key_press(Key::Return, Modifiers::NONE);
        assert!(emu.drain().is_empty());

        emu.feed(b"\x1b[2l").unwrap();
        emu.key_press(Key::A, Modifiers::NONE);
        assert_eq!(emu.drain(), b"a");
    }

    #[test]
    fn test_decarm_gates_repeats() {
        let mut emu = Emulator::new();
        emu.key_repeat(Key::A, Modifiers::NONE);
        assert!(emu.drain().is_empty());

        emu.feed(b"\x1b[?8h").unwrap();
        emu.key_repeat(Key::A, Modifiers::NONE);
        assert_eq!(emu.drain(), b"a");
    }

    #[test]
    fn test_no_scroll_toggles_xon() {
        let mut emu = Emulator::new();
        emu.key_press(Key::NoScroll, Modifiers::NONE);
        assert!(!emu.xon());
        emu.key_press(Key::A, Modifiers::NONE);
        assert!(emu.pending_output().is_empty());
        emu.key_press(Key::NoScroll, Modifiers::NONE);
        assert!(emu.xon());
    }

    #[test]
    fn test_keyboard_output_is_xoff_gated() {
        let mut emu = Emulator::new();
        emu.feed(b"\x13").unwrap();
        emu.key_press(Key::A, Modifiers::NONE);
        assert!(emu.pending_output().is_empty());
    }

    #[test]
    fn test_delete_key() {
        let mut emu = Emulator::new();
        emu.key_press(Key::Delete, Modifiers::NONE);
        assert_eq!(emu.drain(), vec![0x7F]);
    }
}
