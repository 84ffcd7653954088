//! Golden tests for the emulator
//!
//! Each test feeds a byte string to a fresh emulator and checks the
//! resulting screen state or output-buffer contents byte for byte.

use vt102_term::{Emulator, Key, Modifiers, Session};

fn emulator_with(input: &[u8]) -> Emulator {
    let mut emu = Emulator::new();
    emu.feed(input).unwrap();
    emu
}

#[test]
fn test_plain_text() {
    let emu = emulator_with(b"Hello");
    for (i, ch) in b"Hello".iter().enumerate() {
        assert_eq!(emu.cell_at(i as i32, 0).unwrap().ch, *ch);
    }
    assert_eq!((emu.cursor_x(), emu.cursor_y()), (5, 0));
}

#[test]
fn test_clear_and_position() {
    let mut emu = Emulator::new();
    emu.feed(b"junk junk junk").unwrap();
    emu.feed(b"\x1b[2J\x1b[5;10HX").unwrap();

    for y in 0..24 {
        for x in 0..80 {
            let cell = emu.cell_at(x, y).unwrap();
            if (x, y) == (9, 4) {
                assert_eq!(cell.ch, b'X');
            } else {
                assert_eq!(cell.ch, b' ');
            }
        }
    }
    assert_eq!((emu.cursor_x(), emu.cursor_y()), (10, 4));
}

#[test]
fn test_enq_transmits_answerback() {
    let mut emu = Emulator::new();
    emu.set_answerback(b"ACK");
    emu.feed(b"some output\x05").unwrap();
    let out = emu.drain();
    assert!(out.ends_with(b"ACK"));
}

#[test]
fn test_cursor_position_report() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b[3;4H\x1b[6n").unwrap();
    assert_eq!(emu.drain(), b"\x1b[3;4R");
}

#[test]
fn test_insert_mode_round_trip() {
    let emu = emulator_with(b"A\x1b[4hB\x1b[4lC");
    assert_eq!(emu.cell_at(0, 0).unwrap().ch, b'A');
    assert_eq!(emu.cell_at(1, 0).unwrap().ch, b'B');
    assert_eq!(emu.cell_at(2, 0).unwrap().ch, b'C');
}

#[test]
fn test_column_mode_change() {
    let emu = emulator_with(b"filler\x1b[?3h");
    assert_eq!(emu.cols(), 132);
    assert!(emu.screen.modes.column_132);
    assert_eq!((emu.cursor_x(), emu.cursor_y()), (0, 0));
    for x in 0..132 {
        assert_eq!(emu.cell_at(x, 0).unwrap().ch, b' ');
    }
}

#[test]
fn test_arrow_keys_both_cursor_modes() {
    let mut emu = Emulator::new();
    emu.key_press(Key::Up, Modifiers::NONE);
    assert_eq!(emu.drain(), b"\x1b[A");

    emu.feed(b"\x1b=\x1b[?1h").unwrap();
    emu.key_press(Key::Up, Modifiers::NONE);
    assert_eq!(emu.drain(), b"\x1bOA");
}

#[test]
fn test_printable_bytes_round_trip() {
    for byte in 0x20..0x7Fu8 {
        let mut emu = Emulator::new();
        emu.interpret(byte).unwrap();
        assert_eq!(emu.cell_at(0, 0).unwrap().ch, byte, "byte 0x{byte:02X}");
    }
}

#[test]
fn test_wrap_at_right_margin() {
    let mut emu = Emulator::new();
    emu.feed(&[b'A'; 85]).unwrap();
    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0).len(), 80);
    assert_eq!(snap.row_text(1).len(), 5);
}

#[test]
fn test_no_wrap_without_decawm() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b[?7l").unwrap();
    emu.feed(&[b'A'; 85]).unwrap();
    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0).len(), 80);
    assert_eq!(snap.row_text(1), "");
    assert_eq!(emu.cursor_x(), 79);
}

#[test]
fn test_scrolling_region_with_linefeeds() {
    let mut emu = Emulator::new();
    // pin rows 1 and 5, scroll between them
    emu.feed(b"\x1b[1;1Htop\x1b[5;1Hbottom").unwrap();
    emu.feed(b"\x1b[2;4r").unwrap();
    emu.feed(b"\x1b[2;1HA\r\nB\r\nC\r\n\x1b[4;1HD\r\nE").unwrap();

    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0), "top");
    assert_eq!(snap.row_text(4), "bottom");
    // region scrolled twice: A and B left, C D E remain
    assert_eq!(snap.row_text(1), "C");
    assert_eq!(snap.row_text(2), "D");
    assert_eq!(snap.row_text(3), "E");
}

#[test]
fn test_nel_and_ri_inside_region() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b[2;4r\x1b[2;1HX\x1bM").unwrap();
    let snap = emu.snapshot();
    // RI at the top margin scrolls the region down
    assert_eq!(snap.row_text(2), "X");
    assert_eq!(emu.cursor_y(), 1);

    emu.feed(b"\x1b[4;1H\x1bE").unwrap();
    assert_eq!((emu.cursor_x(), emu.cursor_y()), (0, 3));
}

#[test]
fn test_tab_stops_default_and_custom() {
    let mut emu = Emulator::new();
    emu.feed(b"\tA").unwrap();
    assert_eq!(emu.cell_at(8, 0).unwrap().ch, b'A');

    // clear all, set one at column 20
    emu.feed(b"\x1b[3g\x1b[1;21H\x1bH\r\tB").unwrap();
    assert_eq!(emu.cell_at(20, 0).unwrap().ch, b'B');

    // past the last stop, HT lands on the right margin
    emu.feed(b"\t").unwrap();
    assert_eq!(emu.cursor_x(), 79);
}

#[test]
fn test_backspace_boundary() {
    let mut emu = Emulator::new();
    emu.feed(b"\x08").unwrap();
    assert_eq!(emu.cursor_x(), 0);
    emu.feed(b"AB\x08X").unwrap();
    assert_eq!(emu.snapshot().row_text(0), "AX");
}

#[test]
fn test_delete_and_insert_lines() {
    let mut emu = Emulator::new();
    emu.feed(b"one\r\ntwo\r\nthree").unwrap();
    emu.feed(b"\x1b[1;1H\x1b[M").unwrap();
    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0), "two");
    assert_eq!(snap.row_text(1), "three");

    emu.feed(b"\x1b[L").unwrap();
    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0), "");
    assert_eq!(snap.row_text(1), "two");
}

#[test]
fn test_delete_chars() {
    let mut emu = Emulator::new();
    emu.feed(b"ABCDE\x1b[1;2H\x1b[2P").unwrap();
    assert_eq!(emu.snapshot().row_text(0), "ADE");
}

#[test]
fn test_erase_line_variants() {
    let mut emu = Emulator::new();
    emu.feed(b"AAAAAAAAAA\x1b[1;5H\x1b[K").unwrap();
    assert_eq!(emu.snapshot().row_text(0), "AAAA");

    let mut emu = Emulator::new();
    emu.feed(b"AAAAAAAAAA\x1b[1;5H\x1b[1K").unwrap();
    assert_eq!(emu.snapshot().row_text(0), "     AAAAA");
}

#[test]
fn test_cancelled_sequence_prints_substitute() {
    let mut emu = Emulator::new();
    emu.feed(b"ok\x1b[5;5\x18ay").unwrap();
    // CAN dropped the half-built sequence, printed SUB, and resumed
    assert_eq!(emu.cell_at(2, 0).unwrap().ch, 0x1A);
    assert_eq!(emu.cell_at(3, 0).unwrap().ch, b'a');
    assert_eq!(emu.cell_at(4, 0).unwrap().ch, b'y');
}

#[test]
fn test_interleaved_host_and_keyboard() {
    let mut emu = Emulator::new();
    emu.feed(b"login: ").unwrap();
    emu.key_press(Key::R, Modifiers::NONE);
    emu.key_press(Key::Return, Modifiers::NONE);
    emu.feed(b"\x1b[5n").unwrap();
    // output preserves event order
    assert_eq!(emu.drain(), b"r\r\x1b[0n");
}

#[test]
fn test_errors_do_not_lose_following_bytes() {
    let mut emu = Emulator::new();
    let mut errors = 0;
    for &byte in b"A\x1bqB\x1b[99zC".iter() {
        if emu.interpret(byte).is_err() {
            errors += 1;
        }
    }
    assert_eq!(errors, 2);
    assert_eq!(emu.snapshot().row_text(0), "ABC");
}

#[test]
fn test_setup_round_trip_preserves_session() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b[5;10Hwork in progress").unwrap();
    let before = emu.snapshot().screen_text();

    emu.key_press(Key::SetUp, Modifiers::NONE);
    assert_eq!(emu.session(), Session::SetUpA);
    emu.key_press(Key::Digit5, Modifiers::NONE);
    assert_eq!(emu.session(), Session::SetUpB);
    emu.key_press(Key::SetUp, Modifiers::NONE);

    assert_eq!(emu.session(), Session::Online);
    assert_eq!(emu.snapshot().screen_text(), before);
}

#[test]
fn test_user_profile_round_trip() {
    let mut emu = Emulator::new();
    emu.key_press(Key::SetUp, Modifiers::NONE);
    emu.key_press(Key::Digit5, Modifiers::NONE);
    emu.key_press(Key::Digit7, Modifiers::NONE);
    emu.key_press(Key::S, Modifiers::SHIFT);
    emu.key_press(Key::R, Modifiers::SHIFT);
    assert_eq!(emu.setup, emu.user_setup);
    emu.key_press(Key::SetUp, Modifiers::NONE);
}

#[test]
fn test_double_height_banner() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b#3WIDE\x1b[2;1H\x1b#4WIDE").unwrap();
    use vt102_core::LineAttr;
    assert_eq!(emu.line_attr(0).unwrap(), LineAttr::DoubleHeightUpper);
    assert_eq!(emu.line_attr(1).unwrap(), LineAttr::DoubleHeightLower);
    let snap = emu.snapshot();
    assert_eq!(snap.row_text(0), "WIDE");
    assert_eq!(snap.row_text(1), "WIDE");
}

#[test]
fn test_uk_charset_designation() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b(A#").unwrap();
    use vt102_core::{font_index, Charset};
    let cell = emu.cell_at(0, 0).unwrap();
    assert_eq!(cell.ch, b'#');
    assert_eq!(cell.charset, Charset::UnitedKingdom);
    // the renderer resolves the pound sign through the font index
    assert_eq!(font_index(cell.charset, cell.ch), 113);
}

#[test]
fn test_single_shift_applies_once() {
    let mut emu = Emulator::new();
    emu.feed(b"\x1b)0\x0e\x1bNab").unwrap();
    use vt102_core::Charset;
    // SS2 borrowed G2 (US) for one character while G1 (special) is active
    assert_eq!(emu.cell_at(0, 0).unwrap().charset, Charset::UnitedStates);
    assert_eq!(emu.cell_at(1, 0).unwrap().charset, Charset::Special);
}
