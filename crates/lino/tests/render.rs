//! Renderer output against a capturing terminal.

mod common;

use common::{FakeTerm, Op};
use lino::buffer::LineState;
use lino::render::refresh;
use pretty_assertions::assert_eq;

fn state_with(line: &str, pos: usize) -> LineState {
    let mut state = LineState::new(4096);
    state.set_current(line);
    state.set_pos(pos);
    state
}

#[test]
fn plain_line_full_repaint() {
    let mut term = FakeTerm::new(80);
    let mut state = state_with("hello", 5);
    refresh(&mut term, "> ", &mut state).unwrap();
    assert_eq!(
        term.ops,
        vec![
            Op::CursorToStart,
            Op::Write(b"> ".to_vec()),
            Op::Write(b"hello".to_vec()),
            Op::EraseToEol,
            Op::MoveToColumn(7),
        ]
    );
}

#[test]
fn cursor_mid_line() {
    let mut term = FakeTerm::new(80);
    let mut state = state_with("hello", 2);
    refresh(&mut term, "> ", &mut state).unwrap();
    assert_eq!(term.ops.last(), Some(&Op::MoveToColumn(4)));
}

#[test]
fn colored_prompt_width_discounts_sgr() {
    let mut term = FakeTerm::new(80);
    let mut state = state_with("ok", 2);
    let prompt = "\x1b[1;32m> \x1b[0m";
    refresh(&mut term, prompt, &mut state).unwrap();
    // Prompt bytes pass through untouched; width math sees two cells.
    assert_eq!(term.ops[1], Op::Write(prompt.as_bytes().to_vec()));
    assert_eq!(term.ops.last(), Some(&Op::MoveToColumn(4)));
}

#[test]
fn control_chars_render_as_glyphs_between_runs() {
    let mut term = FakeTerm::new(80);
    let mut state = state_with("a\x02b", 3);
    refresh(&mut term, "> ", &mut state).unwrap();
    assert_eq!(
        term.ops,
        vec![
            Op::CursorToStart,
            Op::Write(b"> ".to_vec()),
            Op::Write(b"a".to_vec()),
            Op::Control('\x02'),
            Op::Write(b"b".to_vec()),
            Op::EraseToEol,
            // 'a' is one cell, the caret glyph two, 'b' one.
            Op::MoveToColumn(6),
        ]
    );
}

#[test]
fn long_line_scrolls_window_left() {
    let mut term = FakeTerm::new(10);
    let mut state = state_with("abcdefghij", 10);
    refresh(&mut term, "> ", &mut state).unwrap();
    // Window starts at 'd' so the cursor lands inside the row.
    assert_eq!(term.ops[2], Op::Write(b"defghij".to_vec()));
    assert_eq!(term.ops.last(), Some(&Op::MoveToColumn(9)));
    // The underlying buffer is untouched.
    assert_eq!(state.buf(), "abcdefghij");
}

#[test]
fn cursor_at_line_start_keeps_window_home() {
    let mut term = FakeTerm::new(10);
    let mut state = state_with("abcdefghij", 0);
    refresh(&mut term, "> ", &mut state).unwrap();
    // No shift; emission cut at the right edge instead.
    assert_eq!(term.ops[2], Op::Write(b"abcdefgh".to_vec()));
    assert_eq!(term.ops.last(), Some(&Op::MoveToColumn(2)));
}

#[test]
fn wide_glyphs_cost_two_cells() {
    let mut term = FakeTerm::new(8);
    let mut state = state_with("界界界", 3);
    refresh(&mut term, "> ", &mut state).unwrap();
    // 2 prompt cells + three wide glyphs (6 cells) would hit the edge, so
    // the first glyph scrolls out.
    assert_eq!(term.ops[2], Op::Write("界界".as_bytes().to_vec()));
    assert_eq!(term.ops.last(), Some(&Op::MoveToColumn(6)));
}

#[test]
fn refresh_records_terminal_width() {
    let mut term = FakeTerm::new(42);
    let mut state = state_with("", 0);
    refresh(&mut term, "> ", &mut state).unwrap();
    assert_eq!(state.cols(), 42);
    assert_eq!(state.prompt_cells(), 2);
}
