//! Line repaint.
//!
//! One entry point redraws prompt, visible line slice, and cursor from
//! scratch each time; nothing depends on what a previous repaint left on
//! screen. Column accounting is cell-based: control scalars render as
//! two-cell caret glyphs, wide scalars occupy two cells, and the prompt's
//! SGR color runs are discounted.
//!
//! Horizontal scrolling drops leading scalars of the *displayed* window
//! (never the buffer) until the cursor fits; emission then stops before the
//! right edge, so long lines pan rather than wrap.

use std::io;

use line_term::{Term, prompt_cells};
use line_text::{cell_width, is_ctrl};

use crate::buffer::LineState;

pub fn refresh<T: Term + ?Sized>(
    term: &mut T,
    prompt: &str,
    state: &mut LineState,
) -> io::Result<()> {
    let cols = term.columns().max(1);
    state.set_cols(cols);
    let pcells = prompt_cells(prompt);
    state.set_prompt_cells(pcells);

    let chars: Vec<char> = state.buf().chars().collect();
    let pos = state.pos();

    // Cursor on a multi-cell glyph needs the glyph's full width visible.
    let cursor_extra = state
        .char_at(pos)
        .map_or(0, |c| cell_width(c).saturating_sub(1));

    // Shift the window right until the cursor column fits on the row.
    let mut start = 0usize;
    loop {
        let to_cursor: usize = pcells
            + chars[start..pos].iter().map(|&c| cell_width(c)).sum::<usize>()
            + cursor_extra;
        if to_cursor >= cols && start < pos {
            start += 1;
        } else {
            break;
        }
    }

    term.cursor_to_start()?;
    term.write_bytes(prompt.as_bytes())?;

    let mut col = pcells;
    let mut run = String::new();
    for &c in &chars[start..] {
        let w = cell_width(c);
        if col + w > cols {
            break;
        }
        if is_ctrl(c) {
            if !run.is_empty() {
                term.write_bytes(run.as_bytes())?;
                run.clear();
            }
            term.render_control(c)?;
        } else {
            run.push(c);
        }
        col += w;
    }
    if !run.is_empty() {
        term.write_bytes(run.as_bytes())?;
    }

    term.erase_to_eol()?;

    let cursor_col: usize = pcells
        + chars[start..pos].iter().map(|&c| cell_width(c)).sum::<usize>();
    term.move_to_column(cursor_col)?;
    term.flush()
}
