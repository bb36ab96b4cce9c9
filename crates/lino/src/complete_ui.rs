//! The two interactive faces of completion.
//!
//! Rotation mode previews candidates in place: TAB cycles (with a virtual
//! "original" slot past the end), ESC restores, and any other key commits the
//! preview and bounces back to the main dispatcher. List mode inserts the
//! longest common prefix and, with several candidates, prints a column-major
//! grid below the line, optionally through the host's display filter.

use line_complete::{
    Completer, Completions, DisplayFilter, grid_layout, longest_common_prefix, word_span,
};
use line_events::{Key, code};
use line_input::Decoder;
use line_term::Term;
use line_text::str_cells;

use crate::buffer::LineState;
use crate::config::{CompletionMode, EditorConfig};
use crate::error::ReadError;
use crate::render::refresh;

pub(crate) enum CompleteOutcome {
    Done,
    /// Rotation ended on a key the main dispatcher should process.
    Reinject(Key),
}

pub(crate) fn complete<T: Term + ?Sized>(
    term: &mut T,
    state: &mut LineState,
    completer: &dyn Completer,
    filter: Option<&DisplayFilter>,
    config: &EditorConfig,
    decoder: &Decoder,
    prompt: &str,
) -> Result<CompleteOutcome, ReadError> {
    let (start, end) = word_span(state.buf(), state.pos());
    let mut sink = Completions::new(config.completion_append);
    completer.complete(state.buf(), start, end, &mut sink);

    if sink.is_empty() {
        term.beep()?;
        return Ok(CompleteOutcome::Done);
    }
    match config.completion_mode {
        CompletionMode::Rotate => rotate(term, state, &sink, decoder, prompt),
        CompletionMode::List => {
            list(term, state, &sink, filter, prompt, end - start)?;
            Ok(CompleteOutcome::Done)
        }
    }
}

fn rotate<T: Term + ?Sized>(
    term: &mut T,
    state: &mut LineState,
    sink: &Completions,
    decoder: &Decoder,
    prompt: &str,
) -> Result<CompleteOutcome, ReadError> {
    let items = sink.items();
    let original = (state.buf().to_string(), state.pos());
    let mut i = 0usize; // items.len() is the virtual "original" slot

    loop {
        if i < items.len() {
            state.set_current(&items[i]);
        } else {
            state.set_current(&original.0);
            state.set_pos(original.1);
        }
        refresh(term, prompt, state)?;

        match decoder.read_key(term)? {
            Key::Ctrl(code::TAB) => {
                i = (i + 1) % (items.len() + 1);
                if i == items.len() {
                    term.beep()?;
                }
            }
            Key::Ctrl(code::ESC) => {
                state.set_current(&original.0);
                state.set_pos(original.1);
                refresh(term, prompt, state)?;
                return Ok(CompleteOutcome::Done);
            }
            other => return Ok(CompleteOutcome::Reinject(other)),
        }
    }
}

fn list<T: Term + ?Sized>(
    term: &mut T,
    state: &mut LineState,
    sink: &Completions,
    filter: Option<&DisplayFilter>,
    prompt: &str,
    word_chars: usize,
) -> Result<(), ReadError> {
    let items = sink.items();
    let lcp = longest_common_prefix(items);
    let lcp_chars = lcp.chars().count();

    let mut inserted = 0;
    if lcp_chars > word_chars {
        let extension: String = lcp.chars().skip(word_chars).collect();
        inserted = state.insert_str(&extension);
    }

    if items.len() == 1 {
        if let Some(append) = sink.append_char() {
            if state.char_at(state.pos()) == Some(append) {
                state.set_pos(state.pos() + 1);
            } else {
                state.insert_char(append);
            }
        }
        refresh(term, prompt, state)?;
        return Ok(());
    }

    // Several candidates: no progress warrants the bell, and the grid prints
    // either way.
    if inserted == 0 {
        term.beep()?;
    }

    let displays: Vec<String> = items
        .iter()
        .map(|item| {
            filter
                .and_then(|f| f(item))
                .unwrap_or_else(|| item.clone())
        })
        .collect();
    let max_width = displays.iter().map(|d| str_cells(d)).max().unwrap_or(0);
    let grid = grid_layout(displays.len(), max_width, state.cols());

    term.write_bytes(b"\r\n")?;
    for row in 0..grid.rows {
        let mut line = String::new();
        for col in 0..grid.columns {
            let idx = col * grid.rows + row;
            let Some(name) = displays.get(idx) else {
                break;
            };
            line.push_str(name);
            let has_next = (col + 1) * grid.rows + row < displays.len();
            if col + 1 < grid.columns && has_next {
                for _ in 0..(max_width + 2 - str_cells(name)) {
                    line.push(' ');
                }
            }
        }
        term.write_bytes(line.as_bytes())?;
        term.write_bytes(b"\r\n")?;
    }
    refresh(term, prompt, state)?;
    Ok(())
}
