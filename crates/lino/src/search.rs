//! Reverse incremental search (Ctrl-R) sub-loop.
//!
//! Runs its own read/dispatch cycle under a synthetic prompt while the main
//! loop waits. Printable keys grow the pattern, Ctrl-R/Ctrl-N step through
//! older/newer matches, and any unrecognized terminator key is handed back
//! to the caller for normal dispatch against whatever the search left in the
//! buffer.

use line_events::{Key, Special, code};
use line_history::{History, SearchDir};
use line_input::Decoder;
use line_term::Term;

use crate::buffer::LineState;
use crate::error::ReadError;
use crate::render::refresh;

pub(crate) enum SearchOutcome {
    /// The search consumed its terminator (accept or abort).
    Handled,
    /// Terminated by a key the main dispatcher should process.
    Reinject(Key),
}

pub(crate) fn reverse_search<T: Term + ?Sized>(
    term: &mut T,
    state: &mut LineState,
    history: &mut History,
    decoder: &Decoder,
) -> Result<SearchOutcome, ReadError> {
    let len = history.len();
    if len == 0 {
        return Ok(SearchOutcome::Handled);
    }
    // Keep the scratch slot mirroring the line under edit so it rides along.
    history.set(len - 1, state.buf().to_string());

    let mut pattern = String::new();
    // First real entry below the scratch slot.
    let reset_pos = len.saturating_sub(2);
    let mut searchpos = reset_pos;

    loop {
        let prompt = format!("(reverse-i-search)'{pattern}': ");
        refresh(term, &prompt, state)?;

        let (dir, skip_same) = match decoder.read_key(term)? {
            Key::Char(c) => {
                pattern.push(c);
                searchpos = reset_pos;
                (SearchDir::Older, false)
            }
            Key::Ctrl(code::CTRL_H) | Key::Ctrl(code::BACKSPACE) => {
                pattern.pop();
                searchpos = reset_pos;
                (SearchDir::Older, false)
            }
            Key::Ctrl(code::CTRL_R) | Key::Special(Special::Up) => {
                searchpos = searchpos.saturating_sub(1);
                (SearchDir::Older, true)
            }
            Key::Ctrl(code::CTRL_N) | Key::Special(Special::Down) => {
                if searchpos + 1 < len {
                    searchpos += 1;
                }
                (SearchDir::Newer, true)
            }
            Key::Ctrl(code::CTRL_G) | Key::Ctrl(code::CTRL_C) => {
                state.set_current("");
                return Ok(SearchOutcome::Handled);
            }
            // Accept: leave the buffer as the search set it.
            Key::Ctrl(code::CTRL_J) => return Ok(SearchOutcome::Handled),
            Key::Special(Special::None) => continue,
            other => return Ok(SearchOutcome::Reinject(other)),
        };

        let current = state.buf().to_string();
        let skip = skip_same.then_some(current.as_str());
        if let Some(hit) = history.search(&pattern, searchpos, dir, skip) {
            searchpos = hit.index;
            let entry = history.get(hit.index).unwrap_or_default().to_string();
            state.set_current(&entry);
            state.set_pos(hit.offset);
        }
        // On a miss the buffer stays as is; the loop repaints the pattern.
    }
}
