//! ANSI SGR accounting for colored prompts.
//!
//! A prompt may carry `ESC [ <params> m` color runs. Those bytes occupy no
//! columns, so the renderer subtracts them before doing width math. Only the
//! SGR form is recognized; any other escape content counts as visible.
//!
//! [`sgr_seq_len`] is the single matcher; both public views ([`sgr_len`] for
//! the raw byte count, [`prompt_cells`] for the visible width) walk the
//! prompt with it so the two can never disagree about what counts as SGR.

use line_text::str_cells;

/// Total byte length of every `ESC [ [0-9;]* m` run in `s`.
pub fn sgr_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut total = 0;
    let mut at = 0;
    while at < bytes.len() {
        match sgr_seq_len(&bytes[at..]) {
            Some(n) => {
                total += n;
                at += n;
            }
            None => at += 1,
        }
    }
    total
}

/// Display cells the prompt occupies once SGR runs are discounted.
pub fn prompt_cells(prompt: &str) -> usize {
    let mut cells = 0;
    let mut rest = prompt;
    loop {
        match rest.find('\x1b') {
            None => return cells + str_cells(rest),
            Some(at) => {
                cells += str_cells(&rest[..at]);
                let tail = &rest[at..];
                match sgr_seq_len(tail.as_bytes()) {
                    Some(n) => rest = &tail[n..],
                    None => {
                        // Not an SGR run: the ESC passes through as one cell.
                        cells += 1;
                        rest = &tail[1..];
                    }
                }
            }
        }
    }
}

/// Length of the SGR sequence at the start of `bytes`, if one is present.
fn sgr_seq_len(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < 3 || bytes[0] != 0x1b || bytes[1] != b'[' {
        return None;
    }
    for (i, &b) in bytes.iter().enumerate().skip(2) {
        if b == b'm' {
            return Some(i + 1);
        }
        if !(b.is_ascii_digit() || b == b';') {
            return None;
        }
    }
    None
}
