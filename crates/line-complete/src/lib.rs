//! Completion engine data structures: the candidate sink, the host-facing
//! callback traits, and the pure geometry behind both presentation modes.
//!
//! Everything here is deterministic and free of I/O; the interactive halves
//! (rotation and grid listing) live with the session, which owns the
//! terminal. The sink keeps candidates in case-insensitive ascending order by
//! insertion; the callback is trusted not to need deduplication.

use line_text::word_start;

/// Candidate sink handed to the host's completion callback.
///
/// Besides collecting candidates the sink carries the append character: the
/// scalar inserted after a unique completion (space by default). A callback
/// completing, say, a directory name may clear it so the cursor rests on the
/// trailing `/`.
#[derive(Debug, Clone)]
pub struct Completions {
    items: Vec<String>,
    append: Option<char>,
}

impl Completions {
    pub fn new(append: Option<char>) -> Self {
        Self {
            items: Vec::new(),
            append,
        }
    }

    /// Insert in case-insensitive ascending order, after any equal entries.
    /// Duplicates are kept.
    pub fn add(&mut self, candidate: impl Into<String>) {
        let candidate = candidate.into();
        let key = candidate.to_lowercase();
        let at = self
            .items
            .partition_point(|existing| existing.to_lowercase() <= key);
        self.items.insert(at, candidate);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The scalar appended after a unique completion, if any.
    pub fn append_char(&self) -> Option<char> {
        self.append
    }

    /// Override the append character; `None` suppresses it.
    pub fn set_append_char(&mut self, append: Option<char>) {
        self.append = append;
    }
}

/// Host-registered candidate source.
///
/// `line` is the full buffer (context left of the word is visible on
/// purpose, so a shell can complete a first word differently from an
/// argument); `start..end` is the word span in scalars. Implemented for
/// plain closures of the same shape.
pub trait Completer {
    fn complete(&self, line: &str, start: usize, end: usize, out: &mut Completions);
}

impl<F> Completer for F
where
    F: Fn(&str, usize, usize, &mut Completions),
{
    fn complete(&self, line: &str, start: usize, end: usize, out: &mut Completions) {
        self(line, start, end, out)
    }
}

/// Optional display transform for grid listing. Returning `None` leaves the
/// candidate as is; the inserted text is never affected.
pub type DisplayFilter = Box<dyn Fn(&str) -> Option<String>>;

/// The word under the cursor: scan left from `pos` to the nearest space.
/// Returns `(start, end)` in scalars where `end == pos`.
pub fn word_span(line: &str, pos: usize) -> (usize, usize) {
    (word_start(line, pos), pos)
}

/// Longest common prefix of all candidates, cut on scalar boundaries.
pub fn longest_common_prefix(items: &[String]) -> &str {
    let Some(first) = items.first() else {
        return "";
    };
    let mut end = first.len();
    for item in &items[1..] {
        end = first[..end]
            .char_indices()
            .zip(item.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((at, a), _)| at + a.len_utf8());
    }
    &first[..end]
}

/// Column-major grid geometry for the list-mode printout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub columns: usize,
    pub rows: usize,
}

/// Fit `count` candidates of up to `max_width` cells into a terminal
/// `cols` wide, with two-space gutters.
pub fn grid_layout(count: usize, max_width: usize, cols: usize) -> Grid {
    let columns = ((cols + 2) / (max_width + 2)).max(1);
    let rows = count.div_ceil(columns);
    Grid { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sink_orders_case_insensitively() {
        let mut c = Completions::new(Some(' '));
        for s in ["banana", "Apple", "cherry", "apricot"] {
            c.add(s);
        }
        assert_eq!(c.items(), ["Apple", "apricot", "banana", "cherry"]);
    }

    #[test]
    fn sink_keeps_duplicates() {
        let mut c = Completions::new(Some(' '));
        c.add("same");
        c.add("same");
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn sink_append_override() {
        let mut c = Completions::new(Some(' '));
        assert_eq!(c.append_char(), Some(' '));
        c.set_append_char(None);
        assert_eq!(c.append_char(), None);
    }

    #[test]
    fn word_span_scans_to_space() {
        assert_eq!(word_span("ls fo", 5), (3, 5));
        assert_eq!(word_span("ls ", 3), (3, 3));
        assert_eq!(word_span("word", 4), (0, 4));
        assert_eq!(word_span("", 0), (0, 0));
    }

    #[test]
    fn lcp_common_cases() {
        let items: Vec<String> = ["hello", "hello there"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(longest_common_prefix(&items), "hello");

        let items: Vec<String> = ["abc", "abd", "ab"].iter().map(|s| s.to_string()).collect();
        assert_eq!(longest_common_prefix(&items), "ab");

        let items: Vec<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        assert_eq!(longest_common_prefix(&items), "");

        assert_eq!(longest_common_prefix(&[]), "");
    }

    #[test]
    fn lcp_respects_scalar_boundaries() {
        let items: Vec<String> = ["日本語", "日本酒"].iter().map(|s| s.to_string()).collect();
        assert_eq!(longest_common_prefix(&items), "日本");
    }

    #[test]
    fn grid_geometry() {
        assert_eq!(
            grid_layout(6, 8, 80),
            Grid {
                columns: 8,
                rows: 1
            }
        );
        assert_eq!(
            grid_layout(6, 38, 80),
            Grid {
                columns: 2,
                rows: 3
            }
        );
        // A candidate wider than the screen still gets one column.
        assert_eq!(
            grid_layout(3, 200, 80),
            Grid {
                columns: 1,
                rows: 3
            }
        );
    }
}
