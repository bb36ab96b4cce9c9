//! Editor tunables. Plain values, no config file.

use std::time::Duration;

/// How the completion engine presents candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Cycle candidates in place on repeated TAB.
    #[default]
    Rotate,
    /// Insert the longest common prefix and print a grid of candidates.
    List,
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Upper bound on the line in bytes; insertions past it are refused.
    pub max_line: usize,
    /// History ring capacity (at least 1).
    pub history_max_len: usize,
    pub completion_mode: CompletionMode,
    /// Scalar appended after a unique completion; `None` appends nothing.
    pub completion_append: Option<char>,
    /// Wait for the byte following ESC before treating ESC as a keystroke.
    pub esc_timeout: Duration,
    /// Idle period that abandons draining a malformed escape sequence.
    pub drain_idle: Duration,
    /// Byte bound on the same drain.
    pub drain_max: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_line: 4096,
            history_max_len: line_history::DEFAULT_MAX_LEN,
            completion_mode: CompletionMode::default(),
            completion_append: Some(' '),
            esc_timeout: Duration::from_millis(50),
            drain_idle: Duration::from_millis(200),
            drain_max: 16,
        }
    }
}
