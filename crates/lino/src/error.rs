use std::io;

use line_history::HistoryError;
use line_term::TermError;
use thiserror::Error;

/// Why an editing call produced no line.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Ctrl-C in the main loop.
    #[error("interrupted")]
    Interrupted,
    /// Ctrl-D on an empty line, or end of stdin on the fallback path.
    #[error("end of input")]
    Eof,
    #[error(transparent)]
    Term(#[from] TermError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Io(#[from] io::Error),
}
