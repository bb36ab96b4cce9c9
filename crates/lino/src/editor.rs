//! Public editor handle.
//!
//! Owns everything an editing call needs (terminal backend, history ring,
//! completion callbacks, configuration), so there is no process-global state
//! and tests construct isolated instances. Completion callbacks receive only
//! string views and the candidate sink; the borrow rules make re-entering the
//! editing API from a callback unrepresentable.

use std::io::{self, BufRead, Write};
use std::path::Path;

use line_complete::{Completer, DisplayFilter};
use line_events::{Key, code};
use line_history::{History, HistoryError};
use line_input::Decoder;
use line_term::{RawMode, Term, TermError, VtTerm};
use tracing::debug;

use crate::config::{CompletionMode, EditorConfig};
use crate::error::ReadError;
use crate::session::Session;

pub struct Editor<T: Term = VtTerm> {
    term: T,
    history: History,
    completer: Option<Box<dyn Completer>>,
    display_filter: Option<DisplayFilter>,
    config: EditorConfig,
    multiline: bool,
}

impl Editor<VtTerm> {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::from_parts(VtTerm::new(), config)
    }
}

impl Default for Editor<VtTerm> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Term> Editor<T> {
    /// Build over an explicit backend. Tests use this with a scripted
    /// terminal; production code wants [`Editor::new`].
    pub fn from_parts(term: T, config: EditorConfig) -> Self {
        let history = History::new(config.history_max_len);
        Self {
            term,
            history,
            completer: None,
            display_filter: None,
            config,
            multiline: false,
        }
    }

    /// One full interactive edit. Returns the submitted line; `Err(Eof)` and
    /// `Err(Interrupted)` distinguish Ctrl-D on an empty line from Ctrl-C.
    ///
    /// When stdin is not a terminal or `TERM` is unsupported, falls back to a
    /// plain buffered read with no editing.
    pub fn readline(&mut self, prompt: &str) -> Result<String, ReadError> {
        let Self {
            term,
            history,
            completer,
            display_filter,
            config,
            ..
        } = self;

        enum Attempt {
            Ran(Result<String, ReadError>),
            Fallback,
        }

        let attempt = match RawMode::enter(&mut *term) {
            Ok(mut raw) => {
                let mut session = Session::new(
                    &mut *raw,
                    history,
                    completer.as_deref(),
                    display_filter.as_ref(),
                    config,
                    prompt,
                );
                Attempt::Ran(session.run())
            }
            Err(err @ (TermError::NotATty | TermError::UnsupportedTerm(_))) => {
                debug!(target: "session", %err, "line-buffered fallback");
                Attempt::Fallback
            }
            Err(err) => return Err(err.into()),
        };

        match attempt {
            // Raw mode is restored here; echo the newline the terminal swallowed.
            Attempt::Ran(result) => {
                term.write_bytes(b"\n")?;
                term.flush()?;
                result
            }
            Attempt::Fallback => Self::read_line_plain(term, prompt),
        }
    }

    /// The non-raw path: prompt, then one buffered line with the trailing
    /// newline (either flavor) stripped.
    fn read_line_plain(term: &mut T, prompt: &str) -> Result<String, ReadError> {
        term.write_bytes(prompt.as_bytes())?;
        term.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(ReadError::Eof);
        }
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Ok(line)
    }

    // ---- history -----------------------------------------------------------

    pub fn history_add(&mut self, line: &str) -> bool {
        self.history.add(line)
    }

    /// All history entries, oldest first.
    pub fn history(&self) -> &[String] {
        self.history.entries()
    }

    pub fn history_clear(&mut self) {
        self.history.clear();
    }

    pub fn history_max_len(&self) -> usize {
        self.history.max_len()
    }

    pub fn history_set_max_len(&mut self, max_len: usize) -> bool {
        self.history.set_max_len(max_len)
    }

    pub fn history_save(&self, path: &Path) -> Result<(), HistoryError> {
        self.history.save(path)
    }

    pub fn history_load(&mut self, path: &Path) -> Result<(), HistoryError> {
        self.history.load(path)
    }

    // ---- completion --------------------------------------------------------

    /// Register the completion callback, returning the previous one.
    pub fn set_completer(
        &mut self,
        completer: impl Completer + 'static,
    ) -> Option<Box<dyn Completer>> {
        self.completer.replace(Box::new(completer))
    }

    pub fn clear_completer(&mut self) -> Option<Box<dyn Completer>> {
        self.completer.take()
    }

    /// Register the grid display filter, returning the previous one. The
    /// filter affects listing only, never the inserted text.
    pub fn set_display_filter(
        &mut self,
        filter: impl Fn(&str) -> Option<String> + 'static,
    ) -> Option<DisplayFilter> {
        self.display_filter.replace(Box::new(filter))
    }

    pub fn set_completion_mode(&mut self, mode: CompletionMode) {
        self.config.completion_mode = mode;
    }

    // ---- misc --------------------------------------------------------------

    /// The terminal backend. Hosts writing their own output between edits
    /// (and tests inspecting a scripted backend) go through here.
    pub fn backend(&self) -> &T {
        &self.term
    }

    pub fn backend_mut(&mut self) -> &mut T {
        &mut self.term
    }

    pub fn clear_screen(&mut self) -> Result<(), TermError> {
        self.term.clear_screen().map_err(TermError::from)?;
        self.term.flush().map_err(TermError::from)
    }

    /// Reserved: multi-line editing is not implemented; the flag is stored
    /// and otherwise ignored.
    pub fn set_multiline(&mut self, on: bool) {
        self.multiline = on;
    }

    /// Diagnostic loop: print each decoded key until Ctrl-C or Ctrl-D.
    pub fn print_key_codes(&mut self) -> Result<(), ReadError> {
        let decoder = Decoder {
            esc_timeout: self.config.esc_timeout,
            drain_idle: self.config.drain_idle,
            drain_max: self.config.drain_max,
        };
        let mut raw = RawMode::enter(&mut self.term)?;
        raw.write_bytes(b"press keys to see their codes, Ctrl-C quits\r\n")?;
        raw.flush()?;
        loop {
            let key = decoder.read_key(&mut *raw)?;
            let mut rendered = Vec::new();
            writeln!(rendered, "{key}\r")?;
            raw.write_bytes(&rendered)?;
            raw.flush()?;
            if key == Key::Ctrl(code::CTRL_C) || key == Key::Ctrl(code::CTRL_D) {
                break;
            }
        }
        drop(raw);
        self.term.write_bytes(b"\n")?;
        self.term.flush()?;
        Ok(())
    }
}
