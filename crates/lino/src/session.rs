//! The editing session: one raw-mode read/dispatch/repaint loop.
//!
//! A session owns a fresh [`LineState`] and borrows everything long-lived
//! (terminal, history, callbacks, config) from the editor. On entry it pushes
//! the scratch history slot that mirrors the line under edit; the slot is
//! popped on every way out, so history never leaks an in-progress line.

use line_complete::{Completer, DisplayFilter};
use line_events::{Key, Special, code};
use line_input::Decoder;
use line_term::Term;
use line_text::{kill_word_start, last_token, utf8};
use tracing::trace;

use crate::buffer::{LineState, Outcome};
use crate::complete_ui::{CompleteOutcome, complete};
use crate::config::{CompletionMode, EditorConfig};
use crate::error::ReadError;
use crate::render::refresh;
use crate::search::{SearchOutcome, reverse_search};
use line_history::History;

/// Meta-. cycling: how many lines back the current token came from, and how
/// many scalars it occupies left of the cursor.
struct MetaDot {
    back: usize,
    inserted: usize,
}

pub(crate) struct Session<'a, T: Term + ?Sized> {
    term: &'a mut T,
    history: &'a mut History,
    completer: Option<&'a dyn Completer>,
    filter: Option<&'a DisplayFilter>,
    config: &'a EditorConfig,
    decoder: Decoder,
    prompt: &'a str,
    state: LineState,
    /// 0 is the scratch (newest) slot; grows toward older entries.
    hist_index: usize,
    meta_dot: Option<MetaDot>,
}

impl<'a, T: Term + ?Sized> Session<'a, T> {
    pub(crate) fn new(
        term: &'a mut T,
        history: &'a mut History,
        completer: Option<&'a dyn Completer>,
        filter: Option<&'a DisplayFilter>,
        config: &'a EditorConfig,
        prompt: &'a str,
    ) -> Self {
        let decoder = Decoder {
            esc_timeout: config.esc_timeout,
            drain_idle: config.drain_idle,
            drain_max: config.drain_max,
        };
        Self {
            term,
            history,
            completer,
            filter,
            config,
            decoder,
            prompt,
            state: LineState::new(config.max_line),
            hist_index: 0,
            meta_dot: None,
        }
    }

    pub(crate) fn run(&mut self) -> Result<String, ReadError> {
        self.history.push_entry(String::new());
        self.state.set_current("");
        let result = self.event_loop();
        self.history.pop_newest();
        result
    }

    fn event_loop(&mut self) -> Result<String, ReadError> {
        refresh(self.term, self.prompt, &mut self.state)?;
        let mut pending: Option<Key> = None;

        loop {
            let key = match pending.take() {
                Some(key) => key,
                None => self.decoder.read_key(self.term)?,
            };

            // TAB reaches the completion engine only with a callback
            // registered and, in rotation mode, only at the end of the line.
            if key == Key::Ctrl(code::TAB) {
                if let Some(completer) = self.completer {
                    let allowed = self.config.completion_mode == CompletionMode::List
                        || self.state.pos() == self.state.chars();
                    if allowed {
                        self.meta_dot = None;
                        match complete(
                            self.term,
                            &mut self.state,
                            completer,
                            self.filter,
                            self.config,
                            &self.decoder,
                            self.prompt,
                        )? {
                            CompleteOutcome::Done => continue,
                            CompleteOutcome::Reinject(key) => {
                                pending = Some(key);
                                continue;
                            }
                        }
                    }
                }
            }

            if key != Key::Special(Special::MetaDot) {
                self.meta_dot = None;
            }

            match key {
                Key::Ctrl(code::ENTER) => {
                    return Ok(self.state.buf().to_string());
                }
                Key::Ctrl(code::CTRL_C) => {
                    trace!(target: "session", "interrupted");
                    return Err(ReadError::Interrupted);
                }
                Key::Ctrl(code::CTRL_H) | Key::Ctrl(code::BACKSPACE) => {
                    match self.state.backspace() {
                        Outcome::FastPath => {
                            self.term.write_bytes(b"\x08 \x08")?;
                            self.term.flush()?;
                        }
                        Outcome::Repaint => self.refresh()?,
                        Outcome::Refused => {}
                    }
                }
                Key::Ctrl(code::CTRL_D) => {
                    if self.state.chars() == 0 {
                        return Err(ReadError::Eof);
                    }
                    if self.state.delete() == Outcome::Repaint {
                        self.refresh()?;
                    }
                }
                Key::Special(Special::Delete) => {
                    if self.state.delete() == Outcome::Repaint {
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_W) => {
                    let boundary = kill_word_start(self.state.buf(), self.state.pos());
                    let n = self.state.pos() - boundary;
                    if self.state.remove_chars(boundary, n) > 0 {
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_U) => {
                    if self.state.remove_chars(0, self.state.pos()) > 0 {
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_K) => {
                    let n = self.state.chars() - self.state.pos();
                    if self.state.remove_chars(self.state.pos(), n) > 0 {
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_Y) => {
                    if let Some(capture) = self.state.capture().map(str::to_string) {
                        if self.state.insert_str(&capture) > 0 {
                            self.refresh()?;
                        }
                    }
                }
                Key::Ctrl(code::CTRL_T) => {
                    if self.state.transpose() {
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_V) => {
                    if let Some(c) = self.read_literal()? {
                        self.insert(c)?;
                    } else {
                        self.term.beep()?;
                    }
                }
                Key::Ctrl(code::CTRL_B) | Key::Special(Special::Left) => {
                    if self.state.pos() > 0 {
                        self.state.set_pos(self.state.pos() - 1);
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_F) | Key::Special(Special::Right) => {
                    if self.state.pos() < self.state.chars() {
                        self.state.set_pos(self.state.pos() + 1);
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_A) | Key::Special(Special::Home) => {
                    if self.state.pos() != 0 {
                        self.state.set_pos(0);
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_E) | Key::Special(Special::End) => {
                    if self.state.pos() != self.state.chars() {
                        self.state.set_pos(self.state.chars());
                        self.refresh()?;
                    }
                }
                Key::Ctrl(code::CTRL_P) | Key::Special(Special::Up) => {
                    self.history_move(true)?;
                }
                Key::Ctrl(code::CTRL_N) | Key::Special(Special::Down) => {
                    self.history_move(false)?;
                }
                Key::Special(Special::PageUp) => self.history_jump(true)?,
                Key::Special(Special::PageDown) => self.history_jump(false)?,
                Key::Ctrl(code::CTRL_R) => {
                    match reverse_search(
                        self.term,
                        &mut self.state,
                        self.history,
                        &self.decoder,
                    )? {
                        SearchOutcome::Handled => self.refresh()?,
                        SearchOutcome::Reinject(key) => {
                            self.refresh()?;
                            pending = Some(key);
                        }
                    }
                }
                Key::Ctrl(code::CTRL_L) => {
                    self.term.clear_screen()?;
                    self.refresh()?;
                }
                Key::Special(Special::MetaDot) => self.yank_last_arg()?,
                // Reserved.
                Key::Special(Special::Insert) => {}
                Key::Special(Special::None) => {}
                // Literal tab when the completion engine declined it.
                Key::Ctrl(code::TAB) => self.insert('\t')?,
                Key::Char(c) => self.insert(c)?,
                // Unbound control keys (including a lone ESC) are ignored.
                Key::Ctrl(_) => {}
            }
        }
    }

    fn refresh(&mut self) -> Result<(), ReadError> {
        refresh(self.term, self.prompt, &mut self.state)?;
        Ok(())
    }

    fn insert(&mut self, c: char) -> Result<(), ReadError> {
        match self.state.insert_char(c) {
            Outcome::FastPath => {
                let mut buf = [0u8; utf8::MAX_UTF8_LEN];
                let n = utf8::encode(c, &mut buf);
                self.term.write_bytes(&buf[..n])?;
                self.term.flush()?;
            }
            Outcome::Repaint => self.refresh()?,
            Outcome::Refused => self.term.beep()?,
        }
        Ok(())
    }

    /// Ctrl-V: the next keystroke goes in uninterpreted. NUL is refused.
    fn read_literal(&mut self) -> Result<Option<char>, ReadError> {
        let byte = loop {
            if let Some(b) = self.term.read_byte(None)? {
                break b;
            }
        };
        if byte == 0 {
            return Ok(None);
        }
        if byte < 0x80 {
            return Ok(Some(byte as char));
        }
        let want = match utf8::seq_len(byte) {
            Some(n) => n,
            None => return Ok(None),
        };
        let mut buf = [0u8; utf8::MAX_UTF8_LEN];
        buf[0] = byte;
        for slot in buf.iter_mut().take(want).skip(1) {
            match self.term.read_byte(Some(self.config.esc_timeout))? {
                Some(b) => *slot = b,
                None => return Ok(None),
            }
        }
        Ok(utf8::decode(&buf[..want]).map(|(c, _)| c))
    }

    /// Up/Down: stash the in-progress line in the slot being left, then show
    /// the neighboring entry. At either boundary nothing changes.
    fn history_move(&mut self, older: bool) -> Result<(), ReadError> {
        let len = self.history.len();
        if len <= 1 {
            return Ok(());
        }
        self.history
            .set(len - 1 - self.hist_index, self.state.buf().to_string());
        if older {
            if self.hist_index + 1 >= len {
                return Ok(());
            }
            self.hist_index += 1;
        } else {
            if self.hist_index == 0 {
                return Ok(());
            }
            self.hist_index -= 1;
        }
        self.fetch_history_entry()
    }

    /// PageUp/PageDown: jump straight to the oldest entry or the scratch.
    fn history_jump(&mut self, oldest: bool) -> Result<(), ReadError> {
        let len = self.history.len();
        if len <= 1 {
            return Ok(());
        }
        self.history
            .set(len - 1 - self.hist_index, self.state.buf().to_string());
        self.hist_index = if oldest { len - 1 } else { 0 };
        self.fetch_history_entry()
    }

    fn fetch_history_entry(&mut self) -> Result<(), ReadError> {
        let len = self.history.len();
        let entry = self
            .history
            .get(len - 1 - self.hist_index)
            .unwrap_or_default()
            .to_string();
        self.state.set_current(&entry);
        self.refresh()
    }

    /// Meta-.: insert the last token of the previous history line; repeated
    /// presses swap in the token from one line older each time.
    fn yank_last_arg(&mut self) -> Result<(), ReadError> {
        let previous = self.meta_dot.take();
        let back = previous.as_ref().map_or(1, |m| m.back + 1);

        let len = self.history.len();
        // Scratch sits at len - 1; `back` lines above it.
        if back >= len {
            self.meta_dot = previous;
            self.term.beep()?;
            return Ok(());
        }

        if let Some(m) = &previous {
            let at = self.state.pos().saturating_sub(m.inserted);
            self.state.remove_range(at, m.inserted);
        }

        let entry = self.history.get(len - 1 - back).unwrap_or_default();
        let token = last_token(entry).unwrap_or_default().to_string();
        let inserted = self.state.insert_str(&token);
        self.meta_dot = Some(MetaDot { back, inserted });
        self.refresh()
    }
}
