//! Terminal adapter: the only crate that touches a real console.
//!
//! The rest of the workspace drives a [`Term`] trait object covering raw-mode
//! toggling, timed single-byte reads, queued escape emission, and window
//! geometry. [`VtTerm`] is the production backend; the platform split (POSIX
//! `poll`/`read` vs. Windows console input records) is confined to the
//! private `unix`/`windows` modules so no other crate carries a `#[cfg]`.
//!
//! Raw-mode restore is RAII: [`RawMode`] pairs enable/disable on every exit
//! path including unwind, which is this codebase's rendition of the classic
//! `atexit` restore hook.

use std::io;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use thiserror::Error;

pub mod sgr;
mod vt;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use sgr::{prompt_cells, sgr_len};
pub use vt::VtTerm;

/// Terminal types raw mode refuses to drive.
const UNSUPPORTED_TERMS: &[&str] = &["dumb", "cons25"];

#[derive(Debug, Error)]
pub enum TermError {
    #[error("stdin is not a terminal")]
    NotATty,
    #[error("unsupported terminal type {0:?}")]
    UnsupportedTerm(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// True when a `TERM` value names a terminal the editor cannot drive.
pub fn term_is_unsupported(term: Option<&str>) -> bool {
    match term {
        Some(name) => UNSUPPORTED_TERMS
            .iter()
            .any(|t| name.eq_ignore_ascii_case(t)),
        None => false,
    }
}

/// Reads `TERM` from the environment and applies the blocklist.
pub fn env_term_is_unsupported() -> bool {
    term_is_unsupported(std::env::var("TERM").ok().as_deref())
}

/// Minimal read surface the key decoder needs. Blanket-implemented for every
/// [`Term`] so decoder tests can script input without a full terminal fake.
pub trait ByteSource {
    /// Next input byte; `Ok(None)` on timeout. A `timeout` of `None` blocks
    /// indefinitely.
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>>;
}

/// Operations the editor core issues against a terminal session.
///
/// Write-side operations queue; nothing is guaranteed on screen until
/// [`Term::flush`]. Ordering is preserved, and the session always flushes
/// before blocking on the next read.
pub trait Term {
    /// Enter single-byte no-echo no-signal mode. Fails when stdin is not a
    /// TTY or `TERM` is blocklisted. Idempotent.
    fn enable_raw(&mut self) -> Result<(), TermError>;

    /// Restore the mode recorded by `enable_raw`. Safe to call when raw mode
    /// never engaged. Idempotent.
    fn disable_raw(&mut self) -> Result<(), TermError>;

    /// See [`ByteSource::read_byte`].
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>>;

    /// Queue an opaque byte span.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Push everything queued to the terminal.
    fn flush(&mut self) -> io::Result<()>;

    /// Current width in columns. Never fails: size ioctl, then the cursor
    /// report probe, then 80. Always at least 1.
    fn columns(&mut self) -> usize;

    /// Home the cursor and erase the display.
    fn clear_screen(&mut self) -> io::Result<()>;

    /// Carriage return: cursor to column 0 of the current row.
    fn cursor_to_start(&mut self) -> io::Result<()>;

    /// Erase from the cursor to the end of the row.
    fn erase_to_eol(&mut self) -> io::Result<()>;

    /// Cursor to absolute column `col` of the current row.
    fn move_to_column(&mut self, col: usize) -> io::Result<()>;

    /// Draw a control scalar as an inverse-video caret glyph (`^A`, `^?`).
    fn render_control(&mut self, c: char) -> io::Result<()>;

    /// Audible bell.
    fn beep(&mut self) -> io::Result<()>;
}

impl<T: Term + ?Sized> ByteSource for T {
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        Term::read_byte(self, timeout)
    }
}

/// RAII raw-mode session. Restores the prior mode on drop, including during
/// unwind, and forwards the full [`Term`] surface while held.
pub struct RawMode<'a, T: Term + ?Sized> {
    term: &'a mut T,
}

impl<'a, T: Term + ?Sized> RawMode<'a, T> {
    pub fn enter(term: &'a mut T) -> Result<Self, TermError> {
        term.enable_raw()?;
        Ok(Self { term })
    }
}

impl<T: Term + ?Sized> Deref for RawMode<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.term
    }
}

impl<T: Term + ?Sized> DerefMut for RawMode<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.term
    }
}

impl<T: Term + ?Sized> Drop for RawMode<'_, T> {
    fn drop(&mut self) {
        if let Err(err) = self.term.disable_raw() {
            tracing::warn!(target: "term.raw", %err, "raw mode restore failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocklist_matches_case_insensitively() {
        assert!(term_is_unsupported(Some("dumb")));
        assert!(term_is_unsupported(Some("DUMB")));
        assert!(term_is_unsupported(Some("cons25")));
        assert!(!term_is_unsupported(Some("xterm-256color")));
        assert!(!term_is_unsupported(None));
    }

    #[test]
    fn error_messages_name_the_cause() {
        assert_eq!(format!("{}", TermError::NotATty), "stdin is not a terminal");
        let err = TermError::UnsupportedTerm("dumb".into());
        assert!(format!("{err}").contains("dumb"));
    }
}
