//! Production terminal backend over stdin/stdout.
//!
//! Write-side operations queue crossterm commands into stdout and flush on
//! demand; the read side is a timed single-byte feed supplied by the
//! platform module. Raw-mode state is tracked so enable/disable are
//! idempotent and the drop impl can restore a session that panicked.

use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::cursor::{MoveRight, MoveTo, MoveToColumn};
use crossterm::queue;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::terminal::{
    Clear, ClearType, disable_raw_mode, enable_raw_mode, is_raw_mode_enabled, size,
};
use crossterm::tty::IsTty;
use tracing::{debug, trace};

use crate::{Term, TermError, env_term_is_unsupported};

#[cfg(unix)]
use crate::unix as platform;
#[cfg(windows)]
use crate::windows as platform;

/// Fallback width when both the size ioctl and the cursor probe fail.
const FALLBACK_COLUMNS: usize = 80;

/// Per-byte timeout while parsing a cursor position report.
const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

pub struct VtTerm {
    out: Stdout,
    raw: bool,
    reader: platform::ByteReader,
}

impl VtTerm {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            raw: false,
            reader: platform::ByteReader::new(),
        }
    }

    /// Ask the terminal where the cursor is and return the reported column.
    ///
    /// Sends `ESC[6n` and parses `ESC[<row>;<col>R`. Used only when the size
    /// ioctl fails; every read is bounded by [`PROBE_TIMEOUT`].
    fn query_column(&mut self) -> Option<usize> {
        self.out.write_all(b"\x1b[6n").ok()?;
        self.out.flush().ok()?;

        let mut buf = [0u8; 32];
        let mut len = 0;
        while len < buf.len() {
            match self.reader.read_byte(Some(PROBE_TIMEOUT)).ok()? {
                Some(b) => {
                    buf[len] = b;
                    len += 1;
                    if b == b'R' {
                        break;
                    }
                }
                None => return None,
            }
        }
        let report = std::str::from_utf8(&buf[..len]).ok()?;
        let inner = report.strip_prefix("\x1b[")?.strip_suffix('R')?;
        let (_rows, cols) = inner.split_once(';')?;
        cols.parse().ok()
    }

    /// The `ESC[6n` fallback: measure where the cursor lands after a jump
    /// far right, then undo the jump.
    fn probe_columns(&mut self) -> Option<usize> {
        let start = self.query_column()?;
        self.out.write_all(b"\x1b[999C").ok()?;
        self.out.flush().ok()?;
        let cols = self.query_column()?;
        if cols > start {
            let _ = queue!(self.out, MoveToColumn(start.saturating_sub(1) as u16));
            let _ = self.out.flush();
        }
        Some(cols)
    }
}

impl Default for VtTerm {
    fn default() -> Self {
        Self::new()
    }
}

impl Term for VtTerm {
    fn enable_raw(&mut self) -> Result<(), TermError> {
        if self.raw {
            return Ok(());
        }
        if !io::stdin().is_tty() {
            return Err(TermError::NotATty);
        }
        if env_term_is_unsupported() {
            let name = std::env::var("TERM").unwrap_or_default();
            return Err(TermError::UnsupportedTerm(name));
        }
        enable_raw_mode()?;
        self.reader.on_raw_enter();
        self.raw = true;
        debug!(target: "term.raw", "raw mode enabled");
        Ok(())
    }

    fn disable_raw(&mut self) -> Result<(), TermError> {
        if !self.raw {
            return Ok(());
        }
        self.reader.on_raw_leave();
        disable_raw_mode()?;
        self.raw = false;
        debug!(target: "term.raw", "raw mode restored");
        Ok(())
    }

    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        self.reader.read_byte(timeout)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn columns(&mut self) -> usize {
        match size() {
            Ok((w, _)) if w > 0 => w as usize,
            _ => {
                let cols = self.probe_columns().unwrap_or(FALLBACK_COLUMNS);
                trace!(target: "term.raw", cols, "width probe fallback");
                cols.max(1)
            }
        }
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))
    }

    fn cursor_to_start(&mut self) -> io::Result<()> {
        self.out.write_all(b"\r")
    }

    fn erase_to_eol(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::UntilNewLine))
    }

    fn move_to_column(&mut self, col: usize) -> io::Result<()> {
        self.out.write_all(b"\r")?;
        if col > 0 {
            queue!(self.out, MoveRight(col.min(u16::MAX as usize) as u16))?;
        }
        Ok(())
    }

    fn render_control(&mut self, c: char) -> io::Result<()> {
        let glyph = if c == '\u{7f}' {
            '?'
        } else {
            char::from(b'@' + (c as u8 & 0x1f))
        };
        queue!(
            self.out,
            SetAttribute(Attribute::Reverse),
            Print('^'),
            Print(glyph),
            SetAttribute(Attribute::Reset),
        )
    }

    fn beep(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

impl Drop for VtTerm {
    fn drop(&mut self) {
        // Last-resort restore when the owner unwound without disabling.
        if self.raw || is_raw_mode_enabled().unwrap_or(false) {
            let _ = disable_raw_mode();
        }
    }
}
