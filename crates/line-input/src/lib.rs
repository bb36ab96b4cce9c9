//! Key decoder: terminal byte stream in, [`Key`] events out.
//!
//! Plain bytes classify directly. An ESC opens a short sub-decode driven by
//! per-byte timeouts, so a lone ESC keystroke and the first byte of an arrow
//! sequence are distinguished by arrival time, not lookahead. Bytes at or
//! above 0x80 accumulate a full 2–4 byte UTF-8 scalar.
//!
//! The sub-decode can never hang: every read is bounded, and draining an
//! unrecognized `ESC[` sequence gives up after [`Decoder::drain_max`] bytes
//! or one idle period, yielding `Special::None` which dispatch swallows.

use std::io;
use std::time::Duration;

use line_events::{Key, Special, code};
use line_term::ByteSource;
use line_text::utf8;
use tracing::trace;

/// Escape-sequence decoder with its timing policy.
#[derive(Debug, Clone)]
pub struct Decoder {
    /// Wait for the byte after ESC (and between sequence bytes).
    pub esc_timeout: Duration,
    /// Idle period that abandons a malformed sequence drain.
    pub drain_idle: Duration,
    /// Byte bound that abandons a malformed sequence drain.
    pub drain_max: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            esc_timeout: Duration::from_millis(50),
            drain_idle: Duration::from_millis(200),
            drain_max: 16,
        }
    }
}

impl Decoder {
    /// Block until one keystroke decodes.
    pub fn read_key<S: ByteSource + ?Sized>(&self, src: &mut S) -> io::Result<Key> {
        let byte = loop {
            if let Some(b) = src.read_byte(None)? {
                break b;
            }
        };
        self.decode_byte(src, byte)
    }

    /// Decode a keystroke whose first byte is already in hand.
    pub fn decode_byte<S: ByteSource + ?Sized>(&self, src: &mut S, byte: u8) -> io::Result<Key> {
        if byte == code::ESC {
            return self.decode_escape(src);
        }
        if byte < 0x80 {
            return Ok(Key::from_byte(byte));
        }
        self.decode_utf8(src, byte)
    }

    fn decode_escape<S: ByteSource + ?Sized>(&self, src: &mut S) -> io::Result<Key> {
        let b1 = match src.read_byte(Some(self.esc_timeout))? {
            // Nothing followed: the user pressed ESC itself.
            None => return Ok(Key::Ctrl(code::ESC)),
            Some(b) => b,
        };
        match b1 {
            b'.' => Ok(Key::Special(Special::MetaDot)),
            b'[' | b'O' => self.decode_bracket(src),
            // Meta prefix pass-through: treat the byte as freshly read.
            other => self.decode_byte(src, other),
        }
    }

    fn decode_bracket<S: ByteSource + ?Sized>(&self, src: &mut S) -> io::Result<Key> {
        let b2 = match src.read_byte(Some(self.esc_timeout))? {
            None => return Ok(Key::Special(Special::None)),
            Some(b) => b,
        };
        let special = match b2 {
            b'A' => Special::Up,
            b'B' => Special::Down,
            b'C' => Special::Right,
            b'D' => Special::Left,
            b'F' => Special::End,
            b'H' => Special::Home,
            b'0'..=b'9' => return self.decode_extended(src, b2),
            other => {
                trace!(target: "input.decode", byte = other, "unmapped CSI final");
                Special::None
            }
        };
        Ok(Key::Special(special))
    }

    /// `ESC [ <digit>` sequences: a tilde terminator selects the navigation
    /// block; anything else is drained within bounds and dropped.
    fn decode_extended<S: ByteSource + ?Sized>(&self, src: &mut S, digit: u8) -> io::Result<Key> {
        let b3 = match src.read_byte(Some(self.esc_timeout))? {
            None => return Ok(Key::Special(Special::None)),
            Some(b) => b,
        };
        if b3 == b'~' {
            let special = match digit {
                b'2' => Special::Insert,
                b'3' => Special::Delete,
                b'5' => Special::PageUp,
                b'6' => Special::PageDown,
                b'7' => Special::Home,
                b'8' => Special::End,
                _ => Special::None,
            };
            return Ok(Key::Special(special));
        }

        // Long sequence without a recognized shape: consume up to and
        // including '~', bounded by drain_max bytes and drain_idle.
        let mut seen = 2usize; // digit + b3
        let mut byte = b3;
        while byte != b'~' && seen < self.drain_max {
            byte = match src.read_byte(Some(self.drain_idle))? {
                None => break,
                Some(b) => b,
            };
            seen += 1;
        }
        trace!(target: "input.decode", drained = seen, "abandoned escape sequence");
        Ok(Key::Special(Special::None))
    }

    fn decode_utf8<S: ByteSource + ?Sized>(&self, src: &mut S, lead: u8) -> io::Result<Key> {
        let want = match utf8::seq_len(lead) {
            Some(n) => n,
            None => {
                trace!(target: "input.decode", byte = lead, "stray continuation byte");
                return Ok(Key::Special(Special::None));
            }
        };
        let mut buf = [0u8; utf8::MAX_UTF8_LEN];
        buf[0] = lead;
        for slot in buf.iter_mut().take(want).skip(1) {
            match src.read_byte(Some(self.esc_timeout))? {
                Some(b) => *slot = b,
                None => {
                    trace!(target: "input.decode", "truncated utf-8 sequence");
                    return Ok(Key::Special(Special::None));
                }
            }
        }
        match utf8::decode(&buf[..want]) {
            Some((c, _)) => Ok(Key::Char(c)),
            None => {
                trace!(target: "input.decode", "malformed utf-8 sequence");
                Ok(Key::Special(Special::None))
            }
        }
    }
}
