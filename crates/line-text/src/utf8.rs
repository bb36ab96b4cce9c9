//! UTF-8 codec primitives.
//!
//! Four operations cover every byte/scalar translation the editor performs:
//! decode one scalar from a byte span, encode one scalar, count scalars in a
//! span, and map a scalar index to a byte offset. They are thin wrappers over
//! `str`/`char`, kept as named functions so call sites read in the same
//! vocabulary the buffer invariants are stated in.

/// Maximum encoded length of one scalar.
pub const MAX_UTF8_LEN: usize = 4;

/// Expected total sequence length for a leading byte, or `None` for a bare
/// continuation byte (0x80..=0xBF) and other invalid leads.
pub fn seq_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Decode the first scalar of `bytes`, returning it with its encoded byte
/// width. `None` when the span is empty or does not start with a well-formed
/// sequence.
pub fn decode(bytes: &[u8]) -> Option<(char, usize)> {
    let want = seq_len(*bytes.first()?)?;
    if bytes.len() < want {
        return None;
    }
    let s = std::str::from_utf8(&bytes[..want]).ok()?;
    let c = s.chars().next()?;
    Some((c, want))
}

/// Encode `c` into `buf`, returning the number of bytes written.
pub fn encode(c: char, buf: &mut [u8; MAX_UTF8_LEN]) -> usize {
    c.encode_utf8(buf).len()
}

/// Number of scalars in a well-formed span. Trailing malformed bytes are not
/// counted.
pub fn scalar_count(bytes: &[u8]) -> usize {
    let mut n = 0;
    let mut at = 0;
    while let Some((_, w)) = decode(&bytes[at..]) {
        at += w;
        n += 1;
    }
    n
}

/// Byte offset of the scalar at index `idx`, clamped to `s.len()` when `idx`
/// is at or past the end. The result is always a scalar boundary.
pub fn byte_offset(s: &str, idx: usize) -> usize {
    s.char_indices().nth(idx).map_or(s.len(), |(at, _)| at)
}

/// Scalar at index `idx`, or `None` past the end.
pub fn char_at(s: &str, idx: usize) -> Option<char> {
    s.chars().nth(idx)
}
