//! Windows byte reader over the console input queue.
//!
//! `ReadConsoleInputW` records are translated into the same VT byte language
//! the POSIX side delivers, so the decoder sees one input dialect: printable
//! and control characters arrive as their UTF-8 bytes, navigation keys as the
//! `ESC[`-prefixed sequences listed in the decoder tables.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use windows_sys::Win32::Foundation::{HANDLE, WAIT_OBJECT_0};
use windows_sys::Win32::System::Console::{
    FlushConsoleInputBuffer, GetStdHandle, INPUT_RECORD, KEY_EVENT, ReadConsoleInputW,
    STD_INPUT_HANDLE,
};
use windows_sys::Win32::System::Threading::{INFINITE, WaitForSingleObject};

pub(crate) struct ByteReader {
    handle: HANDLE,
    pending: VecDeque<u8>,
}

impl ByteReader {
    pub(crate) fn new() -> Self {
        Self {
            handle: unsafe { GetStdHandle(STD_INPUT_HANDLE) },
            pending: VecDeque::new(),
        }
    }

    pub(crate) fn on_raw_enter(&mut self) {
        // Drop whatever accumulated while the editor was not reading.
        self.pending.clear();
        unsafe {
            FlushConsoleInputBuffer(self.handle);
        }
    }

    pub(crate) fn on_raw_leave(&mut self) {}

    pub(crate) fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        loop {
            if let Some(b) = self.pending.pop_front() {
                return Ok(Some(b));
            }

            let wait_ms = match timeout {
                None => INFINITE,
                Some(d) => d.as_millis().min(u32::MAX as u128) as u32,
            };
            let wait = unsafe { WaitForSingleObject(self.handle, wait_ms) };
            if wait != WAIT_OBJECT_0 {
                return Ok(None);
            }

            let mut records: [INPUT_RECORD; 32] = unsafe { std::mem::zeroed() };
            let mut count: u32 = 0;
            let ok =
                unsafe { ReadConsoleInputW(self.handle, records.as_mut_ptr(), 32, &mut count) };
            if ok == 0 {
                return Err(io::Error::last_os_error());
            }

            for record in records.iter().take(count as usize) {
                if record.EventType as u32 != KEY_EVENT {
                    continue;
                }
                let key = unsafe { record.Event.KeyEvent };
                if key.bKeyDown == 0 {
                    continue;
                }
                let ch = unsafe { key.uChar.UnicodeChar };
                if ch != 0 {
                    if let Some(c) = char::from_u32(ch as u32) {
                        let mut buf = [0u8; 4];
                        self.pending.extend(c.encode_utf8(&mut buf).as_bytes());
                    }
                } else {
                    self.pending.extend(vk_to_vt(key.wVirtualKeyCode));
                }
            }
            // A burst of key-up or dead-key records may produce nothing;
            // loop and wait again within the same call.
            if self.pending.is_empty() && timeout.is_some() {
                return Ok(None);
            }
        }
    }
}

/// Virtual-key code to VT escape sequence.
fn vk_to_vt(vk: u16) -> &'static [u8] {
    match vk {
        0x25 => b"\x1b[D", // VK_LEFT
        0x26 => b"\x1b[A", // VK_UP
        0x27 => b"\x1b[C", // VK_RIGHT
        0x28 => b"\x1b[B", // VK_DOWN
        0x24 => b"\x1b[H", // VK_HOME
        0x23 => b"\x1b[F", // VK_END
        0x2d => b"\x1b[2~", // VK_INSERT
        0x2e => b"\x1b[3~", // VK_DELETE
        0x21 => b"\x1b[5~", // VK_PRIOR
        0x22 => b"\x1b[6~", // VK_NEXT
        _ => b"",
    }
}
