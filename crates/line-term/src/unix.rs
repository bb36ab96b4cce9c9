//! POSIX byte reader: `poll(2)` for the timeout, then a single `read(2)`.

use std::io;
use std::time::Duration;

pub(crate) struct ByteReader {
    fd: libc::c_int,
}

impl ByteReader {
    pub(crate) fn new() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    pub(crate) fn on_raw_enter(&mut self) {}

    pub(crate) fn on_raw_leave(&mut self) {}

    pub(crate) fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        let timeout_ms: libc::c_int = match timeout {
            None => -1,
            Some(d) => d.as_millis().min(libc::c_int::MAX as u128) as libc::c_int,
        };

        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            let rc = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if rc == 0 {
                return Ok(None);
            }
            if rc > 0 {
                break;
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }

        let mut byte = 0u8;
        loop {
            let n = unsafe { libc::read(self.fd, (&mut byte as *mut u8).cast(), 1) };
            if n == 1 {
                return Ok(Some(byte));
            }
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}
