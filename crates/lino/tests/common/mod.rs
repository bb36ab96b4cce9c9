//! Scripted terminal double shared by the integration suites.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use line_term::{Term, TermError};

/// One scripted read: a byte, or a timeout where the decoder expected one.
pub enum Step {
    Byte(u8),
    Timeout,
}

/// Everything the editor did to the screen, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write(Vec<u8>),
    CursorToStart,
    EraseToEol,
    MoveToColumn(usize),
    Control(char),
    ClearScreen,
    Beep,
}

pub struct FakeTerm {
    cols: usize,
    script: VecDeque<Step>,
    pub ops: Vec<Op>,
    pub raw: bool,
    pub raw_sessions: usize,
}

impl FakeTerm {
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            script: VecDeque::new(),
            ops: Vec::new(),
            raw: false,
            raw_sessions: 0,
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.script.extend(bytes.iter().copied().map(Step::Byte));
    }

    pub fn feed_timeout(&mut self) {
        self.script.push_back(Step::Timeout);
    }

    /// Every written byte span, concatenated and lossily decoded.
    pub fn written(&self) -> String {
        let mut out = Vec::new();
        for op in &self.ops {
            if let Op::Write(bytes) = op {
                out.extend_from_slice(bytes);
            }
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    pub fn beeps(&self) -> usize {
        self.ops.iter().filter(|op| **op == Op::Beep).count()
    }
}

impl Term for FakeTerm {
    fn enable_raw(&mut self) -> Result<(), TermError> {
        self.raw = true;
        self.raw_sessions += 1;
        Ok(())
    }

    fn disable_raw(&mut self) -> Result<(), TermError> {
        self.raw = false;
        Ok(())
    }

    fn read_byte(&mut self, _timeout: Option<Duration>) -> io::Result<Option<u8>> {
        match self.script.pop_front() {
            Some(Step::Byte(b)) => Ok(Some(b)),
            Some(Step::Timeout) => Ok(None),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input script exhausted",
            )),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.ops.push(Op::Write(bytes.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn columns(&mut self) -> usize {
        self.cols
    }

    fn clear_screen(&mut self) -> io::Result<()> {
        self.ops.push(Op::ClearScreen);
        Ok(())
    }

    fn cursor_to_start(&mut self) -> io::Result<()> {
        self.ops.push(Op::CursorToStart);
        Ok(())
    }

    fn erase_to_eol(&mut self) -> io::Result<()> {
        self.ops.push(Op::EraseToEol);
        Ok(())
    }

    fn move_to_column(&mut self, col: usize) -> io::Result<()> {
        self.ops.push(Op::MoveToColumn(col));
        Ok(())
    }

    fn render_control(&mut self, c: char) -> io::Result<()> {
        self.ops.push(Op::Control(c));
        Ok(())
    }

    fn beep(&mut self) -> io::Result<()> {
        self.ops.push(Op::Beep);
        Ok(())
    }
}
