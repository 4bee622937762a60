//! Buffered byte reader with row/column tracking.
//!
//! Lookahead of a few bytes is served from a refillable window, so the lexer
//! never has to push characters back into the stream. A read error ends the
//! stream; the error is parked until the lexer takes it.

use std::io::{self, Read};

const CHUNK: usize = 8 * 1024;

/// Position of a byte in the stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pos {
    /// One-based.
    pub row: u32,
    /// One-based, counted in bytes.
    pub col: u32,
    pub offset: u32,
}

impl Pos {
    const START: Pos = Pos {
        row: 1,
        col: 1,
        offset: 0,
    };
}

pub(crate) struct ByteReader<R> {
    source: R,
    buf: Vec<u8>,
    pos: usize,
    /// Position of `buf[pos]`.
    at: Pos,
    /// Position of the last byte handed out by `bump`.
    last: Pos,
    exhausted: bool,
    error: Option<io::Error>,
}

impl<R: Read> ByteReader<R> {
    pub fn new(source: R) -> Self {
        ByteReader {
            source,
            buf: Vec::with_capacity(CHUNK),
            pos: 0,
            at: Pos::START,
            last: Pos::START,
            exhausted: false,
            error: None,
        }
    }

    /// Make sure at least `n` unread bytes are buffered, short of the end of
    /// the stream.
    fn fill(&mut self, n: usize) {
        while self.buf.len() - self.pos < n && !self.exhausted {
            if self.pos > 0 {
                self.buf.drain(..self.pos);
                self.pos = 0;
            }
            let len = self.buf.len();
            self.buf.resize(len + CHUNK, 0);
            match self.source.read(&mut self.buf[len..]) {
                Ok(0) => {
                    self.buf.truncate(len);
                    self.exhausted = true;
                }
                Ok(read) => self.buf.truncate(len + read),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => self.buf.truncate(len),
                Err(e) => {
                    self.buf.truncate(len);
                    self.exhausted = true;
                    self.error = Some(e);
                }
            }
        }
    }

    /// The `n`th unread byte, zero being the next one.
    #[inline]
    pub fn peek_nth(&mut self, n: usize) -> Option<u8> {
        self.fill(n + 1);
        self.buf.get(self.pos + n).copied()
    }

    #[inline]
    pub fn current(&mut self) -> Option<u8> {
        self.peek_nth(0)
    }

    /// Consume one byte.
    pub fn bump(&mut self) -> Option<u8> {
        let byte = self.current()?;
        self.pos += 1;
        self.last = self.at;
        self.at.offset = self.at.offset.saturating_add(1);
        if byte == b'\n' {
            self.at.row = self.at.row.saturating_add(1);
            self.at.col = 1;
        } else {
            self.at.col = self.at.col.saturating_add(1);
        }
        Some(byte)
    }

    /// Consume bytes while `pred` holds, appending them to `out`.
    pub fn eat_while(&mut self, out: &mut Vec<u8>, mut pred: impl FnMut(u8) -> bool) {
        while let Some(b) = self.current() {
            if !pred(b) {
                break;
            }
            self.bump();
            out.push(b);
        }
    }

    pub fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while self.current().is_some_and(&mut pred) {
            self.bump();
        }
    }

    /// Position of the next unread byte.
    #[inline]
    pub fn pos(&self) -> Pos {
        self.at
    }

    /// Position of the most recently consumed byte.
    #[inline]
    pub fn last(&self) -> Pos {
        self.last
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }
}
