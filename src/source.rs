//! Character sources feeding the scanner.
//!
//! The scanner only ever asks for the next byte; the single byte of
//! look-ahead it needs is kept by the scanner itself, so a source never has
//! to support seeking or push-back.

use crate::ErrorKind;
use std::io;

/// A stream of input bytes.
pub trait Source {
    /// Returns the next byte, `None` at end of input.
    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind>;
}

impl<S: Source + ?Sized> Source for &mut S {
    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        (**self).next_byte()
    }
}

/// An in-memory document.
#[derive(Clone, Debug)]
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl<'a> From<&'a str> for SliceSource<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for SliceSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl Source for SliceSource<'_> {
    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        let b = self.bytes.get(self.pos).copied();
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }
}

const READ_BUF_LEN: usize = 512;

/// A document read on demand from an [`io::Read`] implementation, such as a
/// file, through a fixed-size internal buffer.
pub struct ReadSource<R> {
    reader: R,
    buf: [u8; READ_BUF_LEN],
    pos: usize,
    len: usize,
    done: bool,
}

impl<R: io::Read> ReadSource<R> {
    /// Wraps `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: [0; READ_BUF_LEN],
            pos: 0,
            len: 0,
            done: false,
        }
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    #[cold]
    fn fill(&mut self) -> Result<(), ErrorKind> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.pos = 0;
                    self.len = n;
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ErrorKind::Io(e.kind())),
            }
        }
    }
}

impl<R: io::Read> Source for ReadSource<R> {
    #[inline]
    fn next_byte(&mut self) -> Result<Option<u8>, ErrorKind> {
        if self.pos == self.len {
            if self.done {
                return Ok(None);
            }
            self.fill()?;
            if self.done {
                return Ok(None);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }
}

impl<R> std::fmt::Debug for ReadSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadSource")
            .field("pos", &self.pos)
            .field("len", &self.len)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
