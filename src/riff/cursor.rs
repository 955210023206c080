//! Latched-error byte cursor.
//!
//! Chunk decoders are straight-line sequences of reads with no error check
//! after each call. The cursor makes that safe: the first short read latches
//! a failure, every later read returns a zeroed default without advancing,
//! and the decoder inspects the state at defined checkpoints
//! ([`ByteCursor::status`] mid-stream, [`ByteCursor::require_end`] at the end
//! of a chunk).

use byteorder::{ByteOrder, LittleEndian};

use crate::util::{Error, Result};

/// Sequential reader over an in-memory byte slice with latched end-of-input
/// semantics. The only failure a slice can produce is running out of bytes.
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether no failure has been latched yet.
    #[inline]
    pub fn ok(&self) -> bool {
        !self.failed
    }

    /// Take `n` bytes, or latch and return `None`. Once latched, the
    /// position never moves again.
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.failed {
            return None;
        }
        if self.remaining() < n {
            self.failed = true;
            return None;
        }
        let s = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Some(s)
    }

    /// Read exactly `n` bytes. Returns an empty slice once a failure is
    /// latched.
    pub fn read_slice(&mut self, n: usize) -> &'a [u8] {
        self.take(n).unwrap_or(&[])
    }

    /// Read one byte, defaulting to 0.
    pub fn read_u8(&mut self) -> u8 {
        self.take(1).map_or(0, |s| s[0])
    }

    /// Read a signed little-endian 32-bit integer, defaulting to 0.
    pub fn read_i32(&mut self) -> i32 {
        self.take(4).map_or(0, LittleEndian::read_i32)
    }

    /// Read a .vox STRING: an i32 length followed by that many raw bytes.
    ///
    /// The payload is not guaranteed to be text; invalid UTF-8 is decoded
    /// lossily rather than rejected. A negative length latches a failure.
    pub fn read_string(&mut self) -> String {
        let n = self.read_i32();
        if n < 0 {
            self.failed = true;
            return String::new();
        }
        self.take(n as usize)
            .map_or_else(String::new, |s| String::from_utf8_lossy(s).into_owned())
    }

    /// Check for a latched failure mid-stream, before acting on values that
    /// may be zeroed defaults.
    pub fn status(&self, label: &str) -> Result<()> {
        if self.failed {
            return Err(Error::ChunkTruncated(label.to_string()));
        }
        Ok(())
    }

    /// Assert the input is fully consumed. A pending failure or leftover
    /// bytes are both errors tagged with `label`, naming the chunk that
    /// under- or over-ran its declared length.
    pub fn require_end(&self, label: &str) -> Result<()> {
        self.status(label)?;
        if self.remaining() != 0 {
            return Err(Error::TrailingBytes(label.to_string()));
        }
        Ok(())
    }
}
