//! Bounded in-memory byte FIFO used for prefetch.
//!
//! The ring holds the bytes of the underlying source starting at the
//! consumer's logical position, contiguously. Bulk writes come from any
//! [`Read`] source and may wrap around the end of storage; reads either copy
//! out or advance in place (the no-copy drain behind the short-seek path).
//!
//! The ring is not synchronized; the owning instance serializes access
//! through its shared mutex.

use std::io::{self, Read};

pub(crate) struct ByteRing {
    buf: Box<[u8]>,
    /// Index of the oldest buffered byte.
    head: usize,
    /// Occupancy in bytes.
    len: usize,
}

impl ByteRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn space(&self) -> usize {
        self.buf.len() - self.len
    }

    /// Fill from `src` with up to `n` bytes.
    ///
    /// The free region is handed to `src.read` as one or two contiguous
    /// slices (two on wrap-around). Filling stops early when `src` returns
    /// `Ok(0)` (end of stream) or errors; an error with nothing yet written
    /// is propagated, otherwise the byte count written so far is returned.
    pub(crate) fn write_from<R: Read + ?Sized>(
        &mut self,
        src: &mut R,
        n: usize,
    ) -> io::Result<usize> {
        let mut remaining = n.min(self.space());
        let mut written = 0usize;

        while remaining > 0 {
            let tail = (self.head + self.len) % self.buf.len();
            let contiguous = remaining.min(self.buf.len() - tail);
            match src.read(&mut self.buf[tail..tail + contiguous]) {
                Ok(0) => break,
                Ok(read) => {
                    self.len += read;
                    written += read;
                    remaining -= read;
                }
                Err(e) if written == 0 => return Err(e),
                Err(_) => break,
            }
        }

        Ok(written)
    }

    /// Copy up to `dst.len()` bytes out, advancing past them.
    pub(crate) fn read_into(&mut self, dst: &mut [u8]) -> usize {
        let n = dst.len().min(self.len);
        let first = n.min(self.buf.len() - self.head);
        dst[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        if first < n {
            dst[first..n].copy_from_slice(&self.buf[..n - first]);
        }
        self.advance(n);
        n
    }

    /// Advance past up to `n` bytes without copying.
    pub(crate) fn skip(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        self.advance(n);
        n
    }

    /// Drop all buffered bytes. Called only after the producer services a
    /// seek; the next fill starts at the new position.
    pub(crate) fn reset(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    fn advance(&mut self, n: usize) {
        self.head = (self.head + n) % self.buf.len();
        self.len -= n;
    }
}
