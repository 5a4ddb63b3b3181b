//! Deterministic in-memory byte source for integration tests.
//!
//! The source exposes a pattern where byte `i` equals `i % 251`, so any
//! slice read through the read-ahead layer can be checked against its
//! absolute offset. Instrumentation counters record how often the inner
//! source was read and seeked (the short-seek tests assert the seek counter
//! stays flat), and an optional per-byte delay simulates a slow transport
//! for the cancellation tests.
#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use stream_readahead::{ByteSource, Interrupt, SourceOpener};

/// Length of the standard test pattern: 10 MiB.
pub const PATTERN_LEN: usize = 10 * 1024 * 1024;

/// The pattern byte at absolute `offset`.
pub fn expected_byte(offset: u64) -> u8 {
    (offset % 251) as u8
}

pub fn pattern(len: usize) -> Bytes {
    let mut data = Vec::with_capacity(len);
    for i in 0..len {
        data.push((i % 251) as u8);
    }
    Bytes::from(data)
}

/// Assert that `buf` holds the pattern starting at absolute `start`.
pub fn assert_pattern(buf: &[u8], start: u64) {
    for (i, byte) in buf.iter().enumerate() {
        assert_eq!(
            *byte,
            expected_byte(start + i as u64),
            "mismatch at offset {}",
            start + i as u64
        );
    }
}

#[derive(Default)]
pub struct SourceCounters {
    pub reads: AtomicUsize,
    pub seeks: AtomicUsize,
}

impl SourceCounters {
    pub fn seeks(&self) -> usize {
        self.seeks.load(Ordering::Relaxed)
    }
}

pub struct PatternSource {
    data: Bytes,
    pos: usize,
    seekable: bool,
    byte_delay: Option<Duration>,
    seek_delay: Option<Duration>,
    fail_read_at: Option<usize>,
    interrupt: Interrupt,
    counters: Arc<SourceCounters>,
}

impl ByteSource for PatternSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.counters.reads.fetch_add(1, Ordering::Relaxed);

        let mut n = buf.len().min(self.data.len() - self.pos);
        if let Some(limit) = self.fail_read_at {
            if self.pos >= limit {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    "injected read failure",
                ));
            }
            n = n.min(limit - self.pos);
        }
        if n == 0 {
            return Ok(0);
        }

        match self.byte_delay {
            None => {
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
            Some(delay) => {
                // Trickle one byte per tick, bailing out as soon as the
                // interrupt fires so cancellation latency stays bounded by a
                // single byte, not a whole chunk.
                let mut copied = 0;
                while copied < n {
                    if self.interrupt.is_interrupted() {
                        break;
                    }
                    std::thread::sleep(delay);
                    buf[copied] = self.data[self.pos];
                    self.pos += 1;
                    copied += 1;
                }
                if copied == 0 {
                    Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "read interrupted",
                    ))
                } else {
                    Ok(copied)
                }
            }
        }
    }

    fn seek(&mut self, pos: u64) -> io::Result<u64> {
        self.counters.seeks.fetch_add(1, Ordering::Relaxed);
        if let Some(delay) = self.seek_delay {
            std::thread::sleep(delay);
        }
        if !self.seekable {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "source is not seekable",
            ));
        }
        if pos > self.data.len() as u64 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek past end of source",
            ));
        }
        self.pos = pos as usize;
        Ok(pos)
    }

    fn size(&self) -> Option<u64> {
        self.seekable.then(|| self.data.len() as u64)
    }

    fn is_streamed(&self) -> bool {
        !self.seekable
    }
}

/// Opener for [`PatternSource`] instances. Records every URI it is handed so
/// tests can assert the scheme prefix was stripped.
pub struct PatternOpener {
    len: usize,
    seekable: bool,
    byte_delay: Option<Duration>,
    seek_delay: Option<Duration>,
    fail_read_at: Option<usize>,
    pub counters: Arc<SourceCounters>,
    pub opened_uris: Mutex<Vec<String>>,
}

impl PatternOpener {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            seekable: true,
            byte_delay: None,
            seek_delay: None,
            fail_read_at: None,
            counters: Arc::new(SourceCounters::default()),
            opened_uris: Mutex::new(Vec::new()),
        }
    }

    /// Source reports an unknown size and rejects seeks.
    pub fn non_seekable(mut self) -> Self {
        self.seekable = false;
        self
    }

    /// Sleep this long per byte delivered.
    pub fn byte_delay(mut self, delay: Duration) -> Self {
        self.byte_delay = Some(delay);
        self
    }

    /// Sleep this long before every seek.
    pub fn seek_delay(mut self, delay: Duration) -> Self {
        self.seek_delay = Some(delay);
        self
    }

    /// Reads fail once the source position reaches `offset`.
    pub fn fail_read_at(mut self, offset: usize) -> Self {
        self.fail_read_at = Some(offset);
        self
    }
}

impl SourceOpener for PatternOpener {
    type Source = PatternSource;

    fn open(&self, uri: &str, interrupt: &Interrupt) -> io::Result<PatternSource> {
        self.opened_uris.lock().unwrap().push(uri.to_owned());
        Ok(PatternSource {
            data: pattern(self.len),
            pos: 0,
            seekable: self.seekable,
            byte_delay: self.byte_delay,
            seek_delay: self.seek_delay,
            fail_read_at: self.fail_read_at,
            interrupt: interrupt.clone(),
            counters: self.counters.clone(),
        })
    }
}
