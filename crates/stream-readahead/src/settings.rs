//! Configuration for a read-ahead instance.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::interrupt::InterruptCallback;

/// Default ring capacity: 4 MiB.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4 * 1024 * 1024;

/// Default forward slack accepted by the in-place seek path: 256 KiB.
pub const DEFAULT_SHORT_SEEK_THRESHOLD: usize = 256 * 1024;

/// Default upper bound for a single fill read from the inner source.
pub const DEFAULT_FILL_CHUNK: usize = 4096;

/// Settings for [`ReadAhead::open`](crate::ReadAhead::open).
#[derive(Clone)]
pub struct Settings {
    /// Ring capacity in bytes.
    /// Default: 4 MiB.
    pub buffer_capacity: usize,

    /// How far beyond the buffered window a forward seek may land and still
    /// be satisfied by draining in place instead of seeking the inner
    /// source. Kept small relative to capacity so the worst-case synchronous
    /// drain stays bounded.
    /// Default: 256 KiB.
    pub short_seek_threshold: usize,

    /// Upper bound, in bytes, for a single blocking read from the inner
    /// source. Bounds how long one inner read can hold progress hostage.
    /// Default: 4096.
    pub fill_chunk: usize,

    /// Optional bound on the wait for seek completion. `None` waits until
    /// the producer answers or an interrupt fires.
    /// Default: `None`.
    pub seek_timeout: Option<Duration>,

    /// Host interrupt predicate, checked on every producer iteration and in
    /// every consumer wait loop. Not included in Debug output.
    pub interrupt: Option<InterruptCallback>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            short_seek_threshold: DEFAULT_SHORT_SEEK_THRESHOLD,
            fill_chunk: DEFAULT_FILL_CHUNK,
            seek_timeout: None,
            interrupt: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("buffer_capacity", &self.buffer_capacity)
            .field("short_seek_threshold", &self.short_seek_threshold)
            .field("fill_chunk", &self.fill_chunk)
            .field("seek_timeout", &self.seek_timeout)
            .finish()
    }
}

impl Settings {
    /// Create default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_capacity(mut self, v: usize) -> Self {
        self.buffer_capacity = v;
        self
    }

    pub fn short_seek_threshold(mut self, v: usize) -> Self {
        self.short_seek_threshold = v;
        self
    }

    pub fn fill_chunk(mut self, v: usize) -> Self {
        self.fill_chunk = v;
        self
    }

    pub fn seek_timeout(mut self, v: Option<Duration>) -> Self {
        self.seek_timeout = v;
        self
    }

    pub fn interrupt(mut self, cb: Option<InterruptCallback>) -> Self {
        self.interrupt = cb;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(Error::InvalidSettings("buffer_capacity must be non-zero"));
        }
        if self.fill_chunk == 0 {
            return Err(Error::InvalidSettings("fill_chunk must be non-zero"));
        }
        Ok(())
    }
}
