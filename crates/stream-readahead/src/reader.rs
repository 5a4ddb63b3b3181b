//! Consumer-facing handle.
//!
//! [`ReadAhead`] owns the shared state and the producer thread. All control
//! flow is driven from here: reads drain the ring (blocking while the
//! producer catches up), seeks either drain in place or hand a request to
//! the producer, and close aborts and joins the producer.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::interrupt::Interrupt;
use crate::ring::ByteRing;
use crate::settings::Settings;
use crate::shared::{SeekState, Shared, State};
use crate::source::{self, ByteSource, SourceOpener};
use crate::worker::BufferWorker;

/// Read-ahead wrapper over a [`ByteSource`].
///
/// A background producer keeps a bounded ring filled from the source while
/// the caller reads at its own cadence. Short forward seeks whose target is
/// already buffered (plus a small slack) are satisfied by draining the ring;
/// anything else is handed to the producer, which re-positions the source
/// and starts buffering afresh.
///
/// The handle is not reentrant: one consumer at a time per instance.
/// Dropping the handle closes it.
pub struct ReadAhead {
    shared: Arc<Shared>,
    interrupt: Interrupt,
    short_seek_threshold: usize,
    seek_timeout: Option<Duration>,
    is_streamed: bool,
    worker: Option<JoinHandle<()>>,
}

impl ReadAhead {
    /// Open `uri` through `opener` and start the producer thread.
    ///
    /// A leading `async:` scheme prefix is stripped before delegation. The
    /// opener receives an interrupt handle combining the host predicate from
    /// `settings` with this instance's abort flag, so inner blocking I/O
    /// unblocks during close.
    pub fn open<O: SourceOpener>(uri: &str, opener: &O, settings: Settings) -> Result<Self> {
        settings.validate()?;

        let interrupt = Interrupt::new(settings.interrupt.clone());
        let inner_uri = source::strip_scheme(uri);
        let inner = opener.open(inner_uri, &interrupt).map_err(|e| {
            error!(uri = inner_uri, error = %e, "inner open failed");
            Error::Io(e)
        })?;

        let logical_size = inner.size().map(|s| s as i64);
        let is_streamed = inner.is_streamed();

        let shared = Arc::new(Shared::new(State {
            ring: ByteRing::new(settings.buffer_capacity),
            logical_pos: 0,
            logical_size,
            eof_reached: false,
            io_error: None,
            seek: SeekState::Idle,
        }));

        let worker = BufferWorker::new(
            shared.clone(),
            inner,
            interrupt.clone(),
            settings.fill_chunk,
        );
        // On spawn failure the worker (and with it the inner source) is
        // dropped, unwinding open in reverse order.
        let handle = thread::Builder::new()
            .name("readahead-buffer".into())
            .spawn(move || worker.run())
            .map_err(Error::Io)?;

        debug!(uri = inner_uri, size = ?logical_size, is_streamed, "read-ahead instance opened");

        Ok(Self {
            shared,
            interrupt,
            short_seek_threshold: settings.short_seek_threshold,
            seek_timeout: settings.seek_timeout,
            is_streamed,
            worker: Some(handle),
        })
    }

    /// Declared total size of the underlying source, if known.
    pub fn size(&self) -> Option<i64> {
        self.shared.state.lock().logical_size
    }

    /// Offset of the next byte [`read`](Self::read) will return.
    pub fn position(&self) -> u64 {
        self.shared.state.lock().logical_pos as u64
    }

    /// Whether the inner source declared itself a live/streamed input.
    pub fn is_streamed(&self) -> bool {
        self.is_streamed
    }

    /// Read up to `buf.len()` bytes.
    ///
    /// Blocks until at least one byte is buffered, then returns whatever is
    /// available without waiting for a full buffer. `Ok(0)` signals end of
    /// stream; a producer-side I/O failure is surfaced instead once the
    /// buffered bytes preceding it have been drained, and keeps being
    /// surfaced until a successful seek clears it.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let size = buf.len();
        self.read_internal(Some(buf), size, false)
    }

    /// Reposition the stream.
    ///
    /// `SeekFrom::End` is not supported; query [`size`](Self::size) instead.
    /// Forward targets inside the buffered window plus the configured slack
    /// are satisfied by draining in place, without an inner seek. Other
    /// targets require a known size and must not lie beyond it.
    ///
    /// After a failed inner seek the instance is in a terminal error state
    /// until closed: reads keep returning the recorded failure.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let (logical_pos, occupancy, logical_size) = {
            let state = self.shared.state.lock();
            (state.logical_pos, state.ring.len(), state.logical_size)
        };

        let target = match pos {
            SeekFrom::Start(p) => {
                i64::try_from(p).map_err(|_| Error::InvalidSeek("offset overflows i64"))?
            }
            SeekFrom::Current(delta) => logical_pos
                .checked_add(delta)
                .ok_or(Error::InvalidSeek("offset overflows i64"))?,
            SeekFrom::End(_) => return Err(Error::InvalidSeek("seek from end is not supported")),
        };
        if target < 0 {
            return Err(Error::InvalidSeek("negative target"));
        }

        if target == logical_pos {
            return Ok(logical_pos as u64);
        }

        let window_end = logical_pos + occupancy as i64 + self.short_seek_threshold as i64;
        if target > logical_pos && target <= window_end {
            trace!(
                to = target,
                from = logical_pos,
                buffered = occupancy,
                "forward seek drained in place"
            );
            self.read_internal(None, (target - logical_pos) as usize, true)?;
            return Ok(self.position());
        }

        match logical_size {
            None => return Err(Error::InvalidSeek("source size unknown")),
            Some(size) if target > size => {
                return Err(Error::InvalidSeek("target beyond end of source"));
            }
            Some(_) => {}
        }

        let mut state = self.shared.state.lock();
        state.seek = SeekState::Pending {
            target: target as u64,
        };
        trace!(to = target, "submitted seek to buffer task");

        loop {
            if self.interrupt.is_interrupted() {
                return Err(Error::Aborted);
            }
            if let SeekState::Completed { result } = &state.seek {
                let result = result.clone();
                state.seek = SeekState::Idle;
                return match result {
                    Ok(new_pos) => {
                        state.logical_pos = new_pos as i64;
                        Ok(new_pos)
                    }
                    Err(failure) => Err(Error::Io(failure.to_io())),
                };
            }
            self.shared.wake_producer.notify_one();
            match self.seek_timeout {
                Some(timeout) => {
                    if self
                        .shared
                        .wake_consumer
                        .wait_for(&mut state, timeout)
                        .timed_out()
                    {
                        return Err(Error::SeekTimedOut);
                    }
                }
                None => self.shared.wake_consumer.wait(&mut state),
            }
        }
    }

    /// Abort the producer, wake it, and join it. Idempotent; also runs on
    /// drop.
    pub fn close(&mut self) {
        let Some(handle) = self.worker.take() else {
            return;
        };
        {
            let _state = self.shared.state.lock();
            self.interrupt.set_abort();
            self.shared.wake_producer.notify_one();
        }
        if handle.join().is_err() {
            error!("buffer thread panicked during close");
        }
        debug!("read-ahead instance closed");
    }

    /// Core read loop shared by [`read`](Self::read) and the short-seek
    /// drain. `dst: None` advances past bytes without copying them;
    /// `read_complete` keeps looping until `size` bytes were consumed or the
    /// stream ended.
    fn read_internal(
        &mut self,
        mut dst: Option<&mut [u8]>,
        size: usize,
        read_complete: bool,
    ) -> Result<usize> {
        if size == 0 {
            return Ok(0);
        }

        let mut state = self.shared.state.lock();
        let mut to_read = size;
        let mut total = 0usize;

        let result = loop {
            if self.interrupt.is_interrupted() {
                break Err(Error::Aborted);
            }
            let to_copy = to_read.min(state.ring.len());
            if to_copy > 0 {
                let copied = match dst.as_deref_mut() {
                    Some(out) => state.ring.read_into(&mut out[total..total + to_copy]),
                    None => state.ring.skip(to_copy),
                };
                state.logical_pos += copied as i64;
                to_read -= copied;
                total += copied;
                if to_read == 0 || !read_complete {
                    break Ok(total);
                }
            } else if state.eof_reached {
                break match &state.io_error {
                    Some(failure) if total == 0 => Err(Error::Io(failure.to_io())),
                    _ => Ok(total),
                };
            } else {
                self.shared.wake_producer.notify_one();
                self.shared.wake_consumer.wait(&mut state);
            }
        };

        // Unblock a producer that stopped on a full ring.
        self.shared.wake_producer.notify_one();
        result
    }
}

impl Read for ReadAhead {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ReadAhead::read(self, buf).map_err(io::Error::from)
    }
}

impl Seek for ReadAhead {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        ReadAhead::seek(self, pos).map_err(io::Error::from)
    }
}

impl Drop for ReadAhead {
    fn drop(&mut self) {
        self.close();
    }
}
