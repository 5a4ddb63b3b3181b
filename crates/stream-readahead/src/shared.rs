//! State shared between the consumer handle and the producer thread.
//!
//! One mutex protects everything mutable: the ring, the logical cursor, the
//! EOF/error record, and the seek handshake. Two condition variables carry
//! flow control: the consumer sleeps on `wake_consumer`, the producer on
//! `wake_producer`. Each side signals the other before it waits so the
//! interrupt predicate is always rechecked promptly.

use parking_lot::{Condvar, Mutex};

use crate::error::IoFailure;
use crate::ring::ByteRing;

/// Seek handshake record.
///
/// Exactly one variant holds under the mutex at any point: no seek in flight,
/// one pending for the producer to service, or one completed and awaiting
/// consumption by the consumer.
pub(crate) enum SeekState {
    Idle,
    Pending { target: u64 },
    Completed { result: Result<u64, IoFailure> },
}

pub(crate) struct State {
    pub(crate) ring: ByteRing,
    /// Offset, in the source's address space, of the next byte the consumer
    /// will receive. Monotonically non-decreasing between serviced seeks.
    pub(crate) logical_pos: i64,
    /// Declared total size of the inner source; `None` when unknown, which
    /// also marks the source non-seekable.
    pub(crate) logical_size: Option<i64>,
    /// Set when the producer's most recent attempt to advance the source hit
    /// end of stream, an error, or an interrupt. Cleared by a successful seek.
    pub(crate) eof_reached: bool,
    /// Most recent producer-side failure; sticky until a successful seek.
    pub(crate) io_error: Option<IoFailure>,
    pub(crate) seek: SeekState,
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    pub(crate) wake_consumer: Condvar,
    pub(crate) wake_producer: Condvar,
}

impl Shared {
    pub(crate) fn new(state: State) -> Self {
        Self {
            state: Mutex::new(state),
            wake_consumer: Condvar::new(),
            wake_producer: Condvar::new(),
        }
    }
}
