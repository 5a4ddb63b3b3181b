//! Background producer task.
//!
//! A single worker per instance loops: honour the interrupt, service a
//! pending seek, fill the ring, or wait for the consumer to make room. The
//! blocking read from the inner source happens outside the mutex so the
//! consumer stays responsive while inner I/O is stalled; the fetched chunk is
//! spliced into the ring under the mutex afterwards.

use std::sync::Arc;

use tracing::trace;

use crate::error::IoFailure;
use crate::interrupt::Interrupt;
use crate::shared::{SeekState, Shared};
use crate::source::ByteSource;

pub(crate) struct BufferWorker<S: ByteSource> {
    shared: Arc<Shared>,
    inner: S,
    interrupt: Interrupt,
    fill_chunk: usize,
}

impl<S: ByteSource> BufferWorker<S> {
    pub(crate) fn new(
        shared: Arc<Shared>,
        inner: S,
        interrupt: Interrupt,
        fill_chunk: usize,
    ) -> Self {
        Self {
            shared,
            inner,
            interrupt,
            fill_chunk,
        }
    }

    pub(crate) fn run(self) {
        let Self {
            shared,
            mut inner,
            interrupt,
            fill_chunk,
        } = self;
        let mut scratch = vec![0u8; fill_chunk];

        loop {
            if interrupt.is_interrupted() {
                let mut state = shared.state.lock();
                state.eof_reached = true;
                state.io_error = Some(IoFailure::aborted());
                shared.wake_consumer.notify_one();
                trace!("buffer task interrupted, terminating");
                break;
            }

            let to_fill = {
                let mut state = shared.state.lock();

                if let SeekState::Pending { target } = &state.seek {
                    let target = *target;
                    let result = match inner.seek(target) {
                        Ok(new_pos) => {
                            state.eof_reached = false;
                            state.io_error = None;
                            trace!(to = target, new_pos, "serviced inner seek");
                            Ok(new_pos)
                        }
                        Err(e) => {
                            let failure = IoFailure::from(&e);
                            state.eof_reached = true;
                            state.io_error = Some(failure.clone());
                            trace!(to = target, error = %e, "inner seek failed");
                            Err(failure)
                        }
                    };
                    state.ring.reset();
                    state.seek = SeekState::Completed { result };
                    shared.wake_consumer.notify_one();
                    continue;
                }

                let free = state.ring.space();
                if state.eof_reached || free == 0 {
                    shared.wake_consumer.notify_one();
                    // Recheck under the lock so an abort posted just before
                    // the wait is not missed.
                    if !interrupt.is_interrupted() {
                        shared.wake_producer.wait(&mut state);
                    }
                    continue;
                }
                free.min(fill_chunk)
            };

            let read_result = inner.read(&mut scratch[..to_fill]);

            let mut state = shared.state.lock();
            if matches!(state.seek, SeekState::Pending { .. }) {
                // A seek landed while the read was in flight; these bytes
                // belong to the pre-seek position. Drop them and service the
                // request on the next iteration.
                continue;
            }
            match read_result {
                Ok(0) => {
                    state.eof_reached = true;
                    trace!("inner source reached end of stream");
                }
                Ok(n) => {
                    if let Err(e) = state.ring.write_from(&mut &scratch[..n], n) {
                        state.eof_reached = true;
                        state.io_error = Some(IoFailure::from(&e));
                    }
                }
                Err(e) => {
                    state.eof_reached = true;
                    state.io_error = Some(IoFailure::from(&e));
                    trace!(error = %e, "inner read failed");
                }
            }
            shared.wake_consumer.notify_one();
        }
    }
}
