//! Read-ahead buffering over a blocking byte source.
//!
//! This crate wraps an arbitrary byte source (network, slow disk, anything
//! implementing [`ByteSource`]) and presents the same read/seek surface to
//! the caller while prefetching in the background, decoupling the caller's
//! read cadence from the latency of the underlying I/O.
//!
//! How it works:
//! - A bounded in-memory ring (4 MiB by default) holds the bytes of the
//!   source immediately ahead of the consumer's position.
//! - A single producer thread keeps the ring filled in small chunks and
//!   services seek requests; it is joined when the handle is closed or
//!   dropped.
//! - Reads block only while the ring is empty and the stream has not ended.
//! - Short forward seeks whose target lies within the buffered window (plus
//!   a fixed slack) are satisfied by draining the ring in place, without
//!   issuing a seek on the inner source.
//! - A caller-supplied interrupt predicate is composed with the instance's
//!   abort flag and consulted in every wait loop, so in-flight calls return
//!   promptly when cancelled.
//!
//! This crate is composed of several modules:
//! - `ring`: the bounded byte FIFO.
//! - `source`: the [`ByteSource`] / [`SourceOpener`] contracts and `async:`
//!   scheme handling.
//! - `shared`: mutex/condvar-protected state shared with the producer.
//! - `worker`: the background producer task.
//! - `reader`: the [`ReadAhead`] consumer handle (`Read + Seek`).
//! - `settings`: the [`Settings`] builder.
//! - `error`: unified error types.
//!
//! ```no_run
//! use std::io::SeekFrom;
//!
//! use stream_readahead::{ReadAhead, Settings};
//! # fn run<O: stream_readahead::SourceOpener>(opener: O) -> stream_readahead::Result<()> {
//! let mut stream = ReadAhead::open("async:media://clip", &opener, Settings::default())?;
//! stream.seek(SeekFrom::Start(1024))?;
//! let mut buf = vec![0u8; 4096];
//! let n = stream.read(&mut buf)?;
//! # let _ = n; Ok(())
//! # }
//! ```

mod error;
mod interrupt;
mod reader;
mod ring;
mod settings;
mod shared;
mod source;
mod worker;

pub use crate::error::{Error, Result};
pub use crate::interrupt::{Interrupt, InterruptCallback};
pub use crate::reader::ReadAhead;
pub use crate::settings::{
    Settings, DEFAULT_BUFFER_CAPACITY, DEFAULT_FILL_CHUNK, DEFAULT_SHORT_SEEK_THRESHOLD,
};
pub use crate::source::{strip_scheme, ByteSource, SourceOpener, SCHEME};
