//! The inner byte-source contract and URI scheme handling.
//!
//! The read-ahead layer is polymorphic over the capability set of its inner
//! source: blocking read, absolute seek, size query, and the streamed flag.
//! Implementations provide a [`SourceOpener`] that turns a URI into a
//! [`ByteSource`]; resource release is `Drop`.

use std::io;

use crate::interrupt::Interrupt;

/// URI scheme prefix handled by this crate. `open` strips it before
/// delegating the remainder to the [`SourceOpener`].
pub const SCHEME: &str = "async:";

/// Strip the [`SCHEME`] prefix if present; URIs without it pass through
/// unchanged.
pub fn strip_scheme(uri: &str) -> &str {
    uri.strip_prefix(SCHEME).unwrap_or(uri)
}

/// Blocking byte source wrapped by a read-ahead instance.
///
/// After open returns, only the producer thread calls these methods; the
/// consumer never issues inner I/O directly.
pub trait ByteSource: Send {
    /// Read up to `buf.len()` bytes. `Ok(0)` signals end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Seek to an absolute byte offset, returning the new offset.
    fn seek(&mut self, pos: u64) -> io::Result<u64>;

    /// Total size in bytes, if known. `None` marks the source non-seekable.
    fn size(&self) -> Option<u64>;

    /// Whether this is a live/streamed input. Propagated unchanged to the
    /// consumer handle.
    fn is_streamed(&self) -> bool {
        false
    }
}

/// Opens a [`ByteSource`] for a URI.
///
/// The opener receives the composed [`Interrupt`] handle so the source's own
/// blocking I/O can observe aborts while the instance is being closed.
pub trait SourceOpener {
    /// Concrete source type produced by this opener.
    type Source: ByteSource + 'static;

    fn open(&self, uri: &str, interrupt: &Interrupt) -> io::Result<Self::Source>;
}
