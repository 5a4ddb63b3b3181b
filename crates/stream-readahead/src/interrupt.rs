//! Interrupt predicate composition.
//!
//! An instance is cancelled two ways: the host's interrupt callback fires, or
//! `close` sets the abort flag. The inner source receives a single composed
//! [`Interrupt`] at open time so its blocking I/O unblocks in both cases.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Caller-supplied predicate, consulted on every producer loop iteration and
/// in every consumer wait loop. Returning `true` demands prompt termination.
pub type InterruptCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// Host interrupt callback ORed with the instance abort flag.
///
/// Cheap to clone; all clones observe the same abort flag.
#[derive(Clone, Default)]
pub struct Interrupt {
    host: Option<InterruptCallback>,
    abort: Arc<AtomicBool>,
}

impl Interrupt {
    pub(crate) fn new(host: Option<InterruptCallback>) -> Self {
        Self {
            host,
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True once the host predicate fires or the abort flag is set.
    pub fn is_interrupted(&self) -> bool {
        if let Some(host) = &self.host {
            if host() {
                return true;
            }
        }
        self.abort.load(Ordering::Relaxed)
    }

    // Waiters are notified under the shared mutex after this is set; the
    // flag itself needs no stronger ordering.
    pub(crate) fn set_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupt")
            .field("has_host_callback", &self.host.is_some())
            .field("abort", &self.abort.load(Ordering::Relaxed))
            .finish()
    }
}
