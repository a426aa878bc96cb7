//! Thread affinity checks for composition trees.
//!
//! A composition tree is driven from the single thread that owns the
//! rendering surface. Composites record that thread when they are built and
//! verify it on mutation and batch entry points.
//!
//! ```
//! use horizon_mosaic_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! assert!(affinity.is_same_thread());
//! affinity.debug_assert_same_thread();
//! ```
//!
//! Checks are enabled by default in debug builds only; use
//! [`set_thread_checks_enabled`] to override that globally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Enable or disable runtime thread checks.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread an object was created on.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread as the affinity.
    ///
    /// Does nothing while thread checks are disabled.
    ///
    /// # Panics
    ///
    /// Panics if checks are enabled and the current thread differs.
    pub fn assert_same_thread(&self, operation: &str) {
        if are_thread_checks_enabled() && !self.is_same_thread() {
            self.panic_wrong_thread(operation);
        }
    }

    /// Debug-only variant of [`assert_same_thread`](Self::assert_same_thread).
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread("composition accessed");
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, operation: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        panic!(
            "{operation} from thread \"{current_name}\" ({:?}), but the composition \
             is owned by thread {:?}",
            current.id(),
            self.thread_id
        )
    }
}
