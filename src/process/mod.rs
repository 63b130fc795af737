//! Process-level shutdown handling
//!
//! The monitor runs on a single thread. The only other thread is the Ctrl-C
//! handler, which flips a shared flag that the poll loop and element waits
//! check between blocking steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Longest uninterrupted sleep, so a shutdown request is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Shared shutdown request flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    requested: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Route SIGINT (and SIGTERM where supported) to this flag.
    ///
    /// Can only be installed once per process.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let requested = Arc::clone(&self.requested);
        ctrlc::set_handler(move || {
            requested.store(true, Ordering::SeqCst);
        })
    }

    /// Sleep for `duration` in short slices.
    ///
    /// # Returns
    /// * `true` - The full duration elapsed
    /// * `false` - Shutdown was requested before or during the sleep
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_requested() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SLEEP_SLICE));
        }
    }
}
