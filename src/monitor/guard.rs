//! Scoped ownership of the browser session.

use std::ops::{Deref, DerefMut};
use tracing::{info, warn};

use crate::browser::PageClient;

/// Owns a [`PageClient`] and closes it exactly once.
///
/// [`close`](Self::close) may be called explicitly; otherwise the session is
/// closed on drop, which also covers early returns and panics. Close failures
/// are logged and never replace the error that ended the monitor.
pub struct SessionGuard<C: PageClient> {
    client: C,
    closed: bool,
}

impl<C: PageClient> SessionGuard<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        match self.client.close() {
            Ok(()) => info!("browser session closed"),
            Err(e) => warn!(error = %e, "failed to close browser session"),
        }
    }
}

impl<C: PageClient> Deref for SessionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.client
    }
}

impl<C: PageClient> DerefMut for SessionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.client
    }
}

impl<C: PageClient> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        self.close();
    }
}
