//! Bringing the offerings table into a readable state.

use tracing::{debug, warn};

use super::core::Monitor;
use super::events::{EventSink, MonitorEvent};
use crate::browser::PageClient;
use crate::error::{Result, WatchError};

impl<C: PageClient, S: EventSink> Monitor<C, S> {
    /// Wait for the course table, then select the target course row.
    ///
    /// A missing table is assumed to be a slow render: it is looked up again
    /// after `retry_delay`, and after `max_tries` consecutive misses the page
    /// is reloaded and counting starts over. A reload that fails is treated
    /// like a miss; any other session error is fatal. A course row whose label does
    /// not match the target means the page layout changed and is fatal.
    ///
    /// # Returns
    /// The number of reloads that were needed
    pub(super) fn acquire(&mut self) -> Result<u32> {
        let mut tries = 0;
        let mut reloads = 0;

        loop {
            self.check_shutdown()?;

            if tries >= self.config.max_tries {
                warn!(tries, url = %self.url, "course table did not render, reloading page");
                self.events.emit(&MonitorEvent::Reloading);
                reloads += 1;
                tries = 0;

                if let Err(e) = self.session.navigate(&self.url) {
                    warn!(error = %e, url = %self.url, "reload failed");
                    tries += 1;
                    self.pause(self.config.retry_delay)?;
                    continue;
                }
            }

            if self.session.find_by_id(&self.config.table_id)?.is_some() {
                break;
            }

            tries += 1;
            debug!(tries, table = %self.config.table_id, "course table not found yet");
            self.pause(self.config.retry_delay)?;
        }

        let course = self.target.course().to_string();
        let row = self
            .session
            .wait_until_clickable(&course, self.config.row_timeout)?;

        let cells = self.session.cell_texts(&row)?;
        let label = cells.first().map(String::as_str).unwrap_or_default();
        if label != course {
            return Err(WatchError::TargetMismatch {
                expected: course,
                found: label.to_string(),
            });
        }

        self.session.click(&row)?;
        Ok(reloads)
    }
}
