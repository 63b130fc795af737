//! Poll cycle controller
//!
//! The monitor is the heart of `quota-watch`. Each cycle it:
//! - Brings the offerings table up, reloading when it does not render
//! - Reads the quota of every tracked section
//! - Emits an event per changed section, or one "unchanged" event
//! - Sleeps, refreshes the page and starts over
//!
//! There is no successful end state. The loop stops on a fatal error or when
//! shutdown is requested, and the browser session is closed either way.

use chrono::Local;
use tracing::{debug, info};

use super::cache::{PollOutcome, SectionCache};
use super::config::MonitorConfig;
use super::events::{EventSink, MonitorEvent};
use super::guard::SessionGuard;
use crate::browser::PageClient;
use crate::error::{ErrorKind, Result, WatchError};
use crate::models::Target;
use crate::process::Shutdown;

pub struct Monitor<C: PageClient, S: EventSink> {
    pub(super) target: Target,
    pub(super) config: MonitorConfig,
    pub(super) url: String,
    pub(super) session: SessionGuard<C>,
    pub(super) cache: SectionCache,
    pub(super) events: S,
    pub(super) shutdown: Shutdown,
    cycles: u64,
}

impl<C: PageClient, S: EventSink> Monitor<C, S> {
    /// Create a monitor that takes ownership of the browser session.
    pub fn new(
        target: Target,
        config: MonitorConfig,
        client: C,
        events: S,
        shutdown: Shutdown,
    ) -> Self {
        let url = target.offerings_url(&config.offerings_url);

        Self {
            target,
            config,
            url,
            session: SessionGuard::new(client),
            cache: SectionCache::new(),
            events,
            shutdown,
            cycles: 0,
        }
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache(&self) -> &SectionCache {
        &self.cache
    }

    pub fn events(&self) -> &S {
        &self.events
    }

    /// Number of cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Load the offerings page for the target's department.
    pub fn open(&mut self) -> Result<()> {
        info!(url = %self.url, "opening offerings page");
        self.session.navigate(&self.url)
    }

    /// Poll until shutdown is requested or a fatal error occurs.
    ///
    /// The browser session is closed before returning. A shutdown request is
    /// a normal exit and yields `Ok(())`, including when it makes a pending
    /// session call fail.
    pub fn run(&mut self) -> Result<()> {
        let result = self.poll_forever();
        self.session.close();

        match result {
            Err(WatchError::Interrupted) => {
                info!(cycles = self.cycles, "shutdown requested, monitor stopped");
                Ok(())
            }
            // The request raced a WebDriver call that was already in flight.
            Err(e) if e.kind() == ErrorKind::Session && self.shutdown.is_requested() => {
                info!(cycles = self.cycles, error = %e, "shutdown requested, monitor stopped");
                Ok(())
            }
            other => other,
        }
    }

    fn poll_forever(&mut self) -> Result<()> {
        self.open()?;

        loop {
            self.check_shutdown()?;
            self.run_cycle()?;

            self.pause(self.config.poll_interval)?;
            // Refreshing invalidates every element handle; the next cycle
            // starts again from acquisition.
            self.session.refresh()?;
            self.events.emit(&MonitorEvent::NextCycle);
        }
    }

    /// Run one poll: acquire the table, read all sections, report changes.
    ///
    /// The cache is only updated after every section was read successfully.
    pub fn run_cycle(&mut self) -> Result<PollOutcome> {
        self.cycles += 1;
        debug!(cycle = self.cycles, "starting poll");

        let reloads = self.acquire()?;
        if reloads > 0 {
            debug!(reloads, "table acquired after reloading");
        }

        let readings = self.read_sections()?;
        let outcome = self.cache.apply(readings);
        self.report(&outcome);

        Ok(outcome)
    }

    fn report(&mut self, outcome: &PollOutcome) {
        if outcome.is_unchanged() {
            self.events.emit(&MonitorEvent::Unchanged {
                interval: self.config.poll_interval,
            });
            return;
        }

        let at = Local::now();
        for change in &outcome.changes {
            debug!(
                section = %change.section,
                previous = ?change.previous,
                current = %change.current,
                "quota changed"
            );
            self.events.emit(&MonitorEvent::QuotaChanged {
                at,
                course: self.target.course().to_string(),
                section: change.section.clone(),
                quota: change.current.clone(),
            });
        }
    }

    pub(super) fn check_shutdown(&self) -> Result<()> {
        if self.shutdown.is_requested() {
            return Err(WatchError::Interrupted);
        }
        Ok(())
    }

    /// Sleep unless shutdown is requested first.
    pub(super) fn pause(&self, duration: std::time::Duration) -> Result<()> {
        if self.shutdown.sleep(duration) {
            Ok(())
        } else {
            Err(WatchError::Interrupted)
        }
    }
}
