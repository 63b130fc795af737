use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// Local-time format used in change notifications, e.g. `01.05.2024, 09:03:07`.
pub const TIMESTAMP_FORMAT: &str = "%m.%d.%Y, %H:%M:%S";

pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Events emitted by the monitor, rendered one per output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    QuotaChanged {
        at: DateTime<Local>,
        course: String,
        section: String,
        quota: String,
    },
    /// No tracked section changed during the last poll.
    Unchanged { interval: Duration },
    /// The table stayed missing for too long and the page is being reloaded.
    Reloading,
    /// The page was refreshed and the next poll is starting.
    NextCycle,
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorEvent::QuotaChanged {
                at,
                course,
                section,
                quota,
            } => write!(
                f,
                "[{}] Available quota in {course}-{section}: {quota}",
                format_timestamp(at)
            ),
            MonitorEvent::Unchanged { interval } => write!(
                f,
                "Quotas are unchanged in the interval of {} second(s)",
                interval.as_secs()
            ),
            MonitorEvent::Reloading => write!(f, "Could not load page, reloading"),
            MonitorEvent::NextCycle => write!(f, "------------------------"),
        }
    }
}

/// Destination for monitor events.
pub trait EventSink {
    fn emit(&mut self, event: &MonitorEvent);
}

/// Collects events in memory.
impl EventSink for Vec<MonitorEvent> {
    fn emit(&mut self, event: &MonitorEvent) {
        self.push(event.clone());
    }
}
