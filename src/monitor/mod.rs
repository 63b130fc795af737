//! Monitor module for quota-watch
//!
//! Polls the offerings table through a [`PageClient`](crate::browser::PageClient),
//! compares each tracked section's quota with the previous poll and emits
//! events for the differences.

mod acquire;
pub mod cache;
mod config;
pub mod core;
mod events;
mod guard;
mod reader;


pub use cache::{PollOutcome, QuotaChange, Reading, SectionCache};
pub use config::{
    MonitorConfig, DEFAULT_MAX_TRIES, DEFAULT_OFFERINGS_URL, DEFAULT_POLL_INTERVAL,
    DEFAULT_RETRY_DELAY, DEFAULT_TABLE_ID,
};
pub use self::core::Monitor;
pub use events::{format_timestamp, EventSink, MonitorEvent, TIMESTAMP_FORMAT};
pub use guard::SessionGuard;
pub use reader::read_quota;
