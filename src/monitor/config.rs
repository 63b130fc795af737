use std::time::Duration;

pub const DEFAULT_OFFERINGS_URL: &str = "https://stars.bilkent.edu.tr/homepage/offerings.php";
pub const DEFAULT_TABLE_ID: &str = "courses";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_TRIES: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Configuration for the poll loop
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Offerings page, without the course code query
    pub offerings_url: String,
    /// `id` of the table that holds every course row
    pub table_id: String,
    pub poll_interval: Duration,
    /// Consecutive table misses before the page is reloaded
    pub max_tries: u32,
    pub retry_delay: Duration,
    /// Limit for the course row to become clickable; `None` waits forever
    pub row_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            offerings_url: DEFAULT_OFFERINGS_URL.to_string(),
            table_id: DEFAULT_TABLE_ID.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_tries: DEFAULT_MAX_TRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            row_timeout: None,
        }
    }
}
