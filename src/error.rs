use std::fmt;
use thiserror::Error;

/// How a failure should be treated by the poll loop and reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The page layout no longer matches what the monitor expects.
    Integrity,
    /// The operator asked for something the page does not offer.
    Configuration,
    /// The browser session or the WebDriver server failed.
    Session,
    /// Shutdown was requested while the monitor was waiting.
    Interrupted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Integrity => "integrity",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Session => "session",
            ErrorKind::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("could not click {expected}: row shows '{found}'")]
    TargetMismatch { expected: String, found: String },

    #[error("section row {row_id} shows '{found}'")]
    SectionMismatch { row_id: String, found: String },

    #[error("section row {row_id} has {cells} cell(s), expected at least 2")]
    MissingColumn { row_id: String, cells: usize },

    #[error("could not find section {row_id}")]
    SectionNotFound { row_id: String },

    #[error("timed out waiting for '{id}' to become clickable")]
    WaitTimeout { id: String },

    #[error("webdriver {error}: {message}")]
    WebDriver { error: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected webdriver response: {0}")]
    Protocol(String),

    #[error("geckodriver: {0}")]
    Driver(String),

    #[error("interrupted")]
    Interrupted,
}

impl WatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WatchError::TargetMismatch { .. }
            | WatchError::SectionMismatch { .. }
            | WatchError::MissingColumn { .. } => ErrorKind::Integrity,
            WatchError::SectionNotFound { .. } => ErrorKind::Configuration,
            WatchError::WaitTimeout { .. }
            | WatchError::WebDriver { .. }
            | WatchError::Http(_)
            | WatchError::Protocol(_)
            | WatchError::Driver(_) => ErrorKind::Session,
            WatchError::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// True for WebDriver errors carrying the given W3C error code.
    pub fn is_webdriver_code(&self, code: &str) -> bool {
        matches!(self, WatchError::WebDriver { error, .. } if error == code)
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;

/// Prefix for a fatal error line, naming the kind of the first
/// [`WatchError`] in the chain, e.g. `Error (configuration):`.
pub fn error_label(err: &anyhow::Error) -> String {
    match err.chain().find_map(|cause| cause.downcast_ref::<WatchError>()) {
        Some(watch) => format!("Error ({}):", watch.kind()),
        None => "Error:".to_string(),
    }
}
