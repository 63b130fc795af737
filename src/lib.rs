//! Watches course section quotas on the offerings page and reports changes.
//!
//! The [`monitor::Monitor`] drives a browser session through the
//! [`browser::PageClient`] surface, keeps the last seen quota of every
//! tracked section and emits [`monitor::MonitorEvent`]s when they change.

pub mod browser;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod process;
pub mod validation;

pub use error::{error_label, ErrorKind, Result, WatchError};
