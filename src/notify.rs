//! Console and desktop output for monitor events.
//!
//! Every event is printed to stdout, one line each. Quota changes can also
//! raise a desktop notification, using notify-send on Linux and osascript on
//! macOS.

use colored::Colorize;
use std::process::Command;
use tracing::warn;

use crate::monitor::{EventSink, MonitorEvent};

/// Prints events to stdout and optionally forwards quota changes to the desktop.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    desktop: bool,
}

impl ConsoleSink {
    pub fn new(desktop: bool) -> Self {
        Self { desktop }
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &MonitorEvent) {
        let line = event.to_string();
        match event {
            MonitorEvent::QuotaChanged {
                course,
                section,
                quota,
                ..
            } => {
                println!("{}", line.green().bold());
                if self.desktop {
                    notify_quota_changed(course, section, quota);
                }
            }
            MonitorEvent::Unchanged { .. } => println!("{}", line.dimmed()),
            MonitorEvent::Reloading => println!("{}", line.yellow()),
            MonitorEvent::NextCycle => println!("{line}"),
        }
    }
}

/// Send a desktop notification.
///
/// Failures are logged but never propagated - notifications are best-effort.
pub fn send_desktop_notification(title: &str, body: &str) {
    let result = if cfg!(target_os = "macos") {
        send_macos_notification(title, body)
    } else {
        send_linux_notification(title, body)
    };

    if let Err(e) = result {
        warn!("Desktop notification failed: {e}");
    }
}

fn send_linux_notification(title: &str, body: &str) -> Result<(), String> {
    Command::new("notify-send")
        .arg("--urgency=critical")
        .arg("--app-name=quota-watch")
        .arg(title)
        .arg(body)
        .output()
        .map_err(|e| format!("notify-send failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("notify-send exited with: {}", output.status))
            }
        })
}

fn send_macos_notification(title: &str, body: &str) -> Result<(), String> {
    let script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_applescript_string(body),
        escape_applescript_string(title)
    );

    Command::new("osascript")
        .arg("-e")
        .arg(&script)
        .output()
        .map_err(|e| format!("osascript failed: {e}"))
        .and_then(|output| {
            if output.status.success() {
                Ok(())
            } else {
                Err(format!("osascript exited with: {}", output.status))
            }
        })
}

/// Escape a string for use inside an AppleScript string literal.
pub fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Title and body of the notification for a quota change.
pub fn quota_message(course: &str, section: &str, quota: &str) -> (String, String) {
    (
        format!("quota-watch: {course}-{section}"),
        format!("Available quota: {quota}"),
    )
}

/// Notify the user that a section's quota changed.
pub fn notify_quota_changed(course: &str, section: &str, quota: &str) {
    let (title, body) = quota_message(course, section, quota);
    send_desktop_notification(&title, &body);
}
