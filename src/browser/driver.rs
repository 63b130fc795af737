//! Local geckodriver process management.

use reqwest::blocking::Client;
use serde_json::Value;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::error::{Result, WatchError};

/// How long geckodriver gets to answer `/status` after launch.
const READY_TIMEOUT: Duration = Duration::from_secs(15);
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// How long to wait for the process to exit after it has been killed.
const REAP_TIMEOUT: Duration = Duration::from_secs(5);

/// A geckodriver child process listening on a local port.
///
/// The process is killed and reaped when this value is dropped, so it must
/// outlive any session opened against it.
pub struct DriverProcess {
    child: Child,
    url: String,
}

impl DriverProcess {
    /// Launch geckodriver and wait until it accepts sessions.
    ///
    /// # Arguments
    /// * `binary` - Explicit geckodriver path; `None` searches `PATH`
    pub fn spawn(binary: Option<&Path>) -> Result<Self> {
        let path = resolve_binary(binary)?;
        let port = free_port()?;

        info!(path = %path.display(), port, "starting geckodriver");

        let mut command = Command::new(&path);
        command
            .arg("--port")
            .arg(port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        // Own process group: Ctrl-C in the terminal must not kill geckodriver
        // before the session has been deleted.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command
            .spawn()
            .map_err(|e| WatchError::Driver(format!("failed to launch {}: {e}", path.display())))?;

        let mut process = Self {
            child,
            url: format!("http://127.0.0.1:{port}"),
        };
        process.wait_ready(READY_TIMEOUT)?;

        Ok(process)
    }

    /// Base URL of the WebDriver endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn wait_ready(&mut self, timeout: Duration) -> Result<()> {
        let client = Client::builder().timeout(Duration::from_secs(1)).build()?;
        let status_url = format!("{}/status", self.url);
        let started = Instant::now();

        loop {
            if let Some(status) = self
                .child
                .try_wait()
                .map_err(|e| WatchError::Driver(format!("failed to poll process: {e}")))?
            {
                return Err(WatchError::Driver(format!("exited during startup ({status})")));
            }

            let ready = client
                .get(&status_url)
                .send()
                .and_then(|response| response.json::<Value>())
                .map(|body| is_ready(&body))
                .unwrap_or(false);
            if ready {
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "geckodriver ready");
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(WatchError::Driver(format!(
                    "not ready after {}s",
                    timeout.as_secs()
                )));
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
    }
}

impl Drop for DriverProcess {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "geckodriver already stopped");
        }
        match self.child.wait_timeout(REAP_TIMEOUT) {
            Ok(Some(_)) => debug!("geckodriver stopped"),
            Ok(None) => warn!("geckodriver did not exit within {}s", REAP_TIMEOUT.as_secs()),
            Err(e) => warn!(error = %e, "failed to reap geckodriver"),
        }
    }
}

fn resolve_binary(binary: Option<&Path>) -> Result<PathBuf> {
    match binary {
        Some(path) => Ok(path.to_path_buf()),
        None => which::which("geckodriver").map_err(|e| {
            WatchError::Driver(format!(
                "not found on PATH ({e}); set `geckodriver` in the config or pass --webdriver-url"
            ))
        }),
    }
}

/// Ask the OS for an unused local port.
fn free_port() -> Result<u16> {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .map_err(|e| WatchError::Driver(format!("no free local port: {e}")))
}

/// Reads the `ready` flag of a W3C `/status` response.
fn is_ready(body: &Value) -> bool {
    body.get("value")
        .and_then(|value| value.get("ready"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
