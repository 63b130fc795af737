//! Blocking W3C WebDriver client.
//!
//! Only the handful of endpoints the monitor uses are implemented. Every
//! response is unwrapped from its `value` member; WebDriver error payloads
//! become [`WatchError::WebDriver`] so callers can match on the error code.

use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{ElementHandle, PageClient};
use crate::error::{Result, WatchError};
use crate::process::Shutdown;

/// Key under which W3C drivers return element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const NO_SUCH_ELEMENT: &str = "no such element";
const STALE_ELEMENT: &str = "stale element reference";

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run Firefox without a window
    pub headless: bool,
    /// Delay between checks while waiting for an element
    pub wait_poll_interval: Duration,
    pub connect_timeout: Duration,
    /// Upper bound for a single command; navigation blocks until the page loads
    pub request_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            wait_poll_interval: Duration::from_millis(250),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// A live WebDriver session driving one Firefox window.
pub struct WebDriverSession {
    client: Client,
    session_url: String,
    options: SessionOptions,
    shutdown: Shutdown,
}

impl WebDriverSession {
    /// Open a new session on the WebDriver server at `webdriver_url`.
    pub fn start(webdriver_url: &str, options: SessionOptions, shutdown: Shutdown) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()?;

        let base = webdriver_url.trim_end_matches('/');
        debug!(url = base, headless = options.headless, "creating WebDriver session");

        let response = client
            .post(format!("{base}/session"))
            .json(&capabilities(options.headless))
            .send()?;
        let value = read_response(response)?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WatchError::Protocol("new session response has no sessionId".to_string())
            })?;

        info!(session_id, "browser session started");

        Ok(Self {
            client,
            session_url: format!("{base}/session/{session_id}"),
            options,
            shutdown,
        })
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        debug!(path, "webdriver POST");
        let response = self
            .client
            .post(format!("{}/{path}", self.session_url))
            .json(body)
            .send()?;
        read_response(response)
    }

    fn get(&self, path: &str) -> Result<Value> {
        debug!(path, "webdriver GET");
        let response = self
            .client
            .get(format!("{}/{path}", self.session_url))
            .send()?;
        read_response(response)
    }

    fn element_flag(&self, element: &ElementHandle, property: &str) -> Result<bool> {
        self.get(&format!("element/{}/{property}", element.as_str()))?
            .as_bool()
            .ok_or_else(|| WatchError::Protocol(format!("element {property} is not a boolean")))
    }

    fn is_clickable(&self, element: &ElementHandle) -> Result<bool> {
        Ok(self.element_flag(element, "displayed")? && self.element_flag(element, "enabled")?)
    }

    fn element_text(&self, element: &ElementHandle) -> Result<String> {
        self.get(&format!("element/{}/text", element.as_str()))?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| WatchError::Protocol("element text is not a string".to_string()))
    }
}

impl PageClient for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.post("url", &json!({ "url": url }))?;
        Ok(())
    }

    fn find_by_id(&mut self, id: &str) -> Result<Option<ElementHandle>> {
        let query = json!({ "using": "css selector", "value": id_selector(id) });
        match self.post("element", &query) {
            Ok(value) => element_from(&value).map(Some),
            Err(e) if e.is_webdriver_code(NO_SUCH_ELEMENT) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn wait_until_clickable(
        &mut self,
        id: &str,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle> {
        let started = Instant::now();
        loop {
            if let Some(element) = self.find_by_id(id)? {
                match self.is_clickable(&element) {
                    Ok(true) => return Ok(element),
                    Ok(false) => {}
                    // Re-rendered between lookup and check; look it up again.
                    Err(e) if e.is_webdriver_code(STALE_ELEMENT) => {}
                    Err(e) => return Err(e),
                }
            }

            if timeout.is_some_and(|limit| started.elapsed() >= limit) {
                return Err(WatchError::WaitTimeout { id: id.to_string() });
            }
            if !self.shutdown.sleep(self.options.wait_poll_interval) {
                return Err(WatchError::Interrupted);
            }
        }
    }

    fn cell_texts(&mut self, row: &ElementHandle) -> Result<Vec<String>> {
        let query = json!({ "using": "tag name", "value": "td" });
        let cells = self.post(&format!("element/{}/elements", row.as_str()), &query)?;
        let cells = cells
            .as_array()
            .ok_or_else(|| {
                WatchError::Protocol("find elements did not return a list".to_string())
            })?;

        cells
            .iter()
            .map(|cell| self.element_text(&element_from(cell)?))
            .collect()
    }

    fn click(&mut self, element: &ElementHandle) -> Result<()> {
        self.post(&format!("element/{}/click", element.as_str()), &json!({}))?;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.post("refresh", &json!({}))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        debug!("deleting WebDriver session");
        let response = self.client.delete(&self.session_url).send()?;
        read_response(response)?;
        Ok(())
    }
}

/// Capabilities for a Firefox session.
fn capabilities(headless: bool) -> Value {
    let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
    json!({
        "capabilities": {
            "alwaysMatch": {
                "browserName": "firefox",
                "moz:firefoxOptions": { "args": args }
            }
        }
    })
}

/// CSS selector matching an exact `id` attribute. Course ids contain spaces,
/// so `#id` syntax cannot be used.
fn id_selector(id: &str) -> String {
    let escaped = id.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[id=\"{escaped}\"]")
}

fn element_from(value: &Value) -> Result<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .and_then(Value::as_str)
        .map(ElementHandle::new)
        .ok_or_else(|| WatchError::Protocol(format!("not an element reference: {value}")))
}

fn read_response(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text()?;
    let body: Value = serde_json::from_str(&text)
        .map_err(|e| WatchError::Protocol(format!("HTTP {status}: invalid JSON body: {e}")))?;
    unwrap_value(status.is_success(), body)
}

fn unwrap_value(success: bool, mut body: Value) -> Result<Value> {
    let value = body.get_mut("value").map(Value::take).unwrap_or(Value::Null);
    if success {
        return Ok(value);
    }

    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(WatchError::WebDriver { error, message })
}
