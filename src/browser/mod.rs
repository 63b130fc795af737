//! Remote page access
//!
//! [`PageClient`] is everything the monitor needs from a browser session.
//! [`WebDriverSession`] implements it over the W3C WebDriver HTTP protocol
//! and [`DriverProcess`] runs a local geckodriver for it to talk to.

mod driver;
mod webdriver;


pub use driver::DriverProcess;
pub use webdriver::{SessionOptions, WebDriverSession};

use std::time::Duration;

use crate::error::Result;

/// Opaque reference to an element on the current page.
///
/// Handles are invalidated by navigation and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Capability surface of a browser session.
///
/// Lookups distinguish "not on the page yet" (`Ok(None)`) from failures of
/// the session itself (`Err`), so retry loops never swallow real errors.
pub trait PageClient {
    /// Load `url` in the current window.
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Find the element whose `id` attribute equals `id`.
    fn find_by_id(&mut self, id: &str) -> Result<Option<ElementHandle>>;

    /// Block until the element with `id` is displayed and enabled.
    ///
    /// `None` waits without a deadline.
    fn wait_until_clickable(
        &mut self,
        id: &str,
        timeout: Option<Duration>,
    ) -> Result<ElementHandle>;

    /// Texts of the `td` cells of a table row, in document order.
    fn cell_texts(&mut self, row: &ElementHandle) -> Result<Vec<String>>;

    fn click(&mut self, element: &ElementHandle) -> Result<()>;

    fn refresh(&mut self) -> Result<()>;

    /// End the session. Called exactly once by the session guard.
    fn close(&mut self) -> Result<()>;
}
