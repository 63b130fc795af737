//! A fake offerings page implementing [`PageClient`].
//!
//! Errors mirror what a WebDriver session reports, so the monitor sees the
//! same error kinds as against a real browser.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use quota_watch::browser::{ElementHandle, PageClient};
use quota_watch::process::Shutdown;
use quota_watch::{Result, WatchError};

pub const TABLE_ID: &str = "courses";

/// What the page saw, readable after the page moved into a monitor.
#[derive(Debug, Default)]
pub struct Calls {
    pub navigations: usize,
    pub clicks: usize,
    pub refreshes: usize,
    pub closes: usize,
}

pub struct FakeOfferings {
    course: String,
    course_label: String,
    /// Quotas by section, one map per page load; the last one repeats
    loads: Vec<HashMap<String, String>>,
    load: usize,
    missing_table_lookups: u32,
    stop_after_refreshes: Option<(usize, Shutdown)>,
    calls: Rc<RefCell<Calls>>,
}

impl FakeOfferings {
    pub fn new(course: &str) -> Self {
        Self {
            course: course.to_string(),
            course_label: course.to_string(),
            loads: Vec::new(),
            load: 0,
            missing_table_lookups: 0,
            stop_after_refreshes: None,
            calls: Rc::new(RefCell::new(Calls::default())),
        }
    }

    /// Add the table contents shown after the next page load.
    pub fn then_shows(mut self, quotas: &[(&str, &str)]) -> Self {
        self.loads.push(
            quotas
                .iter()
                .map(|(section, quota)| (section.to_string(), quota.to_string()))
                .collect(),
        );
        self
    }

    pub fn labelled(mut self, label: &str) -> Self {
        self.course_label = label.to_string();
        self
    }

    pub fn table_missing_for(mut self, lookups: u32) -> Self {
        self.missing_table_lookups = lookups;
        self
    }

    pub fn stop_after_refreshes(mut self, refreshes: usize, shutdown: Shutdown) -> Self {
        self.stop_after_refreshes = Some((refreshes, shutdown));
        self
    }

    pub fn calls(&self) -> Rc<RefCell<Calls>> {
        Rc::clone(&self.calls)
    }

    fn quotas(&self) -> Option<&HashMap<String, String>> {
        self.loads.get(self.load.min(self.loads.len().saturating_sub(1)))
    }

    fn section_quota(&self, row_id: &str) -> Option<&String> {
        let section = row_id.strip_prefix(&format!("{}-", self.course))?;
        self.quotas()?.get(section)
    }
}

impl PageClient for FakeOfferings {
    fn navigate(&mut self, _url: &str) -> Result<()> {
        self.calls.borrow_mut().navigations += 1;
        Ok(())
    }

    fn find_by_id(&mut self, id: &str) -> Result<Option<ElementHandle>> {
        if id == TABLE_ID {
            if self.missing_table_lookups > 0 {
                self.missing_table_lookups -= 1;
                return Ok(None);
            }
            return Ok(Some(ElementHandle::new(id)));
        }
        let present = id == self.course || self.section_quota(id).is_some();
        Ok(present.then(|| ElementHandle::new(id)))
    }

    fn wait_until_clickable(
        &mut self,
        id: &str,
        _timeout: Option<Duration>,
    ) -> Result<ElementHandle> {
        self.find_by_id(id)?
            .ok_or_else(|| WatchError::WaitTimeout { id: id.to_string() })
    }

    fn cell_texts(&mut self, row: &ElementHandle) -> Result<Vec<String>> {
        if row.as_str() == self.course {
            return Ok(vec![self.course_label.clone(), "Course title".to_string()]);
        }
        let quota = self
            .section_quota(row.as_str())
            .cloned()
            .ok_or_else(|| WatchError::WebDriver {
                error: "stale element reference".to_string(),
                message: row.as_str().to_string(),
            })?;
        Ok(vec![
            row.as_str().to_string(),
            "Instructor".to_string(),
            quota,
            "Schedule".to_string(),
        ])
    }

    fn click(&mut self, _element: &ElementHandle) -> Result<()> {
        self.calls.borrow_mut().clicks += 1;
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.load += 1;
        let refreshes = {
            let mut calls = self.calls.borrow_mut();
            calls.refreshes += 1;
            calls.refreshes
        };
        if let Some((limit, shutdown)) = &self.stop_after_refreshes {
            if refreshes >= *limit {
                shutdown.request();
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.calls.borrow_mut().closes += 1;
        Ok(())
    }
}
