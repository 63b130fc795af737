//! Last observed quota per section.

use std::collections::HashMap;

/// One section's quota as read during a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub section: String,
    pub quota: String,
}

impl Reading {
    pub fn new(section: impl Into<String>, quota: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            quota: quota.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaChange {
    pub section: String,
    /// `None` on the first reading of the section
    pub previous: Option<String>,
    pub current: String,
}

/// Differences found by one poll, in tracking order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollOutcome {
    pub changes: Vec<QuotaChange>,
}

impl PollOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Section -> quota mapping. A section without an entry has not been read yet.
///
/// Quotas are opaque strings and are only compared for equality.
#[derive(Debug, Clone, Default)]
pub struct SectionCache {
    quotas: HashMap<String, String>,
}

impl SectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str) -> Option<&str> {
        self.quotas.get(section).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.quotas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotas.is_empty()
    }

    /// Diff a complete poll against the cache, then store every reading.
    ///
    /// Callers pass readings only once all sections of a poll were read, so
    /// the cache never mixes values from two polls.
    pub fn apply(&mut self, readings: Vec<Reading>) -> PollOutcome {
        let changes = readings
            .iter()
            .filter(|reading| self.get(&reading.section) != Some(reading.quota.as_str()))
            .map(|reading| QuotaChange {
                section: reading.section.clone(),
                previous: self.quotas.get(&reading.section).cloned(),
                current: reading.quota.clone(),
            })
            .collect();

        for reading in readings {
            self.quotas.insert(reading.section, reading.quota);
        }

        PollOutcome { changes }
    }
}
