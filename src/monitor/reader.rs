use super::cache::Reading;
use super::core::Monitor;
use super::events::EventSink;
use crate::browser::PageClient;
use crate::error::{Result, WatchError};

impl<C: PageClient, S: EventSink> Monitor<C, S> {
    /// Read every tracked section in tracking order.
    ///
    /// Stops at the first failure; nothing read so far is kept.
    pub(super) fn read_sections(&mut self) -> Result<Vec<Reading>> {
        let sections = self.target.sections().to_vec();
        let mut readings = Vec::with_capacity(sections.len());

        for section in sections {
            let row_id = self.target.row_id(&section);
            let row = self
                .session
                .find_by_id(&row_id)?
                .ok_or_else(|| WatchError::SectionNotFound {
                    row_id: row_id.clone(),
                })?;

            let cells = self.session.cell_texts(&row)?;
            let quota = read_quota(&row_id, &cells)?;
            readings.push(Reading { section, quota });
        }

        Ok(readings)
    }
}

/// Extract the quota (second to last cell) of a section row.
///
/// The first cell must show the row's own identifier.
pub fn read_quota(row_id: &str, cells: &[String]) -> Result<String> {
    if cells.len() < 2 {
        return Err(WatchError::MissingColumn {
            row_id: row_id.to_string(),
            cells: cells.len(),
        });
    }
    if cells[0] != row_id {
        return Err(WatchError::SectionMismatch {
            row_id: row_id.to_string(),
            found: cells[0].clone(),
        });
    }

    Ok(cells[cells.len() - 2].clone())
}
