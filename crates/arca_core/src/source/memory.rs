//! In-process tabular source.
//!
//! # Responsibility
//! - Back the core with a mutable, inspectable sheet store.
//! - Record fetch/write call counts per sheet for cache diagnostics.
//!
//! # Invariants
//! - Row 0 of every sheet is the header row; callers decide what to put there.
//! - A rejected batch leaves every sheet unchanged.

use super::{trim_rows, CellUpdate, CellValue, RangeSpec, Row, SheetId, SourceError, SourceResult, TabularSource};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct MemorySheet {
    id: SheetId,
    rows: Vec<Vec<Option<CellValue>>>,
    fetches: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    sheets: BTreeMap<String, MemorySheet>,
    write_calls: usize,
    fail_fetches: bool,
    fetch_delay: Option<Duration>,
}

/// Tabular source held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemorySource {
    state: Mutex<MemoryState>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an empty sheet. Re-adding an existing title keeps its rows.
    pub fn add_sheet(&self, id: SheetId, title: impl Into<String>) {
        let mut state = self.lock();
        state
            .sheets
            .entry(title.into())
            .or_insert_with(|| MemorySheet {
                id,
                ..MemorySheet::default()
            })
            .id = id;
    }

    /// Replaces rows starting at `first_row` with `rows`, extending the sheet
    /// as needed.
    pub fn put_rows(&self, title: &str, first_row: u32, rows: Vec<Row>) -> SourceResult<()> {
        let mut state = self.lock();
        let sheet = state
            .sheets
            .get_mut(title)
            .ok_or_else(|| SourceError::UnknownSheet(title.to_string()))?;

        for (offset, row) in rows.into_iter().enumerate() {
            let index = first_row as usize + offset;
            if sheet.rows.len() <= index {
                sheet.rows.resize_with(index + 1, Vec::new);
            }
            sheet.rows[index] = row.cells().to_vec();
        }
        Ok(())
    }

    /// Returns the stored rows of `title` from `first_row` onwards.
    pub fn rows(&self, title: &str, first_row: u32) -> SourceResult<Vec<Row>> {
        let state = self.lock();
        let sheet = state
            .sheets
            .get(title)
            .ok_or_else(|| SourceError::UnknownSheet(title.to_string()))?;
        let rows = sheet
            .rows
            .iter()
            .skip(first_row as usize)
            .cloned()
            .collect();
        Ok(trim_rows(rows))
    }

    /// Number of `fetch_range` calls that targeted `title`.
    pub fn fetch_count(&self, title: &str) -> usize {
        self.lock()
            .sheets
            .get(title)
            .map_or(0, |sheet| sheet.fetches)
    }

    pub fn total_fetch_count(&self) -> usize {
        self.lock().sheets.values().map(|sheet| sheet.fetches).sum()
    }

    /// Number of `batch_write` calls, accepted or rejected.
    pub fn write_count(&self) -> usize {
        self.lock().write_calls
    }

    /// Makes every subsequent fetch fail until switched off.
    pub fn set_fetch_failure(&self, fail: bool) {
        self.lock().fail_fetches = fail;
    }

    /// Adds artificial latency to every fetch.
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        self.lock().fetch_delay = delay;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TabularSource for InMemorySource {
    async fn fetch_range(&self, range: &RangeSpec) -> SourceResult<Vec<Row>> {
        let (rows, delay) = {
            let mut state = self.lock();
            let fail = state.fail_fetches;
            let delay = state.fetch_delay;
            let sheet = state
                .sheets
                .get_mut(range.sheet())
                .ok_or_else(|| SourceError::UnknownSheet(range.sheet().to_string()))?;
            sheet.fetches += 1;
            if fail {
                return Err(SourceError::Unreachable(format!("fetch {range} refused")));
            }

            let start = range.start_column() as usize;
            let end = range.end_column() as usize;
            let rows = sheet
                .rows
                .iter()
                .enumerate()
                .skip(range.start_row() as usize)
                .take_while(|(index, _)| range.contains_row(*index as u32))
                .map(|(_, cells)| {
                    cells
                        .iter()
                        .skip(start)
                        .take(end.saturating_sub(start))
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect();
            (trim_rows(rows), delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(rows)
    }

    async fn batch_write(&self, sheet: SheetId, updates: Vec<CellUpdate>) -> SourceResult<()> {
        let mut state = self.lock();
        state.write_calls += 1;

        for update in &updates {
            update.validate()?;
        }
        let target = state
            .sheets
            .values_mut()
            .find(|candidate| candidate.id == sheet)
            .ok_or(SourceError::UnknownSheetId(sheet))?;

        for update in &updates {
            let index = update.row_index as usize;
            if target.rows.len() <= index {
                target.rows.resize_with(index + 1, Vec::new);
            }
            let cells = &mut target.rows[index];
            if cells.len() < update.end_column as usize {
                cells.resize(update.end_column as usize, None);
            }
            for column in update.start_column..update.end_column {
                cells[column as usize] = update.value_at(column).cloned();
            }
        }
        Ok(())
    }
}
