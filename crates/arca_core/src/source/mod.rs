//! Tabular data source contract and implementations.
//!
//! # Responsibility
//! - Define the read-range / write-range contract the core consumes.
//! - Model raw rows as sparse, typed cell slots.
//!
//! # Invariants
//! - Fetched rows are positional: row `i` of a fetch is sheet row
//!   `range.start_row() + i`, including blank rows in the middle.
//! - A batch write is all-or-nothing from the caller's perspective.
//!
//! # See also
//! - `service::spreadsheet` for the consumer side.

use crate::db::DbError;
use crate::error::{CoreError, ErrorKind};
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod range;
mod sqlite;

pub use memory::InMemorySource;
pub use range::RangeSpec;
pub use sqlite::SqliteSource;

/// Numeric sheet identifier used as the batch-write target.
pub type SheetId = i64;

pub type SourceResult<T> = Result<T, SourceError>;

/// Typed value of one populated cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "boolean",
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One raw row: possibly short, possibly sparse.
///
/// A missing trailing slot and a `None` slot both mean "no value"; readers
/// still report them differently for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<Option<CellValue>>,
}

impl Row {
    pub fn new(cells: Vec<Option<CellValue>>) -> Self {
        Self { cells }
    }

    /// Returns the slot at `index`, or `None` when the row is shorter.
    pub fn slot(&self, index: usize) -> Option<&Option<CellValue>> {
        self.cells.get(index)
    }

    /// Returns the populated cell at `index`.
    pub fn cell(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    pub fn cells(&self) -> &[Option<CellValue>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no slot holds a value.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

impl FromIterator<Option<CellValue>> for Row {
    fn from_iter<I: IntoIterator<Item = Option<CellValue>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Overwrite instruction for one row segment.
///
/// Every cell in `[start_column, end_column)` is replaced; cells past the
/// end of `values`, and `None` values, are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub row_index: u32,
    pub start_column: u32,
    pub end_column: u32,
    pub values: Vec<Option<CellValue>>,
}

impl CellUpdate {
    pub fn validate(&self) -> SourceResult<()> {
        if self.end_column <= self.start_column {
            return Err(SourceError::InvalidUpdate(format!(
                "row {} has empty column span {}..{}",
                self.row_index, self.start_column, self.end_column
            )));
        }
        let width = (self.end_column - self.start_column) as usize;
        if self.values.len() > width {
            return Err(SourceError::InvalidUpdate(format!(
                "row {} carries {} values for a {width}-column span",
                self.row_index,
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Value written to absolute `column`, `None` meaning cleared.
    pub(crate) fn value_at(&self, column: u32) -> Option<&CellValue> {
        let offset = column.checked_sub(self.start_column)? as usize;
        self.values.get(offset).and_then(Option::as_ref)
    }
}

/// Errors raised by tabular source implementations.
#[derive(Debug)]
pub enum SourceError {
    Db(DbError),
    InvalidRange(String),
    UnknownSheet(String),
    UnknownSheetId(SheetId),
    InvalidUpdate(String),
    InvalidData(String),
    Unreachable(String),
    Worker(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidRange(value) => write!(f, "invalid range notation `{value}`"),
            Self::UnknownSheet(title) => write!(f, "unknown sheet `{title}`"),
            Self::UnknownSheetId(id) => write!(f, "unknown sheet id {id}"),
            Self::InvalidUpdate(message) => write!(f, "invalid cell update: {message}"),
            Self::InvalidData(message) => write!(f, "invalid stored cell data: {message}"),
            Self::Unreachable(message) => write!(f, "tabular source unreachable: {message}"),
            Self::Worker(message) => write!(f, "tabular source worker failed: {message}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SourceError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SourceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<SourceError> for CoreError {
    fn from(value: SourceError) -> Self {
        CoreError::with_source(ErrorKind::Source, value)
    }
}

/// External row/column store the core reads from and writes to.
///
/// Dropping a returned future cancels the call; implementations must not
/// leave a partially applied batch behind.
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Fetches the rows covered by `range`.
    async fn fetch_range(&self, range: &RangeSpec) -> SourceResult<Vec<Row>>;

    /// Applies all `updates` to sheet `sheet`, or none of them.
    async fn batch_write(&self, sheet: SheetId, updates: Vec<CellUpdate>) -> SourceResult<()>;
}

/// Drops trailing blank rows and trailing empty slots, matching how the
/// upstream store short-circuits unpopulated cells.
pub(crate) fn trim_rows(mut rows: Vec<Vec<Option<CellValue>>>) -> Vec<Row> {
    for cells in &mut rows {
        while matches!(cells.last(), Some(None)) {
            cells.pop();
        }
    }
    while matches!(rows.last(), Some(cells) if cells.is_empty()) {
        rows.pop();
    }
    rows.into_iter().map(Row::new).collect()
}
