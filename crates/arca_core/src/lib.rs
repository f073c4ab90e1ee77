//! Tabular-to-domain reconciliation core for building-interior data.
//! This crate is the single source of truth for table layouts, reference
//! resolution and cache invariants.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod parse;
pub mod service;
pub mod source;
pub mod wire;

pub use error::{CoreError, CoreResult, ErrorKind, ResultExt};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use parse::Table;
pub use service::{SlotState, Spreadsheet};
pub use source::{
    CellUpdate, CellValue, InMemorySource, RangeSpec, Row, SheetId, SourceError, SqliteSource,
    TabularSource,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
