//! Reconciliation cache services.
//!
//! # Responsibility
//! - Own the lazily loaded table snapshots shared by every request.
//! - Expose read-to-JSON and upload-from-JSON entry points.
//!
//! # See also
//! - `parse` for table layouts and the dependency graph.

mod slot;
pub mod spreadsheet;

pub use slot::SlotState;
pub use spreadsheet::Spreadsheet;
