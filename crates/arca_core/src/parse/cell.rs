//! Typed cell extraction from sparse rows.
//!
//! Every read distinguishes three states: column beyond the row, slot
//! present but empty (`NoData`), and value of the wrong type (`Invalid`).
//! Callers decide per column whether absence is an error.

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::source::{CellValue, Row};

/// Reads a string cell. Empty strings are returned as-is.
pub fn read_str(row: &Row, index: usize) -> CoreResult<&str> {
    match require(row, index)? {
        CellValue::Text(text) => Ok(text.as_str()),
        other => Err(wrong_type(index, other, "string")),
    }
}

pub fn read_number(row: &Row, index: usize) -> CoreResult<f64> {
    match require(row, index)? {
        CellValue::Number(number) => Ok(*number),
        other => Err(wrong_type(index, other, "number")),
    }
}

pub fn read_bool(row: &Row, index: usize) -> CoreResult<bool> {
    match require(row, index)? {
        CellValue::Bool(flag) => Ok(*flag),
        other => Err(wrong_type(index, other, "boolean")),
    }
}

/// Reads an optional string cell: absent and empty both yield `None`.
pub fn read_optional_str(row: &Row, index: usize) -> CoreResult<Option<&str>> {
    match read_str(row, index) {
        Ok("") => Ok(None),
        Ok(text) => Ok(Some(text)),
        Err(err) if err.is(ErrorKind::NoData) => Ok(None),
        Err(err) => Err(err),
    }
}

fn require(row: &Row, index: usize) -> CoreResult<&CellValue> {
    match row.slot(index) {
        Some(Some(value)) => Ok(value),
        Some(None) => Err(CoreError::new(ErrorKind::NoData).context(format!("column {index} is empty"))),
        None => Err(CoreError::new(ErrorKind::NoData).context(format!(
            "column {index} is beyond the row ({} cells)",
            row.len()
        ))),
    }
}

fn wrong_type(index: usize, value: &CellValue, expected: &str) -> CoreError {
    CoreError::new(ErrorKind::Invalid).context(format!(
        "column {index} holds a {}, expected a {expected}",
        value.type_name()
    ))
}
