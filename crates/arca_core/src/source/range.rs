//! A1-notation range specs (`SHEET!A2:E`).

use super::{SourceError, SourceResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static RANGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<sheet>[^!]+)!(?P<c1>[A-Z]+)(?P<r1>[1-9][0-9]*):(?P<c2>[A-Z]+)(?P<r2>[1-9][0-9]*)?$")
        .expect("range pattern is a valid regex")
});

/// Named sheet plus a rectangular (optionally open-ended) cell span.
///
/// Rows and columns are stored zero-based; end bounds are exclusive.
/// Only `parse` builds a spec, so `end_column > start_column` always holds
/// and the span covers at least one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    sheet: String,
    start_row: u32,
    end_row: Option<u32>,
    start_column: u32,
    end_column: u32,
}

impl RangeSpec {
    /// Parses `SHEET!<col><row>:<col>[<row>]`.
    pub fn parse(notation: &str) -> SourceResult<Self> {
        let invalid = || SourceError::InvalidRange(notation.to_string());
        let captures = RANGE_PATTERN.captures(notation.trim()).ok_or_else(invalid)?;

        let sheet = captures["sheet"].trim().to_string();
        if sheet.is_empty() {
            return Err(invalid());
        }

        let start_column = column_index(&captures["c1"]).ok_or_else(invalid)?;
        let end_column = column_index(&captures["c2"]).ok_or_else(invalid)?;
        let first_row: u32 = captures["r1"].parse().map_err(|_| invalid())?;
        let last_row = match captures.name("r2") {
            Some(value) => Some(value.as_str().parse::<u32>().map_err(|_| invalid())?),
            None => None,
        };

        if end_column < start_column || last_row.is_some_and(|last| last < first_row) {
            return Err(invalid());
        }

        Ok(Self {
            sheet,
            start_row: first_row - 1,
            end_row: last_row,
            start_column,
            end_column: end_column + 1,
        })
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    pub fn end_row(&self) -> Option<u32> {
        self.end_row
    }

    pub fn start_column(&self) -> u32 {
        self.start_column
    }

    pub fn end_column(&self) -> u32 {
        self.end_column
    }

    pub fn width(&self) -> u32 {
        self.end_column - self.start_column
    }

    pub fn contains_row(&self, row_index: u32) -> bool {
        row_index >= self.start_row && self.end_row.map_or(true, |end| row_index < end)
    }
}

impl FromStr for RangeSpec {
    type Err = SourceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for RangeSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}!{}{}:{}",
            self.sheet,
            column_letters(self.start_column),
            self.start_row + 1,
            column_letters(self.end_column - 1)
        )?;
        if let Some(end) = self.end_row {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

fn column_index(letters: &str) -> Option<u32> {
    let mut value: u32 = 0;
    for byte in letters.bytes() {
        let digit = u32::from(byte.checked_sub(b'A')?) + 1;
        value = value.checked_mul(26)?.checked_add(digit)?;
    }
    value.checked_sub(1)
}

fn column_letters(index: u32) -> String {
    let mut remaining = index + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push(char::from(b'A' + digit as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}
