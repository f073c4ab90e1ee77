//! SQLite-backed tabular source.
//!
//! # Responsibility
//! - Persist sheets as sparse `(sheet, row, column) -> value` cells.
//! - Serve range reads and transactional batch writes off the async runtime.
//!
//! # Invariants
//! - Blocking SQLite work only runs inside `spawn_blocking`.
//! - One `batch_write` is one transaction: either every update lands or none.

use super::{trim_rows, CellUpdate, CellValue, RangeSpec, Row, SheetId, SourceError, SourceResult, TabularSource};
use crate::db::{open_db, open_db_in_memory};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task;

/// Tabular source stored in a local SQLite database.
#[derive(Clone)]
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSource {
    /// Opens (or creates) the store at `path` and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> SourceResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Looks up the sheet id registered for `title`.
    pub async fn sheet_id(&self, title: &str) -> SourceResult<SheetId> {
        let title = title.to_string();
        self.run(move |conn| find_sheet_id(conn, &title)).await
    }

    async fn run<T, F>(&self, work: F) -> SourceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> SourceResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            work(&mut guard)
        })
        .await
        .map_err(|err| SourceError::Worker(err.to_string()))?
    }
}

#[async_trait]
impl TabularSource for SqliteSource {
    async fn fetch_range(&self, range: &RangeSpec) -> SourceResult<Vec<Row>> {
        let range = range.clone();
        self.run(move |conn| fetch_rows(conn, &range)).await
    }

    async fn batch_write(&self, sheet: SheetId, updates: Vec<CellUpdate>) -> SourceResult<()> {
        self.run(move |conn| apply_updates(conn, sheet, &updates))
            .await
    }
}

fn lock(conn: &Mutex<Connection>) -> SourceResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| SourceError::Worker("sqlite connection lock poisoned".to_string()))
}

fn find_sheet_id(conn: &Connection, title: &str) -> SourceResult<SheetId> {
    conn.query_row(
        "SELECT sheet_id FROM sheets WHERE title = ?1;",
        [title],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| SourceError::UnknownSheet(title.to_string()))
}

fn fetch_rows(conn: &Connection, range: &RangeSpec) -> SourceResult<Vec<Row>> {
    let sheet_id = find_sheet_id(conn, range.sheet())?;
    let mut stmt = conn.prepare(
        "SELECT row_index, column_index, value_kind, text_value, number_value, bool_value
         FROM cells
         WHERE sheet_id = ?1
           AND row_index >= ?2
           AND (?3 IS NULL OR row_index < ?3)
           AND column_index >= ?4
           AND column_index < ?5
         ORDER BY row_index ASC, column_index ASC;",
    )?;

    let width = range.width() as usize;
    let mut rows: Vec<Vec<Option<CellValue>>> = Vec::new();
    let mut cursor = stmt.query(params![
        sheet_id,
        range.start_row(),
        range.end_row(),
        range.start_column(),
        range.end_column(),
    ])?;

    while let Some(record) = cursor.next()? {
        let row_index: u32 = record.get("row_index")?;
        let column_index: u32 = record.get("column_index")?;
        let value = parse_cell(
            record.get("value_kind")?,
            record.get("text_value")?,
            record.get("number_value")?,
            record.get("bool_value")?,
        )
        .map_err(|message| {
            SourceError::InvalidData(format!(
                "{message} at {}!row {row_index} column {column_index}",
                range.sheet()
            ))
        })?;

        let offset = (row_index - range.start_row()) as usize;
        if rows.len() <= offset {
            rows.resize_with(offset + 1, || vec![None; width]);
        }
        rows[offset][(column_index - range.start_column()) as usize] = Some(value);
    }

    Ok(trim_rows(rows))
}

fn apply_updates(conn: &mut Connection, sheet: SheetId, updates: &[CellUpdate]) -> SourceResult<()> {
    for update in updates {
        update.validate()?;
    }

    let tx = conn.transaction()?;
    let known: Option<i64> = tx
        .query_row(
            "SELECT 1 FROM sheets WHERE sheet_id = ?1;",
            [sheet],
            |row| row.get(0),
        )
        .optional()?;
    if known.is_none() {
        return Err(SourceError::UnknownSheetId(sheet));
    }

    {
        let mut clear = tx.prepare(
            "DELETE FROM cells
             WHERE sheet_id = ?1 AND row_index = ?2 AND column_index >= ?3 AND column_index < ?4;",
        )?;
        let mut insert = tx.prepare(
            "INSERT INTO cells (sheet_id, row_index, column_index, value_kind, text_value, number_value, bool_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        )?;

        for update in updates {
            clear.execute(params![
                sheet,
                update.row_index,
                update.start_column,
                update.end_column
            ])?;
            for column in update.start_column..update.end_column {
                let Some(value) = update.value_at(column) else {
                    continue;
                };
                let (kind, text, number, flag) = cell_columns(value);
                insert.execute(params![
                    sheet,
                    update.row_index,
                    column,
                    kind,
                    text,
                    number,
                    flag
                ])?;
            }
        }
    }

    tx.commit()?;
    Ok(())
}

fn cell_columns(value: &CellValue) -> (&'static str, Option<&str>, Option<f64>, Option<i64>) {
    match value {
        CellValue::Text(text) => ("text", Some(text.as_str()), None, None),
        CellValue::Number(number) => ("number", None, Some(*number), None),
        CellValue::Bool(flag) => ("bool", None, None, Some(i64::from(*flag))),
    }
}

fn parse_cell(
    kind: String,
    text: Option<String>,
    number: Option<f64>,
    flag: Option<i64>,
) -> Result<CellValue, String> {
    match (kind.as_str(), text, number, flag) {
        ("text", Some(text), _, _) => Ok(CellValue::Text(text)),
        ("number", _, Some(number), _) => Ok(CellValue::Number(number)),
        ("bool", _, _, Some(0)) => Ok(CellValue::Bool(false)),
        ("bool", _, _, Some(1)) => Ok(CellValue::Bool(true)),
        (other, ..) => Err(format!("value of kind `{other}` has no matching payload")),
    }
}
