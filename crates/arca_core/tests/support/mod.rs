#![allow(dead_code)]

use arca_core::{CellValue, InMemorySource, Row, Table};
use std::sync::Arc;

pub fn text(value: &str) -> Option<CellValue> {
    Some(CellValue::from(value))
}

pub fn flag(value: bool) -> Option<CellValue> {
    Some(CellValue::Bool(value))
}

/// Source with every table's sheet registered and a header row in place.
pub fn empty_source() -> Arc<InMemorySource> {
    let source = InMemorySource::new();
    for (fallback_id, table) in (1..).zip(Table::ALL) {
        let id = table.upload_sheet_id().unwrap_or(fallback_id);
        source.add_sheet(id, table.sheet());
        source
            .put_rows(table.sheet(), 0, vec![Row::new(vec![text("header")])])
            .unwrap();
    }
    Arc::new(source)
}

/// Small but complete building: three areas, two materials, assignments,
/// keys and relations referencing them.
pub fn seeded_source() -> Arc<InMemorySource> {
    let source = empty_source();
    put(&source, Table::Areas, vec![
        vec![text("Room A")],
        vec![text("Room B")],
        vec![text("Corridor")],
    ]);
    put(&source, Table::Materials, vec![
        vec![flag(true), Some(CellValue::Number(0.2)), text("Core"), text("Brick")],
        vec![
            flag(false),
            Some(CellValue::Number(0.0125)),
            None,
            text("Gypsum"),
            text("Board"),
        ],
    ]);
    put(&source, Table::AreaMaterials, vec![
        vec![text("Room A"), text("Brick")],
        vec![text("Room B"), text("")],
        vec![text("Room A"), text("Gypsum")],
    ]);
    put(&source, Table::AreaKeys, vec![
        vec![text("Room A"), text("Corridor"), text("K-1")],
        vec![text("Room B")],
    ]);
    put(&source, Table::Relations, vec![
        vec![flag(false), text("W-1"), text("Room A"), text("Corridor"), text("Brick")],
        vec![flag(true), None, text("Room B"), text(""), text("")],
    ]);
    source
}

pub fn put(source: &InMemorySource, table: Table, rows: Vec<Vec<Option<CellValue>>>) {
    source
        .put_rows(table.sheet(), 1, rows.into_iter().map(Row::new).collect())
        .unwrap();
}

pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}
