use arca_core::{CellUpdate, CellValue, RangeSpec, SourceError, SqliteSource, TabularSource};

fn text(value: &str) -> Option<CellValue> {
    Some(CellValue::from(value))
}

fn update(row_index: u32, values: Vec<Option<CellValue>>) -> CellUpdate {
    CellUpdate {
        row_index,
        start_column: 0,
        end_column: 2,
        values,
    }
}

#[tokio::test]
async fn fetch_returns_positional_rows_without_header() {
    let source = SqliteSource::open_in_memory().unwrap();
    let sheet = source.sheet_id("AREAS_MATERIALS").await.unwrap();

    source
        .batch_write(
            sheet,
            vec![
                update(0, vec![text("area"), text("material")]),
                update(1, vec![text("Room A"), text("Brick")]),
                update(3, vec![text("Room B")]),
            ],
        )
        .await
        .unwrap();

    let rows = source
        .fetch_range(&RangeSpec::parse("AREAS_MATERIALS!A2:B").unwrap())
        .await
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].cells(), &[text("Room A"), text("Brick")]);
    assert!(rows[1].is_blank());
    assert_eq!(rows[2].cells(), &[text("Room B")]);
}

#[tokio::test]
async fn typed_values_survive_storage() {
    let source = SqliteSource::open_in_memory().unwrap();
    let sheet = source.sheet_id("MATERIALS").await.unwrap();

    source
        .batch_write(
            sheet,
            vec![CellUpdate {
                row_index: 1,
                start_column: 0,
                end_column: 4,
                values: vec![
                    Some(CellValue::Bool(true)),
                    Some(CellValue::Number(0.25)),
                    None,
                    text("Brick"),
                ],
            }],
        )
        .await
        .unwrap();

    let rows = source
        .fetch_range(&RangeSpec::parse("MATERIALS!A2:O").unwrap())
        .await
        .unwrap();

    assert_eq!(
        rows[0].cells(),
        &[
            Some(CellValue::Bool(true)),
            Some(CellValue::Number(0.25)),
            None,
            text("Brick"),
        ]
    );
}

#[tokio::test]
async fn rejected_batch_writes_nothing() {
    let source = SqliteSource::open_in_memory().unwrap();
    let sheet = source.sheet_id("AREAS_MATERIALS").await.unwrap();
    let range = RangeSpec::parse("AREAS_MATERIALS!A2:B").unwrap();

    let err = source
        .batch_write(
            sheet,
            vec![
                update(1, vec![text("Room A")]),
                update(2, vec![text("Room B"), text("Brick"), text("overflow")]),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidUpdate(_)));
    assert!(source.fetch_range(&range).await.unwrap().is_empty());

    let err = source
        .batch_write(42, vec![update(1, vec![text("Room A")])])
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::UnknownSheetId(42)));
    assert!(source.fetch_range(&range).await.unwrap().is_empty());
}

#[tokio::test]
async fn rewrite_clears_cells_inside_the_span_only() {
    let source = SqliteSource::open_in_memory().unwrap();
    let sheet = source.sheet_id("AREAS_KEYS").await.unwrap();
    source
        .batch_write(
            sheet,
            vec![CellUpdate {
                row_index: 1,
                start_column: 0,
                end_column: 3,
                values: vec![text("Room A"), text("Hall"), text("K-1")],
            }],
        )
        .await
        .unwrap();

    source
        .batch_write(sheet, vec![update(1, vec![text("Room B")])])
        .await
        .unwrap();

    let rows = source
        .fetch_range(&RangeSpec::parse("AREAS_KEYS!A2:C").unwrap())
        .await
        .unwrap();
    assert_eq!(rows[0].cells(), &[text("Room B"), None, text("K-1")]);
}

#[tokio::test]
async fn data_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arca.db");

    {
        let source = SqliteSource::open(&path).unwrap();
        let sheet = source.sheet_id("AREAS").await.unwrap();
        source
            .batch_write(
                sheet,
                vec![CellUpdate {
                    row_index: 1,
                    start_column: 0,
                    end_column: 1,
                    values: vec![text("Room A")],
                }],
            )
            .await
            .unwrap();
    }

    let reopened = SqliteSource::open(&path).unwrap();
    let rows = reopened
        .fetch_range(&RangeSpec::parse("AREAS!A2:A").unwrap())
        .await
        .unwrap();
    assert_eq!(rows[0].cells(), &[text("Room A")]);
}

#[tokio::test]
async fn unknown_sheet_title_is_reported() {
    let source = SqliteSource::open_in_memory().unwrap();

    let err = source
        .fetch_range(&RangeSpec::parse("ROOMS!A2:A").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::UnknownSheet(title) if title == "ROOMS"));
    assert!(source.sheet_id("ROOMS").await.is_err());
}
