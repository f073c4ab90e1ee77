//! `AREAS` table: one required name column.

use super::cell::read_optional_str;
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::{Area, Areas};
use crate::source::{CellValue, Row};
use log::debug;

pub(crate) const RANGE: &str = "AREAS!A2:A";

const NAME: usize = 0;

/// Builds the area catalog. Repeated names keep their first position.
pub fn parse_areas(rows: &[Row]) -> CoreResult<Areas> {
    let mut areas = Areas::new();

    for (index, row) in rows.iter().enumerate() {
        let name = read_optional_str(row, NAME)
            .with_context(|| format!("error reading area name in row {index}"))?
            .ok_or_else(|| {
                CoreError::new(ErrorKind::Invalid).context(format!("empty area name in row {index}"))
            })?;

        if areas.insert(Area::new(name)).is_err() {
            debug!("event=table_parse module=parse table=areas status=skip reason=duplicate row={index}");
        }
    }

    Ok(areas)
}

/// Cell values written for one uploaded area.
pub fn area_row(area: &Area) -> Vec<Option<CellValue>> {
    vec![Some(CellValue::from(area.name.as_str()))]
}

#[cfg(test)]
mod tests {
    use super::parse_areas;
    use crate::error::ErrorKind;
    use crate::source::{CellValue, Row};

    fn name_row(name: &str) -> Row {
        Row::new(vec![Some(CellValue::from(name))])
    }

    #[test]
    fn keeps_first_seen_order_and_collapses_duplicates() {
        let rows = vec![name_row("Room B"), name_row("Room A"), name_row("Room B")];
        let areas = parse_areas(&rows).unwrap();

        let names: Vec<&str> = areas.iter().map(|area| area.name.as_str()).collect();
        assert_eq!(names, ["Room B", "Room A"]);
    }

    #[test]
    fn empty_name_fails_whole_load() {
        let rows = vec![name_row("Room A"), name_row(""), name_row("Room C")];
        let err = parse_areas(&rows).unwrap_err();

        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.to_string(), "empty area name in row 1: invalid");
    }

    #[test]
    fn blank_cell_is_an_empty_name() {
        let blank_row = vec![name_row("Room A"), Row::default(), name_row("Room C")];
        let err = parse_areas(&blank_row).unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.to_string(), "empty area name in row 1: invalid");

        let empty_slot = vec![Row::new(vec![None])];
        assert!(parse_areas(&empty_slot).unwrap_err().is(ErrorKind::Invalid));
    }

    #[test]
    fn non_text_name_is_invalid() {
        let rows = vec![Row::new(vec![Some(CellValue::Number(4.0))])];
        let err = parse_areas(&rows).unwrap_err();

        assert!(err.is(ErrorKind::Invalid));
        assert!(err.to_string().starts_with("error reading area name in row 0"));
    }
}
