//! `MATERIALS` table: wall materials with physical and presentational
//! attributes.
//!
//! Layout: isStructural, thickness, function, name, then eleven optional
//! descriptive columns.

use super::cell::{read_bool, read_number, read_optional_str, read_str};
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::{Material, Materials};
use crate::source::{CellValue, Row};

pub(crate) const RANGE: &str = "MATERIALS!A2:O";

const IS_STRUCTURAL: usize = 0;
const THICKNESS: usize = 1;
const FUNCTION: usize = 2;
const NAME: usize = 3;
const CATEGORY: usize = 4;
const CUT_BACKGROUND_PATTERN_COLOR: usize = 5;
const CUT_BACKGROUND_PATTERN_ID: usize = 6;
const CUT_FOREGROUND_PATTERN_COLOR: usize = 7;
const CUT_FOREGROUND_PATTERN_ID: usize = 8;
const SURFACE_FOREGROUND_PATTERN_COLOR: usize = 9;
const SURFACE_FOREGROUND_PATTERN_ID: usize = 10;
const MARK: usize = 11;
const KEYNOTE: usize = 12;
const DESCRIPTION: usize = 13;
const MANUFACTURER: usize = 14;
const WIDTH: usize = 15;

/// Builds the material catalog.
///
/// # Errors
/// - `NoData` when a row has no name (the load is aborted, not truncated).
/// - `Invalid` for negative thickness or a repeated name.
pub fn parse_materials(rows: &[Row]) -> CoreResult<Materials> {
    let mut materials = Materials::new();

    for (index, row) in rows.iter().enumerate() {
        let material = parse_row(row, index)?;
        if materials.insert(material).is_err() {
            return Err(CoreError::new(ErrorKind::Invalid).context(format!(
                "duplicate material name {} in row {index}",
                read_str(row, NAME).unwrap_or_default()
            )));
        }
    }

    Ok(materials)
}

fn parse_row(row: &Row, index: usize) -> CoreResult<Material> {
    let name = read_str(row, NAME)
        .with_context(|| format!("error reading material name in row {index}"))?;
    if name.is_empty() {
        return Err(CoreError::new(ErrorKind::NoData)
            .context(format!("empty material name in row {index}")));
    }

    let thickness = read_number(row, THICKNESS)
        .with_context(|| format!("error reading material thickness in row {index}"))?;
    if !thickness.is_finite() || thickness < 0.0 {
        return Err(CoreError::new(ErrorKind::Invalid)
            .context(format!("material thickness {thickness} in row {index} is out of range")));
    }

    let is_structural = read_bool(row, IS_STRUCTURAL)
        .with_context(|| format!("error reading isStructural in row {index}"))?;

    let optional = |column: usize, field: &str| -> CoreResult<Option<String>> {
        read_optional_str(row, column)
            .map(|value| value.map(str::to_string))
            .with_context(|| format!("error reading {field} in row {index}"))
    };

    Ok(Material {
        name: name.to_string(),
        thickness,
        is_structural,
        function: optional(FUNCTION, "function")?,
        category: optional(CATEGORY, "category")?,
        cut_background_pattern_color: optional(CUT_BACKGROUND_PATTERN_COLOR, "cutBackgroundPatternColor")?,
        cut_background_pattern_id: optional(CUT_BACKGROUND_PATTERN_ID, "cutBackgroundPatternId")?,
        cut_foreground_pattern_color: optional(CUT_FOREGROUND_PATTERN_COLOR, "cutForegroundPatternColor")?,
        cut_foreground_pattern_id: optional(CUT_FOREGROUND_PATTERN_ID, "cutForegroundPatternId")?,
        surface_foreground_pattern_color: optional(SURFACE_FOREGROUND_PATTERN_COLOR, "surfaceForegroundPatternColor")?,
        surface_foreground_pattern_id: optional(SURFACE_FOREGROUND_PATTERN_ID, "surfaceForegroundPatternId")?,
        mark: optional(MARK, "mark")?,
        keynote: optional(KEYNOTE, "keynote")?,
        description: optional(DESCRIPTION, "description")?,
        manufacturer: optional(MANUFACTURER, "manufacturer")?,
    })
}

/// Cell values written for one uploaded material, in read layout.
pub fn material_row(material: &Material) -> Vec<Option<CellValue>> {
    let text = |value: &Option<String>| value.as_deref().map(CellValue::from);

    let mut cells = vec![None; WIDTH];
    cells[IS_STRUCTURAL] = Some(CellValue::Bool(material.is_structural));
    cells[THICKNESS] = Some(CellValue::Number(material.thickness));
    cells[FUNCTION] = text(&material.function);
    cells[NAME] = Some(CellValue::from(material.name.as_str()));
    cells[CATEGORY] = text(&material.category);
    cells[CUT_BACKGROUND_PATTERN_COLOR] = text(&material.cut_background_pattern_color);
    cells[CUT_BACKGROUND_PATTERN_ID] = text(&material.cut_background_pattern_id);
    cells[CUT_FOREGROUND_PATTERN_COLOR] = text(&material.cut_foreground_pattern_color);
    cells[CUT_FOREGROUND_PATTERN_ID] = text(&material.cut_foreground_pattern_id);
    cells[SURFACE_FOREGROUND_PATTERN_COLOR] = text(&material.surface_foreground_pattern_color);
    cells[SURFACE_FOREGROUND_PATTERN_ID] = text(&material.surface_foreground_pattern_id);
    cells[MARK] = text(&material.mark);
    cells[KEYNOTE] = text(&material.keynote);
    cells[DESCRIPTION] = text(&material.description);
    cells[MANUFACTURER] = text(&material.manufacturer);
    cells
}

#[cfg(test)]
mod tests {
    use super::{material_row, parse_materials};
    use crate::error::ErrorKind;
    use crate::model::Material;
    use crate::source::{CellValue, Row};

    fn row(is_structural: bool, thickness: f64, name: &str) -> Row {
        Row::new(vec![
            Some(CellValue::Bool(is_structural)),
            Some(CellValue::Number(thickness)),
            Some(CellValue::from("Core")),
            Some(CellValue::from(name)),
        ])
    }

    #[test]
    fn parses_required_and_optional_columns() {
        let mut full = material_row(&Material::new("Gypsum", 0.0125, false));
        full[12] = Some(CellValue::from("09 29 00.A1"));
        full[14] = Some(CellValue::from("Acme"));
        let rows = vec![row(true, 0.2, "Brick"), Row::new(full)];

        let materials = parse_materials(&rows).unwrap();
        let brick = &materials.as_slice()[0];
        assert_eq!(brick.name, "Brick");
        assert!(brick.is_structural);
        assert_eq!(brick.function.as_deref(), Some("Core"));
        assert_eq!(brick.keynote, None);

        let gypsum = &materials.as_slice()[1];
        assert_eq!(gypsum.thickness, 0.0125);
        assert_eq!(gypsum.function, None);
        assert_eq!(gypsum.keynote.as_deref(), Some("09 29 00.A1"));
        assert_eq!(gypsum.manufacturer.as_deref(), Some("Acme"));
    }

    #[test]
    fn empty_name_aborts_with_no_data() {
        let rows = vec![row(true, 0.2, "Brick"), row(false, 0.1, "")];
        let err = parse_materials(&rows).unwrap_err();

        assert!(err.is(ErrorKind::NoData));
        assert_eq!(err.to_string(), "empty material name in row 1: no data");
    }

    #[test]
    fn rejects_negative_thickness_and_duplicates() {
        let negative = parse_materials(&[row(true, -1.0, "Brick")]).unwrap_err();
        assert!(negative.is(ErrorKind::Invalid));

        let duplicate =
            parse_materials(&[row(true, 0.2, "Brick"), row(true, 0.3, "Brick")]).unwrap_err();
        assert!(duplicate.is(ErrorKind::Invalid));
        assert!(duplicate.to_string().contains("duplicate material name Brick in row 1"));
    }

    #[test]
    fn wrong_flag_type_is_reported_with_field() {
        let rows = vec![Row::new(vec![
            Some(CellValue::from("yes")),
            Some(CellValue::Number(0.2)),
            None,
            Some(CellValue::from("Brick")),
        ])];
        let err = parse_materials(&rows).unwrap_err();

        assert!(err.is(ErrorKind::Invalid));
        assert!(err.to_string().starts_with("error reading isStructural in row 0"));
    }
}
