//! `AREAS_RELATIONS` table: same-area flag, wall keynote, internal area,
//! optional external area, optional material.

use super::cell::{read_bool, read_optional_str};
use super::resolver::Resolver;
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::AreaRelation;
use crate::source::{CellValue, Row};
use crate::wire::RelationRecord;

pub(crate) const RANGE: &str = "AREAS_RELATIONS!A2:E";

const SAME_AREA: usize = 0;
const WALL_KEYNOTE: usize = 1;
const AREA_INTERNAL: usize = 2;
const AREA_EXTERNAL: usize = 3;
const MATERIAL: usize = 4;

pub fn parse_relations(rows: &[Row], resolver: &Resolver<'_>) -> CoreResult<Vec<AreaRelation>> {
    let mut relations = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let same_area = read_bool(row, SAME_AREA)
            .with_context(|| format!("error reading sameArea in row {index}"))?;

        let wall_keynote = read_optional_str(row, WALL_KEYNOTE)
            .with_context(|| format!("error reading wallKeynote in row {index}"))?
            .map(str::to_string);

        let internal_name = read_optional_str(row, AREA_INTERNAL)
            .with_context(|| format!("error reading area internal name in row {index}"))?
            .ok_or_else(|| {
                CoreError::new(ErrorKind::Invalid)
                    .context(format!("empty area internal name in row {index}"))
            })?;
        let area_internal = resolver
            .find_area(internal_name)
            .with_context(|| format!("error finding area {internal_name} in row {index}"))?;

        let external_name = read_optional_str(row, AREA_EXTERNAL)
            .with_context(|| format!("error reading area external name in row {index}"))?;
        let area_external = resolver.find_optional_area(external_name).with_context(|| {
            format!(
                "error finding area {} in row {index}",
                external_name.unwrap_or_default()
            )
        })?;

        let material_name = read_optional_str(row, MATERIAL)
            .with_context(|| format!("error reading material name in row {index}"))?;
        let material = resolver
            .find_optional_material(material_name)
            .with_context(|| {
                format!(
                    "error finding material {} in row {index}",
                    material_name.unwrap_or_default()
                )
            })?;

        relations.push(AreaRelation {
            same_area,
            wall_keynote,
            area_internal,
            area_external,
            material,
        });
    }

    Ok(relations)
}

/// Cell values written for one uploaded relation, in read layout.
pub fn relation_row(relation: &RelationRecord) -> Vec<Option<CellValue>> {
    let text = |value: &Option<String>| value.as_deref().map(CellValue::from);

    vec![
        Some(CellValue::Bool(relation.same_area)),
        text(&relation.wall_keynote),
        Some(CellValue::from(relation.area_internal.as_str())),
        text(&relation.area_external),
        text(&relation.material),
    ]
}
