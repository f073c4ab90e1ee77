//! `AREAS_MATERIALS` table: materials assigned to areas, one row per
//! assignment.

use super::cell::read_optional_str;
use super::resolver::Resolver;
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::{AreaId, AreaMaterials};
use crate::source::Row;
use std::collections::HashMap;

pub(crate) const RANGE: &str = "AREAS_MATERIALS!A2:B";

const AREA: usize = 0;
const MATERIAL: usize = 1;

/// Groups assignment rows by area, in first-seen area order.
///
/// Rows for an already-seen area append to its list in row order, with a
/// `None` placeholder when the row names no material. A first row without a
/// material declares the area with an empty list.
pub fn parse_area_materials(rows: &[Row], resolver: &Resolver<'_>) -> CoreResult<Vec<AreaMaterials>> {
    let mut entries: Vec<AreaMaterials> = Vec::new();
    let mut positions: HashMap<AreaId, usize> = HashMap::new();

    for (index, row) in rows.iter().enumerate() {
        let area_name = read_optional_str(row, AREA)
            .with_context(|| format!("error reading area name in row {index}"))?
            .ok_or_else(|| {
                CoreError::new(ErrorKind::Invalid).context(format!("empty area name in row {index}"))
            })?;
        let area = resolver
            .find_area(area_name)
            .with_context(|| format!("error finding area {area_name} in row {index}"))?;

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

        match positions.get(&area) {
            Some(&position) => entries[position].materials.push(material),
            None => {
                positions.insert(area, entries.len());
                entries.push(AreaMaterials {
                    area,
                    materials: material.into_iter().map(Some).collect(),
                });
            }
        }
    }

    Ok(entries)
}
