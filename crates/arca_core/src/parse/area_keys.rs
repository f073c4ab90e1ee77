//! `AREAS_KEYS` table: internal area, optional external area, optional
//! keynote.

use super::cell::read_optional_str;
use super::resolver::Resolver;
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::AreaKey;
use crate::source::Row;

pub(crate) const RANGE: &str = "AREAS_KEYS!A2:C";

const AREA_INTERNAL: usize = 0;
const AREA_EXTERNAL: usize = 1;
const KEYNOTE: usize = 2;

pub fn parse_area_keys(rows: &[Row], resolver: &Resolver<'_>) -> CoreResult<Vec<AreaKey>> {
    let mut keys = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
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

        let keynote = read_optional_str(row, KEYNOTE)
            .with_context(|| format!("error reading keynote in row {index}"))?
            .map(str::to_string);

        keys.push(AreaKey {
            area_internal,
            area_external,
            keynote,
        });
    }

    Ok(keys)
}
