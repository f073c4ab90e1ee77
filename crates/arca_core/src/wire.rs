//! JSON serialization boundary.
//!
//! # Responsibility
//! - Project snapshots into the wire shape, with references as names.
//! - Decode upload payloads into owned records.
//!
//! # Invariants
//! - Absent optional values are written as `null`, never omitted.
//! - Encoding failures are `Encoding`; malformed payloads are `Invalid`.

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::model::{Area, AreaKeysTable, AreaMaterialsTable, Material, RelationsTable};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Materials assigned to one area, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaMaterialsRecord {
    pub area: String,
    pub materials: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaKeyRecord {
    pub area_internal: String,
    pub area_external: Option<String>,
    pub keynote: Option<String>,
}

/// Upload and read shape of one area relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRecord {
    pub same_area: bool,
    pub wall_keynote: Option<String>,
    pub area_internal: String,
    pub area_external: Option<String>,
    pub material: Option<String>,
}

/// Every table in one document, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllTables {
    pub materials: Vec<Material>,
    pub areas: Vec<Area>,
    pub areas_materials: Vec<AreaMaterialsRecord>,
    pub areas_keys: Vec<AreaKeyRecord>,
    pub areas_relations: Vec<RelationRecord>,
}

impl AreaMaterialsTable {
    pub fn records(&self) -> Vec<AreaMaterialsRecord> {
        self.entries
            .iter()
            .map(|entry| AreaMaterialsRecord {
                area: self.areas[entry.area].name.clone(),
                materials: entry
                    .materials
                    .iter()
                    .map(|material| material.map(|id| self.materials[id].name.clone()))
                    .collect(),
            })
            .collect()
    }
}

impl AreaKeysTable {
    pub fn records(&self) -> Vec<AreaKeyRecord> {
        self.entries
            .iter()
            .map(|key| AreaKeyRecord {
                area_internal: self.areas[key.area_internal].name.clone(),
                area_external: key.area_external.map(|id| self.areas[id].name.clone()),
                keynote: key.keynote.clone(),
            })
            .collect()
    }
}

impl RelationsTable {
    pub fn records(&self) -> Vec<RelationRecord> {
        self.entries
            .iter()
            .map(|relation| RelationRecord {
                same_area: relation.same_area,
                wall_keynote: relation.wall_keynote.clone(),
                area_internal: self.areas[relation.area_internal].name.clone(),
                area_external: relation.area_external.map(|id| self.areas[id].name.clone()),
                material: relation.material.map(|id| self.materials[id].name.clone()),
            })
            .collect()
    }
}

/// Writes `value` as compact JSON.
pub fn encode<W, T>(writer: W, value: &T) -> CoreResult<()>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer(writer, value).map_err(|err| CoreError::with_source(ErrorKind::Encoding, err))
}

/// Reads one JSON document from `reader`.
pub fn decode<R, T>(reader: R) -> CoreResult<T>
where
    R: Read,
    T: DeserializeOwned,
{
    serde_json::from_reader(reader).map_err(|err| CoreError::with_source(ErrorKind::Invalid, err))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, AllTables, AreaMaterialsRecord, RelationRecord};
    use crate::error::ErrorKind;
    use crate::model::{
        Area, AreaMaterials, AreaMaterialsTable, AreaRelation, Areas, Material, Materials,
        RelationsTable,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn catalogs() -> (Arc<Areas>, Arc<Materials>) {
        let areas: Areas = [Area::new("Room A"), Area::new("Hall")].into_iter().collect();
        let materials: Materials = [Material::new("Brick", 0.2, true)].into_iter().collect();
        (Arc::new(areas), Arc::new(materials))
    }

    #[test]
    fn area_materials_serialize_references_as_names() {
        let (areas, materials) = catalogs();
        let table = AreaMaterialsTable {
            entries: vec![AreaMaterials {
                area: areas.find("Hall").unwrap(),
                materials: vec![materials.find("Brick"), None],
            }],
            areas,
            materials,
        };

        let mut out = Vec::new();
        encode(&mut out, &table.records()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value, json!([{ "area": "Hall", "materials": ["Brick", null] }]));
        let back: Vec<AreaMaterialsRecord> = decode(out.as_slice()).unwrap();
        assert_eq!(back, table.records());
    }

    #[test]
    fn relation_nulls_are_kept() {
        let (areas, materials) = catalogs();
        let table = RelationsTable {
            entries: vec![AreaRelation {
                same_area: true,
                wall_keynote: None,
                area_internal: areas.find("Room A").unwrap(),
                area_external: None,
                material: None,
            }],
            areas,
            materials,
        };

        let mut out = Vec::new();
        encode(&mut out, &table.records()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"[{"sameArea":true,"wallKeynote":null,"areaInternal":"Room A","areaExternal":null,"material":null}]"#
        );
    }

    #[test]
    fn material_uses_camel_case_and_null_fields() {
        let mut out = Vec::new();
        encode(&mut out, &Material::new("Brick", 0.2, true)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["isStructural"], json!(true));
        assert_eq!(value["cutBackgroundPatternColor"], json!(null));
        assert_eq!(value.as_object().unwrap().len(), 15);
    }

    #[test]
    fn all_tables_keys_follow_table_names() {
        let mut out = Vec::new();
        encode(&mut out, &AllTables::default()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"{"materials":[],"areas":[],"areas_materials":[],"areas_keys":[],"areas_relations":[]}"#
        );
    }

    #[test]
    fn malformed_payload_is_invalid() {
        let err = decode::<_, Vec<RelationRecord>>(&b"[{\"sameArea\": \"yes\"}]"[..]).unwrap_err();
        assert!(err.is(ErrorKind::Invalid));

        let err = decode::<_, Vec<Area>>(&b"{"[..]).unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
    }
}
