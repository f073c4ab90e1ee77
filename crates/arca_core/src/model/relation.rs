//! Derived records: area-material assignments and area-to-area relations.
//!
//! # Invariants
//! - `area_internal` always points at a loaded area.
//! - Each area appears at most once in an `AreaMaterialsTable`.

use super::area::{AreaId, Areas};
use super::material::{MaterialId, Materials};
use std::sync::Arc;

/// Ordered materials assigned to one area.
///
/// `None` entries are explicit "no material" placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaMaterials {
    pub area: AreaId,
    pub materials: Vec<Option<MaterialId>>,
}

/// Legacy area key: internal area, optional neighbour, optional keynote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaKey {
    pub area_internal: AreaId,
    pub area_external: Option<AreaId>,
    pub keynote: Option<String>,
}

/// Relation between two areas, optionally annotated with a wall material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRelation {
    pub same_area: bool,
    pub wall_keynote: Option<String>,
    pub area_internal: AreaId,
    pub area_external: Option<AreaId>,
    pub material: Option<MaterialId>,
}

/// Area-material assignments plus the catalogs they were resolved against.
#[derive(Debug, Clone)]
pub struct AreaMaterialsTable {
    pub areas: Arc<Areas>,
    pub materials: Arc<Materials>,
    pub entries: Vec<AreaMaterials>,
}

impl AreaMaterialsTable {
    /// Materials assigned to the area called `name`, if it has an entry.
    pub fn materials_of(&self, name: &str) -> Option<&[Option<MaterialId>]> {
        let area = self.areas.find(name)?;
        self.entries
            .iter()
            .find(|entry| entry.area == area)
            .map(|entry| entry.materials.as_slice())
    }
}

/// Area keys plus the area catalog they were resolved against.
#[derive(Debug, Clone)]
pub struct AreaKeysTable {
    pub areas: Arc<Areas>,
    pub entries: Vec<AreaKey>,
}

/// Relations plus the catalogs they were resolved against.
#[derive(Debug, Clone)]
pub struct RelationsTable {
    pub areas: Arc<Areas>,
    pub materials: Arc<Materials>,
    pub entries: Vec<AreaRelation>,
}

impl RelationsTable {
    /// Relations whose internal area is `area`, in row order.
    pub fn relations_of(&self, area: AreaId) -> impl Iterator<Item = &AreaRelation> {
        self.entries
            .iter()
            .filter(move |relation| relation.area_internal == area)
    }
}
