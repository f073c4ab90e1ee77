//! Name-to-entity resolution against loaded catalogs.
//!
//! # Invariants
//! - An unloaded catalog fails with `Unavailable`, never `NotFound`.
//! - An empty material name is `Invalid`: it is the "no material" sentinel.

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::model::{AreaId, Areas, MaterialId, Materials};

/// Resolves names to shared entity handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver<'a> {
    areas: Option<&'a Areas>,
    materials: Option<&'a Materials>,
}

impl<'a> Resolver<'a> {
    pub fn new(areas: Option<&'a Areas>, materials: Option<&'a Materials>) -> Self {
        Self { areas, materials }
    }

    pub fn find_area(&self, name: &str) -> CoreResult<AreaId> {
        let areas = self
            .areas
            .ok_or_else(|| CoreError::new(ErrorKind::Unavailable).context("areas are not loaded"))?;
        areas
            .find(name)
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound).context(format!("area {name}")))
    }

    pub fn find_material(&self, name: &str) -> CoreResult<MaterialId> {
        if name.is_empty() {
            return Err(CoreError::new(ErrorKind::Invalid).context("empty material name"));
        }
        let materials = self.materials.ok_or_else(|| {
            CoreError::new(ErrorKind::Unavailable).context("materials are not loaded")
        })?;
        materials
            .find(name)
            .ok_or_else(|| CoreError::new(ErrorKind::NotFound).context(format!("material {name}")))
    }

    /// Resolves an optional area reference; absent or empty means none.
    pub fn find_optional_area(&self, name: Option<&str>) -> CoreResult<Option<AreaId>> {
        match name {
            None | Some("") => Ok(None),
            Some(name) => self.find_area(name).map(Some),
        }
    }

    /// Resolves an optional material reference; the empty-name sentinel
    /// means none.
    pub fn find_optional_material(&self, name: Option<&str>) -> CoreResult<Option<MaterialId>> {
        let Some(name) = name else {
            return Ok(None);
        };
        match self.find_material(name) {
            Ok(material) => Ok(Some(material)),
            Err(err) if err.is(ErrorKind::Invalid) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
