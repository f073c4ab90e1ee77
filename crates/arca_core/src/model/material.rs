//! Wall material entity.
//!
//! # Invariants
//! - `name` is non-empty and unique within a `Materials` catalog.
//! - `thickness` is finite and non-negative.

use super::catalog::{Catalog, Handle, Named};
use serde::{Deserialize, Serialize};

/// Wall/surface material with physical and presentational attributes.
///
/// Absent descriptive attributes serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: String,
    pub thickness: f64,
    pub is_structural: bool,
    pub function: Option<String>,
    pub category: Option<String>,
    pub cut_background_pattern_color: Option<String>,
    pub cut_background_pattern_id: Option<String>,
    pub cut_foreground_pattern_color: Option<String>,
    pub cut_foreground_pattern_id: Option<String>,
    pub surface_foreground_pattern_color: Option<String>,
    pub surface_foreground_pattern_id: Option<String>,
    pub mark: Option<String>,
    pub keynote: Option<String>,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
}

impl Material {
    /// Creates a material with only the required attributes set.
    pub fn new(name: impl Into<String>, thickness: f64, is_structural: bool) -> Self {
        Self {
            name: name.into(),
            thickness,
            is_structural,
            function: None,
            category: None,
            cut_background_pattern_color: None,
            cut_background_pattern_id: None,
            cut_foreground_pattern_color: None,
            cut_foreground_pattern_id: None,
            surface_foreground_pattern_color: None,
            surface_foreground_pattern_id: None,
            mark: None,
            keynote: None,
            description: None,
            manufacturer: None,
        }
    }
}

impl Named for Material {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type MaterialId = Handle<Material>;

/// Canonical material collection for one cache generation.
pub type Materials = Catalog<Material>;
