//! Domain model for building-interior data.
//!
//! # Responsibility
//! - Define the base entities (areas, materials) and derived records.
//! - Keep one canonical instance per entity name inside a cache generation.
//!
//! # Invariants
//! - Derived records reference entities by `Handle`, never by copy.
//! - A derived table carries the catalogs its handles index into.

pub mod area;
pub mod catalog;
pub mod material;
pub mod relation;

pub use area::{Area, AreaId, Areas};
pub use catalog::{Catalog, Handle, Named};
pub use material::{Material, MaterialId, Materials};
pub use relation::{
    AreaKey, AreaKeysTable, AreaMaterials, AreaMaterialsTable, AreaRelation, RelationsTable,
};
