//! Table parsers: raw rows in, validated typed collections out.
//!
//! # Responsibility
//! - Define the canonical layout of every logical table.
//! - Define the dependency graph between tables in one place.
//! - Convert rows into typed records, resolving names through `Resolver`.
//!
//! # Invariants
//! - Any row-level failure aborts the whole table; no partial collection
//!   is ever returned.
//! - Failures carry the zero-based data row index and the field involved.

pub mod area_keys;
pub mod area_materials;
pub mod areas;
pub mod cell;
pub mod materials;
pub mod relations;
pub mod resolver;

pub use area_keys::parse_area_keys;
pub use area_materials::parse_area_materials;
pub use areas::parse_areas;
pub use materials::parse_materials;
pub use relations::parse_relations;
pub use resolver::Resolver;

use crate::source::SheetId;

/// Logical tables served by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Areas,
    Materials,
    AreaMaterials,
    AreaKeys,
    Relations,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Areas,
        Table::Materials,
        Table::AreaMaterials,
        Table::AreaKeys,
        Table::Relations,
    ];

    /// JSON key and route name.
    pub fn key(self) -> &'static str {
        match self {
            Self::Areas => "areas",
            Self::Materials => "materials",
            Self::AreaMaterials => "areas_materials",
            Self::AreaKeys => "areas_keys",
            Self::Relations => "areas_relations",
        }
    }

    /// Human-readable name used in error context.
    pub fn label(self) -> &'static str {
        match self {
            Self::Areas => "areas",
            Self::Materials => "materials",
            Self::AreaMaterials => "areas materials",
            Self::AreaKeys => "areas keys",
            Self::Relations => "areas relations",
        }
    }

    pub fn sheet(self) -> &'static str {
        match self {
            Self::Areas => "AREAS",
            Self::Materials => "MATERIALS",
            Self::AreaMaterials => "AREAS_MATERIALS",
            Self::AreaKeys => "AREAS_KEYS",
            Self::Relations => "AREAS_RELATIONS",
        }
    }

    /// A1 range holding the table's data rows (header excluded).
    pub fn range(self) -> &'static str {
        match self {
            Self::Areas => areas::RANGE,
            Self::Materials => materials::RANGE,
            Self::AreaMaterials => area_materials::RANGE,
            Self::AreaKeys => area_keys::RANGE,
            Self::Relations => relations::RANGE,
        }
    }

    /// Sheet targeted by uploads; `None` for read-only tables.
    pub fn upload_sheet_id(self) -> Option<SheetId> {
        match self {
            Self::Areas => Some(2_055_988_922),
            Self::Materials => Some(1_466_546_092),
            Self::Relations => Some(1_715_124_245),
            Self::AreaMaterials | Self::AreaKeys => None,
        }
    }

    /// Tables that must be loaded before this one. Only base tables
    /// (areas, materials) appear as prerequisites.
    pub fn dependencies(self) -> &'static [Table] {
        match self {
            Self::Areas | Self::Materials => &[],
            Self::AreaMaterials | Self::Relations => &[Table::Areas, Table::Materials],
            Self::AreaKeys => &[Table::Areas],
        }
    }

    /// `targets` plus their prerequisites, each once, dependencies first.
    pub fn load_order(targets: &[Table]) -> Vec<Table> {
        fn visit(table: Table, order: &mut Vec<Table>) {
            if order.contains(&table) {
                return;
            }
            for dependency in table.dependencies() {
                visit(*dependency, order);
            }
            order.push(table);
        }

        let mut order = Vec::with_capacity(Table::ALL.len());
        for table in targets {
            visit(*table, &mut order);
        }
        order
    }
}
