//! Reconciliation cache over one tabular source.
//!
//! # Responsibility
//! - Load tables lazily, prerequisites first, and memoize the snapshots.
//! - Serialize snapshots to JSON and project uploads into batch writes.
//!
//! # Invariants
//! - Each slot is populated by at most one fetch at a time.
//! - Prerequisites come only from `Table::dependencies`.
//! - A reset swaps the whole generation; loads still running on the old
//!   generation are never observed afterwards.
//! - Uploads never touch the cache.
//!
//! # See also
//! - `parse::Table` for the dependency graph.
//! - `service::slot` for the per-slot state machine.

use super::slot::{Slot, SlotState};
use crate::error::{CoreError, CoreResult, ErrorKind, ResultExt};
use crate::model::{
    Area, AreaKeysTable, AreaMaterialsTable, Areas, Material, Materials, RelationsTable,
};
use crate::parse::areas::area_row;
use crate::parse::materials::material_row;
use crate::parse::relations::relation_row;
use crate::parse::{
    parse_area_keys, parse_area_materials, parse_areas, parse_materials, parse_relations, Resolver,
    Table,
};
use crate::source::{CellUpdate, CellValue, RangeSpec, Row, TabularSource};
use crate::wire::{decode, encode, AllTables, RelationRecord};
use log::{info, warn};
use std::future::Future;
use std::io::{Read, Write};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

#[derive(Default)]
struct Generation {
    areas: Slot<Areas>,
    materials: Slot<Materials>,
    area_materials: Slot<AreaMaterialsTable>,
    area_keys: Slot<AreaKeysTable>,
    relations: Slot<RelationsTable>,
}

impl Generation {
    fn state(&self, table: Table) -> SlotState {
        match table {
            Table::Areas => self.areas.state(),
            Table::Materials => self.materials.state(),
            Table::AreaMaterials => self.area_materials.state(),
            Table::AreaKeys => self.area_keys.state(),
            Table::Relations => self.relations.state(),
        }
    }
}

/// Base catalogs loaded ahead of a derived table.
#[derive(Default)]
struct Prerequisites {
    areas: Option<Arc<Areas>>,
    materials: Option<Arc<Materials>>,
}

impl Prerequisites {
    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.areas.as_deref(), self.materials.as_deref())
    }

    fn areas(&self) -> CoreResult<Arc<Areas>> {
        self.areas
            .clone()
            .ok_or_else(|| CoreError::new(ErrorKind::Unavailable).context("areas are not loaded"))
    }

    fn materials(&self) -> CoreResult<Arc<Materials>> {
        self.materials.clone().ok_or_else(|| {
            CoreError::new(ErrorKind::Unavailable).context("materials are not loaded")
        })
    }
}

/// Shared, lazily populated model of every table in one tabular source.
pub struct Spreadsheet {
    source: Arc<dyn TabularSource>,
    generation: RwLock<Arc<Generation>>,
}

impl Spreadsheet {
    pub fn new(source: Arc<dyn TabularSource>) -> Self {
        Self {
            source,
            generation: RwLock::new(Arc::new(Generation::default())),
        }
    }

    /// Discards every cached table; the next access reloads from the source.
    pub fn reset_data(&self) {
        *self
            .generation
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(Generation::default());
        info!("event=cache_reset module=spreadsheet status=ok");
    }

    pub fn slot_state(&self, table: Table) -> SlotState {
        self.current().state(table)
    }

    pub async fn areas(&self) -> CoreResult<Arc<Areas>> {
        self.load_areas(&self.current()).await
    }

    pub async fn materials(&self) -> CoreResult<Arc<Materials>> {
        self.load_materials(&self.current()).await
    }

    pub async fn area_materials(&self) -> CoreResult<Arc<AreaMaterialsTable>> {
        self.load_area_materials(&self.current()).await
    }

    pub async fn area_keys(&self) -> CoreResult<Arc<AreaKeysTable>> {
        self.load_area_keys(&self.current()).await
    }

    pub async fn relations(&self) -> CoreResult<Arc<RelationsTable>> {
        self.load_relations(&self.current()).await
    }

    /// Loads every table and writes them as one JSON object.
    pub async fn read_all_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let generation = self.current();
        let mut all = AllTables::default();

        for table in Table::load_order(&Table::ALL) {
            match table {
                Table::Areas => {
                    all.areas = self.load_areas(&generation).await?.as_slice().to_vec();
                }
                Table::Materials => {
                    all.materials = self.load_materials(&generation).await?.as_slice().to_vec();
                }
                Table::AreaMaterials => {
                    all.areas_materials = self.load_area_materials(&generation).await?.records();
                }
                Table::AreaKeys => {
                    all.areas_keys = self.load_area_keys(&generation).await?.records();
                }
                Table::Relations => {
                    all.areas_relations = self.load_relations(&generation).await?.records();
                }
            }
        }

        encode(writer, &all).context("unable to read all tables")
    }

    pub async fn read_areas_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let areas = self.areas().await?;
        encode(writer, &*areas).context("unable to read areas")
    }

    pub async fn read_materials_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let materials = self.materials().await?;
        encode(writer, &*materials).context("unable to read materials")
    }

    pub async fn read_area_materials_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let table = self.area_materials().await?;
        encode(writer, &table.records()).context("unable to read areas materials")
    }

    pub async fn read_area_keys_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let table = self.area_keys().await?;
        encode(writer, &table.records()).context("unable to read areas keys")
    }

    pub async fn read_relations_to<W: Write>(&self, writer: W) -> CoreResult<()> {
        let table = self.relations().await?;
        encode(writer, &table.records()).context("unable to read areas relations")
    }

    /// Writes a JSON array of areas to the `AREAS` sheet.
    pub async fn upload_areas_from<R: Read>(&self, reader: R) -> CoreResult<()> {
        let areas: Vec<Area> = decode(reader).context("unable to upload areas")?;
        self.upload(Table::Areas, areas.iter().map(area_row).collect())
            .await
    }

    /// Writes a JSON array of materials to the `MATERIALS` sheet.
    pub async fn upload_materials_from<R: Read>(&self, reader: R) -> CoreResult<()> {
        let materials: Vec<Material> = decode(reader).context("unable to upload materials")?;
        self.upload(Table::Materials, materials.iter().map(material_row).collect())
            .await
    }

    /// Writes a JSON array of relations to the `AREAS_RELATIONS` sheet.
    pub async fn upload_relations_from<R: Read>(&self, reader: R) -> CoreResult<()> {
        let relations: Vec<RelationRecord> =
            decode(reader).context("unable to upload areas relations")?;
        self.upload(Table::Relations, relations.iter().map(relation_row).collect())
            .await
    }

    fn current(&self) -> Arc<Generation> {
        Arc::clone(&self.generation.read().unwrap_or_else(PoisonError::into_inner))
    }

    async fn load_areas(&self, generation: &Generation) -> CoreResult<Arc<Areas>> {
        populate(&generation.areas, Table::Areas, || async {
            let rows = self.fetch(Table::Areas).await?;
            parse_areas(&rows)
        })
        .await
    }

    async fn load_materials(&self, generation: &Generation) -> CoreResult<Arc<Materials>> {
        populate(&generation.materials, Table::Materials, || async {
            let rows = self.fetch(Table::Materials).await?;
            parse_materials(&rows)
        })
        .await
    }

    async fn load_area_materials(
        &self,
        generation: &Generation,
    ) -> CoreResult<Arc<AreaMaterialsTable>> {
        populate(&generation.area_materials, Table::AreaMaterials, || async {
            let loaded = self.prerequisites(generation, Table::AreaMaterials).await?;
            let rows = self.fetch(Table::AreaMaterials).await?;
            let entries = parse_area_materials(&rows, &loaded.resolver())?;
            Ok(AreaMaterialsTable {
                areas: loaded.areas()?,
                materials: loaded.materials()?,
                entries,
            })
        })
        .await
    }

    async fn load_area_keys(&self, generation: &Generation) -> CoreResult<Arc<AreaKeysTable>> {
        populate(&generation.area_keys, Table::AreaKeys, || async {
            let loaded = self.prerequisites(generation, Table::AreaKeys).await?;
            let rows = self.fetch(Table::AreaKeys).await?;
            let entries = parse_area_keys(&rows, &loaded.resolver())?;
            Ok(AreaKeysTable {
                areas: loaded.areas()?,
                entries,
            })
        })
        .await
    }

    async fn load_relations(&self, generation: &Generation) -> CoreResult<Arc<RelationsTable>> {
        populate(&generation.relations, Table::Relations, || async {
            let loaded = self.prerequisites(generation, Table::Relations).await?;
            let rows = self.fetch(Table::Relations).await?;
            let entries = parse_relations(&rows, &loaded.resolver())?;
            Ok(RelationsTable {
                areas: loaded.areas()?,
                materials: loaded.materials()?,
                entries,
            })
        })
        .await
    }

    async fn prerequisites(&self, generation: &Generation, table: Table) -> CoreResult<Prerequisites> {
        let mut loaded = Prerequisites::default();
        for dependency in table.dependencies() {
            match dependency {
                Table::Areas => loaded.areas = Some(self.load_areas(generation).await?),
                Table::Materials => loaded.materials = Some(self.load_materials(generation).await?),
                other => {
                    return Err(CoreError::new(ErrorKind::Unavailable).context(format!(
                        "{} cannot be loaded ahead of {}",
                        other.label(),
                        table.label()
                    )));
                }
            }
        }
        Ok(loaded)
    }

    async fn fetch(&self, table: Table) -> CoreResult<Vec<Row>> {
        let range = RangeSpec::parse(table.range())?;
        let rows = self
            .source
            .fetch_range(&range)
            .await
            .map_err(CoreError::from)
            .with_context(|| format!("fetch {range}"))?;
        info!(
            "event=table_fetch module=spreadsheet status=ok table={} rows={}",
            table.key(),
            rows.len()
        );
        Ok(rows)
    }

    async fn upload(&self, table: Table, rows: Vec<Vec<Option<CellValue>>>) -> CoreResult<()> {
        self.write_rows(table, rows)
            .await
            .with_context(|| format!("unable to upload {}", table.label()))
    }

    async fn write_rows(&self, table: Table, rows: Vec<Vec<Option<CellValue>>>) -> CoreResult<()> {
        if rows.is_empty() {
            return Err(CoreError::new(ErrorKind::Invalid).context("no records to upload"));
        }
        let sheet = table.upload_sheet_id().ok_or_else(|| {
            CoreError::new(ErrorKind::Invalid).context(format!("{} is read-only", table.label()))
        })?;
        let range = RangeSpec::parse(table.range())?;

        let mut updates = Vec::with_capacity(rows.len());
        for (offset, values) in rows.into_iter().enumerate() {
            let row_index = u32::try_from(offset)
                .ok()
                .and_then(|offset| range.start_row().checked_add(offset))
                .ok_or_else(|| {
                    CoreError::new(ErrorKind::Invalid).context(format!("record {offset} is past the last row"))
                })?;
            updates.push(CellUpdate {
                row_index,
                start_column: range.start_column(),
                end_column: range.end_column(),
                values,
            });
        }

        let count = updates.len();
        let started = Instant::now();
        match self.source.batch_write(sheet, updates).await {
            Ok(()) => {
                info!(
                    "event=table_upload module=spreadsheet status=ok table={} rows={} duration_ms={}",
                    table.key(),
                    count,
                    started.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=table_upload module=spreadsheet status=error table={} rows={} error={}",
                    table.key(),
                    count,
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Runs `load` through `slot`, logging the outcome of real loads.
async fn populate<T, F, Fut>(slot: &Slot<T>, table: Table, load: F) -> CoreResult<Arc<T>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = CoreResult<T>>,
{
    slot.get_or_load(|| async {
        let started = Instant::now();
        info!(
            "event=table_load module=spreadsheet status=start table={}",
            table.key()
        );
        let outcome = load().await;
        match &outcome {
            Ok(_) => info!(
                "event=table_load module=spreadsheet status=ok table={} duration_ms={}",
                table.key(),
                started.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=table_load module=spreadsheet status=error table={} kind={} duration_ms={}",
                table.key(),
                err.kind(),
                started.elapsed().as_millis()
            ),
        }
        outcome
    })
    .await
    .with_context(|| format!("unable to read {}", table.label()))
}
