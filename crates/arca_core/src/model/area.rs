//! Area entity: a named architectural zone.

use super::catalog::{Catalog, Handle, Named};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub name: String,
}

impl Area {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Named for Area {
    fn name(&self) -> &str {
        &self.name
    }
}

pub type AreaId = Handle<Area>;

/// Canonical area collection for one cache generation.
pub type Areas = Catalog<Area>;
