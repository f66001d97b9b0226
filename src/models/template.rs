//! Master-data catalog entries: operations and spare parts.

use serde::{Deserialize, Serialize};

/// Default unit for spare parts ("komad", piece).
pub const DEFAULT_UNIT: &str = "kom";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationTemplate {
    pub id: String,
    /// ERP item code (`ChItemCode`)
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SparePartTemplate {
    pub id: String,
    pub code: String,
    pub name: String,
    /// e.g. "kom", "par", "set", "m"
    pub unit: String,
    pub is_active: bool,
    pub created_at: String,
}

/// Body of `POST /api/config/operations` and one item of an operations import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOperation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `POST /api/config/spare-parts` and one item of a spare-parts import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSparePart {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportRequest<T> {
    #[serde(default)]
    pub items: Option<Vec<T>>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    pub skipped: usize,
}

/// An item as read from the ERP `Item` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErpItem {
    pub id: String,
    pub code: String,
    pub name: String,
    pub status: String,
}

/// Which catalog a config sync refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CatalogKind {
    Operations,
    SpareParts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSyncQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl ConfigSyncQuery {
    /// Unrecognised values mean "all catalogs".
    pub fn catalog(&self) -> Option<CatalogKind> {
        match self.kind.as_deref() {
            Some("operations") => Some(CatalogKind::Operations),
            Some("spareParts") => Some(CatalogKind::SpareParts),
            _ => None,
        }
    }
}
