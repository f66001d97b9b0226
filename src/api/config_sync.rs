//! Catalog sync for mobile devices.

use axum::extract::{Query, State};
use serde_json::{json, Map, Value};

use super::{success_with, ApiResult};
use crate::models::{CatalogKind, ConfigSyncQuery};
use crate::store::now_rfc3339;
use crate::AppState;

/// GET /api/config/sync?type=operations|spareParts - Active catalog entries.
pub async fn get_config_sync(
    State(state): State<AppState>,
    Query(query): Query<ConfigSyncQuery>,
) -> ApiResult<Map<String, Value>> {
    let catalog = query.catalog();
    let mut data = Map::new();
    data.insert("syncedAt".to_string(), json!(now_rfc3339()));

    if catalog != Some(CatalogKind::SpareParts) {
        let operations: Vec<_> = state
            .store
            .operations
            .get()
            .await
            .into_iter()
            .filter(|op| op.is_active)
            .collect();
        data.insert("operations".to_string(), json!(operations));
    }
    if catalog != Some(CatalogKind::Operations) {
        let spare_parts: Vec<_> = state
            .store
            .spare_parts
            .get()
            .await
            .into_iter()
            .filter(|sp| sp.is_active)
            .collect();
        data.insert("spareParts".to_string(), json!(spare_parts));
    }

    success_with("Konfiguracioni podaci spremni za sinhronizaciju", data)
}

/// POST /api/config/sync?type=... - Acknowledge a sync signal.
pub async fn post_config_sync(Query(query): Query<ConfigSyncQuery>) -> ApiResult<Value> {
    let (message, kind) = match query.catalog() {
        Some(CatalogKind::Operations) => ("Operacije poslate na sve mobilne uređaje", "operations"),
        Some(CatalogKind::SpareParts) => {
            ("Rezervni delovi poslati na sve mobilne uređaje", "spareParts")
        }
        None => ("Signal za sinhronizaciju poslat na sve mobilne uređaje", "all"),
    };
    tracing::info!("Config sync signal: {}", kind);

    success_with(message, json!({ "type": kind, "timestamp": now_rfc3339() }))
}
