//! Master-data catalog endpoints (operations and spare parts).

use axum::extract::{Path, State};
use serde_json::{json, Map, Value};

use super::{done, success, success_with, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::{ImportReport, ImportRequest, NewOperation, NewSparePart};
use crate::store::{Collection, Record};
use crate::AppState;

/// Response wording for one catalog.
struct Wording {
    updated: &'static str,
    deleted: &'static str,
    not_found: &'static str,
    /// Genitive plural used in the import summary
    plural: &'static str,
}

const OPERATIONS: Wording = Wording {
    updated: "Operacija uspešno ažurirana",
    deleted: "Operacija uspešno obrisana",
    not_found: "Operacija nije pronađena",
    plural: "operacija",
};

const SPARE_PARTS: Wording = Wording {
    updated: "Rezervni deo uspešno ažuriran",
    deleted: "Rezervni deo uspešno obrisan",
    not_found: "Rezervni deo nije pronađen",
    plural: "rezervnih delova",
};

async fn update_entry<T: Record>(
    collection: &Collection<T>,
    id: &str,
    patch: &Map<String, Value>,
    wording: &Wording,
) -> ApiResult<()> {
    match collection.update(id, patch).await? {
        Some(_) => {
            tracing::info!("Updated catalog entry {}", id);
            done(wording.updated)
        }
        None => Err(AppError::NotFound(wording.not_found.to_string())),
    }
}

async fn delete_entry<T: Record>(
    collection: &Collection<T>,
    id: &str,
    wording: &Wording,
) -> ApiResult<()> {
    if collection.delete(id).await? {
        tracing::info!("Deleted catalog entry {}", id);
        done(wording.deleted)
    } else {
        Err(AppError::NotFound(wording.not_found.to_string()))
    }
}

fn import_items<T>(request: ImportRequest<T>) -> Result<Vec<T>, AppError> {
    request
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::Validation("items niz je obavezan".to_string()))
}

fn import_summary(report: ImportReport, wording: &Wording) -> ApiResult<ImportReport> {
    tracing::info!(
        "Imported {} {}, skipped {}",
        report.added,
        wording.plural,
        report.skipped
    );
    success_with(
        format!(
            "Import-ovano {} {}, preskočeno {} duplikata",
            report.added, wording.plural, report.skipped
        ),
        report,
    )
}

fn object_body(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// GET /api/config/operations
pub async fn list_operations(State(state): State<AppState>) -> ApiResult<Value> {
    let operations = state.store.operations.get().await;
    success(json!({ "operations": operations }))
}

/// POST /api/config/operations
pub async fn create_operation(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<NewOperation>,
) -> ApiResult<Value> {
    let operation = state.store.create_operation(draft).await?;
    success_with("Operacija uspešno dodata", json!({ "operation": operation }))
}

/// PUT /api/config/operations/{id}
pub async fn update_operation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<()> {
    let patch = object_body(body)?;
    update_entry(&state.store.operations, &id, &patch, &OPERATIONS).await
}

/// DELETE /api/config/operations/{id}
pub async fn delete_operation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    delete_entry(&state.store.operations, &id, &OPERATIONS).await
}

/// POST /api/config/operations/import
pub async fn import_operations(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ImportRequest<NewOperation>>,
) -> ApiResult<ImportReport> {
    let items = import_items(request)?;
    let report = state.store.import_operations(items).await?;
    import_summary(report, &OPERATIONS)
}

/// GET /api/config/spare-parts
pub async fn list_spare_parts(State(state): State<AppState>) -> ApiResult<Value> {
    let spare_parts = state.store.spare_parts.get().await;
    success(json!({ "spareParts": spare_parts }))
}

/// POST /api/config/spare-parts
pub async fn create_spare_part(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<NewSparePart>,
) -> ApiResult<Value> {
    let spare_part = state.store.create_spare_part(draft).await?;
    success_with("Rezervni deo uspešno dodat", json!({ "sparePart": spare_part }))
}

/// PUT /api/config/spare-parts/{id}
pub async fn update_spare_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Value>,
) -> ApiResult<()> {
    let patch = object_body(body)?;
    update_entry(&state.store.spare_parts, &id, &patch, &SPARE_PARTS).await
}

/// DELETE /api/config/spare-parts/{id}
pub async fn delete_spare_part(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    delete_entry(&state.store.spare_parts, &id, &SPARE_PARTS).await
}

/// POST /api/config/spare-parts/import
pub async fn import_spare_parts(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ImportRequest<NewSparePart>>,
) -> ApiResult<ImportReport> {
    let items = import_items(request)?;
    let report = state.store.import_spare_parts(items).await?;
    import_summary(report, &SPARE_PARTS)
}
