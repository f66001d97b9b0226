//! ERP pass-through endpoints: catalog lookups, connection settings and
//! diagnostics.

use axum::extract::State;
use serde_json::{json, Map, Value};

use super::{done, success, success_with, ApiResult, JsonBody};
use crate::erp::env_file;
use crate::erp::settings::{
    ErpSettings, DEFAULT_PORT, KEY_DATABASE, KEY_PASSWORD, KEY_PORT, KEY_SERVER, KEY_USER,
};
use crate::errors::AppError;
use crate::models::{
    CatalogKind, DatabaseConfigRequest, DatabaseConfigView, ErpItem, RawQueryRequest,
    RawQueryResult,
};
use crate::store::required;
use crate::AppState;

const MASKED_PASSWORD: &str = "********";

async fn configured_settings(state: &AppState, message: &str) -> Result<ErpSettings, AppError> {
    let settings = state.erp.settings().await;
    if settings.is_configured() {
        Ok(settings)
    } else {
        Err(AppError::Validation(message.to_string()))
    }
}

async fn erp_items(state: &AppState, kind: CatalogKind) -> Result<Vec<ErpItem>, AppError> {
    configured_settings(
        state,
        "ERP sistem nije konfigurisan. Idite na Konfiguracija → Sistemska Podešavanja...",
    )
    .await?;

    let label = match kind {
        CatalogKind::Operations => "operacija",
        CatalogKind::SpareParts => "rezervnih delova",
    };
    state.erp.fetch_items(kind).await.map_err(|e| {
        AppError::erp(format!(
            "Greška pri učitavanju {} iz ERP-a: {}",
            label,
            e.message()
        ))
    })
}

/// GET /api/operations - Operations from the ERP item table.
pub async fn erp_operations(State(state): State<AppState>) -> ApiResult<Value> {
    let operations = erp_items(&state, CatalogKind::Operations).await?;
    success_with(
        format!("Učitano {} operacija", operations.len()),
        json!({ "operations": operations }),
    )
}

/// GET /api/spare-parts - Spare parts from the ERP item table.
pub async fn erp_spare_parts(State(state): State<AppState>) -> ApiResult<Value> {
    let spare_parts = erp_items(&state, CatalogKind::SpareParts).await?;
    success_with(
        format!("Učitano {} rezervnih delova", spare_parts.len()),
        json!({ "spareParts": spare_parts }),
    )
}

/// GET /api/database/config - Saved connection settings, password masked.
pub async fn get_database_config(
    State(state): State<AppState>,
) -> ApiResult<DatabaseConfigView> {
    let Some(content) = env_file::read(state.erp.env_file()).await? else {
        return success(DatabaseConfigView {
            server: String::new(),
            database: String::new(),
            username: String::new(),
            password: String::new(),
            port: DEFAULT_PORT.to_string(),
        });
    };

    let value = |key: &str| env_file::extract_value(&content, key).unwrap_or_default();
    let port = env_file::extract_value(&content, KEY_PORT)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());

    success(DatabaseConfigView {
        server: value(KEY_SERVER),
        database: value(KEY_DATABASE),
        username: value(KEY_USER),
        password: MASKED_PASSWORD.to_string(),
        port,
    })
}

/// POST /api/database/config - Save connection settings and reload the client.
pub async fn save_database_config(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<DatabaseConfigRequest>,
) -> ApiResult<()> {
    let (Some(server), Some(database), Some(username), Some(password)) = (
        required(&request.server),
        required(&request.database),
        required(&request.username),
        request.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Sva polja su obavezna".to_string()));
    };
    let port = request
        .port_string()
        .unwrap_or_else(|| DEFAULT_PORT.to_string());

    env_file::write_values(
        state.erp.env_file(),
        &[
            (KEY_SERVER, server),
            (KEY_DATABASE, database),
            (KEY_USER, username),
            (KEY_PASSWORD, password),
            (KEY_PORT, port.as_str()),
        ],
    )
    .await?;
    state.erp.reload().await?;

    tracing::info!("ERP connection settings saved for {}:{}/{}", server, port, database);
    done("Konfiguracija uspešno sačuvana.")
}

/// GET /api/database/test - Check the ERP connection.
pub async fn test_database(State(state): State<AppState>) -> ApiResult<Map<String, Value>> {
    configured_settings(
        &state,
        "Database nije konfigurisan. Idite na Konfiguracija → Povezivanje sa Bazom i sačuvajte podešavanja.",
    )
    .await?;

    let row = state.erp.test_connection().await?;
    success_with("Konekcija uspešna!", row)
}

/// POST /api/database/test - Run an arbitrary query with named parameters.
///
/// Disabled unless `ERP_ALLOW_RAW_QUERY=true`.
pub async fn raw_query(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RawQueryRequest>,
) -> ApiResult<RawQueryResult> {
    if !state.config.allow_raw_query {
        return Err(AppError::Forbidden(
            "Raw SQL queries are disabled (ERP_ALLOW_RAW_QUERY)".to_string(),
        ));
    }
    let Some(sql) = required(&request.query) else {
        return Err(AppError::Validation("SQL query is required".to_string()));
    };
    configured_settings(
        &state,
        "Database nije konfigurisan. Idite na Konfiguracija → Povezivanje sa Bazom i sačuvajte podešavanja.",
    )
    .await?;

    tracing::info!("Executing raw ERP query");
    let result = state.erp.query(sql, request.params.as_ref()).await?;
    success_with("Query executed successfully", result)
}
