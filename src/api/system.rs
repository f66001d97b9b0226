//! Host maintenance, self-update and version endpoints.

use axum::extract::State;

use super::{done, success, ApiResult};
use crate::errors::AppError;
use crate::models::{SystemInfo, VersionInfo};
use crate::system::{info, update};
use crate::AppState;

/// GET /api/system/info
pub async fn system_info(State(state): State<AppState>) -> ApiResult<SystemInfo> {
    success(info::system_info(&state.config).await)
}

/// POST /api/system/update - Upgrade OS packages (blocking).
pub async fn system_update() -> ApiResult<()> {
    update::upgrade_packages().await.map_err(|e| {
        AppError::Process(format!("Greška pri ažuriranju sistema: {}", e.message()))
    })?;
    done("Sistem je uspešno ažuriran")
}

/// POST /api/update - Pull, rebuild and restart the application.
pub async fn self_update(State(state): State<AppState>) -> ApiResult<()> {
    update::self_update(&state.config).await.map_err(|e| {
        AppError::Process(format!(
            "Greška pri ažuriranju aplikacije: {}",
            e.message()
        ))
    })?;
    done("Ažuriranje uspešno! Aplikacija će se restartovati za nekoliko sekundi...")
}

/// GET /api/version
pub async fn version(State(state): State<AppState>) -> ApiResult<VersionInfo> {
    success(info::version_info(&state.config).await)
}
