//! Backup listing, creation, restore and download.

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use super::{done, success, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::{BackupList, DownloadQuery, RestoreRequest};
use crate::store::required;
use crate::system::{self, backups};
use crate::AppState;

async fn script_exists(path: &std::path::Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// GET /api/backup - Newest backup archives.
pub async fn list_backups(State(state): State<AppState>) -> ApiResult<BackupList> {
    let list = backups::list_backups(&state.config.backup_dirs).await?;
    success(list)
}

/// POST /api/backup - Start the backup script in the background.
pub async fn create_backup(State(state): State<AppState>) -> ApiResult<()> {
    let script = &state.config.backup_script;
    if !script_exists(script).await {
        return Err(AppError::NotFound(
            "Backup script not found. Please run git pull first.".to_string(),
        ));
    }

    let script = script.to_string_lossy();
    system::spawn_detached("bash", &[script.as_ref()])?;
    done("Backup je pokrenut u pozadini. Sačekajte 1-2 minuta i refresh-ujte stranicu.")
}

/// POST /api/backup/restore - Start the restore script for one archive.
pub async fn restore_backup(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RestoreRequest>,
) -> ApiResult<()> {
    let Some(name) = required(&request.backup_file) else {
        return Err(AppError::Validation(
            "Naziv backup fajla nije prosleđen".to_string(),
        ));
    };
    if !backups::is_safe_file_name(name) {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }

    let Some(archive) = backups::find_backup(&state.config.backup_dirs, name).await else {
        return Err(AppError::NotFound("Backup fajl ne postoji".to_string()));
    };

    let script = &state.config.restore_script;
    if !script_exists(script).await {
        return Err(AppError::NotFound(
            "Restore script ne postoji. Molimo kontaktirajte administratora.".to_string(),
        ));
    }

    tracing::warn!("Restoring backup {:?}", archive);
    let script = script.to_string_lossy();
    let archive = archive.to_string_lossy();
    system::spawn_detached("bash", &[script.as_ref(), archive.as_ref()])?;
    done("Restore je pokrenut u pozadini. Server će se restartovati za 5 sekundi.")
}

/// GET /api/backup/download?file= - Stream one archive.
pub async fn download_backup(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let Some(name) = required(&query.file) else {
        return Err(AppError::Validation("Filename not provided".to_string()));
    };
    if !backups::is_safe_file_name(name) {
        return Err(AppError::Validation("Invalid filename".to_string()));
    }

    let Some(path) = backups::find_backup(&state.config.backup_dirs, name).await else {
        return Err(AppError::NotFound("Backup file not found".to_string()));
    };

    let file = tokio::fs::File::open(&path).await?;
    let length = file.metadata().await?.len();
    tracing::info!("Serving backup {:?} ({} bytes)", path, length);

    Ok((
        [
            (header::CONTENT_TYPE, "application/gzip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
