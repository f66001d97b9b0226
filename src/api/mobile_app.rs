//! Mobile app APK distribution endpoints.

use axum::extract::{multipart::MultipartRejection, Multipart, State};

use super::{success, success_with, ApiResult};
use crate::errors::AppError;
use crate::models::{BuildStatus, MobileAppInfo, UploadedApk};
use crate::system::apk;
use crate::AppState;

/// Multipart field carrying the APK.
const APK_FIELD: &str = "apk";

fn no_file() -> AppError {
    AppError::Validation("Nije izabran fajl".to_string())
}

/// GET /api/mobile-app - Published builds.
pub async fn mobile_app_info(State(state): State<AppState>) -> ApiResult<MobileAppInfo> {
    let info = apk::app_info(&state.config.apk_dir).await?;
    success(info)
}

/// POST /api/mobile-app/upload - Replace the published APK.
pub async fn upload_apk(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadedApk> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload: {}", e);
        no_file()
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(APK_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(no_file());
        };
        if !file_name.ends_with(".apk") {
            return Err(AppError::Validation("Fajl mora biti APK format".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Upload failed: {}", e)))?;
        let saved = apk::save_upload(&state.config.apk_dir, &file_name, &bytes).await?;
        return success_with("APK fajl je uspešno uploadovan", saved);
    }

    Err(no_file())
}

/// GET /api/mobile-app/build-status
pub async fn build_status(State(state): State<AppState>) -> ApiResult<BuildStatus> {
    let status = apk::build_status(&state.config.apk_dir, &state.config.build_log_dir).await?;
    success(status)
}
