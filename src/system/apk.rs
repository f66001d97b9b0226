//! Mobile app (APK) distribution directory.

use std::path::Path;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::backups::is_safe_file_name;
use crate::errors::AppError;
use crate::models::{ApkBuild, BuildStatus, MobileAppInfo, UploadedApk};
use crate::store::write_atomic;

pub const NO_VERSION: &str = "Nije dostupno";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const VERSION_MARKER: &str = ".latest-build-version";
pub const DATE_MARKER: &str = ".latest-build-date";

const LISTED_BUILDS: usize = 3;
const BUILD_LOG_PREFIX: &str = "android-build-";
const BUILD_LOG_SUFFIX: &str = ".log";
/// A build log touched within this window means a build is running.
const BUILD_WINDOW: Duration = Duration::from_secs(15 * 60);

static APK_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"v?(\d+\.\d+\.\d+)").expect("version pattern is valid"));

fn iso(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_apk(name: &str) -> bool {
    name.ends_with(".apk")
}

/// Version embedded in an APK file name.
pub fn apk_version(name: &str) -> String {
    APK_VERSION
        .captures(name)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

/// Files in `dir` accepted by `filter`, newest first, with size and mtime.
async fn files_by_mtime(
    dir: &Path,
    filter: impl Fn(&str) -> bool,
) -> Result<Vec<(String, u64, SystemTime)>, AppError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !filter(&name) {
            continue;
        }
        let meta = entry.metadata().await?;
        if meta.is_file() {
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((name, meta.len(), modified));
        }
    }

    files.sort_by(|a, b| b.2.cmp(&a.2));
    Ok(files)
}

/// Published builds, newest first. Creates the directory when missing.
pub async fn app_info(apk_dir: &Path) -> Result<MobileAppInfo, AppError> {
    tokio::fs::create_dir_all(apk_dir).await?;
    let files = files_by_mtime(apk_dir, is_apk).await?;

    let builds: Vec<ApkBuild> = files
        .iter()
        .take(LISTED_BUILDS)
        .map(|(name, size, modified)| ApkBuild {
            name: name.clone(),
            version: apk_version(name),
            size: *size,
            build_date: iso(*modified),
            download_url: format!("/apk/{}", name),
        })
        .collect();

    let latest = builds.first();
    Ok(MobileAppInfo {
        has_apk: !files.is_empty(),
        latest_version: latest
            .map(|b| b.version.clone())
            .unwrap_or_else(|| NO_VERSION.to_string()),
        download_url: latest.map(|b| b.download_url.clone()),
        file_name: latest.map(|b| b.name.clone()),
        updated_at: iso(SystemTime::now()),
        builds,
    })
}

/// Publish `bytes` as `file_name`, then remove every other APK.
///
/// A failed write leaves the previously published builds in place.
pub async fn save_upload(
    apk_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<UploadedApk, AppError> {
    if !is_apk(file_name) {
        return Err(AppError::Validation("Fajl mora biti APK format".to_string()));
    }
    if !is_safe_file_name(file_name) {
        return Err(AppError::Validation("Nevalidan naziv fajla".to_string()));
    }

    tokio::fs::create_dir_all(apk_dir).await?;
    write_atomic(&apk_dir.join(file_name), bytes).await?;

    for (old, _, _) in files_by_mtime(apk_dir, is_apk).await? {
        if old == file_name {
            continue;
        }
        match tokio::fs::remove_file(apk_dir.join(&old)).await {
            Ok(()) => tracing::info!("Removed previous APK {}", old),
            Err(e) => tracing::warn!("Could not remove previous APK {}: {}", old, e),
        }
    }

    tracing::info!("Stored APK {} ({} bytes)", file_name, bytes.len());
    Ok(UploadedApk {
        file_name: file_name.to_string(),
        size: bytes.len() as u64,
        uploaded_at: iso(SystemTime::now()),
    })
}

async fn read_marker(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path)
        .await
        .ok()
        .map(|s| s.trim().to_string())
}

/// Last build markers and whether a build log is still being written.
pub async fn build_status(apk_dir: &Path, build_log_dir: &Path) -> Result<BuildStatus, AppError> {
    let latest_build_version = read_marker(&apk_dir.join(VERSION_MARKER)).await;
    let latest_build_date = read_marker(&apk_dir.join(DATE_MARKER)).await;

    let logs = match files_by_mtime(build_log_dir, |name| {
        name.starts_with(BUILD_LOG_PREFIX) && name.ends_with(BUILD_LOG_SUFFIX)
    })
    .await
    {
        Ok(logs) => logs,
        Err(e) => {
            tracing::warn!("Cannot scan build logs in {:?}: {}", build_log_dir, e);
            Vec::new()
        }
    };

    let build_in_progress = logs
        .first()
        .and_then(|(_, _, modified)| SystemTime::now().duration_since(*modified).ok())
        .map(|age| age < BUILD_WINDOW)
        .unwrap_or(false);

    Ok(BuildStatus {
        latest_build_version,
        latest_build_date,
        build_in_progress,
    })
}
