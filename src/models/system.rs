//! Host, deployment and artifact (backup, APK) descriptions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiskSpace {
    pub used: String,
    pub total: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RamMemory {
    pub total: String,
    pub used: String,
    pub available: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os_version: String,
    pub kernel_version: String,
    pub disk_space: DiskSpace,
    pub ram_memory: RamMemory,
    pub update_available: bool,
    pub git_version: String,
    pub git_branch: String,
    pub last_commit_date: String,
    pub last_commit_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub current_version: String,
    pub current_commit: String,
    pub latest_commit: String,
    pub has_update: bool,
}

/// A backup archive on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    pub version: String,
    /// `YYYYMMDD-HHMMSS` from the file name, `-` when it does not parse
    pub timestamp: String,
    pub size: u64,
    pub date: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupList {
    pub backups: Vec<BackupInfo>,
    pub has_backups: bool,
    pub backup_dir: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    #[serde(default)]
    pub backup_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub file: Option<String>,
}

/// A published mobile build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApkBuild {
    pub name: String,
    pub version: String,
    pub size: u64,
    pub build_date: String,
    pub download_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileAppInfo {
    pub has_apk: bool,
    pub latest_version: String,
    pub download_url: Option<String>,
    pub file_name: Option<String>,
    pub updated_at: String,
    pub builds: Vec<ApkBuild>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedApk {
    pub file_name: String,
    pub size: u64,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    pub latest_build_version: Option<String>,
    pub latest_build_date: Option<String>,
    pub build_in_progress: bool,
}
