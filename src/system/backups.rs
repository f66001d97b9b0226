//! Backup archive discovery.
//!
//! Archives are created and restored by shell scripts; this module only finds
//! them on disk and describes them.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::errors::AppError;
use crate::models::{BackupInfo, BackupList};

pub const BACKUP_PREFIX: &str = "lafantana-whs-backup-";
pub const BACKUP_SUFFIX: &str = ".tar.gz";

/// Number of archives reported by the listing.
pub const LISTED_BACKUPS: usize = 3;

static BACKUP_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"lafantana-whs-backup-v([^-]+)-(\d{8})-(\d{6})\.tar\.gz")
        .expect("backup name pattern is valid")
});

fn is_backup_archive(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_SUFFIX)
}

/// Plain file names only: no separators, no parent references.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains("..") && !name.contains('/') && !name.contains('\\')
}

/// Version, `YYYYMMDD-HHMMSS` and `DD.MM.YYYY HH:MM` parsed from an archive name.
pub fn parse_backup_name(name: &str) -> Option<(String, String, String)> {
    let caps = BACKUP_NAME.captures(name)?;
    let version = caps[1].to_string();
    let date = &caps[2];
    let time = &caps[3];
    let display = format!(
        "{}.{}.{} {}:{}",
        &date[6..8],
        &date[4..6],
        &date[0..4],
        &time[0..2],
        &time[2..4]
    );
    Some((version, format!("{}-{}", date, time), display))
}

/// Characters left as-is in a query string component, as `encodeURIComponent` does.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a query string component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn describe(name: String, size: u64, modified: SystemTime) -> BackupInfo {
    let (version, timestamp, date) = parse_backup_name(&name).unwrap_or_else(|| {
        let mtime: DateTime<Utc> = modified.into();
        (
            "unknown".to_string(),
            "-".to_string(),
            mtime.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    });

    BackupInfo {
        download_url: format!("/api/backup/download?file={}", encode_component(&name)),
        name,
        version,
        timestamp,
        size,
        date,
    }
}

async fn archives_in(dir: &Path) -> Result<Vec<(BackupInfo, SystemTime)>, AppError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if !is_backup_archive(&name) {
            continue;
        }
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        found.push((describe(name, meta.len(), modified), modified));
    }

    Ok(found)
}

/// Newest archives from the first candidate directory that holds any.
pub async fn list_backups(dirs: &[PathBuf]) -> Result<BackupList, AppError> {
    for dir in dirs {
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            continue;
        }

        let mut archives = match archives_in(dir).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!("Skipping backup directory {:?}: {}", dir, e);
                continue;
            }
        };
        if archives.is_empty() {
            continue;
        }

        archives.sort_by(|a, b| b.1.cmp(&a.1));
        let backups: Vec<BackupInfo> = archives
            .into_iter()
            .take(LISTED_BACKUPS)
            .map(|(info, _)| info)
            .collect();

        return Ok(BackupList {
            has_backups: !backups.is_empty(),
            backups,
            backup_dir: dir.display().to_string(),
        });
    }

    Ok(BackupList {
        backups: Vec::new(),
        has_backups: false,
        backup_dir: String::new(),
    })
}

/// Path of `name` in the first candidate directory that contains it.
pub async fn find_backup(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    if !is_safe_file_name(name) {
        return None;
    }
    for dir in dirs {
        let candidate = dir.join(name);
        if tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age: Duration) {
        let path = dir.join(name);
        fs::write(&path, b"archive").unwrap();
        let file = File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_parse_backup_name() {
        let (version, timestamp, date) =
            parse_backup_name("lafantana-whs-backup-v2.1.0-20251111-143000.tar.gz").unwrap();
        assert_eq!(version, "2.1.0");
        assert_eq!(timestamp, "20251111-143000");
        assert_eq!(date, "11.11.2025 14:30");

        assert!(parse_backup_name("lafantana-whs-backup-manual.tar.gz").is_none());
    }

    #[test]
    fn test_safe_file_names() {
        assert!(is_safe_file_name("lafantana-whs-backup-v1-20240101-000000.tar.gz"));
        assert!(!is_safe_file_name("../etc/passwd"));
        assert!(!is_safe_file_name("sub/file.tar.gz"));
        assert!(!is_safe_file_name(""));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("a b&c.tar.gz"), "a%20b%26c.tar.gz");
        assert_eq!(encode_component("v(1)_x~y*'!"), "v(1)_x~y*'!");
        assert_eq!(encode_component("č/?"), "%C4%8D%2F%3F");
    }

    #[tokio::test]
    async fn test_list_uses_first_dir_with_archives() {
        let empty = TempDir::new().unwrap();
        let full = TempDir::new().unwrap();
        fs::write(empty.path().join("notes.txt"), "x").unwrap();

        for (i, name) in [
            "lafantana-whs-backup-v2.0.0-20240101-100000.tar.gz",
            "lafantana-whs-backup-v2.0.1-20240201-100000.tar.gz",
            "lafantana-whs-backup-v2.1.0-20240301-100000.tar.gz",
            "lafantana-whs-backup-manual.tar.gz",
        ]
        .iter()
        .enumerate()
        {
            touch(full.path(), name, Duration::from_secs(3600 * (4 - i as u64)));
        }

        let dirs = vec![
            PathBuf::from("/nonexistent/backups"),
            empty.path().to_path_buf(),
            full.path().to_path_buf(),
        ];
        let list = list_backups(&dirs).await.unwrap();

        assert!(list.has_backups);
        assert_eq!(list.backup_dir, full.path().display().to_string());
        assert_eq!(list.backups.len(), LISTED_BACKUPS);
        // Newest first, oldest dropped
        assert_eq!(list.backups[0].name, "lafantana-whs-backup-manual.tar.gz");
        assert_eq!(list.backups[0].version, "unknown");
        assert_eq!(list.backups[1].version, "2.1.0");
        assert!(list.backups.iter().all(|b| b.version != "2.0.0"));
        assert!(list.backups[1]
            .download_url
            .starts_with("/api/backup/download?file=lafantana-whs-backup-v2.1.0"));
    }

    #[tokio::test]
    async fn test_list_without_archives() {
        let empty = TempDir::new().unwrap();
        let list = list_backups(&[empty.path().to_path_buf()]).await.unwrap();
        assert!(!list.has_backups);
        assert!(list.backup_dir.is_empty());
    }

    #[tokio::test]
    async fn test_find_backup() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let name = "lafantana-whs-backup-v2.1.0-20240301-100000.tar.gz";
        touch(second.path(), name, Duration::ZERO);

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_backup(&dirs, name).await, Some(second.path().join(name)));
        assert_eq!(find_backup(&dirs, "missing.tar.gz").await, None);
        assert_eq!(find_backup(&dirs, "../x.tar.gz").await, None);
    }
}
