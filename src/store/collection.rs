//! A single JSON-file-backed collection.
//!
//! The whole collection lives in memory and every mutation rewrites the file.
//! Writers are serialized per collection; the in-memory copy is only replaced
//! once the new file is on disk.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::errors::AppError;

/// A record stored in a [`Collection`], addressed by its string id.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    fn id(&self) -> &str;
}

pub struct Collection<T> {
    path: PathBuf,
    items: RwLock<Vec<T>>,
}

impl<T: Record> Collection<T> {
    /// Load the collection from `path`.
    ///
    /// A missing file is created from `seed`. An unreadable or corrupt file is
    /// left in place and `seed` is used in memory.
    pub async fn load(path: PathBuf, seed: impl FnOnce() -> Vec<T>) -> Result<Self, AppError> {
        let items = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<T>>(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Failed to parse {:?}, using defaults: {}", path, e);
                    seed()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let items = seed();
                write_json_atomic(&path, &items).await?;
                tracing::info!("Created {:?} with {} records", path, items.len());
                items
            }
            Err(e) => {
                tracing::warn!("Failed to read {:?}, using defaults: {}", path, e);
                seed()
            }
        };

        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    /// Snapshot of every record.
    pub async fn get(&self) -> Vec<T> {
        self.items.read().await.clone()
    }

    /// Replace the whole collection.
    pub async fn set(&self, items: Vec<T>) -> Result<(), AppError> {
        self.mutate(move |current| {
            *current = items;
            Ok(())
        })
        .await
    }

    pub async fn add(&self, item: T) -> Result<(), AppError> {
        self.mutate(move |current| {
            current.push(item);
            Ok(())
        })
        .await
    }

    /// Shallow-merge `patch` into the record with `id`.
    ///
    /// Returns the updated record, or `None` when no record has that id. The
    /// `id` key of the patch is ignored.
    pub async fn update(&self, id: &str, patch: &Map<String, Value>) -> Result<Option<T>, AppError> {
        self.mutate(|current| {
            let Some(slot) = current.iter_mut().find(|item| item.id() == id) else {
                return Ok(None);
            };
            *slot = merge_patch(slot, patch)?;
            Ok(Some(slot.clone()))
        })
        .await
    }

    /// Remove every record with `id`. Returns whether anything was removed.
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        self.mutate(|current| {
            let before = current.len();
            current.retain(|item| item.id() != id);
            Ok(current.len() != before)
        })
        .await
    }

    /// Read-modify-write under the collection's write lock.
    ///
    /// `f` works on a copy. If it fails nothing is written; if the write fails
    /// the in-memory collection is left unchanged.
    pub async fn mutate<R>(
        &self,
        f: impl FnOnce(&mut Vec<T>) -> Result<R, AppError>,
    ) -> Result<R, AppError> {
        let mut guard = self.items.write().await;
        let mut next = guard.clone();
        let result = f(&mut next)?;
        write_json_atomic(&self.path, &next).await?;
        *guard = next;
        Ok(result)
    }
}

fn merge_patch<T: Record>(item: &T, patch: &Map<String, Value>) -> Result<T, AppError> {
    let mut value = serde_json::to_value(item)
        .map_err(|e| AppError::Internal(format!("Failed to serialize record: {}", e)))?;

    if let Value::Object(fields) = &mut value {
        for (key, field) in patch {
            if key != "id" {
                fields.insert(key.clone(), field.clone());
            }
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AppError::Validation(format!("Invalid field value: {}", e)))
}

/// Write `items` as pretty-printed JSON via a temp file and rename.
async fn write_json_atomic<T: Serialize>(path: &Path, items: &[T]) -> Result<(), AppError> {
    let bytes = serde_json::to_vec_pretty(items)
        .map_err(|e| AppError::Internal(format!("Failed to serialize {:?}: {}", path, e)))?;
    write_atomic(path, &bytes).await
}

/// Replace `path` with `bytes` through a uniquely named sibling temp file.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let result = async {
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        tracing::error!("Error writing {:?}: {}", path, e);
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(AppError::Storage(format!("Failed to write {:?}: {}", path, e)));
    }

    Ok(())
}
