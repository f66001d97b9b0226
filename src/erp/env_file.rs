//! Raw `KEY=value` env file editing.
//!
//! The file is treated as plain text: keys are read with a line regex and
//! updated in place, leaving every other line as it was.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::errors::AppError;
use crate::store::write_atomic;

/// One `KEY=value` line. Group 1 is the key, group 2 the raw value.
static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").expect("entry line pattern is valid")
});

/// Value of `key` in `content`, trimmed and without surrounding quotes.
pub fn extract_value(content: &str, key: &str) -> Option<String> {
    let captures = ENTRY_LINE
        .captures_iter(content)
        .find(|caps| &caps[1] == key)?;
    let raw = captures.get(2)?.as_str().trim();
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    Some(unquoted.to_string())
}

/// Replace the first line for each key, or append one when the key is absent.
pub fn upsert(content: &str, updates: &[(&str, &str)]) -> String {
    let mut next = content.to_string();

    for (key, value) in updates {
        let line = format!("{}={}", key, value);
        let mut replaced = false;
        let rewritten = ENTRY_LINE
            .replace_all(&next, |caps: &Captures| {
                if !replaced && &caps[1] == *key {
                    replaced = true;
                    line.clone()
                } else {
                    caps[0].to_string()
                }
            })
            .into_owned();

        if replaced {
            next = rewritten;
        } else {
            if !next.is_empty() && !next.ends_with('\n') {
                next.push('\n');
            }
            next.push_str(&line);
        }
    }

    next
}

/// Read the file, returning `None` when it does not exist.
pub async fn read(path: &Path) -> Result<Option<String>, AppError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Storage(format!("Failed to read {:?}: {}", path, e))),
    }
}

/// Values of `keys` found in the file.
pub async fn read_values(path: &Path, keys: &[&str]) -> Result<HashMap<String, String>, AppError> {
    let content = read(path).await?.unwrap_or_default();
    Ok(keys
        .iter()
        .filter_map(|key| extract_value(&content, key).map(|v| (key.to_string(), v)))
        .collect())
}

/// Apply `updates` to the file, creating it when missing.
pub async fn write_values(path: &Path, updates: &[(&str, &str)]) -> Result<(), AppError> {
    let content = read(path).await?.unwrap_or_default();
    let next = upsert(&content, updates);
    write_atomic(path, next.as_bytes()).await
}
