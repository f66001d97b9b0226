//! Host process orchestration: shell probes, detached scripts, backups,
//! APK distribution and self-update.

pub mod apk;
pub mod backups;
pub mod info;
pub mod update;

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::AppError;

/// Run `cmd` through `sh -c` and return its trimmed stdout.
pub async fn run_shell(cmd: &str, cwd: Option<&Path>) -> Result<String, AppError> {
    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd).stdin(Stdio::null());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| AppError::Process(format!("Failed to run `{}`: {}", cmd, e)))?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!("`{}` exited with {}: {}", cmd, output.status, stderr);
        Err(AppError::Process(if stderr.is_empty() {
            format!("`{}` exited with {}", cmd, output.status)
        } else {
            stderr
        }))
    }
}

/// Probe output, or `fallback` when the command fails or prints nothing.
pub async fn probe(cmd: &str, cwd: Option<&Path>, fallback: &str) -> String {
    match run_shell(cmd, cwd).await {
        Ok(out) if !out.is_empty() => out,
        Ok(_) => fallback.to_string(),
        Err(e) => {
            tracing::debug!("Probe `{}` failed: {}", cmd, e);
            fallback.to_string()
        }
    }
}

/// Start `program` without waiting for it. The child is reaped in a
/// background task that logs its exit status.
pub fn spawn_detached(program: &str, args: &[&str]) -> Result<(), AppError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| AppError::Process(format!("Failed to start {}: {}", program, e)))?;

    let label = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::info!("Started background process: {}", label);

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {
                tracing::info!("Background process finished: {}", label)
            }
            Ok(status) => tracing::warn!("Background process `{}` exited with {}", label, status),
            Err(e) => tracing::error!("Failed to wait for `{}`: {}", label, e),
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_shell_trims_stdout() {
        let out = run_shell("printf '  hello \\n'", None).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_run_shell_reports_stderr() {
        let err = run_shell("echo broken >&2; exit 3", None).await.unwrap_err();
        assert!(matches!(&err, AppError::Process(msg) if msg == "broken"));
    }

    #[tokio::test]
    async fn test_run_shell_uses_cwd() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("marker.txt"), "x").unwrap();
        let out = run_shell("ls", Some(temp_dir.path())).await.unwrap();
        assert_eq!(out, "marker.txt");
    }

    #[tokio::test]
    async fn test_probe_fallback() {
        assert_eq!(probe("exit 1", None, "Unknown").await, "Unknown");
        assert_eq!(probe("true", None, "Unknown").await, "Unknown");
    }

    #[tokio::test]
    async fn test_spawn_detached_missing_program() {
        let result = spawn_detached("/nonexistent/definitely-not-here", &[]);
        assert!(matches!(result, Err(AppError::Process(_))));
    }
}
