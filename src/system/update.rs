//! OS package upgrade and application self-update.

use std::path::Path;
use std::time::Duration;

use super::run_shell;
use crate::config::Config;
use crate::errors::AppError;

/// Delay before restarting so the HTTP response can be flushed first.
const RESTART_DELAY: Duration = Duration::from_secs(2);

const APT_STEPS: [&str; 3] = [
    "sudo apt update",
    "sudo DEBIAN_FRONTEND=noninteractive apt upgrade -y",
    "sudo apt autoremove -y && sudo apt autoclean",
];

/// Upgrade host packages. Stops at the first failing step.
pub async fn upgrade_packages() -> Result<(), AppError> {
    for step in APT_STEPS {
        tracing::info!("Running `{}`", step);
        run_shell(step, None).await?;
    }
    tracing::info!("System packages upgraded");
    Ok(())
}

/// Pull, rebuild and schedule a restart of the deployed application.
///
/// Git steps run only inside a checkout, and their failures are logged and
/// tolerated. Install and build failures abort the update; nothing is rolled
/// back.
pub async fn self_update(config: &Config) -> Result<(), AppError> {
    let repo = Some(config.repo_dir.as_path());
    tracing::info!("Starting application update in {:?}", config.repo_dir);

    let env_backup = match tokio::fs::read_to_string(&config.env_file).await {
        Ok(content) => {
            tracing::info!("Backed up {:?}", config.env_file);
            Some(content)
        }
        Err(e) => {
            tracing::warn!("Could not back up {:?}: {}", config.env_file, e);
            None
        }
    };

    if is_git_checkout(&config.repo_dir) {
        pull_latest(config).await;
    } else {
        tracing::warn!(
            "{:?} is not a git checkout, skipping reset and pull",
            config.repo_dir
        );
    }

    if let Some(content) = env_backup {
        match tokio::fs::write(&config.env_file, content).await {
            Ok(()) => tracing::info!("Restored {:?}", config.env_file),
            Err(e) => tracing::warn!("Could not restore {:?}: {}", config.env_file, e),
        }
    }

    run_shell(&config.install_cmd, repo)
        .await
        .map_err(|e| AppError::Process(format!("Instalacija dependencies nije uspela: {}", e)))?;
    tracing::info!("Dependencies installed");

    run_shell(&config.build_cmd, repo)
        .await
        .map_err(|e| AppError::Process(format!("Build nije uspeo: {}", e)))?;
    tracing::info!("Build completed");

    let config = config.clone();
    tokio::spawn(async move {
        tokio::time::sleep(RESTART_DELAY).await;
        restart_service(&config).await;
    });

    Ok(())
}

/// True when `repo_dir` holds a `.git` directory or worktree file.
fn is_git_checkout(repo_dir: &Path) -> bool {
    repo_dir.join(".git").exists()
}

/// Discard local changes and pull the configured branch. Failures are logged.
async fn pull_latest(config: &Config) {
    let repo = Some(config.repo_dir.as_path());
    if let Err(e) = run_shell("git reset --hard", repo).await {
        tracing::warn!("git reset failed: {}", e);
    }

    match run_shell(
        &format!("git pull {} {}", config.git_remote, config.git_branch),
        repo,
    )
    .await
    {
        Ok(out) => tracing::info!("git pull: {}", out),
        Err(e) => tracing::error!("git pull failed: {}", e),
    }
}

/// Try pm2, then systemd, then leave a flag file for an operator.
pub async fn restart_service(config: &Config) {
    match run_shell(&format!("pm2 restart {}", config.pm2_name), None).await {
        Ok(_) => {
            tracing::info!("Service restarted with pm2");
            return;
        }
        Err(e) => tracing::debug!("pm2 restart failed: {}", e),
    }

    match run_shell(
        &format!("sudo systemctl restart {}", config.systemd_unit),
        None,
    )
    .await
    {
        Ok(_) => {
            tracing::info!("Service restarted with systemd");
            return;
        }
        Err(e) => tracing::debug!("systemctl restart failed: {}", e),
    }

    match tokio::fs::write(&config.restart_flag, "1").await {
        Ok(()) => tracing::warn!(
            "Could not restart service automatically, wrote {:?}",
            config.restart_flag
        ),
        Err(e) => tracing::error!("Could not write restart flag {:?}: {}", config.restart_flag, e),
    }
}
