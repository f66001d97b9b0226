//! Host and deployment probes.

use super::{probe, run_shell};
use crate::config::Config;
use crate::models::{DiskSpace, RamMemory, SystemInfo, VersionInfo};

const UNKNOWN: &str = "Unknown";

fn parse_percent(raw: &str) -> u32 {
    raw.trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .map(|p| p.round().max(0.0) as u32)
        .unwrap_or(0)
}

/// `used total pct%` as printed by `df -h`.
pub fn parse_disk(raw: &str) -> DiskSpace {
    let mut fields = raw.split_whitespace();
    let mut next = || fields.next().unwrap_or(UNKNOWN).to_string();
    let used = next();
    let total = next();
    let percentage = parse_percent(&next());
    DiskSpace {
        used,
        total,
        percentage,
    }
}

/// `total used available` as printed by `free -h`, plus a usage percentage.
pub fn parse_ram(raw: &str, percent_raw: &str) -> RamMemory {
    let mut fields = raw.split_whitespace();
    let mut next = || fields.next().unwrap_or(UNKNOWN).to_string();
    RamMemory {
        total: next(),
        used: next(),
        available: next(),
        percentage: parse_percent(percent_raw),
    }
}

async fn os_version() -> String {
    let pretty = probe(
        "cat /etc/os-release | grep PRETTY_NAME | cut -d '\"' -f 2",
        None,
        "",
    )
    .await;
    let name = if pretty.is_empty() {
        probe("cat /etc/issue | head -1", None, "Ubuntu").await
    } else {
        pretty
    };
    name.replace('"', "")
}

fn git(config: &Config, args: &str) -> String {
    format!("git -C '{}' {}", config.repo_dir.display(), args)
}

pub async fn system_info(config: &Config) -> SystemInfo {
    let disk_raw = probe("df -h / | tail -1 | awk '{print $3, $2, $5}'", None, "").await;
    let ram_raw = probe("free -h | grep Mem | awk '{print $2, $3, $7}'", None, "").await;
    let ram_pct = probe("free | grep Mem | awk '{print ($3/$2) * 100.0}'", None, "0").await;
    let upgradable = probe(
        "apt list --upgradable 2>/dev/null | grep -v 'Listing' | wc -l",
        None,
        "0",
    )
    .await;

    SystemInfo {
        os_version: os_version().await,
        kernel_version: probe("uname -r", None, UNKNOWN).await,
        disk_space: parse_disk(&disk_raw),
        ram_memory: parse_ram(&ram_raw, &ram_pct),
        update_available: upgradable.trim().parse::<u64>().unwrap_or(0) > 0,
        git_version: probe(&git(config, "rev-parse --short HEAD"), None, UNKNOWN).await,
        git_branch: probe(&git(config, "rev-parse --abbrev-ref HEAD"), None, "main").await,
        last_commit_date: probe(
            &git(config, "log -1 --format=%cd --date=format:'%Y-%m-%d %H:%M:%S'"),
            None,
            UNKNOWN,
        )
        .await,
        last_commit_message: probe(&git(config, "log -1 --format=%s"), None, UNKNOWN).await,
    }
}

fn short(hash: &str) -> String {
    hash.trim().chars().take(7).collect()
}

/// Compare the deployed commit with the remote branch head.
pub async fn version_info(config: &Config) -> VersionInfo {
    let cwd = Some(config.repo_dir.as_path());
    let mut current_commit = String::new();
    let mut latest_commit = String::new();

    let checked = async {
        current_commit = short(&run_shell("git rev-parse HEAD", cwd).await?);
        run_shell(
            &format!("git fetch {} {} --quiet", config.git_remote, config.git_branch),
            cwd,
        )
        .await?;
        latest_commit = short(
            &run_shell(
                &format!("git rev-parse {}/{}", config.git_remote, config.git_branch),
                cwd,
            )
            .await?,
        );
        Ok::<_, crate::errors::AppError>(())
    }
    .await;

    if let Err(e) = checked {
        tracing::warn!("Version check failed: {}", e);
    }

    VersionInfo {
        current_version: env!("CARGO_PKG_VERSION").to_string(),
        has_update: !latest_commit.is_empty() && current_commit != latest_commit,
        current_commit,
        latest_commit,
    }
}
