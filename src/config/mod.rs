//! Configuration module for the admin backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! ERP credentials live in a separate env file that the admin UI can rewrite
//! (see `erp::env_file`).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BACKUP_DIRS: &str =
    "/root/webadminportal/backups,/root/webadminportal,./public/backups,../backups";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (optional)
    pub api_psk: Option<String>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Directory holding the JSON collections
    pub data_dir: PathBuf,
    /// Env file holding the ERP connection settings
    pub env_file: PathBuf,
    /// Directory of published APK builds
    pub apk_dir: PathBuf,
    /// Directory scanned for `android-build-*.log`
    pub build_log_dir: PathBuf,
    /// Candidate backup directories, searched in order
    pub backup_dirs: Vec<PathBuf>,
    pub backup_script: PathBuf,
    pub restore_script: PathBuf,
    /// Git checkout of the deployed application
    pub repo_dir: PathBuf,
    pub git_remote: String,
    pub git_branch: String,
    pub pm2_name: String,
    pub systemd_unit: String,
    pub install_cmd: String,
    pub build_cmd: String,
    /// Written when no service manager could restart the process
    pub restart_flag: PathBuf,
    /// Enables `POST /api/database/test`
    pub allow_raw_query: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("WHS_API_PSK").ok().filter(|s| !s.is_empty());

        let bind_addr = env::var("WHS_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("Invalid WHS_BIND_ADDR format");

        let backup_dirs = env::var("WHS_BACKUP_DIRS")
            .unwrap_or_else(|_| DEFAULT_BACKUP_DIRS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();

        Self {
            api_psk,
            bind_addr,
            log_level: var_or("WHS_LOG_LEVEL", "info"),
            log_json: var_or("WHS_LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
            data_dir: var_or("WHS_DATA_DIR", "./data").into(),
            env_file: var_or("WHS_ENV_FILE", "./.env.local").into(),
            apk_dir: var_or("WHS_APK_DIR", "./public/apk").into(),
            build_log_dir: var_or("WHS_BUILD_LOG_DIR", "/tmp").into(),
            backup_dirs,
            backup_script: var_or("WHS_BACKUP_SCRIPT", "/root/webadminportal/CREATE_BACKUP.sh")
                .into(),
            restore_script: var_or(
                "WHS_RESTORE_SCRIPT",
                "/root/webadminportal/RESTORE_BACKUP.sh",
            )
            .into(),
            repo_dir: var_or("WHS_REPO_DIR", ".").into(),
            git_remote: var_or("WHS_GIT_REMOTE", "origin"),
            git_branch: var_or("WHS_GIT_BRANCH", "main"),
            pm2_name: var_or("WHS_PM2_NAME", "lafantana-whs-admin"),
            systemd_unit: var_or("WHS_SYSTEMD_UNIT", "lafantana-admin"),
            install_cmd: var_or("WHS_INSTALL_CMD", "cargo fetch"),
            build_cmd: var_or("WHS_BUILD_CMD", "cargo build --release"),
            restart_flag: var_or("WHS_RESTART_FLAG", "/tmp/web-admin-restart-required").into(),
            allow_raw_query: var_or("ERP_ALLOW_RAW_QUERY", "false") == "true",
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    // Tests mutate process-wide environment variables
    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // Clear any existing env vars
        for key in [
            "WHS_API_PSK",
            "WHS_BIND_ADDR",
            "WHS_LOG_LEVEL",
            "WHS_DATA_DIR",
            "WHS_BACKUP_DIRS",
            "WHS_GIT_BRANCH",
            "ERP_ALLOW_RAW_QUERY",
        ] {
            env::remove_var(key);
        }
        let config = Config::from_env();

        assert!(config.api_psk.is_none());
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.backup_dirs.len(), 4);
        assert_eq!(config.git_branch, "main");
        assert!(!config.allow_raw_query);
    }

    #[test]
    fn test_backup_dirs_list() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        env::set_var("WHS_BACKUP_DIRS", "/a, /b ,,");
        let config = Config::from_env();
        assert_eq!(
            config.backup_dirs,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        env::remove_var("WHS_BACKUP_DIRS");
    }
}
