//! ERP connection settings.

use std::path::Path;

use super::env_file;
use crate::errors::AppError;

pub const DEFAULT_PORT: u16 = 1433;

pub const KEY_SERVER: &str = "DB_SERVER";
pub const KEY_DATABASE: &str = "DB_NAME";
pub const KEY_USER: &str = "DB_USER";
pub const KEY_PASSWORD: &str = "DB_PASSWORD";
pub const KEY_PORT: &str = "DB_PORT";
pub const KEY_ENCRYPT: &str = "DB_ENCRYPT";
pub const KEY_TRUST_CERT: &str = "DB_TRUST_CERT";

const ALL_KEYS: [&str; 7] = [
    KEY_SERVER,
    KEY_DATABASE,
    KEY_USER,
    KEY_PASSWORD,
    KEY_PORT,
    KEY_ENCRYPT,
    KEY_TRUST_CERT,
];

#[derive(Debug, Clone, PartialEq)]
pub struct ErpSettings {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub encrypt: bool,
    pub trust_cert: bool,
}

impl Default for ErpSettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            database: String::new(),
            user: String::new(),
            password: String::new(),
            port: DEFAULT_PORT,
            encrypt: false,
            trust_cert: true,
        }
    }
}

impl ErpSettings {
    /// Read settings from the env file, falling back to process variables.
    pub async fn load(env_file: &Path) -> Result<Self, AppError> {
        let file_values = env_file::read_values(env_file, &ALL_KEYS).await?;
        Ok(Self::from_lookup(|key| {
            file_values
                .get(key)
                .cloned()
                .or_else(|| std::env::var(key).ok())
        }))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            server: text(KEY_SERVER),
            database: text(KEY_DATABASE),
            user: text(KEY_USER),
            password: lookup(KEY_PASSWORD).unwrap_or_default(),
            port: lookup(KEY_PORT)
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            encrypt: text(KEY_ENCRYPT) == "true",
            trust_cert: text(KEY_TRUST_CERT) != "false",
        }
    }

    /// Server, database, user and password are all set.
    pub fn is_configured(&self) -> bool {
        !self.server.is_empty()
            && !self.database.is_empty()
            && !self.user.is_empty()
            && !self.password.is_empty()
    }

    /// Settings that are safe to echo back to a client.
    pub fn public_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "server": self.server,
            "database": self.database,
            "user": self.user,
            "port": self.port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> ErpSettings {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ErpSettings::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = from_pairs(&[]);
        assert_eq!(settings, ErpSettings::default());
        assert!(!settings.is_configured());
        assert!(settings.trust_cert);
        assert!(!settings.encrypt);
    }

    #[test]
    fn test_parse_values() {
        let settings = from_pairs(&[
            (KEY_SERVER, "10.0.0.5"),
            (KEY_DATABASE, "Charisma"),
            (KEY_USER, "sa"),
            (KEY_PASSWORD, " secret "),
            (KEY_PORT, "14330"),
            (KEY_ENCRYPT, "true"),
            (KEY_TRUST_CERT, "false"),
        ]);

        assert!(settings.is_configured());
        assert_eq!(settings.port, 14330);
        assert_eq!(settings.password, " secret ");
        assert!(settings.encrypt);
        assert!(!settings.trust_cert);
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let settings = from_pairs(&[(KEY_PORT, "abc")]);
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn test_summary_has_no_password() {
        let settings = from_pairs(&[(KEY_PASSWORD, "secret")]);
        let summary = settings.public_summary();
        assert!(summary.get("password").is_none());
        assert_eq!(summary["port"], 1433);
    }

    #[tokio::test]
    async fn test_load_prefers_env_file_values() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join(".env.local");
        std::fs::write(&path, "DB_SERVER=erp.file
DB_PORT=2000
DB_ENCRYPT=true
").unwrap();

        let settings = ErpSettings::load(&path).await.unwrap();
        assert_eq!(settings.server, "erp.file");
        assert_eq!(settings.port, 2000);
        assert!(settings.encrypt);
    }
}
