//! SQL Server (ERP) client.
//!
//! Queries run on a bb8 connection pool that is built on first use from the
//! current settings. Reloading the settings drops the pool, so the next call
//! connects with the new values. Connections are validated on checkout.

pub mod env_file;
pub mod settings;

use std::path::PathBuf;
use std::time::Duration;

use bb8::{ManageConnection, Pool, RunError};
use bb8_tiberius::ConnectionManager;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tiberius::{AuthMethod, ColumnData, EncryptionLevel, FromSql, Query, Row};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::models::{CatalogKind, ErpItem, RawQueryResult};
pub use settings::ErpSettings;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);
const POOL_MAX_SIZE: u32 = 10;

pub const TEST_QUERY: &str = "SELECT @@VERSION AS Version, GETDATE() AS CurrentDateTime";

const OPERATIONS_QUERY: &str = "SELECT DISTINCT i.ItemId, i.ItemCode AS Sifra, \
     i.ItemName AS Naziv, 'Aktivan' AS Status FROM Item i \
     WHERE LEFT(i.ItemCode, 2) = 'OP' AND i.Enabled = 1 AND i.IsStockable = 0 \
     ORDER BY i.ItemCode";

const SPARE_PARTS_QUERY: &str = "SELECT DISTINCT i.ItemId, i.ItemCode AS Sifra, \
     i.ItemName AS Naziv, 'Aktivan' AS Status FROM Item i \
     WHERE LEFT(i.ItemCode, 3) = '102' AND i.Enabled = 1 AND i.IsStockable = 1 \
     ORDER BY i.ItemCode";

static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("parameter pattern is valid"));

type ErpPool = Pool<ConnectionManager>;
type Connection = <ConnectionManager as ManageConnection>::Connection;

pub struct ErpClient {
    env_file: PathBuf,
    settings: RwLock<ErpSettings>,
    pool: RwLock<Option<ErpPool>>,
}

impl ErpClient {
    /// Create a client with settings read from `env_file`. No connection is
    /// opened yet.
    pub async fn new(env_file: PathBuf) -> Result<Self, AppError> {
        let settings = ErpSettings::load(&env_file).await?;
        if settings.is_configured() {
            tracing::info!(
                "ERP configured: {}:{}/{}",
                settings.server,
                settings.port,
                settings.database
            );
        } else {
            tracing::warn!("ERP connection is not configured");
        }

        Ok(Self {
            env_file,
            settings: RwLock::new(settings),
            pool: RwLock::new(None),
        })
    }

    pub fn env_file(&self) -> &std::path::Path {
        &self.env_file
    }

    pub async fn settings(&self) -> ErpSettings {
        self.settings.read().await.clone()
    }

    /// Re-read the env file and drop the pool.
    pub async fn reload(&self) -> Result<ErpSettings, AppError> {
        let settings = ErpSettings::load(&self.env_file).await?;
        *self.settings.write().await = settings.clone();
        self.pool.write().await.take();
        tracing::info!("ERP settings reloaded");
        Ok(settings)
    }

    /// The pool for the current settings, built on first use.
    async fn pool(&self) -> ErpPool {
        if let Some(pool) = self.pool.read().await.as_ref() {
            return pool.clone();
        }

        let mut slot = self.pool.write().await;
        if let Some(pool) = slot.as_ref() {
            return pool.clone();
        }
        let settings = self.settings().await;
        let pool = build_pool(&settings);
        tracing::info!(
            "Created ERP pool for {}:{} (max {} connections)",
            settings.server,
            settings.port,
            POOL_MAX_SIZE
        );
        *slot = Some(pool.clone());
        pool
    }

    /// Run `sql` with named parameters referenced as `@name`.
    pub async fn query(
        &self,
        sql: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<RawQueryResult, AppError> {
        let prepared = bind_named(sql, params)?;

        let pool = self.pool().await;
        let mut conn = match pool.get().await {
            Ok(conn) => conn,
            Err(e) => return Err(checkout_error(&self.settings().await, e)),
        };

        let outcome = tokio::time::timeout(QUERY_TIMEOUT, run(&mut conn, prepared)).await;
        match outcome {
            Ok(Ok(rows)) => {
                let recordset: Vec<Map<String, Value>> = rows.into_iter().map(row_to_json).collect();
                Ok(RawQueryResult {
                    rows_affected: recordset.len() as u64,
                    recordset,
                })
            }
            Ok(Err(e)) => {
                tracing::error!("ERP query failed: {}", e);
                Err(AppError::erp(e.to_string()))
            }
            Err(_) => {
                tracing::error!("ERP query timed out after {:?}", QUERY_TIMEOUT);
                Err(AppError::erp(format!(
                    "Request timed out after {}ms",
                    QUERY_TIMEOUT.as_millis()
                )))
            }
        }
    }

    /// Server version and time, or an error carrying troubleshooting hints.
    pub async fn test_connection(&self) -> Result<Map<String, Value>, AppError> {
        match self.query(TEST_QUERY, None).await {
            Ok(result) => Ok(result.recordset.into_iter().next().unwrap_or_default()),
            Err(e) => {
                let settings = self.settings().await;
                let error = e.message();
                let mut details = serde_json::json!({
                    "error": error,
                    "config": settings.public_summary(),
                });
                let hints = troubleshooting(&error, &settings);
                if !hints.is_empty() {
                    details["troubleshooting"] = serde_json::json!(hints);
                }
                Err(AppError::Erp {
                    message: format!("Database connection failed: {}", error),
                    details: Some(details),
                })
            }
        }
    }

    /// Enabled catalog items of one kind from the ERP `Item` table.
    pub async fn fetch_items(&self, kind: CatalogKind) -> Result<Vec<ErpItem>, AppError> {
        let sql = match kind {
            CatalogKind::Operations => OPERATIONS_QUERY,
            CatalogKind::SpareParts => SPARE_PARTS_QUERY,
        };
        let result = self.query(sql, None).await?;
        Ok(result.recordset.iter().map(item_from_row).collect())
    }
}

fn tiberius_config(settings: &ErpSettings) -> tiberius::Config {
    let mut config = tiberius::Config::new();
    config.host(&settings.server);
    config.port(settings.port);
    config.database(&settings.database);
    config.authentication(AuthMethod::sql_server(&settings.user, &settings.password));
    config.encryption(if settings.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });
    if settings.trust_cert {
        config.trust_cert();
    }
    config
}

/// Pool that opens connections on demand, nothing at build time.
fn build_pool(settings: &ErpSettings) -> ErpPool {
    Pool::builder()
        .max_size(POOL_MAX_SIZE)
        .connection_timeout(CONNECT_TIMEOUT)
        .retry_connection(false)
        .build_unchecked(ConnectionManager::new(tiberius_config(settings)))
}

/// Server-side login errors keep the driver text; anything else is reported
/// as a connection failure.
fn checkout_error(settings: &ErpSettings, error: RunError<bb8_tiberius::Error>) -> AppError {
    let addr = format!("{}:{}", settings.server, settings.port);
    let message = match error {
        RunError::TimedOut => format!("Could not connect to {} (timeout)", addr),
        RunError::User(e) => {
            let text = e.to_string();
            if text.contains("Login failed") || text.contains("Cannot open database") {
                text
            } else {
                format!("Could not connect to {}: {}", addr, text)
            }
        }
    };
    tracing::error!("ERP connection failed: {}", message);
    AppError::erp(message)
}

async fn run(client: &mut Connection, prepared: Prepared) -> tiberius::Result<Vec<Row>> {
    let mut query = Query::new(prepared.sql);
    for value in prepared.values {
        match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(b) => query.bind(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => query.bind(s),
            other => query.bind(other.to_string()),
        }
    }
    query.query(client).await?.into_first_result().await
}

/// SQL with positional placeholders plus the values to bind, in order.
#[derive(Debug)]
struct Prepared {
    sql: String,
    values: Vec<Value>,
}

/// Declare each named parameter as a local variable assigned from a
/// positional placeholder so the query text can use `@name`.
fn bind_named(sql: &str, params: Option<&Map<String, Value>>) -> Result<Prepared, AppError> {
    let Some(params) = params.filter(|p| !p.is_empty()) else {
        return Ok(Prepared {
            sql: sql.to_string(),
            values: Vec::new(),
        });
    };

    let mut declarations = String::new();
    let mut values = Vec::with_capacity(params.len());
    for (index, (key, value)) in params.iter().enumerate() {
        let name = key.trim_start_matches('@');
        if !PARAM_NAME.is_match(name) {
            return Err(AppError::Validation(format!(
                "Invalid parameter name: {}",
                key
            )));
        }
        declarations.push_str(&format!(
            "DECLARE @{} {} = @P{};\n",
            name,
            sql_type(value),
            index + 1
        ));
        values.push(value.clone());
    }

    Ok(Prepared {
        sql: format!("{}{}", declarations, sql),
        values,
    })
}

fn sql_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "BIT",
        Value::Number(n) if n.is_i64() => "BIGINT",
        Value::Number(_) => "FLOAT",
        _ => "NVARCHAR(MAX)",
    }
}

fn row_to_json(row: Row) -> Map<String, Value> {
    let names: Vec<String> = row.columns().iter().map(|c| c.name().to_string()).collect();
    names
        .into_iter()
        .zip(row.into_iter())
        .map(|(name, data)| (name, column_to_json(data)))
        .collect()
}

fn column_to_json(data: ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|f| Value::from(f as f64)).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::Bool).unwrap_or(Value::Null),
        ColumnData::String(v) => v.map(|s| Value::String(s.into_owned())).unwrap_or(Value::Null),
        ColumnData::Guid(v) => v.map(|g| Value::String(g.to_string())).unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .map(|b| Value::String(hex::encode(b.as_ref())))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .map(|n| Value::from(n.value() as f64 / 10f64.powi(n.scale() as i32)))
            .unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .map(|x| Value::String(x.into_owned().into_string()))
            .unwrap_or(Value::Null),
        other => temporal_to_json(&other),
    }
}

fn temporal_to_json(data: &ColumnData<'static>) -> Value {
    if let Ok(Some(dt)) = DateTime::<FixedOffset>::from_sql(data) {
        return Value::String(dt.to_rfc3339());
    }
    if let Ok(Some(dt)) = NaiveDateTime::from_sql(data) {
        return Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string());
    }
    if let Ok(Some(d)) = NaiveDate::from_sql(data) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(t)) = NaiveTime::from_sql(data) {
        return Value::String(t.format("%H:%M:%S%.3f").to_string());
    }
    Value::Null
}

fn item_from_row(row: &Map<String, Value>) -> ErpItem {
    let text = |key: &str| match row.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    ErpItem {
        id: text("ItemId"),
        code: text("Sifra"),
        name: text("Naziv"),
        status: text("Status"),
    }
}

/// Hints for common connection failures, keyed on the driver message.
pub fn troubleshooting(error: &str, settings: &ErpSettings) -> Vec<String> {
    if error.contains("Could not connect") {
        vec![
            format!("- Proverite da li je SQL Server pokrenut na {}", settings.server),
            format!("- Proverite firewall podešavanja (port {})", settings.port),
            "- Proverite da li je TCP/IP protokol omogućen u SQL Server Configuration Manager"
                .to_string(),
        ]
    } else if error.contains("Login failed") {
        vec![
            "- Proverite korisničko ime i lozinku".to_string(),
            format!("- Proverite da li korisnik ima pristup bazi {}", settings.database),
        ]
    } else if error.contains("Cannot open database") {
        vec![
            format!("- Proverite da li baza podataka {} postoji", settings.database),
            "- Proverite dozvole korisnika".to_string(),
        ]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_bind_named_without_params() {
        let prepared = bind_named("SELECT 1", None).unwrap();
        assert_eq!(prepared.sql, "SELECT 1");
        assert!(prepared.values.is_empty());
    }

    #[test]
    fn test_bind_named_declares_each_param() {
        let p = params(json!({ "id": 7, "name": "Pumpa", "ratio": 0.5, "active": true }));
        let prepared = bind_named("SELECT * FROM Item WHERE ItemId = @id", Some(&p)).unwrap();

        assert!(prepared.sql.contains("DECLARE @id BIGINT = @P"));
        assert!(prepared.sql.contains("DECLARE @name NVARCHAR(MAX) = @P"));
        assert!(prepared.sql.contains("DECLARE @ratio FLOAT = @P"));
        assert!(prepared.sql.contains("DECLARE @active BIT = @P"));
        assert!(prepared.sql.ends_with("SELECT * FROM Item WHERE ItemId = @id"));
        assert_eq!(prepared.values.len(), 4);
    }

    #[test]
    fn test_bind_named_accepts_at_prefix() {
        let p = params(json!({ "@code": "OP-001" }));
        let prepared = bind_named("SELECT @code", Some(&p)).unwrap();
        assert!(prepared.sql.starts_with("DECLARE @code NVARCHAR(MAX) = @P1;"));
    }

    #[test]
    fn test_bind_named_rejects_injection_in_name() {
        let p = params(json!({ "id; DROP TABLE Item;--": 1 }));
        assert!(matches!(
            bind_named("SELECT 1", Some(&p)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_item_from_row() {
        let row = params(json!({
            "ItemId": 42,
            "Sifra": "OP-010 ",
            "Naziv": "Zamena filtera",
            "Status": "Aktivan"
        }));
        let item = item_from_row(&row);
        assert_eq!(item.id, "42");
        assert_eq!(item.code, "OP-010");
        assert_eq!(item.status, "Aktivan");
    }

    #[test]
    fn test_troubleshooting_hints() {
        let settings = ErpSettings {
            server: "10.0.0.5".to_string(),
            database: "Charisma".to_string(),
            ..ErpSettings::default()
        };

        let hints = troubleshooting("Could not connect to 10.0.0.5:1433", &settings);
        assert_eq!(hints.len(), 3);
        assert!(hints[1].contains("1433"));

        let hints = troubleshooting("Login failed for user 'sa'.", &settings);
        assert!(hints[1].contains("Charisma"));

        assert!(troubleshooting("something else", &settings).is_empty());
    }

    #[test]
    fn test_column_to_json_scalars() {
        assert_eq!(column_to_json(ColumnData::I32(Some(5))), json!(5));
        assert_eq!(column_to_json(ColumnData::Bit(Some(true))), json!(true));
        assert_eq!(column_to_json(ColumnData::I64(None)), Value::Null);
        assert_eq!(
            column_to_json(ColumnData::String(Some("kom".into()))),
            json!("kom")
        );
        assert_eq!(
            column_to_json(ColumnData::Numeric(Some(tiberius::numeric::Numeric::new_with_scale(
                1250, 2
            )))),
            json!(12.5)
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_has_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let client = ErpClient::new(temp_dir.path().join(".env.local"))
            .await
            .unwrap();
        let settings = client.settings().await;
        assert_eq!(settings.port, settings::DEFAULT_PORT);
    }

    fn write_env(dir: &tempfile::TempDir, server: &str) -> PathBuf {
        let path = dir.path().join(".env.local");
        std::fs::write(
            &path,
            format!(
                "DB_SERVER={}\nDB_NAME=Charisma\nDB_USER=sa\nDB_PASSWORD=secret\nDB_PORT=1\n",
                server
            ),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_pool_is_built_lazily_and_dropped_on_reload() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = write_env(&temp_dir, "127.0.0.1");
        let client = ErpClient::new(path.clone()).await.unwrap();
        assert!(client.pool.read().await.is_none());

        let pool = client.pool().await;
        assert_eq!(pool.state().connections, 0);
        assert!(client.pool.read().await.is_some());

        write_env(&temp_dir, "10.0.0.9");
        let settings = client.reload().await.unwrap();
        assert_eq!(settings.server, "10.0.0.9");
        assert!(client.pool.read().await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_connect_hints() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let client = ErpClient::new(write_env(&temp_dir, "127.0.0.1")).await.unwrap();

        let err = client.test_connection().await.unwrap_err();
        let AppError::Erp { message, details } = err else {
            panic!("expected an ERP error");
        };
        assert!(message.starts_with("Database connection failed: Could not connect to 127.0.0.1:1"));
        let details = details.unwrap();
        assert_eq!(details["troubleshooting"].as_array().unwrap().len(), 3);
        assert_eq!(details["config"]["server"], "127.0.0.1");
        assert!(details["config"].get("password").is_none());
    }
}
