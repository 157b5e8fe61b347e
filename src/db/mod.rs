use crate::api::DEFAULT_PROVIDER_KEY;
use crate::cache::DEFAULT_EXPIRY_HOURS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

#[cfg(target_arch = "wasm32")]
const SETTINGS_KEY: &str = "utrippin.app_settings";

#[cfg(not(target_arch = "wasm32"))]
const SETTINGS_ROW: &str = "app_settings";

/// Settings persistence failure. Never fatal; callers fall back to defaults.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("settings storage unavailable: {0}")]
    Storage(String),
    #[error("settings could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for DbError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<gloo_storage::errors::StorageError> for DbError {
    fn from(error: gloo_storage::errors::StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// App settings stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub functions_url: String,
    pub functions_anon_key: String,
    pub default_provider: String,
    /// 0 keeps the platform default.
    pub request_timeout_secs: u32,
    pub cache_enabled: bool,
    pub cache_expiry_hours: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            functions_url: option_env!("UTRIPPIN_FUNCTIONS_URL")
                .unwrap_or_default()
                .to_string(),
            functions_anon_key: option_env!("UTRIPPIN_FUNCTIONS_ANON_KEY")
                .unwrap_or_default()
                .to_string(),
            default_provider: DEFAULT_PROVIDER_KEY.to_string(),
            request_timeout_secs: 0,
            cache_enabled: true,
            cache_expiry_hours: DEFAULT_EXPIRY_HOURS,
        }
    }
}

impl AppSettings {
    /// Clamp values edited by hand or written by an older build.
    pub fn sanitized(mut self) -> Self {
        self.functions_url = self.functions_url.trim().trim_end_matches('/').to_string();
        self.functions_anon_key = self.functions_anon_key.trim().to_string();
        if self.request_timeout_secs != 0 {
            self.request_timeout_secs = self.request_timeout_secs.clamp(1, 30);
        }
        self.cache_expiry_hours = self.cache_expiry_hours.clamp(1, 24 * 30);
        if crate::api::ProviderKind::from_key(&self.default_provider).is_none() {
            self.default_provider = DEFAULT_PROVIDER_KEY.to_string();
        }
        self
    }
}

fn decode_settings(json: &str) -> Result<AppSettings, DbError> {
    Ok(serde_json::from_str::<AppSettings>(json)?.sanitized())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn save_settings(settings: AppSettings) -> Result<(), DbError> {
    let conn = get_db_connection()?;
    let settings_json = serde_json::to_string(&settings)?;

    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        [SETTINGS_ROW, settings_json.as_str()],
    )?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub async fn save_settings(settings: AppSettings) -> Result<(), DbError> {
    LocalStorage::set(SETTINGS_KEY, settings)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn load_settings() -> Result<AppSettings, DbError> {
    let conn = get_db_connection()?;

    let result: Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM settings WHERE key = ?1",
        [SETTINGS_ROW],
        |row: &rusqlite::Row| row.get(0),
    );

    match result {
        Ok(json) => decode_settings(&json),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(AppSettings::default()),
        Err(error) => Err(error.into()),
    }
}

#[cfg(target_arch = "wasm32")]
pub async fn load_settings() -> Result<AppSettings, DbError> {
    match LocalStorage::raw().get_item(SETTINGS_KEY) {
        Ok(Some(json)) => decode_settings(&json),
        _ => Ok(AppSettings::default()),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn initialize_database() -> Result<(), DbError> {
    let conn = get_db_connection()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub async fn initialize_database() -> Result<(), DbError> {
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn get_db_connection() -> Result<rusqlite::Connection, DbError> {
    use std::path::PathBuf;

    let data_dir = dirs::data_dir()
        .map(|dir: PathBuf| dir.join("utrippin"))
        .unwrap_or_else(|| PathBuf::from(".utrippin"));
    std::fs::create_dir_all(&data_dir).map_err(|e| DbError::Storage(e.to_string()))?;

    rusqlite::Connection::open(data_dir.join("utrippin.db"))
        .map_err(|e| DbError::Storage(format!("Failed to open database: {e}")))
}
