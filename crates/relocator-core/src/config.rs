use config::{Config, ConfigError, Environment, File as ConfigFile, FileFormat};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub record_store: RecordStoreConfig,
    #[serde(default)]
    pub table: TableConfig,
    pub paths: PathsConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub relocation: RelocationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreEngine {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordStoreConfig {
    #[serde(default = "default_engine")]
    pub engine: StoreEngine,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    #[serde(default)]
    pub database_url: Option<String>,
}

impl RecordStoreConfig {
    /// Connection URL for the network engine, falling back to `DATABASE_URL`.
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| env::var("DATABASE_URL").ok())
    }
}

impl Default for RecordStoreConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            sqlite_path: default_sqlite_path(),
            database_url: None,
        }
    }
}

/// Names of the record-store table and the columns the lookup reads.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableConfig {
    #[serde(default = "default_table_name")]
    pub name: String,
    #[serde(default = "default_filename_column")]
    pub filename_column: String,
    #[serde(default = "default_path_column")]
    pub path_column: String,
    #[serde(default = "default_key_column")]
    pub key_column: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: default_table_name(),
            filename_column: default_filename_column(),
            path_column: default_path_column(),
            key_column: default_key_column(),
        }
    }
}

/// Prefix translation rule: stored paths starting with `db_prefix` are rebased
/// onto `destination_root`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    #[serde(default = "default_db_prefix")]
    pub db_prefix: String,
    pub destination_root: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelocationConfig {
    #[serde(default = "default_true")]
    pub remove_source: bool,
    #[serde(default)]
    pub verify_copy: bool,
}

impl Default for RelocationConfig {
    fn default() -> Self {
        Self {
            remove_source: true,
            verify_copy: false,
        }
    }
}

fn default_engine() -> StoreEngine {
    StoreEngine::Sqlite
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("records.db")
}

fn default_table_name() -> String {
    "el_desh".to_string()
}

fn default_filename_column() -> String {
    "file_name".to_string()
}

fn default_path_column() -> String {
    "file_path".to_string()
}

fn default_key_column() -> String {
    "serial_nbr".to_string()
}

fn default_db_prefix() -> String {
    "/EL/".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string()]
}

fn default_true() -> bool {
    true
}

/// Load `Config.toml` (if present) overlaid with `RELOCATOR__*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    configuration_sources()?.try_deserialize::<AppConfig>()
}

/// Load only the `[scan]` section. Commands that never reach the record store
/// or the destination use this, so they work without a `[paths]` table.
pub fn load_scan_configuration() -> Result<ScanConfig, ConfigError> {
    let section = configuration_sources()?.try_deserialize::<ScanSection>()?;
    Ok(section.scan)
}

pub fn load_configuration_from_str(toml: &str) -> Result<AppConfig, ConfigError> {
    toml_source(toml)?.try_deserialize::<AppConfig>()
}

pub fn load_scan_configuration_from_str(toml: &str) -> Result<ScanConfig, ConfigError> {
    let section = toml_source(toml)?.try_deserialize::<ScanSection>()?;
    Ok(section.scan)
}

#[derive(Debug, Deserialize)]
struct ScanSection {
    #[serde(default)]
    scan: ScanConfig,
}

fn configuration_sources() -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("RELOCATOR")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scan.extensions")
                .try_parsing(true),
        )
        .build()
}

fn toml_source(toml: &str) -> Result<Config, ConfigError> {
    Config::builder()
        .add_source(ConfigFile::from_str(toml, FileFormat::Toml))
        .build()
}
