pub mod models;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;

pub use models::{RecordStoreRow, TableSpec};
#[cfg(feature = "postgres")]
pub use postgres::PgRecordStore;
pub use sqlite::SqliteRecordStore;

use crate::config::{RecordStoreConfig, StoreEngine};
use crate::error::{Error, Result};

/// Read access to the authoritative record set.
///
/// Implementations open their connection inside `lookup` and release it
/// before returning, whatever the outcome.
pub trait RecordStore {
    /// Fetch every row whose filename column equals one of `filenames`, in a
    /// single parameterized query.
    fn lookup(&self, table: &TableSpec, filenames: &[String]) -> Result<Vec<RecordStoreRow>>;
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn lookup(&self, table: &TableSpec, filenames: &[String]) -> Result<Vec<RecordStoreRow>> {
        (**self).lookup(table, filenames)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn lookup(&self, table: &TableSpec, filenames: &[String]) -> Result<Vec<RecordStoreRow>> {
        (**self).lookup(table, filenames)
    }
}

/// Build the record store selected by configuration.
pub fn open_store(config: &RecordStoreConfig) -> Result<Box<dyn RecordStore>> {
    match config.engine {
        StoreEngine::Sqlite => Ok(Box::new(SqliteRecordStore::new(&config.sqlite_path))),
        StoreEngine::Postgres => open_postgres(config),
    }
}

#[cfg(feature = "postgres")]
fn open_postgres(config: &RecordStoreConfig) -> Result<Box<dyn RecordStore>> {
    let url = config.database_url().ok_or_else(|| {
        Error::Other("record_store.database_url or DATABASE_URL must be set".to_string())
    })?;
    Ok(Box::new(PgRecordStore::new(url)))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_config: &RecordStoreConfig) -> Result<Box<dyn RecordStore>> {
    Err(Error::Other(
        "postgres engine requested but this build lacks the `postgres` feature".to_string(),
    ))
}
