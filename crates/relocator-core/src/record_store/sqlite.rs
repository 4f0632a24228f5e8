use super::{RecordStore, RecordStoreRow, TableSpec};
use crate::error::Result;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Embedded record store backed by a SQLite file.
pub struct SqliteRecordStore {
    path: PathBuf,
}

impl SqliteRecordStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        Ok(conn)
    }
}

impl RecordStore for SqliteRecordStore {
    fn lookup(&self, table: &TableSpec, filenames: &[String]) -> Result<Vec<RecordStoreRow>> {
        let conn = self.connect()?;

        let placeholders = (1..=filenames.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM {} WHERE {} IN ({})",
            table.select_list(),
            table.table(),
            table.filename_column(),
            placeholders
        );
        debug!("SQLite lookup of {} filenames in {}", filenames.len(), self.path.display());

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(filenames.iter()), |row| {
                Ok(RecordStoreRow {
                    filename: row.get(0)?,
                    stored_path: row.get(1)?,
                    key: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}
