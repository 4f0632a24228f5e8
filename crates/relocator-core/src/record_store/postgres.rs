use super::{RecordStore, RecordStoreRow, TableSpec};
use crate::error::{Error, Result};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_types::{Array, Text};
use tracing::debug;

/// Network record store reached over a PostgreSQL connection URL.
pub struct PgRecordStore {
    database_url: String,
}

impl PgRecordStore {
    pub fn new(database_url: String) -> Self {
        Self { database_url }
    }
}

impl RecordStore for PgRecordStore {
    fn lookup(&self, table: &TableSpec, filenames: &[String]) -> Result<Vec<RecordStoreRow>> {
        let mut connection = PgConnection::establish(&self.database_url)
            .map_err(|e| Error::RecordStoreUnavailable(format!("Error connecting: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ANY($1)",
            table.select_list(),
            table.table(),
            table.filename_column()
        );
        debug!("Postgres lookup of {} filenames", filenames.len());

        diesel::sql_query(sql)
            .bind::<Array<Text>, _>(filenames.to_vec())
            .load::<RecordStoreRow>(&mut connection)
            .map_err(|e| Error::RecordStoreUnavailable(e.to_string()))
    }
}
