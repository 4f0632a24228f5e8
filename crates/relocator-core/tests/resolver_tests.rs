use std::cell::Cell;
use std::path::Path;
use tempfile::tempdir;

use relocator_core::record_store::{RecordStore, RecordStoreRow, SqliteRecordStore, TableSpec};
use relocator_core::{Error, PathResolver, PathTranslator};

/// Wraps a store and counts lookups.
struct CountingStore<S> {
    inner: S,
    calls: Cell<usize>,
}

impl<S> CountingStore<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl<S: RecordStore> RecordStore for CountingStore<S> {
    fn lookup(
        &self,
        table: &TableSpec,
        filenames: &[String],
    ) -> relocator_core::error::Result<Vec<RecordStoreRow>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.lookup(table, filenames)
    }
}

/// Returns a fixed set of rows regardless of the request.
struct StaticStore(Vec<RecordStoreRow>);

impl RecordStore for StaticStore {
    fn lookup(
        &self,
        _table: &TableSpec,
        _filenames: &[String],
    ) -> relocator_core::error::Result<Vec<RecordStoreRow>> {
        Ok(self.0.clone())
    }
}

fn row(filename: &str, stored_path: &str, key: &str) -> RecordStoreRow {
    RecordStoreRow {
        filename: filename.to_string(),
        stored_path: stored_path.to_string(),
        key: key.to_string(),
    }
}

fn create_record_db(path: &Path, rows: &[(&str, &str, &str)]) {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE el_desh (
            file_name TEXT NOT NULL,
            file_path TEXT NOT NULL,
            serial_nbr TEXT NOT NULL
        );",
    )
    .unwrap();
    for (name, stored, key) in rows {
        conn.execute(
            "INSERT INTO el_desh (file_name, file_path, serial_nbr) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, stored, key],
        )
        .unwrap();
    }
}

fn table() -> TableSpec {
    TableSpec::new("el_desh", "file_name", "file_path", "serial_nbr").unwrap()
}

fn pair(filename: &str, key: &str) -> (String, String) {
    (filename.to_string(), key.to_string())
}

#[test]
fn test_empty_batch_skips_lookup() {
    let store = CountingStore::new(StaticStore(vec![row("a.jpg", "/EL/a.jpg", "a")]));
    let resolver = PathResolver::new(&store, table(), PathTranslator::new("/EL/", "/share"));

    let resolution = resolver.resolve(&[]).unwrap();
    assert!(resolution.destinations.is_empty());
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn test_single_query_per_batch() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("records.db");
    create_record_db(
        &db_path,
        &[
            ("one.jpg", "/EL/2024/one.jpg", "one"),
            ("two.jpg", "/EL/2024/two.jpg", "two"),
            ("three.jpg", "/EL/2025/three.jpg", "three"),
        ],
    );

    let store = CountingStore::new(SqliteRecordStore::new(&db_path));
    let resolver = PathResolver::new(&store, table(), PathTranslator::new("/EL/", "/share/"));

    let single = resolver.resolve(&[pair("one.jpg", "one")]).unwrap();
    assert_eq!(single.destinations.len(), 1);
    assert_eq!(store.calls.get(), 1);

    let many = resolver
        .resolve(&[
            pair("one.jpg", "one"),
            pair("two.jpg", "two"),
            pair("three.jpg", "three"),
            pair("missing.jpg", "missing"),
        ])
        .unwrap();
    assert_eq!(store.calls.get(), 2);
    assert_eq!(many.destinations.len(), 3);
    assert!(!many.destinations.contains_key("missing.jpg"));
    assert_eq!(
        many.destinations["three.jpg"].canonical_path,
        "/share/2025/three.jpg"
    );
    assert!(many.anomalies.is_empty());
}

#[test]
fn test_key_mismatch_is_reported_not_fatal() {
    let store = StaticStore(vec![row("a.jpg", "/EL/x/a.jpg", "SOMETHING_ELSE")]);
    let resolver = PathResolver::new(store, table(), PathTranslator::new("/EL/", "/share"));

    let resolution = resolver.resolve(&[pair("a.jpg", "a")]).unwrap();
    assert_eq!(resolution.destinations["a.jpg"].canonical_path, "/share/x/a.jpg");
    assert_eq!(resolution.anomalies.len(), 1);
    assert_eq!(resolution.anomalies[0].requested_key, "a");
    assert_eq!(resolution.anomalies[0].stored_key, "SOMETHING_ELSE");
}

#[test]
fn test_only_requested_filenames_are_resolved() {
    let store = StaticStore(vec![
        row("a.jpg", "/EL/a.jpg", "a"),
        row("stranger.jpg", "/EL/stranger.jpg", "stranger"),
    ]);
    let resolver = PathResolver::new(store, table(), PathTranslator::new("/EL/", "/share"));

    let resolution = resolver.resolve(&[pair("a.jpg", "a")]).unwrap();
    assert_eq!(resolution.destinations.len(), 1);
    assert!(resolution.destinations.contains_key("a.jpg"));
}

#[test]
fn test_first_row_wins_for_repeated_filename() {
    let store = StaticStore(vec![
        row("a.jpg", "/EL/first/a.jpg", "a"),
        row("a.jpg", "/EL/second/a.jpg", "a"),
    ]);
    let resolver = PathResolver::new(store, table(), PathTranslator::new("/EL/", "/share"));

    let resolution = resolver.resolve(&[pair("a.jpg", "a")]).unwrap();
    assert_eq!(resolution.destinations["a.jpg"].canonical_path, "/share/first/a.jpg");
}

#[test]
fn test_unc_destination_scenario() {
    let store = StaticStore(vec![row(
        "ABCDEFGHIJKLMNOPQRST12345.jpg",
        "/EL/2024/unit1/ABCDEFGHIJKLMNOPQRST12345.jpg",
        "ABCDEFGHIJKLMNOPQRST",
    )]);
    let resolver = PathResolver::new(
        store,
        table(),
        PathTranslator::new("/EL/", r"\\192.168.2.2\homes\ryan\"),
    );

    let resolution = resolver
        .resolve(&[pair("ABCDEFGHIJKLMNOPQRST12345.jpg", "ABCDEFGHIJKLMNOPQRST")])
        .unwrap();
    assert_eq!(
        resolution.destinations["ABCDEFGHIJKLMNOPQRST12345.jpg"].canonical_path,
        r"\\192.168.2.2\homes\ryan\2024\unit1\ABCDEFGHIJKLMNOPQRST12345.jpg"
    );
}

#[test]
fn test_filenames_are_bound_not_interpolated() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("records.db");
    create_record_db(&db_path, &[("a.jpg", "/EL/a.jpg", "a")]);

    let resolver = PathResolver::new(
        SqliteRecordStore::new(&db_path),
        table(),
        PathTranslator::new("/EL/", "/share"),
    );
    let resolution = resolver
        .resolve(&[pair("x' OR '1'='1", "x' OR '1'='1")])
        .unwrap();
    assert!(resolution.destinations.is_empty());
}

#[test]
fn test_missing_database_is_unavailable() {
    let tmp = tempdir().unwrap();
    let resolver = PathResolver::new(
        SqliteRecordStore::new(&tmp.path().join("absent.db")),
        table(),
        PathTranslator::new("/EL/", "/share"),
    );

    let err = resolver.resolve(&[pair("a.jpg", "a")]).unwrap_err();
    assert!(matches!(err, Error::RecordStoreUnavailable(_)));
}

#[test]
fn test_missing_table_is_unavailable() {
    let tmp = tempdir().unwrap();
    let db_path = tmp.path().join("records.db");
    create_record_db(&db_path, &[]);

    let other_table = TableSpec::new("no_such_table", "file_name", "file_path", "serial_nbr").unwrap();
    let resolver = PathResolver::new(
        SqliteRecordStore::new(&db_path),
        other_table,
        PathTranslator::new("/EL/", "/share"),
    );

    let err = resolver.resolve(&[pair("a.jpg", "a")]).unwrap_err();
    assert!(matches!(err, Error::RecordStoreUnavailable(_)));
}
