use crate::config::PathsConfig;
use crate::error::Result;
use crate::record_store::{RecordStore, TableSpec};
use ahash::AHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where a requested file belongs, after prefix translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDestination {
    pub filename: String,
    pub canonical_path: String,
}

impl ResolvedDestination {
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.canonical_path)
    }
}

/// A record-store row whose key disagrees with the key derived from its filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchAnomaly {
    pub filename: String,
    pub requested_key: String,
    pub stored_key: String,
}

#[derive(Debug, Default)]
pub struct Resolution {
    pub destinations: BTreeMap<String, ResolvedDestination>,
    pub anomalies: Vec<MatchAnomaly>,
}

/// Rebases stored paths under `source_prefix` onto `destination_root`.
///
/// The destination separator follows the root: a root written with
/// backslashes (UNC share or drive path) gets `\`, anything else gets `/`.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    source_prefix: String,
    destination_root: String,
    separator: char,
}

impl PathTranslator {
    pub fn new(source_prefix: &str, destination_root: &str) -> Self {
        let separator = if destination_root.contains('\\') { '\\' } else { '/' };
        Self {
            source_prefix: source_prefix.to_string(),
            destination_root: destination_root.to_string(),
            separator,
        }
    }

    pub fn from_config(config: &PathsConfig) -> Self {
        Self::new(&config.db_prefix, &config.destination_root)
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn translate(&self, stored_path: &str) -> String {
        let remainder = if self.source_prefix.is_empty() {
            None
        } else {
            stored_path.strip_prefix(self.source_prefix.as_str())
        };

        match remainder {
            Some(rest) => {
                let root = self.destination_root.trim_end_matches(['/', '\\']);
                let rest = self.normalize(rest);
                let rest = rest.trim_start_matches(self.separator);
                format!("{}{}{}", root, self.separator, rest)
            }
            None => {
                debug!(
                    "Stored path '{}' lacks prefix '{}', normalizing separators only",
                    stored_path, self.source_prefix
                );
                self.normalize(stored_path)
            }
        }
    }

    fn normalize(&self, path: &str) -> String {
        path.chars()
            .map(|c| if c == '/' || c == '\\' { self.separator } else { c })
            .collect()
    }
}

/// Turns (filename, key) pairs into canonical destinations with one
/// record-store query per call.
pub struct PathResolver<S: RecordStore> {
    store: S,
    table: TableSpec,
    translator: PathTranslator,
}

impl<S: RecordStore> PathResolver<S> {
    pub fn new(store: S, table: TableSpec, translator: PathTranslator) -> Self {
        Self {
            store,
            table,
            translator,
        }
    }

    pub fn translator(&self) -> &PathTranslator {
        &self.translator
    }

    /// Resolve a batch. An empty batch returns an empty resolution without
    /// touching the store; a store failure fails the whole batch.
    pub fn resolve(&self, pairs: &[(String, String)]) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        if pairs.is_empty() {
            debug!("Empty batch, skipping record store lookup");
            return Ok(resolution);
        }

        let mut requested: AHashMap<&str, &str> = AHashMap::with_capacity(pairs.len());
        let mut filenames: Vec<String> = Vec::with_capacity(pairs.len());
        for (filename, key) in pairs {
            if !requested.contains_key(filename.as_str()) {
                requested.insert(filename.as_str(), key.as_str());
                filenames.push(filename.clone());
            }
        }

        let rows = self.store.lookup(&self.table, &filenames)?;
        debug!("Record store returned {} rows for {} filenames", rows.len(), filenames.len());

        for row in rows {
            let requested_key = match requested.get(row.filename.as_str()) {
                Some(key) => *key,
                None => {
                    debug!("Ignoring row for unrequested filename '{}'", row.filename);
                    continue;
                }
            };

            if resolution.destinations.contains_key(&row.filename) {
                warn!(
                    "Multiple records for '{}', keeping the first (ignored '{}')",
                    row.filename, row.stored_path
                );
                continue;
            }

            if row.key.trim() != requested_key {
                warn!(
                    "Key mismatch for '{}': derived '{}', stored '{}'",
                    row.filename, requested_key, row.key
                );
                resolution.anomalies.push(MatchAnomaly {
                    filename: row.filename.clone(),
                    requested_key: requested_key.to_string(),
                    stored_key: row.key.clone(),
                });
            }

            let canonical_path = self.translator.translate(&row.stored_path);
            debug!("Resolved {} -> {}", row.filename, canonical_path);
            resolution.destinations.insert(
                row.filename.clone(),
                ResolvedDestination {
                    filename: row.filename,
                    canonical_path,
                },
            );
        }

        info!(
            "Resolved {} of {} filenames ({} key anomalies)",
            resolution.destinations.len(),
            filenames.len(),
            resolution.anomalies.len()
        );
        Ok(resolution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_to_unc_root() {
        let translator = PathTranslator::new("/EL/", r"\\192.168.2.2\homes\ryan\");
        assert_eq!(
            translator.translate("/EL/2024/unit1/ABCDEFGHIJKLMNOPQRST12345.jpg"),
            r"\\192.168.2.2\homes\ryan\2024\unit1\ABCDEFGHIJKLMNOPQRST12345.jpg"
        );
    }

    #[test]
    fn test_translate_root_without_trailing_separator() {
        let translator = PathTranslator::new("/EL/", r"\\nas\photos");
        assert_eq!(translator.translate("/EL/a/b.jpg"), r"\\nas\photos\a\b.jpg");
    }

    #[test]
    fn test_translate_posix_root() {
        let translator = PathTranslator::new("/EL/", "/mnt/share/");
        assert_eq!(translator.separator(), '/');
        assert_eq!(translator.translate("/EL/2024\\unit1/x.jpg"), "/mnt/share/2024/unit1/x.jpg");
    }

    #[test]
    fn test_translate_without_prefix_normalizes_only() {
        let translator = PathTranslator::new("/EL/", r"\\nas\photos\");
        assert_eq!(translator.translate("/OTHER/2024/x.jpg"), r"\OTHER\2024\x.jpg");
    }

    #[test]
    fn test_translate_prefix_is_case_sensitive() {
        let translator = PathTranslator::new("/EL/", "/mnt/share");
        assert_eq!(translator.translate("/el/x.jpg"), "/el/x.jpg");
    }
}
