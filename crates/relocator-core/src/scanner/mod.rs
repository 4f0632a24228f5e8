mod walk;

pub use walk::scan;

use crate::key::extract_key;
use glob::{MatchOptions, Pattern};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::error;

/// A candidate image found in the source location.
///
/// The identifying key is derived once at construction and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalFile {
    filename: String,
    absolute_path: PathBuf,
    identifying_key: String,
}

impl LocalFile {
    /// Build a `LocalFile` from a path. Returns `None` when the path has no
    /// file name or the derived key would be empty.
    pub fn from_path(path: &Path) -> Option<Self> {
        let filename = path.file_name()?.to_string_lossy().into_owned();
        let identifying_key = extract_key(&filename);
        if identifying_key.is_empty() {
            return None;
        }
        Some(Self {
            filename,
            absolute_path: path.to_path_buf(),
            identifying_key,
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn identifying_key(&self) -> &str {
        &self.identifying_key
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub extensions: Vec<String>,
}

impl ScanOptions {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    fn patterns(&self) -> Vec<Pattern> {
        self.extensions
            .iter()
            .filter_map(|ext| {
                let glob = format!("*.{}", Pattern::escape(ext));
                match Pattern::new(&glob) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        error!("Invalid extension pattern '{}': {}", glob, e);
                        None
                    }
                }
            })
            .collect()
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new(&["jpg", "jpeg"])
    }
}

/// Files found by a scan plus the non-fatal problems met along the way.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<LocalFile>,
    pub warnings: Vec<String>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

fn matches_any(patterns: &[Pattern], filename: &str) -> bool {
    patterns
        .iter()
        .any(|p| p.matches_with(filename, MATCH_OPTIONS))
}
