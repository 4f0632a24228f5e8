use super::{matches_any, LocalFile, ScanOptions, ScanResult};
use crate::error::{Error, Result};
use crate::platform::{self, LocationKind};
use ahash::AHashSet;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Enumerate candidate images at `location`.
///
/// A directory yields its direct children matching the configured extensions,
/// sorted by filename. A single file yields itself when it matches and an
/// empty result with a warning otherwise. A location that cannot be found
/// fails with [`Error::LocationNotFound`].
pub fn scan(location: &Path, options: &ScanOptions) -> Result<ScanResult> {
    let location = absolute(location);
    let patterns = options.patterns();

    let kind = platform::classify_location(&location)
        .ok_or_else(|| Error::LocationNotFound(location.clone()))?;

    let mut result = ScanResult::default();
    match kind {
        LocationKind::File => scan_single_file(&location, &patterns, &mut result),
        LocationKind::Directory => scan_directory(&location, &patterns, &mut result)?,
    }

    for warning in &result.warnings {
        warn!("{}", warning);
    }
    info!(
        "Found {} candidate files in {}",
        result.files.len(),
        location.display()
    );
    Ok(result)
}

fn scan_single_file(path: &Path, patterns: &[glob::Pattern], result: &mut ScanResult) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if !matches_any(patterns, &name) {
        result
            .warnings
            .push(format!("'{}' does not have a recognized image extension", name));
        return;
    }

    match LocalFile::from_path(path) {
        Some(file) => {
            debug!("Processed: {} -> Key: {}", file.filename(), file.identifying_key());
            result.files.push(file);
        }
        None => result
            .warnings
            .push(format!("'{}' yields an empty identifying key", name)),
    }
}

fn scan_directory(
    dir: &Path,
    patterns: &[glob::Pattern],
    result: &mut ScanResult,
) -> Result<()> {
    let case_insensitive = platform::is_case_insensitive(dir);
    let mut seen: AHashSet<String> = AHashSet::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                debug!("Cannot list {}: {}", dir.display(), err);
                return Err(Error::LocationNotFound(dir.to_path_buf()));
            }
            Err(err) => {
                result
                    .warnings
                    .push(format!("Error reading entry in {}: {}", dir.display(), err));
                continue;
            }
        };

        let file_type = entry.file_type();
        if !(file_type.is_file() || file_type.is_symlink()) {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !matches_any(patterns, &name) {
            continue;
        }

        let dedup_key = if case_insensitive {
            entry.path().to_string_lossy().to_lowercase()
        } else {
            entry.path().to_string_lossy().into_owned()
        };
        if !seen.insert(dedup_key) {
            debug!("Skipping duplicate listing of {}", entry.path().display());
            continue;
        }

        match LocalFile::from_path(entry.path()) {
            Some(file) => {
                debug!("Processed: {} -> Key: {}", file.filename(), file.identifying_key());
                result.files.push(file);
            }
            None => result
                .warnings
                .push(format!("'{}' yields an empty identifying key", name)),
        }
    }

    if result.files.is_empty() {
        result
            .warnings
            .push(format!("No image files found in {}", dir.display()));
    }
    result
        .files
        .sort_by(|a, b| a.filename().cmp(b.filename()));
    Ok(())
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() || platform::is_remote_share(path) {
        return path.to_path_buf();
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
