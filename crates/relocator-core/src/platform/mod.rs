#[cfg(target_os = "windows")]
pub mod windows;

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// What a location turned out to be once its existence was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    File,
    Directory,
}

/// True for UNC-style addresses (`\\server\share`, `//server/share`) and, on
/// Windows, verbatim UNC prefixes.
pub fn is_remote_share(path: &Path) -> bool {
    if has_native_unc_prefix(path) {
        return true;
    }

    let raw = path.to_string_lossy();
    raw.starts_with(r"\\") || raw.starts_with("//")
}

#[cfg(target_os = "windows")]
fn has_native_unc_prefix(path: &Path) -> bool {
    windows::has_unc_prefix(path)
}

#[cfg(not(target_os = "windows"))]
fn has_native_unc_prefix(_path: &Path) -> bool {
    false
}

/// Storage that compares names without regard to case. Windows volumes and
/// SMB shares behave this way.
pub fn is_case_insensitive(path: &Path) -> bool {
    cfg!(target_os = "windows") || is_remote_share(path)
}

/// Establish whether `path` exists and what it is.
///
/// The native metadata call is tried first. On remote shares that call is
/// unreliable, so when it fails there the answer is taken from directory
/// listings instead: a listable path is a directory, and a name found in its
/// parent's listing is a file.
pub fn classify_location(path: &Path) -> Option<LocationKind> {
    classify_with(path, is_remote_share(path), |p| fs::metadata(p))
}

fn classify_with<M>(path: &Path, remote: bool, metadata: M) -> Option<LocationKind>
where
    M: Fn(&Path) -> io::Result<fs::Metadata>,
{
    match metadata(path) {
        Ok(meta) if meta.is_dir() => Some(LocationKind::Directory),
        Ok(_) => Some(LocationKind::File),
        Err(err) if !remote => {
            debug!("Metadata check failed for {}: {}", path.display(), err);
            None
        }
        Err(err) => {
            debug!(
                "Metadata check failed for remote share {}: {}; falling back to listing",
                path.display(),
                err
            );
            classify_by_listing(path, true)
        }
    }
}

fn classify_by_listing(path: &Path, case_insensitive: bool) -> Option<LocationKind> {
    if fs::read_dir(path).is_ok() {
        return Some(LocationKind::Directory);
    }

    match listed_in_parent(path, case_insensitive) {
        Ok(true) => Some(LocationKind::File),
        Ok(false) => None,
        Err(err) => {
            debug!("Listing parent of {} failed: {}", path.display(), err);
            None
        }
    }
}

/// Remote-share aware existence check.
pub fn location_exists(path: &Path) -> bool {
    classify_location(path).is_some()
}

/// True when `a` and `b` name the same file on disk.
///
/// File identity is compared first. When that cannot be read (a missing file,
/// or a share that refuses the handle query) two names that differ only by
/// case on case-insensitive storage still count as the same file.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match same_file::is_same_file(a, b) {
        Ok(same) => same,
        Err(err) => {
            debug!(
                "Identity check of {} and {} failed: {}",
                a.display(),
                b.display(),
                err
            );
            is_case_insensitive(a)
                && a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        }
    }
}

fn listed_in_parent(path: &Path, case_insensitive: bool) -> io::Result<bool> {
    let (parent, name) = match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => (parent, name),
        _ => return Ok(false),
    };
    let wanted = name.to_string_lossy();

    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        let entry_name = entry.file_name();
        let entry_name = entry_name.to_string_lossy();
        let same = if case_insensitive {
            entry_name.eq_ignore_ascii_case(&wanted)
        } else {
            entry_name == wanted
        };
        if same {
            return Ok(true);
        }
    }
    Ok(false)
}
