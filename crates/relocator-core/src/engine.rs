use crate::config::{AppConfig, RelocationConfig};
use crate::error::{Error, Result};
use crate::key::composite_match_key;
use crate::platform;
use crate::progress::RelocationReporter;
use crate::record_store::{self, RecordStore, TableSpec};
use crate::resolver::{MatchAnomaly, PathResolver, PathTranslator, ResolvedDestination};
use crate::scanner::LocalFile;
use ahash::AHashMap;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelocationStatus {
    Moved,
    WouldMove,
    SkippedNoRemoteMatch,
    SkippedMissingLocal,
    Failed,
}

impl fmt::Display for RelocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RelocationStatus::Moved => "moved",
            RelocationStatus::WouldMove => "wouldMove",
            RelocationStatus::SkippedNoRemoteMatch => "skippedNoRemoteMatch",
            RelocationStatus::SkippedMissingLocal => "skippedMissingLocal",
            RelocationStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelocationOutcome {
    pub filename: String,
    pub status: RelocationStatus,
    pub destination: Option<String>,
    pub detail: Option<String>,
}

impl RelocationOutcome {
    fn new(filename: &str, status: RelocationStatus, destination: Option<&str>) -> Self {
        Self {
            filename: filename.to_string(),
            status,
            destination: destination.map(str::to_string),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Everything one reconciliation run did or would have done, in processing order.
#[derive(Debug, Default, Serialize)]
pub struct RelocationReport {
    pub dry_run: bool,
    pub outcomes: Vec<RelocationOutcome>,
    pub anomalies: Vec<MatchAnomaly>,
}

impl RelocationReport {
    pub fn count(&self, status: RelocationStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn moved(&self) -> usize {
        self.count(RelocationStatus::Moved)
    }

    pub fn would_move(&self) -> usize {
        self.count(RelocationStatus::WouldMove)
    }

    pub fn failed(&self) -> usize {
        self.count(RelocationStatus::Failed)
    }

    /// A run succeeds when at least one relocation, real or simulated, happened.
    pub fn is_success(&self) -> bool {
        self.moved() + self.would_move() > 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelocationOptions {
    /// Delete the local file once its copy is in place.
    pub remove_source: bool,
    /// Compare BLAKE3 digests of source and destination after copying.
    pub verify_copy: bool,
}

impl Default for RelocationOptions {
    fn default() -> Self {
        Self {
            remove_source: true,
            verify_copy: false,
        }
    }
}

impl From<&RelocationConfig> for RelocationOptions {
    fn from(config: &RelocationConfig) -> Self {
        Self {
            remove_source: config.remove_source,
            verify_copy: config.verify_copy,
        }
    }
}

pub struct ReconcileEngine<S: RecordStore> {
    resolver: PathResolver<S>,
    options: RelocationOptions,
}

impl ReconcileEngine<Box<dyn RecordStore>> {
    /// Wire the configured record store, table and path rule into an engine.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = record_store::open_store(&config.record_store)?;
        let table = TableSpec::from_config(&config.table)?;
        let translator = PathTranslator::from_config(&config.paths);
        let resolver = PathResolver::new(store, table, translator);
        Ok(Self::new(resolver, RelocationOptions::from(&config.relocation)))
    }
}

impl<S: RecordStore> ReconcileEngine<S> {
    pub fn new(resolver: PathResolver<S>, options: RelocationOptions) -> Self {
        Self { resolver, options }
    }

    pub fn resolver(&self) -> &PathResolver<S> {
        &self.resolver
    }

    /// Pair local files with their resolved destinations and relocate each pair.
    ///
    /// Fails only for a composite key collision in `local_files` or a record
    /// store failure. Problems with individual files become outcomes.
    pub fn reconcile(
        &self,
        local_files: &[LocalFile],
        dry_run: bool,
        reporter: &dyn RelocationReporter,
    ) -> Result<RelocationReport> {
        let mut by_composite: AHashMap<String, &LocalFile> =
            AHashMap::with_capacity(local_files.len());
        for file in local_files {
            let composite = composite_match_key(file.identifying_key(), file.filename());
            if by_composite.contains_key(&composite) {
                return Err(Error::DuplicateLocalKey(composite));
            }
            by_composite.insert(composite, file);
        }

        let mut by_filename: AHashMap<&str, &LocalFile> = AHashMap::with_capacity(local_files.len());
        for file in local_files {
            by_filename.entry(file.filename()).or_insert(file);
        }

        let pairs: Vec<(String, String)> = local_files
            .iter()
            .map(|f| (f.filename().to_string(), f.identifying_key().to_string()))
            .collect();

        reporter.on_resolve_start(pairs.len());
        let resolve_start = Instant::now();
        let resolution = self.resolver.resolve(&pairs)?;
        reporter.on_resolve_complete(
            resolution.destinations.len(),
            resolve_start.elapsed().as_secs_f64(),
        );

        let unmatched: Vec<&LocalFile> = local_files
            .iter()
            .filter(|f| !resolution.destinations.contains_key(f.filename()))
            .collect();

        let total = resolution.destinations.len() + unmatched.len();
        reporter.on_relocate_start(total);
        let relocate_start = Instant::now();

        let mut report = RelocationReport {
            dry_run,
            outcomes: Vec::with_capacity(total),
            anomalies: resolution.anomalies,
        };

        for (filename, destination) in &resolution.destinations {
            let outcome = match by_filename.get(filename.as_str()) {
                None => {
                    warn!("No local file for resolved destination of '{}'", filename);
                    RelocationOutcome::new(
                        filename,
                        RelocationStatus::SkippedMissingLocal,
                        Some(destination.canonical_path.as_str()),
                    )
                }
                Some(file) if dry_run => {
                    info!(
                        "Would move: {} -> {}",
                        file.absolute_path().display(),
                        destination.canonical_path
                    );
                    RelocationOutcome::new(
                        filename,
                        RelocationStatus::WouldMove,
                        Some(destination.canonical_path.as_str()),
                    )
                }
                Some(file) => self.relocate(file, destination),
            };
            reporter.on_outcome(report.outcomes.len(), &outcome);
            report.outcomes.push(outcome);
        }

        for file in unmatched {
            warn!("No matching record found for '{}'", file.filename());
            let outcome =
                RelocationOutcome::new(file.filename(), RelocationStatus::SkippedNoRemoteMatch, None);
            reporter.on_outcome(report.outcomes.len(), &outcome);
            report.outcomes.push(outcome);
        }

        reporter.on_relocate_complete(relocate_start.elapsed().as_secs_f64());
        info!(
            "{} outcomes: {} moved, {} would move, {} failed",
            report.outcomes.len(),
            report.moved(),
            report.would_move(),
            report.failed()
        );
        Ok(report)
    }

    fn relocate(&self, file: &LocalFile, destination: &ResolvedDestination) -> RelocationOutcome {
        let source = file.absolute_path();
        let target = destination.path();
        let canonical = Some(destination.canonical_path.as_str());

        if !platform::location_exists(source) {
            warn!("Source file no longer present: {}", source.display());
            return RelocationOutcome::new(
                file.filename(),
                RelocationStatus::SkippedMissingLocal,
                canonical,
            )
            .with_detail("source no longer present");
        }

        if platform::is_same_file(source, &target) {
            info!("Already in place: {}", target.display());
            return RelocationOutcome::new(file.filename(), RelocationStatus::Moved, canonical)
                .with_detail("already in place");
        }

        if let Err(err) = self.copy_over(source, &target) {
            error!("ERROR moving {}: {}", file.filename(), err);
            return RelocationOutcome::new(file.filename(), RelocationStatus::Failed, canonical)
                .with_detail(err.to_string());
        }

        info!("MOVED: {} -> {}", file.filename(), target.display());
        let outcome = RelocationOutcome::new(file.filename(), RelocationStatus::Moved, canonical);

        if self.options.remove_source {
            if let Err(err) = fs::remove_file(source) {
                warn!("Copied {} but could not remove source: {}", file.filename(), err);
                return outcome.with_detail(format!("source not removed: {}", err));
            }
            debug!("Removed source {}", source.display());
        }
        outcome
    }

    /// Copy `source` onto `target`, creating parent directories and replacing
    /// whatever is already there.
    fn copy_over(&self, source: &Path, target: &Path) -> io::Result<()> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("Error creating directory {}: {}", parent.display(), err),
                )
            })?;
        }

        if platform::location_exists(target) {
            debug!("Replacing existing file {}", target.display());
            fs::remove_file(target).map_err(|err| {
                io::Error::new(
                    err.kind(),
                    format!("Error removing existing {}: {}", target.display(), err),
                )
            })?;
        }

        fs::copy(source, target).map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Error copying to {}: {}", target.display(), err),
            )
        })?;

        if self.options.verify_copy {
            let expected = hash_file(source)?;
            let actual = hash_file(target)?;
            if expected != actual {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Copy verification failed for {}", target.display()),
                ));
            }
            debug!("Verified copy {} ({})", target.display(), actual.to_hex());
        }
        Ok(())
    }
}

fn hash_file(path: &Path) -> io::Result<blake3::Hash> {
    let mut file = File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        assert_eq!(RelocationStatus::WouldMove.to_string(), "wouldMove");
        assert_eq!(
            RelocationStatus::SkippedNoRemoteMatch.to_string(),
            "skippedNoRemoteMatch"
        );
    }

    #[test]
    fn test_report_success_counts_simulated_moves() {
        let mut report = RelocationReport::default();
        assert!(!report.is_success());

        report.outcomes.push(RelocationOutcome::new(
            "a.jpg",
            RelocationStatus::SkippedNoRemoteMatch,
            None,
        ));
        assert!(!report.is_success());

        report
            .outcomes
            .push(RelocationOutcome::new("b.jpg", RelocationStatus::WouldMove, Some("/d/b.jpg")));
        assert!(report.is_success());
        assert_eq!(report.would_move(), 1);
        assert_eq!(report.moved(), 0);
    }
}
