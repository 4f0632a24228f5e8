pub mod config;
pub mod engine;
pub mod error;
pub mod key;
pub mod platform;
pub mod progress;
pub mod record_store;
pub mod resolver;
pub mod scanner;

pub use config::AppConfig;
pub use engine::{
    ReconcileEngine, RelocationOptions, RelocationOutcome, RelocationReport, RelocationStatus,
};
pub use error::Error;
pub use key::extract_key;
pub use progress::{RelocationReporter, SilentReporter};
pub use resolver::{MatchAnomaly, PathResolver, PathTranslator, Resolution, ResolvedDestination};
pub use scanner::{LocalFile, ScanOptions, ScanResult};
