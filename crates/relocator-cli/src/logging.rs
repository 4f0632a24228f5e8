use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const CONFIG_FILE: &str = "Config.toml";
const LOG_FILE_PREFIX: &str = "relocator.log";

/// Set up stdout logging plus a daily relocation log.
///
/// Each day's runs land in one `relocator.log.YYYY-MM-DD` file, which is the
/// audit trail of what was moved where.
pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_dir = log_directory(env::var("LOG_DIR").ok(), Path::new(CONFIG_FILE));
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .pretty()
                .with_file(false)
                .with_target(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!("Relocation log directory: {}", log_dir.display());

    guard
}

/// `LOG_DIR` wins; otherwise logs go in `logs/` beside the config file, or
/// `./logs` when there is none.
fn log_directory(override_dir: Option<String>, config_file: &Path) -> PathBuf {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    if config_file.is_file() {
        let parent = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        return parent.join("logs");
    }
    PathBuf::from("./logs")
}
