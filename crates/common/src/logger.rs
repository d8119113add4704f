use crate::error::UiForgeError;
use std::fs::File;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log file name inside the log directory
pub const LOG_FILE_NAME: &str = "uiforge.log";

/// HTTP stack targets that are only interesting at trace level
const QUIET_TARGETS: &[&str] = &["hyper", "reqwest", "h2", "rustls"];

/// Initialize logging: compact console output on stderr plus a detailed file log
///
/// Stdout is left to command output (search results, generated paths).
/// `RUST_LOG` overrides `log_level` for both layers.
pub fn setup_logging(log_dir: &Path, log_level: &str) -> Result<(), UiForgeError> {
    let log_file_path = log_dir.join(LOG_FILE_NAME);
    let log_file = open_log_file(log_dir)?;

    let console_layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(build_filter(log_level));

    let file_layer = fmt::layer()
        .with_writer(log_file)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(build_filter(log_level));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| UiForgeError::config(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(
        "Logging initialized: level={}, log_file={}",
        log_level,
        log_file_path.display()
    );

    Ok(())
}

fn open_log_file(log_dir: &Path) -> Result<File, UiForgeError> {
    std::fs::create_dir_all(log_dir).map_err(|e| {
        UiForgeError::config(format!(
            "Failed to create log directory {}: {}",
            log_dir.display(),
            e
        ))
    })?;

    let path = log_dir.join(LOG_FILE_NAME);
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            UiForgeError::config(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

/// Filter directives for `log_level`, unless RUST_LOG is set
fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directives(log_level)))
}

fn filter_directives(log_level: &str) -> String {
    let level = parse_log_level(log_level);
    let mut directives = level.to_string().to_lowercase();
    if level != Level::TRACE {
        for target in QUIET_TARGETS {
            directives.push_str(&format!(",{}=warn", target));
        }
    }
    directives
}

/// Parse string to tracing Level
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO", level);
            Level::INFO
        }
    }
}
