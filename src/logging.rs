//! Logging configuration for mp3-meta
//!
//! Logs always go to stderr so that dry-run output on stdout can be piped
//! into other tools. Optionally they are also appended to a log file, by
//! default at `<data_local_dir>/mp3-meta/logs/mp3-meta.log`.

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "mp3-meta.log";

/// Rotate the log file once it grows beyond this size
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// How logging is set up for this process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level shown on the terminal
    pub level: LevelFilter,
    /// Also append debug-level logs to this file
    pub file: Option<PathBuf>,
}

/// Get the default log directory
pub fn get_log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("mp3-meta").join("logs"))
}

/// Get the default log file path
pub fn get_log_file_path() -> Option<PathBuf> {
    get_log_directory().map(|d| d.join(LOG_FILE_NAME))
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

/// Move an oversized log file aside to `<name>.old`
fn rotate_if_needed(log_path: &Path) {
    if let Ok(metadata) = fs::metadata(log_path) {
        if metadata.len() > MAX_LOG_SIZE {
            let mut backup = log_path.as_os_str().to_owned();
            backup.push(".old");
            let _ = fs::rename(log_path, backup);
        }
    }
}

/// Open the log file in append mode, creating its directory if needed
fn open_log_file(log_path: &Path) -> io::Result<File> {
    if let Some(dir) = log_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    rotate_if_needed(log_path);
    OpenOptions::new().create(true).append(true).open(log_path)
}

/// Initialize the logging system
///
/// Called once from `main`. Returns the path of the log file when file
/// logging was requested and could be set up.
pub fn init_logging(config: &LogConfig) -> Option<PathBuf> {
    let term_logger: Box<dyn SharedLogger> =
        TermLogger::new(config.level, build_config(), TerminalMode::Stderr, ColorChoice::Auto);

    let Some(log_path) = config.file.clone() else {
        let _ = CombinedLogger::init(vec![term_logger]);
        return None;
    };

    let log_file = match open_log_file(&log_path) {
        Ok(f) => f,
        Err(e) => {
            let _ = CombinedLogger::init(vec![term_logger]);
            log::warn!("could not open log file, logging to terminal only path={} error={}", log_path.display(), e);
            return None;
        }
    };

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        term_logger,
        WriteLogger::new(LevelFilter::Debug.max(config.level), build_config(), log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== mp3-meta session started ===");
    log::debug!("log file path={}", log_path.display());

    Some(log_path)
}
