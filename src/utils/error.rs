//! Error handling for batchloader

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for batchloader
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("yt-dlp is not usable: {0}")]
    PreflightFailed(String),

    #[error("Target list not found: {}", .0.display())]
    TargetListNotFound(PathBuf),

    #[error("Failed to read target list {}: {source}", .path.display())]
    TargetListUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single download did not succeed.
///
/// These never abort a run; the scheduler folds them into the summary.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not start yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("yt-dlp exited with {}", describe_exit(.0))]
    NonZeroExit(Option<i32>),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("task panicked: {0}")]
    Panicked(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (killed by signal)".to_string(),
    }
}
