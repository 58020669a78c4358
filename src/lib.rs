//! batchloader library
//!
//! Downloads a list of named URLs with yt-dlp, a bounded number at a time,
//! relaying each download's output with a `[name] ` prefix.

pub mod app;
pub mod downloader;
pub mod extractor;
pub mod queue;
pub mod utils;

// Re-export main types for easier use
pub use downloader::{DownloadExecutor, OutputSink, StreamKind, YtDlpExecutor};
pub use extractor::{format_args_for, YtDlp};
pub use queue::{load_targets, Scheduler, Summary, Target, TaskResult};
pub use utils::{BatchError, MediaType, Settings, TaskError};
