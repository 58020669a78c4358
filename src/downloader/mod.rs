//! Download execution module

pub mod executor;
pub mod output;

// Re-export for convenience
pub use executor::{DownloadExecutor, YtDlpExecutor};
pub use output::{CapturedOutput, OutputSink, StreamKind};
