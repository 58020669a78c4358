//! Run orchestration: preflight, load targets, download, report

use crate::downloader::output::prefix_line;
use crate::downloader::{DownloadExecutor, OutputSink, StreamKind, YtDlpExecutor};
use crate::extractor::YtDlp;
use crate::queue::{load_targets, Scheduler, Summary, Target};
use crate::utils::config::Settings;
use crate::utils::error::{BatchError, TaskError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything needed for one batch run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Target list file
    pub targets_path: PathBuf,

    pub settings: Settings,

    /// Explicit yt-dlp binary; searched for when `None`
    pub ytdlp_path: Option<PathBuf>,
}

/// Run a batch with the real yt-dlp.
///
/// Errors are fatal and returned before any download starts. Failed
/// downloads are not errors; they show up in the returned [`Summary`].
pub async fn run(config: RunConfig, sink: OutputSink) -> Result<Summary, BatchError> {
    let ytdlp = YtDlp::locate(config.ytdlp_path)?;
    ytdlp.preflight().await?;

    let targets = load_targets(&config.targets_path).await?;
    if targets.is_empty() {
        warn!(
            "No download targets in {}, nothing to do",
            config.targets_path.display()
        );
    }

    let settings = Arc::new(config.settings);
    sink.write_line(
        StreamKind::Stdout,
        &format!(
            "Downloading {} target(s) into {} (concurrency {}, media: {}, cookies: {})",
            targets.len(),
            settings.absolute_output_dir().display(),
            settings.concurrency,
            settings.media_type,
            settings.cookie_browser
        ),
    );

    let concurrency = settings.concurrency;
    let executor = Arc::new(YtDlpExecutor::new(ytdlp, settings, sink.clone()));
    Ok(run_targets(executor, targets, concurrency, &sink).await)
}

/// Schedule `targets` on `executor` and print the summary
pub async fn run_targets<E>(
    executor: Arc<E>,
    targets: Vec<Target>,
    concurrency: usize,
    sink: &OutputSink,
) -> Summary
where
    E: DownloadExecutor + 'static,
{
    let scheduler = Scheduler::new(executor, concurrency);
    let summary = scheduler
        .run_with(targets, |result| match &result.error {
            None => info!("[{}] succeeded", result.target.name),
            // Executors report their own failures; a crashed task could not
            Some(e @ TaskError::Panicked(_)) => sink.write_line(
                StreamKind::Stderr,
                &prefix_line(&result.target.name, &format!("download failed: {}", e)),
            ),
            Some(_) => {}
        })
        .await;

    for line in summary.to_string().lines() {
        sink.write_line(StreamKind::Stdout, line);
    }
    summary
}

/// Process exit status for a finished run
pub fn exit_code(result: &Result<Summary, BatchError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
