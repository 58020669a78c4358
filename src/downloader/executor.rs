//! Runs one yt-dlp download per target

use crate::downloader::output::{prefix_line, pump_lines, OutputSink, StreamKind};
use crate::extractor::args::download_args;
use crate::extractor::YtDlp;
use crate::queue::{Target, TaskResult};
use crate::utils::config::Settings;
use crate::utils::error::TaskError;
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Something that can download a single target.
///
/// Implementations report every problem through the returned [`TaskResult`];
/// they must not panic on a failed download.
#[async_trait]
pub trait DownloadExecutor: Send + Sync {
    async fn execute(&self, target: Target) -> TaskResult;
}

/// Downloads a target by running yt-dlp and relaying its output
#[derive(Debug, Clone)]
pub struct YtDlpExecutor {
    ytdlp: YtDlp,
    settings: Arc<Settings>,
    sink: OutputSink,
}

impl YtDlpExecutor {
    pub fn new(ytdlp: YtDlp, settings: Arc<Settings>, sink: OutputSink) -> Self {
        Self {
            ytdlp,
            settings,
            sink,
        }
    }

    async fn download(&self, target: &Target) -> Result<(), TaskError> {
        let settings = &self.settings;
        ensure_output_dir(&settings.output_dir).await?;

        let args = download_args(
            &target.url,
            &target.name,
            &settings.output_dir,
            &settings.cookie_browser,
            settings.media_type,
        );
        debug!("[{}] yt-dlp args: {:?}", target.name, args);

        let mut child = self
            .ytdlp
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(TaskError::Spawn)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stdout not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "child stderr not captured"))?;

        let name = target.name.as_str();
        let sink = &self.sink;
        let run = async {
            // Both pipes must hit EOF before we wait, or a chatty child can
            // block on a full pipe and never exit.
            let (out, err) = tokio::join!(
                pump_lines(stdout, name, StreamKind::Stdout, sink),
                pump_lines(stderr, name, StreamKind::Stderr, sink),
            );
            if let Err(e) = out {
                warn!("[{}] lost stdout: {}", name, e);
            }
            if let Err(e) = err {
                warn!("[{}] lost stderr: {}", name, e);
            }

            child.wait().await
        };

        let status = match settings.task_timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(status) => status?,
                // Dropping the child kills it
                Err(_) => return Err(TaskError::TimedOut(limit)),
            },
            None => run.await?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(TaskError::NonZeroExit(status.code()))
        }
    }
}

#[async_trait]
impl DownloadExecutor for YtDlpExecutor {
    async fn execute(&self, target: Target) -> TaskResult {
        match self.download(&target).await {
            Ok(()) => {
                info!("[{}] download finished", target.name);
                TaskResult::success(target)
            }
            Err(e) => {
                self.sink.write_line(
                    StreamKind::Stderr,
                    &prefix_line(&target.name, &format!("download failed: {}", e)),
                );
                debug!("[{}] {} failed: {:?}", target.name, target.url, e);
                TaskResult::failure(target, e)
            }
        }
    }
}

/// Create the output directory if needed. The current directory is left alone.
async fn ensure_output_dir(dir: &Path) -> Result<(), TaskError> {
    if dir == Path::new(".") || dir.as_os_str().is_empty() {
        return Ok(());
    }

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| TaskError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
