//! yt-dlp discovery and preflight
//!
//! Finds the yt-dlp binary and checks that it runs before any download is
//! attempted. A broken install aborts the whole run up front.

use crate::utils::error::BatchError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Handle to a yt-dlp executable
#[derive(Debug, Clone)]
pub struct YtDlp {
    path: PathBuf,
}

impl YtDlp {
    /// Use an explicit binary (path or bare command name)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `explicit` if given, otherwise search for yt-dlp.
    ///
    /// Search order:
    /// 1. Next to the current executable
    /// 2. System PATH
    /// 3. Common installation paths (Homebrew, pip user installs)
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self, BatchError> {
        if let Some(path) = explicit {
            debug!("Using yt-dlp from command line: {}", path.display());
            return Ok(Self::new(path));
        }

        match find_ytdlp() {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                Ok(Self::new(path))
            }
            None => Err(BatchError::YtDlpNotFound),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh command for this binary with no arguments
    pub fn command(&self) -> Command {
        Command::new(&self.path)
    }

    /// Run `yt-dlp --version` and return the reported version.
    ///
    /// Fails if the binary cannot be started or exits non-zero.
    pub async fn preflight(&self) -> Result<String, BatchError> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    BatchError::YtDlpNotFound
                } else {
                    BatchError::PreflightFailed(format!(
                        "failed to run {}: {}",
                        self.path.display(),
                        e
                    ))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BatchError::PreflightFailed(format!(
                "{} --version exited with {}: {}",
                self.path.display(),
                output.status,
                stderr.trim()
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("yt-dlp version: {}", version);
        Ok(version)
    }
}

/// Find yt-dlp binary, trying locations in priority order
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(local) = find_next_to_exe() {
        debug!("Using yt-dlp next to executable: {:?}", local);
        return Some(local);
    }

    if let Ok(path) = which::which("yt-dlp") {
        debug!("Using system yt-dlp: {:?}", path);
        return Some(path);
    }

    if let Some(common) = find_in_common_paths() {
        debug!("Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("yt-dlp not found anywhere");
    None
}

/// A yt-dlp shipped alongside our own binary
fn find_next_to_exe() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let exe_dir = exe_path.parent()?;

    let name = if cfg!(windows) { "yt-dlp.exe" } else { "yt-dlp" };
    let candidate = exe_dir.join(name);
    if candidate.is_file() && is_executable(&candidate) {
        return Some(candidate);
    }

    None
}

fn find_in_common_paths() -> Option<PathBuf> {
    let common_paths = [
        // macOS Homebrew (Apple Silicon)
        "/opt/homebrew/bin/yt-dlp",
        // macOS Homebrew (Intel)
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        // pip user install
        "~/.local/bin/yt-dlp",
    ];

    common_paths
        .iter()
        .map(|p| expand_home(p))
        .find(|p| p.is_file() && is_executable(p))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}
