//! Run configuration
//!
//! Settings come from three layers: built-in defaults, an optional
//! `config.txt` next to the target list, and command line overrides applied
//! by the binary. Bad values never abort a run; they fall back to defaults.

use crate::utils::error::BatchError;
use clap::ValueEnum;
use path_absolutize::Absolutize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Settings file read when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "config.txt";

/// Target list read when no `--targets` is given
pub const DEFAULT_TARGETS_FILE: &str = "urls.txt";

pub const DEFAULT_BROWSER: &str = "firefox";

/// Browsers we know yt-dlp can read cookies from. Anything else is passed
/// through with a warning since yt-dlp may support more than this.
const KNOWN_BROWSERS: [&str; 8] = [
    "firefox", "chrome", "chromium", "edge", "brave", "opera", "safari", "vivaldi",
];

/// Which streams to ask yt-dlp for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MediaType {
    /// yt-dlp default selection (usually best combined stream)
    #[default]
    Both,
    /// Best MP4 video with audio
    Video,
    /// Audio only, transcoded
    Audio,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Both => "both",
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(MediaType::Both),
            "video" => Ok(MediaType::Video),
            "audio" => Ok(MediaType::Audio),
            other => Err(BatchError::ConfigError(format!(
                "unknown media type '{}' (expected both, video or audio)",
                other
            ))),
        }
    }
}

/// Resolved settings, shared read-only by every download task
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Maximum downloads running at once (at least 1)
    pub concurrency: usize,

    /// Directory the downloaded files are written to
    pub output_dir: PathBuf,

    /// Browser yt-dlp reads cookies from
    pub cookie_browser: String,

    pub media_type: MediaType,

    /// Kill a download that runs longer than this. `None` waits forever.
    pub task_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            output_dir: PathBuf::from("."),
            cookie_browser: DEFAULT_BROWSER.to_string(),
            media_type: MediaType::Both,
            task_timeout: None,
        }
    }
}

impl Settings {
    /// Load settings from a config file, falling back to defaults.
    ///
    /// A missing file is normal. An unreadable one is logged and ignored.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded settings from {}", path.display());
                Self::parse(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                warn!(
                    "Failed to read settings file {}: {}. Using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Parse `Key = Value` lines. Keys are case-insensitive and only the
    /// `[Settings]` section (or lines before any section) is read.
    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();
        let mut in_settings = true;

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                in_settings = line[1..line.len() - 1].trim().eq_ignore_ascii_case("settings");
                continue;
            }
            if !in_settings {
                continue;
            }

            let Some((key, value)) = split_key_value(line) else {
                warn!("Ignoring malformed settings line: {}", line);
                continue;
            };

            match key.to_ascii_lowercase().as_str() {
                "count" => settings.concurrency = parse_concurrency(value),
                "path" => settings.output_dir = normalize_output_dir(value),
                "browser" => settings.cookie_browser = normalize_browser(value),
                other => debug!("Ignoring unknown settings key '{}'", other),
            }
        }

        settings
    }

    /// Output directory as an absolute path, for reporting
    pub fn absolute_output_dir(&self) -> PathBuf {
        self.output_dir
            .absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.output_dir.clone())
    }
}

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub concurrency: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub cookie_browser: Option<String>,
    pub media_type: Option<MediaType>,
    /// Seconds; 0 disables the timeout
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn apply(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(n) = overrides.concurrency {
            if n == 0 {
                warn!("Concurrency must be at least 1, using 1");
            }
            self.concurrency = n.max(1);
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = normalize_output_dir(&dir.to_string_lossy());
        }
        if let Some(browser) = overrides.cookie_browser {
            self.cookie_browser = normalize_browser(&browser);
        }
        if let Some(media_type) = overrides.media_type {
            self.media_type = media_type;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.task_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        self
    }
}

/// Split on whichever of `=` or `:` comes first
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let idx = line.find(['=', ':'])?;
    let key = line[..idx].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[idx + 1..].trim()))
}

/// Unparseable or non-positive counts become 1
pub fn parse_concurrency(value: &str) -> usize {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 1 => n as usize,
        Ok(n) => {
            warn!("Count must be at least 1 (got {}), using 1", n);
            1
        }
        Err(_) => {
            warn!("Count '{}' is not a number, using 1", value.trim());
            1
        }
    }
}

/// Strip one pair of surrounding double quotes; empty means the current directory
pub fn normalize_output_dir(value: &str) -> PathBuf {
    let mut value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        value = &value[1..value.len() - 1];
    }
    if value.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(value)
    }
}

/// Lowercase the browser name. Unknown names are kept; yt-dlp has the final say.
pub fn normalize_browser(value: &str) -> String {
    let browser = value.trim().to_lowercase();
    if browser.is_empty() {
        return DEFAULT_BROWSER.to_string();
    }
    if !is_known_browser(&browser) {
        warn!(
            "Browser '{}' is not one of {}; passing it to yt-dlp anyway",
            browser,
            KNOWN_BROWSERS.join(", ")
        );
    }
    browser
}

pub fn is_known_browser(name: &str) -> bool {
    KNOWN_BROWSERS.contains(&name)
}
