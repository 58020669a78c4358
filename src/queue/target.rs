//! Target list loading
//!
//! A target list is UTF-8 text with one `<name> <url>` pair per line.
//! Blank lines and `#` comments are ignored.

use crate::utils::error::BatchError;
use std::path::Path;
use tracing::{debug, warn};

/// One (name, URL) pair to download.
///
/// `name` is both the output file stem and the console prefix for this
/// download's output. Duplicate names are not rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Parse one line of a target list.
///
/// Returns `None` for blank lines, comments and lines without both a name
/// and a URL. The URL is everything after the first run of whitespace.
pub fn parse_target_line(line: &str) -> Option<Target> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (name, url) = line.split_once(char::is_whitespace)?;
    let (name, url) = (name.trim(), url.trim());
    if name.is_empty() || url.is_empty() {
        return None;
    }

    Some(Target::new(name, url))
}

/// Parse a whole target list, keeping input order
pub fn parse_targets(content: &str) -> Vec<Target> {
    let mut targets = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_target_line(trimmed) {
            Some(target) => targets.push(target),
            None => warn!(
                "Skipping line {}: expected '<name> <url>', got '{}'",
                idx + 1,
                trimmed
            ),
        }
    }

    targets
}

/// Load targets from a file.
///
/// An existing file with no usable lines yields an empty list, not an error.
pub async fn load_targets(path: &Path) -> Result<Vec<Target>, BatchError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(BatchError::TargetListNotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(BatchError::TargetListUnreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let targets = parse_targets(&content);
    debug!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}
