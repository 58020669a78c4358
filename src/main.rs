//! batchloader - batch media downloader driving yt-dlp
//!
//! Reads `<name> <url>` lines from a target list, runs yt-dlp for each with a
//! bounded number of downloads in flight, and reports how many succeeded.

use anyhow::Result;
use batchloader::app::{self, RunConfig};
use batchloader::utils::config::{DEFAULT_CONFIG_FILE, DEFAULT_TARGETS_FILE};
use batchloader::utils::{MediaType, Settings, SettingsOverrides};
use batchloader::OutputSink;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "batchloader")]
#[command(version, about = "Download a list of URLs with yt-dlp, several at a time")]
struct Args {
    /// Target list, one `<name> <url>` per line
    #[arg(short = 't', long, value_name = "FILE", default_value = DEFAULT_TARGETS_FILE)]
    targets: PathBuf,

    /// Settings file with Count, Path and Browser keys
    #[arg(short = 'c', long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Maximum simultaneous downloads
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Directory downloads are saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Browser to read cookies from
    #[arg(short = 'b', long)]
    browser: Option<String>,

    /// What to download
    #[arg(short = 'm', long, value_enum)]
    media_type: Option<MediaType>,

    /// Path to the yt-dlp binary
    #[arg(long = "yt-dlp", value_name = "PATH")]
    ytdlp: Option<PathBuf>,

    /// Kill a download after this many seconds (0 = never)
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// More logging (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings::load(&self.config).apply(SettingsOverrides {
            concurrency: self.concurrency,
            output_dir: self.output_dir.clone(),
            cookie_browser: self.browser.clone(),
            media_type: self.media_type,
            timeout_secs: self.timeout,
        })
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging on stderr; stdout carries yt-dlp output
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = RunConfig {
        targets_path: args.targets.clone(),
        settings: args.settings(),
        ytdlp_path: args.ytdlp.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(app::run(config, OutputSink::console()));

    if let Err(e) = &result {
        error!("Run aborted: {}", e);
        eprintln!("Error: {}", e);
    }

    Ok(ExitCode::from(app::exit_code(&result)))
}
