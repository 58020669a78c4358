//! yt-dlp argument construction
//!
//! Pure functions so the exact command line can be tested without spawning.

use crate::utils::config::MediaType;
use std::ffi::OsString;
use std::path::Path;

/// Format selection for MP4 video: merged best MP4 video and M4A audio,
/// then best single MP4, then anything.
pub const VIDEO_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Codec audio-only downloads are transcoded to
pub const AUDIO_CODEC: &str = "mp3";

/// Format flags for a media type. `Both` leaves selection to yt-dlp.
pub fn format_args_for(media_type: MediaType) -> Vec<String> {
    match media_type {
        MediaType::Both => Vec::new(),
        MediaType::Video => vec!["-f".to_string(), VIDEO_FORMAT.to_string()],
        MediaType::Audio => vec![
            "-f".to_string(),
            "bestaudio".to_string(),
            "--extract-audio".to_string(),
            "--audio-format".to_string(),
            AUDIO_CODEC.to_string(),
        ],
    }
}

/// Output template `{output_dir}/{name}.%(ext)s`; yt-dlp fills in the extension
pub fn output_template(output_dir: &Path, name: &str) -> OsString {
    output_dir.join(format!("{}.%(ext)s", name)).into_os_string()
}

/// Full argument list for one download, URL last.
///
/// The URL follows `--` so a target line can never be read as a yt-dlp option.
pub fn download_args(
    url: &str,
    name: &str,
    output_dir: &Path,
    cookie_browser: &str,
    media_type: MediaType,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--no-check-certificates".into(),
        "--cookies-from-browser".into(),
        cookie_browser.into(),
    ];
    args.extend(format_args_for(media_type).into_iter().map(OsString::from));
    args.push("-o".into());
    args.push(output_template(output_dir, name));
    args.push("--".into());
    args.push(url.into());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_both_adds_no_format_flags() {
        assert!(format_args_for(MediaType::Both).is_empty());
    }

    #[test]
    fn test_video_format_fallback_chain() {
        let args = format_args_for(MediaType::Video);
        assert_eq!(args[0], "-f");
        let chain: Vec<_> = args[1].split('/').collect();
        assert_eq!(
            chain,
            vec!["bestvideo[ext=mp4]+bestaudio[ext=m4a]", "best[ext=mp4]", "best"]
        );
    }

    #[test]
    fn test_audio_extracts_to_fixed_codec() {
        let args = format_args_for(MediaType::Audio);
        assert!(args.contains(&"--extract-audio".to_string()));
        let idx = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[idx + 1], AUDIO_CODEC);
    }

    #[test]
    fn test_download_args_layout() {
        let dir = PathBuf::from("out");
        let args = strings(&download_args(
            "https://example.com/a",
            "clip1",
            &dir,
            "chrome",
            MediaType::Both,
        ));

        assert_eq!(
            &args[..3],
            &["--no-check-certificates", "--cookies-from-browser", "chrome"]
        );
        assert_eq!(args[3], "-o");
        assert_eq!(
            PathBuf::from(&args[4]),
            PathBuf::from("out").join("clip1.%(ext)s")
        );
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://example.com/a");
    }

    #[test]
    fn test_option_like_url_stays_positional() {
        let args = strings(&download_args(
            "--exec=touch /tmp/owned",
            "clip",
            Path::new("."),
            "firefox",
            MediaType::Both,
        ));

        let end_of_options = args.iter().position(|a| a == "--").unwrap();
        assert_eq!(end_of_options, args.len() - 2);
        assert_eq!(args.last().unwrap(), "--exec=touch /tmp/owned");
        assert_eq!(args.iter().filter(|a| a.starts_with("--exec")).count(), 1);
    }

    #[test]
    fn test_format_flags_sit_before_output() {
        let args = strings(&download_args(
            "u",
            "n",
            Path::new("."),
            "firefox",
            MediaType::Video,
        ));
        let f = args.iter().position(|a| a == "-f").unwrap();
        let o = args.iter().position(|a| a == "-o").unwrap();
        assert!(f < o);
        assert_eq!(args.len(), 9);
    }
}
