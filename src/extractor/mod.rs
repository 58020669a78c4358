pub mod args;
pub mod ytdlp;

pub use args::{download_args, format_args_for};
pub use ytdlp::{find_ytdlp, YtDlp};
