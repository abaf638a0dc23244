use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::builtin::DEFAULT_PLACEHOLDER_IMAGE;
use crate::controller::DEFAULT_REFRESH_INTERVAL;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Mode {
    /// Load the feed once, print it and exit.
    Once,
    /// Keep reloading on the refresh interval.
    Watch,
    /// Read commands from stdin while auto-refreshing.
    Interactive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the feed API (e.g. `http://localhost:8000`).
    #[arg(long, default_value = "http://localhost:8000")]
    pub base_url: Url,

    /// `once`, `watch` or `interactive`.
    #[arg(long, value_enum, default_value = "once")]
    pub mode: Mode,

    /// Seconds between automatic feed reloads.
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
    pub refresh_interval: u64,

    /// Image shown in place of any post image that fails to load.
    #[arg(long, default_value = DEFAULT_PLACEHOLDER_IMAGE)]
    pub placeholder_image: String,

    /// Write the rendered page HTML here after every change.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// HTTP User-Agent sent to the API.
    #[arg(long, default_value = "social-feed-client/0.1")]
    pub user_agent: String,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, value_enum, default_value = "auto")]
    pub progress: ProgressMode,
}
