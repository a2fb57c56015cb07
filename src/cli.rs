use clap::Parser;
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::PathBuf;

pub const DEFAULT_SEARCH_URL: &str = "https://wallhaven.cc/api/v1/search";

/// Wallpaper downloader
#[derive(Parser, Debug)]
#[command(name = "waldl", author, version, about, long_about = None)]
pub struct Cli {
    /// Free-text search query
    pub query: Option<String>,

    /// Directory to download wallpapers into [default: <pictures>/wallpapers/<today>]
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Number of wallpapers to download (0 downloads every result)
    #[arg(short, long, default_value = "0")]
    pub number: usize,

    /// Maximum number of downloads in flight (unbounded when omitted)
    #[arg(short, long)]
    pub parallelism: Option<NonZeroUsize>,

    /// Per-download timeout in seconds (none when omitted)
    #[arg(short, long)]
    pub timeout: Option<NonZeroU64>,

    /// Search endpoint to query
    #[arg(long, default_value = DEFAULT_SEARCH_URL)]
    pub api_url: String,
}
