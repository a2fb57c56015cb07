use crate::error::TaskError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Envelope returned by the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub data: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub url: String,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub struct DownloadReport {
    pub url: String,
    pub output_path: Option<PathBuf>,
    pub status: DownloadStatus,
    pub bytes_downloaded: u64,
    pub duration: Duration,
    pub error: Option<TaskError>,
}

#[derive(Debug, PartialEq)]
pub enum DownloadStatus {
    Success,
    Failed,
}

#[derive(Debug)]
pub struct DownloadSummary {
    pub total_downloads: usize,
    pub successful_downloads: usize,
    pub failed_downloads: usize,
    pub total_bytes_downloaded: u64,
    pub total_duration: Duration,
    pub reports: Vec<DownloadReport>,
}
