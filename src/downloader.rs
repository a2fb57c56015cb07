use crate::config::Config;
use crate::error::TaskError;
use crate::types::{DownloadReport, DownloadStatus, DownloadSummary, DownloadTask};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

/// Links that write to the same file. They run one after another in
/// resolver order, so the last one wins.
type Unit = Vec<(usize, DownloadTask)>;

pub struct Downloader {
    client: reqwest::Client,
    config: Config,
    progress: MultiProgress,
}

impl Downloader {
    pub fn new(client: reqwest::Client, config: Config) -> Self {
        Self {
            client,
            config,
            progress: MultiProgress::new(),
        }
    }

    /// Downloads the selected links concurrently and returns once every
    /// task has finished. Per-link failures are recorded in the summary.
    pub async fn download_all(&self, links: &[String]) -> DownloadSummary {
        let start_time = Instant::now();
        let selected = select_links(links, self.config.limit);
        let (units, mut reports) = self.plan(selected);

        let in_flight = self
            .config
            .parallelism
            .map_or(units.len().max(1), NonZeroUsize::get);
        info!(
            "Launching {} downloads ({} in flight at most)",
            selected.len(),
            in_flight
        );

        let finished: Vec<Vec<(usize, DownloadReport)>> = stream::iter(units)
            .map(|unit| self.run_unit(unit))
            .buffer_unordered(in_flight)
            .collect()
            .await;
        reports.extend(finished.into_iter().flatten());
        reports.sort_by_key(|(index, _)| *index);
        let reports: Vec<DownloadReport> = reports.into_iter().map(|(_, r)| r).collect();

        let total_duration = start_time.elapsed();
        let total_downloads = reports.len();
        let successful_downloads = reports
            .iter()
            .filter(|r| r.status == DownloadStatus::Success)
            .count();
        let failed_downloads = total_downloads - successful_downloads;
        let total_bytes_downloaded: u64 = reports.iter().map(|r| r.bytes_downloaded).sum();

        DownloadSummary {
            total_downloads,
            successful_downloads,
            failed_downloads,
            total_bytes_downloaded,
            total_duration,
            reports,
        }
    }

    /// Groups links by destination. Links without a usable file name fail here.
    fn plan(&self, links: &[String]) -> (Vec<Unit>, Vec<(usize, DownloadReport)>) {
        let mut units: Vec<Unit> = Vec::new();
        let mut by_path: HashMap<PathBuf, usize> = HashMap::new();
        let mut failed = Vec::new();

        for (index, url) in links.iter().enumerate() {
            let output_path = match destination_for(url, &self.config.directory) {
                Ok(path) => path,
                Err(e) => {
                    error!("Not able to download {}: {}", url, e);
                    failed.push((index, failed_report(url.clone(), None, e, Duration::ZERO, 0)));
                    continue;
                }
            };

            let task = DownloadTask {
                url: url.clone(),
                output_path: output_path.clone(),
            };
            info!("Download task: {} -> {}", task.url, task.output_path.display());

            match by_path.get(&output_path) {
                Some(&slot) => {
                    warn!(
                        "{} shares its file name with an earlier link and will overwrite it",
                        url
                    );
                    units[slot].push((index, task));
                }
                None => {
                    by_path.insert(output_path, units.len());
                    units.push(vec![(index, task)]);
                }
            }
        }

        (units, failed)
    }

    async fn run_unit(&self, unit: Unit) -> Vec<(usize, DownloadReport)> {
        let mut reports = Vec::with_capacity(unit.len());
        for (index, task) in unit {
            let pb = self.progress.add(create_progress_bar(&task));
            reports.push((index, self.download_file(task, pb).await));
        }
        reports
    }

    async fn download_file(&self, task: DownloadTask, pb: ProgressBar) -> DownloadReport {
        let start_time = Instant::now();
        info!("Starting download: {}", task.url);
        let mut downloaded: u64 = 0;

        let transfer = self.transfer(&task, &pb, &mut downloaded);
        let result = match self.config.timeout {
            Some(limit) => match tokio::time::timeout(limit, transfer).await {
                Ok(result) => result,
                Err(_) => Err(TaskError::Timeout(limit)),
            },
            None => transfer.await,
        };

        let duration = start_time.elapsed();
        match result {
            Ok(()) => {
                let line = format!("Downloaded {}", task.output_path.display());
                info!("{}", line);
                pb.finish_with_message(line.clone());
                self.announce(&line);
                DownloadReport {
                    url: task.url,
                    output_path: Some(task.output_path),
                    status: DownloadStatus::Success,
                    bytes_downloaded: downloaded,
                    duration,
                    error: None,
                }
            }
            Err(e) => {
                error!("Download failed for {} ({:?}): {}", task.url, e.kind(), e);
                let line = format!("Not able to download {}", task.url);
                pb.abandon_with_message(line.clone());
                self.announce(&line);
                failed_report(task.url, Some(task.output_path), e, duration, downloaded)
            }
        }
    }

    /// Prints a result line even when the progress bars are not drawn.
    fn announce(&self, line: &str) {
        if self.progress.is_hidden() {
            println!("{}", line);
        } else if let Err(e) = self.progress.println(line) {
            warn!("Could not print progress line: {}", e);
        }
    }

    async fn transfer(
        &self,
        task: &DownloadTask,
        pb: &ProgressBar,
        downloaded: &mut u64,
    ) -> Result<(), TaskError> {
        let resp = self
            .client
            .get(&task.url)
            .send()
            .await
            .map_err(TaskError::Fetch)?;

        if !resp.status().is_success() {
            return Err(TaskError::Status(resp.status()));
        }

        if let Some(total_size) = resp.content_length() {
            pb.set_length(total_size);
        }

        let mut file = File::create(&task.output_path)
            .await
            .map_err(|source| TaskError::Create {
                path: task.output_path.clone(),
                source,
            })?;

        let mut stream = resp.bytes_stream();
        let copied = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(TaskError::Body)?;
                file.write_all(&chunk)
                    .await
                    .map_err(|source| TaskError::Write {
                        path: task.output_path.clone(),
                        source,
                    })?;
                *downloaded += chunk.len() as u64;
                pb.set_position(*downloaded);
            }
            Ok::<(), TaskError>(())
        }
        .await;

        // Whatever arrived stays on disk, even when the copy failed.
        let flushed = file.flush().await.map_err(|source| TaskError::Write {
            path: task.output_path.clone(),
            source,
        });
        copied.and(flushed)
    }
}

/// The first `limit` links in resolver order; 0 selects all of them.
/// A limit past the end is clamped.
pub fn select_links(links: &[String], limit: usize) -> &[String] {
    let count = match limit {
        0 => links.len(),
        n if n > links.len() => {
            warn!(
                "Requested {} wallpapers but only {} were found",
                n,
                links.len()
            );
            links.len()
        }
        n => n,
    };
    &links[..count]
}

/// `dir` joined with the final path segment of `link`.
pub fn destination_for(link: &str, dir: &Path) -> Result<PathBuf, TaskError> {
    let url = Url::parse(link).map_err(|_| TaskError::InvalidName(link.to_string()))?;
    let name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| TaskError::InvalidName(link.to_string()))?;
    Ok(dir.join(name))
}

fn failed_report(
    url: String,
    output_path: Option<PathBuf>,
    error: TaskError,
    duration: Duration,
    bytes_downloaded: u64,
) -> DownloadReport {
    DownloadReport {
        url,
        output_path,
        status: DownloadStatus::Failed,
        bytes_downloaded,
        duration,
        error: Some(error),
    }
}

fn create_progress_bar(task: &DownloadTask) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(
        task.output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string(),
    );
    pb
}
