mod cli;
mod config;
mod downloader;
mod error;
mod resolver;
#[cfg(test)]
mod test_support;
mod types;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::*;
use log::{error, info};
use types::{DownloadStatus, DownloadSummary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("Starting wallpaper downloader");
    run(Cli::parse()).await
}

/// Resolves before touching the filesystem, so a failed search never
/// leaves an empty download directory behind.
async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = config::Config::from_cli(&cli)?;
    info!(
        "CLI arguments parsed: number={}, parallelism={:?}, timeout={:?}",
        config.limit, config.parallelism, config.timeout
    );

    println!("Downloading to {}", config.directory.display());
    let query = resolver::effective_query(cli.query.as_deref());
    if let Some(q) = query {
        println!("Received query {}", q);
    }

    let client = resolver::build_client().context("could not build HTTP client")?;
    let resolver = resolver::Resolver::new(client.clone(), &cli.api_url)?;
    let links = match resolver.resolve(query).await {
        Ok(links) => links,
        Err(e) => {
            error!("Failed to resolve wallpaper links ({:?}): {}", e.kind(), e);
            eprintln!("{}", "Failed to fetch wallpaper list".red());
            return Err(e).context("could not resolve wallpaper links");
        }
    };

    config::prepare_directory(&config.directory).await?;

    let directory = config.directory.clone();
    let downloader = downloader::Downloader::new(client, config);
    let summary = downloader.download_all(&links).await;
    print_summary(&summary);

    if summary.failed_downloads > 0 {
        error!("{} downloads failed", summary.failed_downloads);
    }
    println!("Wallpapers downloaded to {}", directory.display());
    Ok(())
}

fn print_summary(summary: &DownloadSummary) {
    println!("\n{}", "Download Summary:".bold());
    println!("Total downloads: {} files", summary.total_downloads);
    println!(
        "Succeeded: {}, failed: {}",
        summary.successful_downloads.to_string().green(),
        summary.failed_downloads.to_string().red()
    );
    println!(
        "Total data transferred: {:.2} MB in {:.2?}",
        summary.total_bytes_downloaded as f64 / 1_048_576.0,
        summary.total_duration
    );

    for report in &summary.reports {
        let name = report
            .output_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("unknown");
        match (&report.status, &report.error) {
            (DownloadStatus::Success, _) => println!(
                "✓ {} ({:.2} MB in {:.2?})",
                name.green(),
                report.bytes_downloaded as f64 / 1_048_576.0,
                report.duration
            ),
            (DownloadStatus::Failed, error) => {
                let reason = error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string());
                println!("✗ {} - Error: {}", name.red(), reason);
                println!("  URL: {}", report.url);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cli_for(dir: &std::path::Path, api_url: &str) -> Cli {
        Cli::parse_from([
            "waldl",
            "-d",
            dir.to_str().unwrap(),
            "--api-url",
            api_url,
        ])
    }

    #[tokio::test]
    async fn malformed_endpoint_creates_no_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("2024-05-01");

        assert!(run(cli_for(&target, "not a url")).await.is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn failed_search_creates_no_directory() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("2024-05-01");

        let api_url = format!("{}/api/v1/search", test_support::refused_uri());
        assert!(run(cli_for(&target, &api_url)).await.is_err());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn resolves_then_downloads_into_new_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"path": format!("{}/full/wall.png", server.uri())}]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/full/wall.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pixels".to_vec()))
            .expect(1)
            .mount(&server)
            .await;
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("wallpapers").join("2024-05-01");

        let api_url = format!("{}/api/v1/search", server.uri());
        run(cli_for(&target, &api_url)).await.unwrap();

        assert_eq!(std::fs::read(target.join("wall.png")).unwrap(), b"pixels");
    }
}
