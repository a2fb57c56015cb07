use crate::cli::Cli;
use crate::error::ConfigError;
use log::info;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything the downloader needs for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    /// 0 means every resolved link.
    pub limit: usize,
    pub parallelism: Option<NonZeroUsize>,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(directory: PathBuf, limit: usize) -> Self {
        Self {
            directory,
            limit,
            parallelism: None,
            timeout: None,
        }
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let directory = match &cli.dir {
            Some(dir) => dir.clone(),
            None => default_download_dir()?,
        };

        let mut config = Self::new(directory, cli.number);
        config.parallelism = cli.parallelism;
        config.timeout = cli.timeout.map(|secs| Duration::from_secs(secs.get()));
        Ok(config)
    }
}

/// `<pictures>/wallpapers/<YYYY-MM-DD>` using the local date.
pub fn default_download_dir() -> Result<PathBuf, ConfigError> {
    let pictures = dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .ok_or(ConfigError::NoPictureDir)?;
    Ok(dated_dir(&pictures.join("wallpapers"), chrono::Local::now().date_naive()))
}

fn dated_dir(base: &Path, date: chrono::NaiveDate) -> PathBuf {
    base.join(date.format("%Y-%m-%d").to_string())
}

/// Creates the download directory (and parents) if it is missing.
pub async fn prepare_directory(dir: &Path) -> Result<(), ConfigError> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(ConfigError::NotADirectory(dir.to_path_buf())),
        Err(_) => {}
    }

    info!("Creating download directory {}", dir.display());
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ConfigError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn dated_dir_uses_iso_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2023, 7, 4).unwrap();
        assert_eq!(
            dated_dir(Path::new("/pics/wallpapers"), date),
            PathBuf::from("/pics/wallpapers/2023-07-04")
        );
    }

    #[test]
    fn explicit_dir_overrides_default() {
        let cli = Cli::parse_from(["waldl", "-d", "/srv/walls", "-n", "3", "-t", "10"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.directory, PathBuf::from("/srv/walls"));
        assert_eq!(config.limit, 3);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.parallelism, None);
    }

    #[tokio::test]
    async fn prepare_directory_creates_nested_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("wallpapers").join("2024-01-01");

        prepare_directory(&target).await.unwrap();
        assert!(target.is_dir());

        // Existing directory is accepted as-is.
        prepare_directory(&target).await.unwrap();
    }

    #[tokio::test]
    async fn prepare_directory_rejects_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let err = prepare_directory(&file).await.unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
    }
}
