// CLI module for argument parsing and configuration

use crate::config::UserConfig;
use crate::domain::SessionTimings;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// Largest batch the app will fetch in one session
pub const MAX_BATCH_SIZE: usize = 50;

/// Catswp - swipe through random cats in your terminal
///
/// Like the ones you love, skip the rest, then save or share your collection.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "catswp")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Number of cats per session
    #[arg(short = 'n', long = "count")]
    pub count: Option<usize>,

    /// Image source URL template; `{rand}` is replaced with a cache-busting number
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Directory where saved cats are written
    #[arg(short = 'o', long = "save-dir")]
    pub save_dir: Option<PathBuf>,

    /// Delay before the first card accepts input, in milliseconds
    #[arg(long = "settle-ms")]
    pub settle_ms: Option<u64>,

    /// Delay between the last swipe and the collection, in milliseconds
    #[arg(long = "finish-ms")]
    pub finish_ms: Option<u64>,

    /// Share by opening the link in the default browser instead of copying it
    #[arg(long = "open-links", action = ArgAction::SetTrue)]
    pub open_links: bool,

    /// Write the resolved settings to the config file and exit
    #[arg(long = "write-config", action = ArgAction::SetTrue)]
    pub write_config: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the arguments and return any errors
    pub fn validate(&self) -> Result<(), String> {
        if let Some(count) = self.count {
            validate_batch_size(count)?;
        }

        if let Some(ref url) = self.url {
            validate_source_url(url)?;
        }

        if let Some(ref dir) = self.save_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(format!("Save path is not a directory: {}", dir.display()));
            }
        }

        Ok(())
    }
}

fn validate_batch_size(count: usize) -> Result<(), String> {
    if count == 0 || count > MAX_BATCH_SIZE {
        return Err(format!(
            "Count must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, count
        ));
    }
    Ok(())
}

fn validate_source_url(url: &str) -> Result<(), String> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(format!("Source URL must start with http:// or https://: '{}'", url));
    }
    Ok(())
}

/// Settings resolved from defaults, the config file and CLI flags (in rising priority)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub batch_size: usize,
    pub source_url: String,
    pub save_dir: PathBuf,
    pub timings: SessionTimings,
    pub request_timeout: Duration,
    pub open_links: bool,
    pub drag_threshold: u16,
}

impl AppConfig {
    pub fn resolve(args: &Args, user: &UserConfig) -> Result<Self, String> {
        let batch_size = args.count.unwrap_or(user.batch_size);
        validate_batch_size(batch_size)?;

        let source_url = args.url.clone().unwrap_or_else(|| user.source_url.clone());
        validate_source_url(&source_url)?;

        let save_dir = args
            .save_dir
            .clone()
            .or_else(|| user.save_dir.clone())
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(AppConfig {
            batch_size,
            source_url,
            save_dir,
            timings: SessionTimings {
                settle_delay: Duration::from_millis(args.settle_ms.unwrap_or(user.settle_delay_ms)),
                finish_delay: Duration::from_millis(args.finish_ms.unwrap_or(user.finish_delay_ms)),
            },
            request_timeout: Duration::from_secs(user.request_timeout_secs.max(1)),
            open_links: args.open_links || user.open_links,
            drag_threshold: user.drag_threshold.max(1),
        })
    }

    /// The knobs worth persisting, as a config file would hold them
    pub fn to_user_config(&self) -> UserConfig {
        UserConfig {
            batch_size: self.batch_size,
            source_url: self.source_url.clone(),
            settle_delay_ms: self.timings.settle_delay.as_millis() as u64,
            finish_delay_ms: self.timings.finish_delay.as_millis() as u64,
            request_timeout_secs: self.request_timeout.as_secs(),
            save_dir: Some(self.save_dir.clone()),
            open_links: self.open_links,
            drag_threshold: self.drag_threshold,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            batch_size: crate::config::DEFAULT_BATCH_SIZE,
            source_url: crate::source::DEFAULT_SOURCE_URL.to_string(),
            save_dir: PathBuf::from("."),
            timings: SessionTimings::default(),
            request_timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            open_links: false,
            drag_threshold: crate::config::DEFAULT_DRAG_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod args_tests {
        use super::*;

        #[test]
        fn test_parse_flags() {
            let args = Args::try_parse_from([
                "catswp",
                "-n",
                "5",
                "--url",
                "https://cats.test/cat?r={rand}",
                "--open-links",
                "--settle-ms",
                "0",
            ])
            .unwrap();

            assert_eq!(args.count, Some(5));
            assert_eq!(args.url.as_deref(), Some("https://cats.test/cat?r={rand}"));
            assert!(args.open_links);
            assert_eq!(args.settle_ms, Some(0));
            assert!(args.finish_ms.is_none());
            assert!(!args.write_config);
        }

        #[test]
        fn test_validate_defaults() {
            assert!(Args::default().validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_zero_count() {
            let args = Args {
                count: Some(0),
                ..Args::default()
            };
            assert!(args.validate().is_err());
        }

        #[test]
        fn test_validate_rejects_huge_count() {
            let args = Args {
                count: Some(MAX_BATCH_SIZE + 1),
                ..Args::default()
            };
            assert!(args.validate().is_err());
        }

        #[test]
        fn test_validate_rejects_non_http_url() {
            let args = Args {
                url: Some("ftp://cats.test/cat".to_string()),
                ..Args::default()
            };
            let err = args.validate().unwrap_err();
            assert!(err.contains("http"));
        }

        #[test]
        fn test_validate_rejects_file_as_save_dir() {
            let file = tempfile::NamedTempFile::new().unwrap();
            let args = Args {
                save_dir: Some(file.path().to_path_buf()),
                ..Args::default()
            };
            assert!(args.validate().is_err());
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_uses_user_config() {
            let user = UserConfig {
                batch_size: 7,
                finish_delay_ms: 100,
                save_dir: Some(PathBuf::from("/tmp/cats")),
                ..UserConfig::default()
            };
            let config = AppConfig::resolve(&Args::default(), &user).unwrap();

            assert_eq!(config.batch_size, 7);
            assert_eq!(config.timings.finish_delay, Duration::from_millis(100));
            assert_eq!(config.timings.settle_delay, Duration::from_millis(500));
            assert_eq!(config.save_dir, PathBuf::from("/tmp/cats"));
        }

        #[test]
        fn test_resolve_flags_override_user_config() {
            let user = UserConfig {
                batch_size: 7,
                ..UserConfig::default()
            };
            let args = Args {
                count: Some(2),
                settle_ms: Some(0),
                save_dir: Some(PathBuf::from("/srv/cats")),
                open_links: true,
                ..Args::default()
            };
            let config = AppConfig::resolve(&args, &user).unwrap();

            assert_eq!(config.batch_size, 2);
            assert_eq!(config.timings.settle_delay, Duration::ZERO);
            assert_eq!(config.save_dir, PathBuf::from("/srv/cats"));
            assert!(config.open_links);
        }

        #[test]
        fn test_resolve_rejects_bad_config_file_values() {
            let user = UserConfig {
                batch_size: 0,
                ..UserConfig::default()
            };
            assert!(AppConfig::resolve(&Args::default(), &user).is_err());
        }

        #[test]
        fn test_to_user_config_keeps_knobs() {
            let config = AppConfig {
                batch_size: 4,
                ..AppConfig::default()
            };
            let user = config.to_user_config();
            assert_eq!(user.batch_size, 4);
            assert_eq!(user.settle_delay_ms, 500);
            assert_eq!(user.save_dir, Some(PathBuf::from(".")));
        }
    }
}
