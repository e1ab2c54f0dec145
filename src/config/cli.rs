use super::FeedConfig;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "exposure-feed")]
#[command(about = "Scrape the ACT exposure site list and publish it as RSS feeds")]
pub struct CliConfig {
    /// Directory the feeds and state file are written to
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_path: String,

    #[arg(short, long, help = "Regenerate the feeds even if nothing changed")]
    pub force: bool,

    #[arg(long, help = "Exposure page to scrape for the CSV link")]
    pub source_url: Option<String>,

    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列參數，命令列優先
    pub fn to_feed_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                FeedConfig::from_file(path)?
            }
            None => FeedConfig::default(),
        };

        if let Some(url) = &self.source_url {
            config.source.url = url.clone();
        }
        config.output.path = self.output_path.clone();
        config.force = self.force;
        Ok(config)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("OUTPUT_DIR", &self.output_path)?;
        if let Some(url) = &self.source_url {
            validation::validate_url("--source-url", url)?;
        }
        if let Some(path) = &self.config {
            validation::validate_path("--config", &path.to_string_lossy())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_ci_invocation() {
        let cli = CliConfig::parse_from(["exposure-feed", "-f", "public/dev"]);
        assert!(cli.force);
        assert_eq!(cli.output_path, "public/dev");
        assert!(cli.validate().is_ok());

        let config = cli.to_feed_config().unwrap();
        assert!(config.force());
        assert_eq!(config.output_path(), "public/dev");
        assert_eq!(config.source_url(), crate::config::DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[source]\nurl = \"https://from-file.example.com\"\nretry_attempts = 7\n[output]\npath = \"ignored\"\n")
            .unwrap();
        let config_path = temp_file.path().to_string_lossy().to_string();

        let cli = CliConfig::parse_from([
            "exposure-feed",
            "--config",
            &config_path,
            "--source-url",
            "https://from-cli.example.com",
            "out",
        ]);
        let config = cli.to_feed_config().unwrap();

        assert_eq!(config.source_url(), "https://from-cli.example.com");
        assert_eq!(config.retry_attempts(), 7);
        assert_eq!(config.output_path(), "out");
        assert!(!config.force());
    }

    #[test]
    fn test_invalid_source_url_fails_validation() {
        let cli = CliConfig::parse_from(["exposure-feed", "--source-url", "not a url", "out"]);
        assert!(cli.validate().is_err());
    }
}
