use super::*;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub source: SourceConfig,
    pub feed: ChannelConfig,
    pub output: OutputConfig,
    /// 由命令列 `-f` 設定，不從檔案讀取
    #[serde(skip)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub url: String,
    pub csv_pattern: String,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            csv_pattern: DEFAULT_CSV_PATTERN.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_seconds: DEFAULT_RETRY_DELAY_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub title: String,
    pub summary_title: String,
    pub description: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_FEED_TITLE.to_string(),
            summary_title: DEFAULT_SUMMARY_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub feed_file: String,
    pub summary_file: String,
    pub state_file: String,
    pub summary_retention: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            feed_file: DEFAULT_FEED_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
            summary_retention: DEFAULT_SUMMARY_RETENTION,
        }
    }
}

impl FeedConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，缺少的欄位使用預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${FEED_SOURCE_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }
}

impl Validate for FeedConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.url", &self.source.url)?;
        validation::validate_regex("source.csv_pattern", &self.source.csv_pattern)?;
        validation::validate_range("source.timeout_seconds", self.source.timeout_seconds, 1, 600)?;
        validation::validate_range("source.retry_attempts", self.source.retry_attempts, 1, 10)?;
        validation::validate_range(
            "source.retry_delay_seconds",
            self.source.retry_delay_seconds,
            0,
            300,
        )?;

        validation::validate_non_empty_string("feed.title", &self.feed.title)?;
        validation::validate_non_empty_string("feed.summary_title", &self.feed.summary_title)?;
        validation::validate_non_empty_string("feed.description", &self.feed.description)?;

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_file_name("output.feed_file", &self.output.feed_file)?;
        validation::validate_file_name("output.summary_file", &self.output.summary_file)?;
        validation::validate_file_name("output.state_file", &self.output.state_file)?;
        validation::validate_positive_number("output.summary_retention", self.output.summary_retention, 1)?;

        let files = [
            &self.output.feed_file,
            &self.output.summary_file,
            &self.output.state_file,
        ];
        if files[0] == files[1] || files[0] == files[2] || files[1] == files[2] {
            return Err(FeedError::ConfigValidationError {
                field: "output".to_string(),
                message: "feed_file, summary_file and state_file must differ".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigProvider for FeedConfig {
    fn source_url(&self) -> &str {
        &self.source.url
    }

    fn csv_pattern(&self) -> &str {
        &self.source.csv_pattern
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn feed_file(&self) -> &str {
        &self.output.feed_file
    }

    fn summary_file(&self) -> &str {
        &self.output.summary_file
    }

    fn state_file(&self) -> &str {
        &self.output.state_file
    }

    fn feed_title(&self) -> &str {
        &self.feed.title
    }

    fn summary_title(&self) -> &str {
        &self.feed.summary_title
    }

    fn feed_description(&self) -> &str {
        &self.feed.description
    }

    fn summary_retention(&self) -> usize {
        self.output.summary_retention
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.source.retry_delay_seconds)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn force(&self) -> bool {
        self.force
    }
}
