#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::FeedConfig;

pub const DEFAULT_SOURCE_URL: &str =
    "https://www.covid19.act.gov.au/act-status-and-response/act-covid-19-exposure-locations";
pub const DEFAULT_CSV_PATTERN: &str = r"https://www[.]covid19[.]act[.]gov[.]au/.*?[.]csv";

pub const DEFAULT_FEED_TITLE: &str = "ACT Exposure Locations";
pub const DEFAULT_SUMMARY_TITLE: &str = "ACT Exposure Summaries";
pub const DEFAULT_DESCRIPTION: &str = "Feed scraped from ACT exposure website";

pub const DEFAULT_FEED_FILE: &str = "rss.xml";
pub const DEFAULT_SUMMARY_FILE: &str = "summary.xml";
pub const DEFAULT_STATE_FILE: &str = "state.json";
pub const DEFAULT_SUMMARY_RETENTION: usize = 50;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 2;
