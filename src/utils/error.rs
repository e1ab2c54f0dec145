use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("RSS error: {0}")]
    RssError(#[from] rss::Error),

    #[error("RSS validation failed: {0}")]
    RssValidationError(#[from] rss::validation::ValidationError),

    #[error("No CSV link found on {page}")]
    CsvLocationNotFound { page: String },

    #[error("CSV schema changed (missing: [{missing}], unexpected: [{unexpected}])")]
    SchemaChanged { missing: String, unexpected: String },

    #[error("State file {path} is corrupt: {message}")]
    CorruptState { path: String, message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Source,
    Storage,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FeedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::HttpError(_) | FeedError::HttpStatusError { .. } => ErrorCategory::Network,
            FeedError::CsvError(_)
            | FeedError::CsvLocationNotFound { .. }
            | FeedError::SchemaChanged { .. } => ErrorCategory::Source,
            FeedError::IoError(_) | FeedError::CorruptState { .. } => ErrorCategory::Storage,
            FeedError::ConfigValidationError { .. } | FeedError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            FeedError::SerializationError(_)
            | FeedError::RssError(_)
            | FeedError::RssValidationError(_)
            | FeedError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            FeedError::HttpError(e) if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() => {
                ErrorSeverity::Medium
            }
            FeedError::HttpError(_) => ErrorSeverity::High,
            FeedError::HttpStatusError { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            FeedError::HttpStatusError { .. } => ErrorSeverity::High,
            FeedError::CsvError(_)
            | FeedError::CsvLocationNotFound { .. }
            | FeedError::SchemaChanged { .. }
            | FeedError::SerializationError(_)
            | FeedError::RssError(_)
            | FeedError::RssValidationError(_)
            | FeedError::ProcessingError { .. } => ErrorSeverity::High,
            FeedError::IoError(_)
            | FeedError::CorruptState { .. }
            | FeedError::ConfigValidationError { .. }
            | FeedError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 網路錯誤與 5xx 可以重試
    pub fn is_retryable(&self) -> bool {
        self.severity() == ErrorSeverity::Medium
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check connectivity to the source site; the next scheduled run will retry",
            ErrorCategory::Source => {
                "The publisher may have changed the page or CSV layout; inspect the source and update the configuration"
            }
            ErrorCategory::Storage => {
                "Check permissions on the output directory, or remove the corrupt state file to rebuild it"
            }
            ErrorCategory::Configuration => "Fix the configuration value named in the error",
            ErrorCategory::Processing => "Re-run with --verbose and inspect the offending rows",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FeedError::CsvLocationNotFound { .. } => {
                "Could not find the exposure CSV link on the source page".to_string()
            }
            FeedError::SchemaChanged { .. } => {
                format!("The exposure CSV columns changed, feed left untouched ({})", self)
            }
            FeedError::HttpError(_) | FeedError::HttpStatusError { .. } => {
                format!("Could not download exposure data: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
