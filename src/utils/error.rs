use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid project identifier '{name}': {reason}")]
    InvalidProject { name: String, reason: String },

    #[error("Project '{name}' not found")]
    ProjectNotFound { name: String },

    #[error("Metrics data file not found")]
    MetricsNotFound { project: String, iteration: u64 },

    #[error("Invalid query parameter: {message}")]
    InvalidQuery { message: String },

    #[error("Data directory '{}' is unavailable: {}", path.display(), source)]
    DataRootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 呼叫端送來的參數有誤
    Client,
    NotFound,
    Configuration,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MetricsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MetricsError::InvalidProject { .. } | MetricsError::InvalidQuery { .. } => {
                ErrorCategory::Client
            }
            MetricsError::ProjectNotFound { .. } | MetricsError::MetricsNotFound { .. } => {
                ErrorCategory::NotFound
            }
            MetricsError::DataRootUnavailable { .. }
            | MetricsError::ConfigError { .. }
            | MetricsError::InvalidConfigValueError { .. }
            | MetricsError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            MetricsError::IoError(_) => ErrorCategory::Io,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Client | ErrorCategory::NotFound => ErrorSeverity::Low,
            // 單次讀取失敗，伺服器仍可繼續服務
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 請求層級的錯誤，回報給呼叫端即可，不需要升級成伺服器錯誤
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Client | ErrorCategory::NotFound
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            MetricsError::InvalidProject { .. } | MetricsError::ProjectNotFound { .. } => {
                "Request /projects to see the available project names".to_string()
            }
            MetricsError::MetricsNotFound { project, .. } => format!(
                "Request /iterations/{} to see the available iteration counts",
                project
            ),
            MetricsError::InvalidQuery { .. } => {
                "Pass 'iterations' as a non-negative integer".to_string()
            }
            MetricsError::DataRootUnavailable { path, .. } => format!(
                "Create '{}' or point DATA_DIR / --data-dir at an existing directory",
                path.display()
            ),
            MetricsError::IoError(_) => {
                "Check file permissions under the data directory".to_string()
            }
            MetricsError::ConfigError { .. }
            | MetricsError::InvalidConfigValueError { .. }
            | MetricsError::ConfigValidationError { .. } => {
                "Check the environment variables, .env file and --config file".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Server configuration problem: {}", self),
            ErrorCategory::Io => format!("Could not read metrics data: {}", self),
            ErrorCategory::Client | ErrorCategory::NotFound => self.to_string(),
        }
    }

    /// 依嚴重程度決定程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, MetricsError>;
