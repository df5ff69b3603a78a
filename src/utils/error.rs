use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("JWT signing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Uploaded file is empty")]
    EmptyUpload,

    #[error("Token exchange failed with status {status}: {body}")]
    TokenExchangeError { status: u16, body: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, TimetableError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Storage,
    Authentication,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TimetableError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) => ErrorCategory::Network,
            Self::CsvError(_)
            | Self::SerializationError(_)
            | Self::EmptyUpload
            | Self::ProcessingError { .. } => ErrorCategory::Data,
            Self::IoError(_) | Self::DatabaseError(_) => ErrorCategory::Storage,
            Self::JwtError(_) | Self::TokenExchangeError { .. } => ErrorCategory::Authentication,
            Self::TomlError(_)
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::EmptyUpload => ErrorSeverity::Low,
            Self::ApiError(_) | Self::TokenExchangeError { .. } => ErrorSeverity::Medium,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorSeverity::High
            }
            Self::DatabaseError(_) | Self::IoError(_) => ErrorSeverity::Critical,
            Self::JwtError(_)
            | Self::TomlError(_)
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and environment variables"
            }
            ErrorCategory::Network => {
                "Check network connectivity and the remote endpoint, then retry"
            }
            ErrorCategory::Data => "Check the uploaded file's delimiter, header row and encoding",
            ErrorCategory::Storage => "Check that the database/file path exists and is writable",
            ErrorCategory::Authentication => {
                "Check the service account key file and its permissions"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyUpload => "The uploaded file contains no rows".to_string(),
            Self::DatabaseError(_) => "Database connection failed".to_string(),
            Self::TokenExchangeError { status, .. } => {
                format!("Could not obtain an access token (HTTP {})", status)
            }
            Self::MissingConfigError { field } => format!("Missing setting: {}", field),
            other => other.to_string(),
        }
    }

    /// 對外顯示的錯誤訊息；正式環境下資料庫錯誤不暴露細節
    pub fn public_message(&self, production: bool) -> String {
        match self {
            Self::DatabaseError(_) if production => self.user_friendly_message(),
            Self::DatabaseError(e) => format!("Database connection failed: {}", e),
            other => other.user_friendly_message(),
        }
    }
}
