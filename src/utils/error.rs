use thiserror::Error;

/// Failure reported by the remote service client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// The service refused the request because the resource already exists.
    /// Mastodon answers 422 when an account is already a list member.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ApiError::Status { status: 409 | 422, .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] ApiError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Source file {path} has no '{column}' column")]
    MissingColumn { path: String, column: String },

    #[error("Cannot resolve list '{list_name}': {source}")]
    ListResolution {
        list_name: String,
        #[source]
        source: ApiError,
    },

    #[error("{failed} of {processed} records failed, see {retry_path}")]
    RecordsFailed {
        failed: usize,
        processed: usize,
        retry_path: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl BatchError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BatchError::RecordsFailed { .. } => ErrorSeverity::Medium,
            BatchError::ConfigError { .. }
            | BatchError::MissingConfigError { .. }
            | BatchError::InvalidConfigValueError { .. }
            | BatchError::MissingColumn { .. }
            | BatchError::CsvError(_) => ErrorSeverity::High,
            BatchError::ApiError(_)
            | BatchError::ListResolution { .. }
            | BatchError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            BatchError::ConfigError { .. }
            | BatchError::MissingConfigError { .. }
            | BatchError::InvalidConfigValueError { .. } => {
                "Check ACCESS_TOKEN, API_BASE_URL and REQUEST_TIMEOUT in the environment or .env file"
            }
            BatchError::MissingColumn { .. } | BatchError::CsvError(_) => {
                "Use a CSV export with an 'Account address' header, or a previous retry file"
            }
            BatchError::ListResolution { source, .. } | BatchError::ApiError(source) => {
                match source.status() {
                    Some(401) | Some(403) => {
                        "The access token was rejected; it needs the read:lists, write:lists and write:follows scopes"
                    }
                    _ => "Check API_BASE_URL and network connectivity, then run again",
                }
            }
            BatchError::RecordsFailed { .. } => {
                "Fix what the error_reason column reports, then run again with the retry file as --file"
            }
            BatchError::IoError(_) => "Check that the source file exists and the retry file location is writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BatchError::MissingConfigError { field } => {
                format!("{} is not set", field)
            }
            BatchError::ListResolution { list_name, .. } => {
                format!("Could not find or create the list '{}'", list_name)
            }
            BatchError::RecordsFailed {
                failed,
                processed,
                retry_path,
            } => format!(
                "{} of {} accounts need another run, see {}",
                failed, processed, retry_path
            ),
            other => other.to_string(),
        }
    }

    /// Process exit code for a run ending with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;
