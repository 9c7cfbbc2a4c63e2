use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to fetch server status: {0}")]
    UpstreamFetch(#[from] reqwest::Error),

    #[error("Failed to parse server status: {0}")]
    UpstreamParse(#[from] serde_json::Error),

    // Specific HTTP status code errors from the status source
    #[error("Server status request failed ({status}): {message} (URL: {url})")]
    UpstreamStatus {
        status: u16,
        message: String,
        url: String,
    },

    // Data shape errors
    #[error("Malformed server data: {message}")]
    MalformedServerData { message: String },

    #[error("Invalid server name filter '{filter}': {source}")]
    InvalidServerFilter {
        filter: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to render scoreboard: {0}")]
    Render(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Log setup error: {0}")]
    LogSetup(String),
}

impl AppError {
    /// Create a configuration error with context
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a log setup error with context
    pub fn log_setup_error(msg: impl Into<String>) -> Self {
        Self::LogSetup(msg.into())
    }

    /// Create an error for a non-success response from the status source
    pub fn upstream_status(status: u16, message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::UpstreamStatus {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a malformed server data error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedServerData {
            message: message.into(),
        }
    }

    /// Create an invalid server filter error
    pub fn invalid_filter(filter: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidServerFilter {
            filter: filter.into(),
            source,
        }
    }

    /// Create a render error. Rendering is total over well-formed rosters,
    /// so this always indicates a defect.
    pub fn render_error(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Create an error for a cached computation whose task died
    pub fn task_failed(msg: impl Into<String>) -> Self {
        Self::TaskFailed(msg.into())
    }

    /// Check if error came from talking to the status source
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamFetch(_) | AppError::UpstreamParse(_) | AppError::UpstreamStatus { .. }
        )
    }

    /// Check if error indicates the server data did not have the expected shape
    pub fn is_malformed(&self) -> bool {
        matches!(self, AppError::MalformedServerData { .. })
    }
}
