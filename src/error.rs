use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Invalid tenor: {0}")]
    InvalidTenor(String),

    #[error("Irregular spacing: {0}")]
    IrregularSpacing(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyticsError {
    /// True when the error was caused by the caller's input rather than by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidSeries(_)
                | AnalyticsError::InvalidData(_)
                | AnalyticsError::InvalidWindow(_)
                | AnalyticsError::InvalidTenor(_)
                | AnalyticsError::IrregularSpacing(_)
                | AnalyticsError::InsufficientData(_)
                | AnalyticsError::InvalidRequest(_)
        )
    }
}
