use thiserror::Error;

/// Boxed error reported by storage and gateway adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum PrintQError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Job not found: {0}")]
    NotFound(String),
    #[error("Store read failed for {job_id}: {source}")]
    StoreReadFailed {
        job_id: String,
        #[source]
        source: BoxError,
    },
    #[error("Store write failed for {job_id}: {source}")]
    StoreWriteFailed {
        job_id: String,
        #[source]
        source: BoxError,
    },
    #[error("File storage failed for {key}: {source}")]
    FileStorageFailed {
        key: String,
        #[source]
        source: BoxError,
    },
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Gateway returned no checkout URL for {job_id}")]
    MissingCheckoutUrl { job_id: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl PrintQError {
    pub fn store_read(job_id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::StoreReadFailed {
            job_id: job_id.into(),
            source: source.into(),
        }
    }

    pub fn store_write(job_id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::StoreWriteFailed {
            job_id: job_id.into(),
            source: source.into(),
        }
    }

    /// HTTP-equivalent status class for whatever layer fronts the engine.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrintQError>;
