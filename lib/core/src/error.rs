use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Error::InvalidRequest(reason.into())
    }

    /// Stable code used in error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "VALIDATION_ERROR",
            Error::CollectionNotFound(_) => "HTTP_404",
            Error::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Storage(_) | Error::Io(_) | Error::Serialization(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller is at fault (4xx) rather than the server (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidRequest(_) | Error::CollectionNotFound(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidRequest(_) => 422,
            Error::CollectionNotFound(_) => 404,
            Error::StoreUnavailable(_) => 503,
            _ => 500,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
