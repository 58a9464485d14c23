use thiserror::Error;

/// Failure of a single request against one Overpass endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("server reported {0}")]
    Runtime(String),
    #[error("HTTP client error: {0}")]
    Client(String),
}

impl TransportError {
    /// Whether the endpoint failed to answer in time.
    ///
    /// Overpass signals its own query timeouts and overload with 504 and 429,
    /// so those count the same as a client-side timeout or a refused
    /// connection.
    pub fn is_timeout_class(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout | TransportError::Unreachable(_) | TransportError::Status(429 | 504)
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Unreachable(err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Client(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("query timed out on primary ({primary}) and mirror ({mirror})")]
    QueryTimeout { primary: String, mirror: String },

    #[error("location not found: {0}")]
    LocationNotFound(String),

    #[error("Overpass request to {endpoint} failed: {source}")]
    Upstream {
        endpoint: String,
        #[source]
        source: TransportError,
    },

    #[error("Nominatim request failed: {0}")]
    Geocoder(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
