//! Error types for the Wavefleet client library.

use thiserror::Error;

/// The main error type for all Wavefleet client operations.
#[derive(Error, Debug)]
pub enum WavefleetError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// No usable API token could be found
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Invalid arguments, rejected before any request is sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// The Wavefleet API answered with a non-success status
    #[error("Wavefleet API error: {0}")]
    Api(ApiError),

    /// The response body was not valid JSON or did not have the expected shape
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// A batch refresh worker stopped before producing a result
    #[error("Worker failed: {0}")]
    Worker(String),
}

impl WavefleetError {
    /// Shorthand for a [`WavefleetError::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the HTTP status if this error came from a non-success response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(api) => Some(api.status),
            _ => None,
        }
    }
}

/// An error response returned by the Wavefleet API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response
    pub status: u16,
    /// Message reported by the API, or the raw body when it carried none
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

impl ApiError {
    /// Create a new API error from a status code and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build an API error from a failed response body.
    ///
    /// The API reports failures as `{"message": "..."}`; anything else is
    /// kept verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: String,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self::new(status, parsed.message),
            Err(_) => Self::new(status, body.trim()),
        }
    }

    /// Check if the token was rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Check if the requested resource (typically a spotter id) does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}
