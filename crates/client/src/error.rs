use bonsai_types::JobStatus;
use thiserror::Error;

/// Error type for Bonsai client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed or URL conversion failed.
    #[error("Request error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// Server returned an error response with status code >= 400.
    #[error(
        "Requested {} failed with status {} and msg {}",
        inner.url().map_or("unknown url", |url| url.as_str()),
        inner.status().map_or(0, |status| status.as_u16()),
        msg.as_deref().unwrap_or("Unknown")
    )]
    ErrorStatus {
        /// The underlying HTTP error containing status code and URL.
        inner: reqwest::Error,
        /// Error message from the server response body, if available.
        msg: Option<String>,
    },
    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// A required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),
    /// The service omitted a field its response is required to carry.
    #[error("{field} not included in {response} response")]
    MissingField {
        /// Which response was malformed.
        response: &'static str,
        /// The absent field.
        field: &'static str,
    },
    /// The job reached a terminal status other than `SUCCEEDED`.
    #[error("workflow exited: {status} - err: {message}")]
    JobFailed {
        /// Terminal status reported by the service.
        status: JobStatus,
        /// Error message reported by the service, verbatim.
        message: String,
    },
    /// The job was still running after the configured number of polls.
    #[error("Job still running after {attempts} status polls")]
    PollLimitExceeded {
        /// Number of status requests issued.
        attempts: u32,
    },
    /// Polling was cancelled before the job finished.
    #[error("Polling cancelled")]
    Cancelled,
}
