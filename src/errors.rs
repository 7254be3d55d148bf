use reqwest::StatusCode;
use std::fmt;

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// The request never produced a response (DNS, connect, reset).
    Transport(String),
    /// The request exceeded its timeout.
    Timeout(String),
    /// The remote API answered with a non-success status.
    Status {
        /// HTTP status returned by the remote API.
        status: StatusCode,
        /// Response body, best effort.
        body: String,
    },
    /// The response body parsed, but not into the expected shape.
    UnexpectedShape(String),
    /// The response body could not be decoded as JSON.
    Decode(String),
    /// Filesystem error while reading or writing tabular files.
    Io(std::io::Error),
    /// CSV parse or write error.
    Csv(csv::Error),
    /// Invalid or missing configuration.
    Config(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Whether the failure came from the remote API rather than local I/O.
    pub fn is_remote(&self) -> bool {
        match self {
            AppError::Transport(_)
            | AppError::Timeout(_)
            | AppError::Status { .. }
            | AppError::UnexpectedShape(_)
            | AppError::Decode(_) => true,
            AppError::WithContext { source, .. } => source.is_remote(),
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Transport(msg) => write!(f, "Request failed: {}", msg),
            AppError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            AppError::Status { status, body } => {
                write!(f, "Remote API returned {}: {}", status, body)
            }
            AppError::UnexpectedShape(msg) => write!(f, "Unexpected response shape: {}", msg),
            AppError::Decode(msg) => write!(f, "Failed to decode response: {}", msg),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
            AppError::Csv(e) => write!(f, "CSV error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Io(e) => Some(e),
            AppError::Csv(e) => Some(e),
            AppError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    ///
    /// Timeouts and body decoding failures get their own variants so callers
    /// can log them distinctly.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            AppError::Status {
                status,
                body: err.to_string(),
            }
        } else {
            AppError::Transport(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err)
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err)
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e.into()),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_source() {
        let result: Result<(), AppError> = Err(AppError::Transport("connection reset".into()));
        let err = result.context("Resolving relation").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Resolving relation: Request failed: connection reset"
        );
        assert!(err.is_remote());
    }

    #[test]
    fn test_io_errors_are_not_remote() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let result: Result<(), std::io::Error> = Err(io);
        let err = result.with_context(|| "Opening data/companies.csv".to_string());

        let err = err.unwrap_err();
        assert!(!err.is_remote());
        assert!(err.to_string().starts_with("Opening data/companies.csv: I/O error"));
    }

    #[test]
    fn test_status_display() {
        let err = AppError::Status {
            status: StatusCode::NOT_FOUND,
            body: "no such entity".into(),
        };
        assert_eq!(
            err.to_string(),
            "Remote API returned 404 Not Found: no such entity"
        );
    }

    #[test]
    fn test_config_errors_are_not_remote() {
        let err = AppError::Config("FUSIONBASE_API_KEY is not set".into());
        assert!(!err.is_remote());
        assert_eq!(
            err.to_string(),
            "Configuration error: FUSIONBASE_API_KEY is not set"
        );
    }
}
