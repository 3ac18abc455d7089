//! Application error type.
//!
//! Every failure in the pipeline is terminal for the run, so a single error
//! type carrying a process exit code and a human-readable message is enough.
//! `ErrorKind` lets callers (and tests) tell the failure classes apart without
//! matching on message text.

/// Failure classes surfaced by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `--since` was malformed or in the future.
    InvalidDate,
    /// An environment override could not be parsed.
    Config,
    /// A page request failed (status, transport or decode).
    Fetch,
    /// Flattened record count disagrees with the server-declared total.
    Completeness,
    /// Filesystem or Parquet failure while persisting/loading partitions.
    Io,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InvalidDate | ErrorKind::Config => 2,
            ErrorKind::Fetch => 3,
            ErrorKind::Completeness => 4,
            ErrorKind::Io => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidDate, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, message)
    }

    /// A page request answered with a non-success status.
    pub fn http_status(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::fetch(format!(
                "Unable to process request, please try again later. Error code: {status}."
            ))
        }
    }

    pub fn completeness(expected: usize, actual: usize) -> Self {
        Self::new(
            ErrorKind::Completeness,
            format!("There is missing data, expected {expected} rows of data but processed {actual}."),
        )
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status code, for fetch errors caused by a non-success response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .field("status", &self.status)
            .finish()
    }
}

impl std::error::Error for AppError {}
