//! Shared error type across pbxgauge crates.

use thiserror::Error;

/// Stable error kinds, used in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Backing store unreachable.
    Connection,
    /// Query execution failed.
    Query,
    /// Result row did not have the expected shape.
    Scan,
    /// Connect or query exceeded its deadline.
    Timeout,
    /// Metric name registered twice.
    RegistrationConflict,
    /// Write to a metric that was never registered.
    UnknownMetric,
    /// Non-finite gauge value.
    InvalidValue,
    /// Bad configuration.
    Config,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connection => "CONNECTION",
            ErrorKind::Query => "QUERY",
            ErrorKind::Scan => "SCAN",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::RegistrationConflict => "REGISTRATION_CONFLICT",
            ErrorKind::UnknownMetric => "UNKNOWN_METRIC",
            ErrorKind::InvalidValue => "INVALID_VALUE",
            ErrorKind::Config => "CONFIG",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("query failed ({family}): {msg}")]
    Query { family: &'static str, msg: String },
    #[error("scan failed ({family}): {msg}")]
    Scan { family: &'static str, msg: String },
    #[error("{what} timed out after {after_ms}ms")]
    Timeout { what: &'static str, after_ms: u64 },
    #[error("registration conflict: {0}")]
    RegistrationConflict(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("invalid value for {metric}{{domain=\"{label}\"}}: {value}")]
    InvalidValue {
        metric: &'static str,
        label: String,
        value: f64,
    },
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map to a stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExporterError::Connection(_) => ErrorKind::Connection,
            ExporterError::Query { .. } => ErrorKind::Query,
            ExporterError::Scan { .. } => ErrorKind::Scan,
            ExporterError::Timeout { .. } => ErrorKind::Timeout,
            ExporterError::RegistrationConflict(_) => ErrorKind::RegistrationConflict,
            ExporterError::UnknownMetric(_) => ErrorKind::UnknownMetric,
            ExporterError::InvalidValue { .. } => ErrorKind::InvalidValue,
            ExporterError::Config(_) => ErrorKind::Config,
            ExporterError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Caller bugs. These end the process regardless of the refresh failure policy.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownMetric | ErrorKind::RegistrationConflict | ErrorKind::Internal
        )
    }
}
