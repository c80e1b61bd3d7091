use thiserror::Error;

/// Operator-facing failures. None of them are fatal; each is surfaced once
/// and can be dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashError {
    /// Input rejected before any gateway call.
    #[error("{0}")]
    Validation(String),
    /// Non-2xx response carrying a structured error body.
    #[error("{error}{}", .details.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Remote {
        status: u16,
        error: String,
        details: Option<String>,
    },
    /// No usable response from the crawler service.
    #[error("network error: {0}")]
    Network(String),
}

impl DashError {
    pub fn validation(message: impl Into<String>) -> Self {
        DashError::Validation(message.into())
    }

    pub fn remote(status: u16, error: impl Into<String>, details: Option<String>) -> Self {
        DashError::Remote {
            status,
            error: error.into(),
            details,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        DashError::Network(message.into())
    }
}
