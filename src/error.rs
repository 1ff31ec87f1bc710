//! Error types for sg300-batch

use thiserror::Error;

/// Main error type for a batch run
#[derive(Debug, Error)]
pub enum Sg300Error {
    /// Host is not an IPv4/IPv6 literal
    #[error("{0} is not a valid IP address")]
    InvalidHost(String),

    /// Command list could not be loaded
    #[error("{0}")]
    Commands(String),

    /// Credentials rejected (SSH or in-shell login)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Every password attempt was rejected
    #[error("Maximum password attempts ({0}) reached")]
    AttemptsExhausted(u32),

    /// SSH connection failed or dropped
    #[error("SSH connection error: {0}")]
    Connection(String),

    /// Command output did not complete in time
    #[error("Command timeout after {0}ms")]
    Timeout(u64),

    /// Run stopped by SIGINT/SIGTERM
    #[error("Interrupted")]
    Interrupted,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using Sg300Error
pub type Result<T> = std::result::Result<T, Sg300Error>;

impl Sg300Error {
    /// Create a connection error from a string
    pub fn connection(msg: impl Into<String>) -> Self {
        Sg300Error::Connection(msg.into())
    }

    /// Create an authentication error from a string
    pub fn auth(msg: impl Into<String>) -> Self {
        Sg300Error::Authentication(msg.into())
    }

    /// Create a command loading error from a string
    pub fn commands(msg: impl Into<String>) -> Self {
        Sg300Error::Commands(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Sg300Error::Config(msg.into())
    }

    /// Whether another password attempt could fix this error
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Sg300Error::Authentication(_))
    }
}
