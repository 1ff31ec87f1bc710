//! SSH configuration types
//!
//! Connection parameters for a single switch session.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::config::{Config, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_MS};

/// Switch connection configuration
#[derive(Clone)]
pub struct SwitchConfig {
    /// Switch address and SSH port
    pub addr: SocketAddr,

    /// Username for SSH and in-shell login
    pub username: String,

    /// Password for SSH and in-shell login
    pub password: Zeroizing<String>,

    /// Limit for TCP connect, handshake and login
    pub connect_timeout: Duration,

    /// Limit for a single command's output
    pub command_timeout: Duration,
}

impl SwitchConfig {
    /// Create a new configuration with default timeouts
    pub fn new(
        addr: SocketAddr,
        username: impl Into<String>,
        password: Zeroizing<String>,
    ) -> Self {
        Self {
            addr,
            username: username.into(),
            password,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            command_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Build from the run configuration and a password
    pub fn from_config(config: &Config, password: Zeroizing<String>) -> Self {
        Self::new(config.socket_addr(), &config.username, password)
            .with_connect_timeout(config.connect_timeout)
            .with_command_timeout(config.command_timeout)
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

impl fmt::Debug for SwitchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchConfig")
            .field("addr", &self.addr)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}
