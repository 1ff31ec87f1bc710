//! SSH session to the switch
//!
//! This module owns the russh connection, the interactive CLI shell and the
//! prompt-driven reading of command output.

pub mod command;
pub mod config;
pub mod connection;
pub mod handler;
pub mod shell;
pub mod stream;

// Re-exports
pub use config::SwitchConfig;
pub use connection::SwitchConnection;
pub use handler::SshHandler;
pub use stream::{ShellChannel, ShellEvent};
