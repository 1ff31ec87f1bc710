//! sg300-batch - run a batch of CLI commands on a Cisco SG300 switch over SSH
//!
//! Opens one SSH session to the switch, runs the given commands in order,
//! prints each command's output as it arrives and writes the whole session
//! to a timestamped transcript under `logs/`.
//!
//! # Features
//!
//! - Commands inline (`--commands`) or from a file (`--file`)
//! - Hidden password prompt with up to three attempts
//! - Handles the SG300 in-shell `User Name:` login and disables paging
//! - One transcript file per run, unique even for runs in the same second
//!
//! # Example Usage (CLI)
//!
//! ```bash
//! sg300-batch --host 192.168.1.102 --username cisco \
//!   --commands "show version,show vlan,show running-config"
//!
//! sg300-batch --host 192.168.1.102 --username cisco --file commands.txt
//! ```

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod runner;
pub mod session_log;
pub mod ssh;
pub mod terminal;

// Re-exports for convenience
pub use app::{run, run_session, RunReport};
pub use commands::CommandSource;
pub use config::{validate_ip, Args, Config};
pub use error::{Result, Sg300Error};
pub use prompt::{with_password_retries, PasswordPrompt, TerminalPrompt, MAX_PASSWORD_ATTEMPTS};
pub use runner::{run_commands, CommandSession};
pub use session_log::SessionLog;
pub use ssh::{SshHandler, SwitchConfig, SwitchConnection};
pub use terminal::TerminalState;
