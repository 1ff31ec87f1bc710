//! Configuration and CLI argument parsing for sg300-batch

use clap::{ArgGroup, Parser};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::commands::CommandSource;
use crate::error::{Result, Sg300Error};

/// Default timeout for a single command's output in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000; // 60 seconds

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default directory for transcript logs
pub const DEFAULT_LOG_DIR: &str = "logs";

/// sg300-batch CLI Arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "sg300-batch")]
#[command(version)]
#[command(about = "Run multiple commands on a Cisco SG300 switch over SSH")]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["commands", "file"]),
))]
pub struct Args {
    /// IP address of the switch
    #[arg(long, env = "SG300_HOST")]
    pub host: String,

    /// Username for SSH login
    #[arg(long, env = "SG300_USERNAME")]
    pub username: String,

    /// Comma-separated list of commands to run
    #[arg(long)]
    pub commands: Option<String>,

    /// Path to a text file with commands (one per line)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// SSH port
    #[arg(long, default_value = "22", env = "SG300_PORT")]
    pub port: u16,

    /// Per-command output timeout in milliseconds
    #[arg(long, default_value = "60000", env = "SG300_TIMEOUT")]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(long, default_value = "30", env = "SG300_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Directory for the session transcript
    #[arg(long, default_value = DEFAULT_LOG_DIR, env = "SG300_LOG_DIR")]
    pub log_dir: PathBuf,
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Switch address
    pub host: IpAddr,

    /// SSH port
    pub port: u16,

    /// SSH username
    pub username: String,

    /// Commands to run, in order
    pub commands: Vec<String>,

    /// Per-command output timeout
    pub command_timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Transcript directory
    pub log_dir: PathBuf,
}

impl Config {
    /// Create Config from CLI Args
    pub fn from_args(args: Args) -> Result<Self> {
        validate_args(&args)?;

        let host = validate_ip(&args.host)?;
        let commands = command_source(&args)?.load()?;

        Ok(Config {
            host,
            port: args.port,
            username: args.username,
            commands,
            command_timeout: Duration::from_millis(args.timeout),
            connect_timeout: Duration::from_secs(args.connect_timeout),
            log_dir: args.log_dir,
        })
    }

    /// Socket address of the switch
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Validate that a host string is a well-formed IPv4 or IPv6 address
///
/// # Examples
/// ```
/// use sg300_batch::config::validate_ip;
///
/// assert!(validate_ip("192.168.1.102").is_ok());
/// assert!(validate_ip("fe80::1").is_ok());
/// assert!(validate_ip("switch.local").is_err());
/// ```
pub fn validate_ip(host: &str) -> Result<IpAddr> {
    host.trim()
        .parse::<IpAddr>()
        .map_err(|_| Sg300Error::InvalidHost(host.to_string()))
}

fn command_source(args: &Args) -> Result<CommandSource> {
    match (&args.file, &args.commands) {
        (Some(path), _) => Ok(CommandSource::File(path.clone())),
        (None, Some(list)) => Ok(CommandSource::Inline(list.clone())),
        (None, None) => Err(Sg300Error::commands(
            "You must provide commands with --commands or a file with --file",
        )),
    }
}

/// Validate CLI arguments
fn validate_args(args: &Args) -> Result<()> {
    let mut errors = Vec::new();

    if args.username.trim().is_empty() {
        errors.push("Missing required --username".to_string());
    }

    if args.port == 0 {
        errors.push("--port must be greater than 0".to_string());
    }

    if args.timeout == 0 {
        errors.push("--timeout must be greater than 0".to_string());
    }

    if args.connect_timeout == 0 {
        errors.push("--connect-timeout must be greater than 0".to_string());
    }

    if !errors.is_empty() {
        return Err(Sg300Error::Config(errors.join("\n")));
    }

    Ok(())
}
