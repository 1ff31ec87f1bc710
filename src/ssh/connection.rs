//! SSH connection to an SG300 switch
//!
//! Establishes the SSH session, opens the interactive shell the switch CLI
//! lives in, walks through the optional in-shell login and prepares the
//! terminal so command output can be read without paging.

use std::borrow::Cow;
use std::sync::Arc;

use russh::client::{self, Handle};
use russh::{kex, Channel, Preferred};
use tokio::time::timeout;
use tracing::{debug, error, info};

use super::config::SwitchConfig;
use super::handler::SshHandler;
use super::shell::{DISABLE_PAGING_COMMAND, TERMINAL_WIDTH_COMMAND};
use super::stream;
use crate::error::{Result, Sg300Error};

/// Open SSH session and CLI shell on a switch
pub struct SwitchConnection {
    /// Connection parameters
    pub(crate) config: SwitchConfig,

    /// SSH session handle
    session: Handle<SshHandler>,

    /// PTY shell channel running the switch CLI
    pub(crate) channel: Channel<client::Msg>,

    /// Hostname part of the CLI prompt
    pub(crate) base_prompt: String,
}

impl SwitchConnection {
    /// Connect, authenticate and prepare the CLI shell
    ///
    /// The whole sequence runs under the configured connect timeout.
    pub async fn connect(config: &SwitchConfig) -> Result<Self> {
        info!("Connecting to {}...", config.addr);

        match timeout(config.connect_timeout, Self::establish(config)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Connection to {} timed out after {}s",
                    config.addr.ip(),
                    config.connect_timeout.as_secs()
                );
                Err(Sg300Error::connection(format!(
                    "Connection to {} timed out after {}s",
                    config.addr.ip(),
                    config.connect_timeout.as_secs()
                )))
            }
        }
    }

    async fn establish(config: &SwitchConfig) -> Result<Self> {
        let ssh_config = Arc::new(client_config());

        let mut session = client::connect(ssh_config, config.addr, SshHandler::new())
            .await
            .map_err(|e| {
                error!("SSH connection failed: {}", e);
                Sg300Error::connection(format!("{}: {}", config.addr, e))
            })?;

        authenticate(&mut session, config).await?;

        let channel = open_shell(&session).await?;

        let mut connection = Self {
            config: config.clone(),
            session,
            channel,
            base_prompt: String::new(),
        };

        let login_result = stream::login(
            &mut connection.channel,
            &connection.config.username,
            &connection.config.password,
        )
        .await;
        match login_result {
            Ok(base) => connection.base_prompt = base,
            Err(e) => {
                connection.close().await;
                return Err(e);
            }
        }

        debug!("Base prompt: {}", connection.base_prompt);

        if let Err(e) = connection.prepare_session().await {
            connection.close().await;
            return Err(e);
        }

        info!(
            "Connected to {} as {}",
            connection.base_prompt, connection.config.username
        );

        Ok(connection)
    }

    /// Widen the terminal and turn off paging
    async fn prepare_session(&mut self) -> Result<()> {
        self.send_command(TERMINAL_WIDTH_COMMAND).await?;
        self.send_command(DISABLE_PAGING_COMMAND).await?;
        Ok(())
    }

    /// Leave the CLI and close the SSH connection
    pub async fn close(&mut self) {
        let _ = stream::write_line(&mut self.channel, "exit").await;
        let _ = self.channel.eof().await;
        let _ = self
            .session
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await;

        info!("SSH connection closed");
    }
}

/// russh client configuration
///
/// Adds the SHA-1 Diffie-Hellman groups that SG300 firmware offers to the
/// default key exchange list.
fn client_config() -> client::Config {
    let mut preferred = Preferred::default();

    let mut kex_algorithms = preferred.kex.to_vec();
    for legacy in [kex::DH_G14_SHA1, kex::DH_G1_SHA1] {
        if !kex_algorithms.contains(&legacy) {
            kex_algorithms.push(legacy);
        }
    }
    preferred.kex = Cow::Owned(kex_algorithms);

    client::Config {
        preferred,
        ..Default::default()
    }
}

/// Authenticate with the SSH server using the password
async fn authenticate(session: &mut Handle<SshHandler>, config: &SwitchConfig) -> Result<()> {
    debug!(
        "Attempting password authentication for user '{}'",
        config.username
    );

    let auth_result = session
        .authenticate_password(config.username.as_str(), config.password.as_str())
        .await
        .map_err(|e| Sg300Error::connection(format!("Authentication exchange failed: {}", e)))?;

    if auth_result.success() {
        info!("Password authentication successful");
        Ok(())
    } else {
        Err(Sg300Error::auth(format!(
            "Password rejected for {}@{}",
            config.username,
            config.addr.ip()
        )))
    }
}

/// Open a session channel with a PTY and an interactive shell
async fn open_shell(session: &Handle<SshHandler>) -> Result<Channel<client::Msg>> {
    let channel = session
        .channel_open_session()
        .await
        .map_err(|e| Sg300Error::connection(format!("Failed to open channel: {}", e)))?;

    channel
        .request_pty(
            true, // want_reply
            "vt100",
            511, // cols
            24,  // rows
            0,   // pixel width
            0,   // pixel height
            &[], // terminal modes
        )
        .await
        .map_err(|e| Sg300Error::connection(format!("Failed to request PTY: {}", e)))?;

    channel
        .request_shell(true)
        .await
        .map_err(|e| Sg300Error::connection(format!("Failed to request shell: {}", e)))?;

    debug!("Shell channel open");
    Ok(channel)
}

impl std::fmt::Debug for SwitchConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchConnection")
            .field("addr", &self.config.addr)
            .field("username", &self.config.username)
            .field("base_prompt", &self.base_prompt)
            .finish()
    }
}
