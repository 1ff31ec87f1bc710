//! End-to-end batch run against one switch

use std::future::Future;
use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, Sg300Error};
use crate::prompt::{with_password_retries, PasswordPrompt, MAX_PASSWORD_ATTEMPTS};
use crate::runner::{run_commands, CommandSession};
use crate::session_log::SessionLog;
use crate::ssh::{SwitchConfig, SwitchConnection};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Transcript file
    pub log_path: PathBuf,

    /// Number of commands executed
    pub commands_run: usize,
}

/// Connect to the switch, run every command and write the transcript
///
/// When `shutdown` completes the run stops with [`Sg300Error::Interrupted`].
/// An open session is still closed first.
pub async fn run<P, W, F>(
    config: &Config,
    prompt: &mut P,
    console: &mut W,
    shutdown: F,
) -> Result<RunReport>
where
    P: PasswordPrompt + ?Sized,
    W: Write,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let connecting = with_password_retries(prompt, MAX_PASSWORD_ATTEMPTS, |password| {
        let switch = SwitchConfig::from_config(config, password);
        async move { SwitchConnection::connect(&switch).await }
    });

    let mut connection = tokio::select! {
        _ = &mut shutdown => {
            warn!("Interrupted before the session was established");
            return Err(Sg300Error::Interrupted);
        }
        result = connecting => result?,
    };

    run_session(&mut connection, config, console, shutdown).await
}

/// Run the configured commands on an open session and close it afterwards
///
/// The session is closed whether the commands succeed, fail or are cut
/// short by `shutdown`.
pub async fn run_session<S, W, F>(
    session: &mut S,
    config: &Config,
    console: &mut W,
    shutdown: F,
) -> Result<RunReport>
where
    S: CommandSession + ?Sized,
    W: Write,
    F: Future<Output = ()>,
{
    let result = tokio::select! {
        biased;
        _ = shutdown => {
            warn!("Interrupted, closing session");
            Err(Sg300Error::Interrupted)
        }
        result = execute(session, config, console) => result,
    };

    session.close().await;
    result
}

async fn execute<S, W>(session: &mut S, config: &Config, console: &mut W) -> Result<RunReport>
where
    S: CommandSession + ?Sized,
    W: Write,
{
    let host = config.host.to_string();
    let mut log = SessionLog::create(&config.log_dir, &host).await?;

    let commands_run = run_commands(session, &config.commands, console, &mut log).await?;

    writeln!(console, "\nOutput saved to: {}", log.path().display())?;
    info!("Ran {} commands on {}", commands_run, host);

    Ok(RunReport {
        log_path: log.path().to_path_buf(),
        commands_run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use zeroize::Zeroizing;

    /// Never returns, like a user who walks away from the password prompt
    struct AbandonedPrompt;

    #[async_trait]
    impl PasswordPrompt for AbandonedPrompt {
        async fn prompt(&mut self, _: u32, _: u32) -> std::io::Result<Zeroizing<String>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_signal_at_password_prompt_interrupts_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            host: "192.168.1.102".parse().unwrap(),
            port: 22,
            username: "cisco".to_string(),
            commands: vec!["show version".to_string()],
            command_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            log_dir: dir.path().join("logs"),
        };
        let mut console = Vec::new();

        let signal = tokio::time::sleep(Duration::from_millis(50));
        let err = run(&config, &mut AbandonedPrompt, &mut console, signal)
            .await
            .unwrap_err();

        assert!(matches!(err, Sg300Error::Interrupted));
        assert!(console.is_empty());
        assert!(!config.log_dir.exists());
    }
}
