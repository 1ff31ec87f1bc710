//! Sequential command executor

use std::io::Write;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::error::Result;
use crate::session_log::SessionLog;

/// A device session that can run CLI commands one at a time
#[async_trait]
pub trait CommandSession: Send {
    /// Run a command and return its output
    async fn send_command(&mut self, command: &str) -> Result<String>;

    /// End the session
    async fn close(&mut self);
}

/// Run every command in order, echoing output to `console` and `log`
///
/// Stops at the first failing command and returns its error; everything
/// before it has already been printed and logged.
pub async fn run_commands<S, W>(
    session: &mut S,
    commands: &[String],
    console: &mut W,
    log: &mut SessionLog,
) -> Result<usize>
where
    S: CommandSession + ?Sized,
    W: Write,
{
    for (index, command) in commands.iter().enumerate() {
        writeln!(console, "\n[Running] {}", command)?;
        console.flush()?;

        let output = session.send_command(command).await.map_err(|e| {
            error!("Command '{}' failed: {}", command, e);
            e
        })?;

        writeln!(console, "{}", output)?;
        log.record(command, &output).await?;

        debug!("Finished command {}/{}", index + 1, commands.len());
    }

    Ok(commands.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Sg300Error;

    /// Answers `show <x>` with `<x> output` and fails on `fail`
    #[derive(Default)]
    struct EchoSession {
        sent: Vec<String>,
    }

    #[async_trait]
    impl CommandSession for EchoSession {
        async fn send_command(&mut self, command: &str) -> Result<String> {
            self.sent.push(command.to_string());
            if command == "fail" {
                return Err(Sg300Error::Timeout(100));
            }
            Ok(format!("{} output", command.trim_start_matches("show ")))
        }

        async fn close(&mut self) {}
    }

    fn commands(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_runs_in_order_and_echoes() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::create(dir.path(), "10.0.0.1").await.unwrap();
        let mut session = EchoSession::default();
        let mut console = Vec::new();

        let count = run_commands(
            &mut session,
            &commands(&["show version", "show vlan"]),
            &mut console,
            &mut log,
        )
        .await
        .unwrap();

        assert_eq!(count, 2);
        assert_eq!(session.sent, vec!["show version", "show vlan"]);
        assert_eq!(
            String::from_utf8(console).unwrap(),
            "\n[Running] show version\nversion output\n\n[Running] show vlan\nvlan output\n"
        );
        assert_eq!(
            std::fs::read_to_string(log.path()).unwrap(),
            "\n--- show version ---\nversion output\n\n--- show vlan ---\nvlan output\n"
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = SessionLog::create(dir.path(), "10.0.0.1").await.unwrap();
        let mut session = EchoSession::default();
        let mut console = Vec::new();

        let result = run_commands(
            &mut session,
            &commands(&["show clock", "fail", "show vlan"]),
            &mut console,
            &mut log,
        )
        .await;

        assert!(matches!(result, Err(Sg300Error::Timeout(100))));
        assert_eq!(session.sent, vec!["show clock", "fail"]);
        assert_eq!(
            std::fs::read_to_string(log.path()).unwrap(),
            "\n--- show clock ---\nclock output\n"
        );
    }
}
