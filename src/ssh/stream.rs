//! Prompt-driven reading of the switch shell
//!
//! The login and command loops only need to read chunks and write bytes, so
//! they work on any [`ShellChannel`]. The russh channel is the real one.
//! Output is collected as raw bytes and decoded as a whole so multi-byte
//! characters split across SSH messages survive.

use std::time::Duration;

use async_trait::async_trait;
use russh::client;
use russh::{Channel, ChannelMsg};
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::shell::{next_login_action, next_read_action, strip_ansi, LoginAction, ReadAction};
use crate::error::{Result, Sg300Error};

/// How long to wait on the channel before checking deadlines again
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Idle polls during login before nudging the switch with a newline
const LOGIN_NUDGE_POLLS: u32 = 4;

/// One event from the shell channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// Terminal output (stdout or stderr)
    Data(Vec<u8>),
    /// Channel closed or hit EOF
    Closed,
    /// Anything else (window adjust, exit status, ...)
    Other,
}

/// Byte stream to and from the switch CLI
#[async_trait]
pub trait ShellChannel: Send {
    /// Wait for the next event
    async fn recv(&mut self) -> ShellEvent;

    /// Write raw bytes to the shell
    async fn send(&mut self, data: &[u8]) -> Result<()>;
}

#[async_trait]
impl ShellChannel for Channel<client::Msg> {
    async fn recv(&mut self) -> ShellEvent {
        match self.wait().await {
            Some(ChannelMsg::Data { data }) | Some(ChannelMsg::ExtendedData { data, .. }) => {
                ShellEvent::Data(data.to_vec())
            }
            Some(ChannelMsg::Close) | Some(ChannelMsg::Eof) | None => ShellEvent::Closed,
            Some(_) => ShellEvent::Other,
        }
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.data(data)
            .await
            .map_err(|e| Sg300Error::connection(format!("Failed to write to shell: {}", e)))
    }
}

/// Write a line of input to the shell
pub async fn write_line<C>(channel: &mut C, line: &str) -> Result<()>
where
    C: ShellChannel + ?Sized,
{
    channel.send(format!("{}\n", line).as_bytes()).await
}

/// Wait for the CLI prompt, answering the in-shell login if one appears
///
/// SG300 firmware may ask for `User Name:` and `Password:` again inside the
/// shell even after SSH authentication succeeded. Returns the base prompt.
/// There is no deadline here; the caller bounds the whole connect.
pub async fn login<C>(channel: &mut C, username: &str, password: &str) -> Result<String>
where
    C: ShellChannel + ?Sized,
{
    let mut buffer = Vec::new();
    let mut password_sent = false;
    let mut idle_polls = 0;

    loop {
        match timeout(POLL_INTERVAL, channel.recv()).await {
            Ok(ShellEvent::Data(data)) => {
                idle_polls = 0;
                buffer.extend_from_slice(&data);
                let text = strip_ansi(&String::from_utf8_lossy(&buffer));

                match next_login_action(&text, password_sent) {
                    LoginAction::Ready(base) => return Ok(base),
                    LoginAction::SendUsername => {
                        debug!("In-shell username prompt, sending username");
                        write_line(channel, username).await?;
                        buffer.clear();
                    }
                    LoginAction::SendPassword => {
                        debug!("In-shell password prompt, sending password");
                        let line = Zeroizing::new(format!("{}\n", password));
                        channel.send(line.as_bytes()).await?;
                        password_sent = true;
                        buffer.clear();
                    }
                    LoginAction::Rejected => {
                        return Err(Sg300Error::auth(format!(
                            "Switch rejected in-shell login for {}",
                            username
                        )));
                    }
                    LoginAction::Wait => {}
                }
            }
            Ok(ShellEvent::Closed) => {
                return Err(Sg300Error::connection("Channel closed during login"));
            }
            Ok(ShellEvent::Other) => {}
            Err(_) => {
                idle_polls += 1;
                if idle_polls == LOGIN_NUDGE_POLLS {
                    debug!("No prompt yet, sending newline");
                    channel.send(b"\n").await?;
                }
            }
        }
    }
}

/// Collect shell output until the prompt for `base` reappears
///
/// Pager prompts are answered with a single space in case paging could not
/// be disabled.
pub async fn read_until_prompt<C>(
    channel: &mut C,
    base: &str,
    timeout_duration: Duration,
) -> Result<String>
where
    C: ShellChannel + ?Sized,
{
    let deadline = Instant::now() + timeout_duration;
    let mut buffer = Vec::new();
    let mut pages_answered = 0;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(
                "No prompt after {}ms, giving up on command",
                timeout_duration.as_millis()
            );
            return Err(Sg300Error::Timeout(timeout_duration.as_millis() as u64));
        }

        match timeout(POLL_INTERVAL.min(remaining), channel.recv()).await {
            Ok(ShellEvent::Data(data)) => {
                buffer.extend_from_slice(&data);
                let raw = String::from_utf8_lossy(&buffer);

                match next_read_action(&strip_ansi(&raw), base, pages_answered) {
                    ReadAction::Done => return Ok(raw.into_owned()),
                    ReadAction::NextPage(pages) => {
                        debug!("Pager prompt, requesting next page");
                        channel.send(b" ").await?;
                        pages_answered = pages;
                    }
                    ReadAction::Wait => {}
                }
            }
            Ok(ShellEvent::Closed) => {
                return Err(Sg300Error::connection(
                    "Channel closed during command execution",
                ));
            }
            Ok(ShellEvent::Other) | Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Plays back scripted events, then stays silent; records what was sent
    #[derive(Default)]
    struct ScriptedChannel {
        events: VecDeque<ShellEvent>,
        sent: Vec<Vec<u8>>,
    }

    impl ScriptedChannel {
        fn new(chunks: &[&[u8]]) -> Self {
            Self {
                events: chunks.iter().map(|c| ShellEvent::Data(c.to_vec())).collect(),
                sent: Vec::new(),
            }
        }

        fn then(mut self, event: ShellEvent) -> Self {
            self.events.push_back(event);
            self
        }

        fn sent_text(&self) -> Vec<String> {
            self.sent
                .iter()
                .map(|s| String::from_utf8_lossy(s).into_owned())
                .collect()
        }
    }

    #[async_trait]
    impl ShellChannel for ScriptedChannel {
        async fn recv(&mut self) -> ShellEvent {
            match self.events.pop_front() {
                Some(event) => event,
                None => std::future::pending().await,
            }
        }

        async fn send(&mut self, data: &[u8]) -> Result<()> {
            self.sent.push(data.to_vec());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_login_answers_username_then_password() {
        let mut channel = ScriptedChannel::new(&[
            b"\r\nUser Name:",
            b"cisco\r\nPass",
            b"word:",
            b"\r\n\r\nswitch01#",
        ]);

        let base = login(&mut channel, "cisco", "secret").await.unwrap();

        assert_eq!(base, "switch01");
        assert_eq!(channel.sent_text(), vec!["cisco\n", "secret\n"]);
    }

    #[tokio::test]
    async fn test_login_without_shell_prompts() {
        let mut channel = ScriptedChannel::new(&[b"\x1b[0m\r\n", b"switch01>"]);

        assert_eq!(login(&mut channel, "cisco", "secret").await.unwrap(), "switch01");
        assert!(channel.sent.is_empty());
    }

    #[tokio::test]
    async fn test_login_skips_banner_rule() {
        let mut channel = ScriptedChannel::new(&[
            b"\r\n##########################\r\n",
            b"  Authorized access only\r\n##########################\r\n",
            b"\r\nswitch01#",
        ]);

        assert_eq!(login(&mut channel, "cisco", "secret").await.unwrap(), "switch01");
    }

    #[tokio::test]
    async fn test_login_rejected_when_prompt_returns() {
        let mut channel = ScriptedChannel::new(&[
            b"User Name:",
            b"Password:",
            b"\r\nUser Name:",
        ]);

        let err = login(&mut channel, "cisco", "wrong").await.unwrap_err();

        assert!(err.is_auth_failure(), "{err}");
        assert_eq!(channel.sent_text(), vec!["cisco\n", "wrong\n"]);
    }

    #[tokio::test]
    async fn test_login_channel_closed() {
        let mut channel = ScriptedChannel::new(&[b"User Name:"]).then(ShellEvent::Closed);

        let err = login(&mut channel, "cisco", "secret").await.unwrap_err();
        assert!(matches!(err, Sg300Error::Connection(_)), "{err}");
    }

    #[tokio::test]
    async fn test_read_answers_each_pager_prompt_once() {
        let mut channel = ScriptedChannel::new(&[
            b"show mac address-table\r\nline 1\r\n",
            b"More: <space>,  Quit: q or CTRL+Z, One line: <return> ",
            b"\x1b[K",
            b"line 2\r\n",
            b"More: <space>,  Quit: q or CTRL+Z, One line: <return> ",
            b"line 3\r\nswitch01#",
        ]);

        let raw = read_until_prompt(&mut channel, "switch01", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(channel.sent_text(), vec![" ", " "]);
        assert!(raw.contains("line 1") && raw.contains("line 3"));
        assert!(raw.ends_with("switch01#"));
    }

    #[tokio::test]
    async fn test_read_keeps_split_multibyte_characters() {
        // "Température" with the two bytes of 'é' in separate messages
        let mut channel = ScriptedChannel::new(&[
            b"show env\r\nTemp\xc3",
            b"\xa9rature OK\r\nswitch01#",
        ]);

        let raw = read_until_prompt(&mut channel, "switch01", Duration::from_secs(5))
            .await
            .unwrap();

        assert!(raw.contains("Température OK"), "{raw}");
        assert!(!raw.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_read_times_out_without_prompt() {
        let mut channel = ScriptedChannel::new(&[b"show tech-support\r\npartial output"]);

        let err = read_until_prompt(&mut channel, "switch01", Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, Sg300Error::Timeout(50)), "{err}");
    }

    #[tokio::test]
    async fn test_read_channel_closed() {
        let mut channel =
            ScriptedChannel::new(&[b"reload\r\n"]).then(ShellEvent::Closed);

        let err = read_until_prompt(&mut channel, "switch01", Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, Sg300Error::Connection(_)), "{err}");
    }
}
