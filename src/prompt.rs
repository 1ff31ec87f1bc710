//! Interactive password entry with a bounded retry loop

use std::future::Future;
use std::io;

use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::error::{Result, Sg300Error};

/// Number of password attempts before giving up
pub const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// Source of SSH passwords
#[async_trait]
pub trait PasswordPrompt: Send {
    /// Ask for the password for the given attempt (1-based)
    async fn prompt(&mut self, attempt: u32, max_attempts: u32) -> io::Result<Zeroizing<String>>;
}

/// Reads the password from the terminal without echo
///
/// The blocking read runs on the blocking pool so the caller can still be
/// cancelled by a signal while the prompt is up.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

#[async_trait]
impl PasswordPrompt for TerminalPrompt {
    async fn prompt(&mut self, attempt: u32, max_attempts: u32) -> io::Result<Zeroizing<String>> {
        let text = format!("Enter SSH password (attempt {attempt}/{max_attempts}): ");
        tokio::task::spawn_blocking(move || rpassword::prompt_password(text).map(Zeroizing::new))
            .await
            .map_err(io::Error::other)?
    }
}

/// Run `connect` with passwords from `prompt` until it succeeds
///
/// Only authentication failures are retried. Any other error ends the loop
/// immediately. After `max_attempts` rejected passwords the loop returns
/// [`Sg300Error::AttemptsExhausted`].
pub async fn with_password_retries<P, F, Fut, T>(
    prompt: &mut P,
    max_attempts: u32,
    mut connect: F,
) -> Result<T>
where
    P: PasswordPrompt + ?Sized,
    F: FnMut(Zeroizing<String>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 1..=max_attempts {
        let password = prompt.prompt(attempt, max_attempts).await?;

        match connect(password).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_auth_failure() => {
                warn!("{} (attempt {}/{})", e, attempt, max_attempts);
            }
            Err(e) => return Err(e),
        }
    }

    Err(Sg300Error::AttemptsExhausted(max_attempts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out scripted passwords and records the attempts it was asked for
    struct ScriptedPrompt {
        answers: VecDeque<&'static str>,
        asked: Vec<(u32, u32)>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl PasswordPrompt for ScriptedPrompt {
        async fn prompt(&mut self, attempt: u32, max_attempts: u32) -> io::Result<Zeroizing<String>> {
            self.asked.push((attempt, max_attempts));
            self.answers
                .pop_front()
                .map(|p| Zeroizing::new(p.to_string()))
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        }
    }

    #[tokio::test]
    async fn test_stops_after_exactly_three_failures() {
        let mut prompt = ScriptedPrompt::new(&["a", "b", "c", "d", "e"]);
        let mut tried = Vec::new();

        let result: Result<()> = with_password_retries(&mut prompt, MAX_PASSWORD_ATTEMPTS, |p| {
            tried.push(p.to_string());
            async { Err(Sg300Error::auth("Password authentication rejected")) }
        })
        .await;

        assert!(matches!(result, Err(Sg300Error::AttemptsExhausted(3))));
        assert_eq!(tried, vec!["a", "b", "c"]);
        assert_eq!(prompt.asked, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_succeeds_on_second_attempt() {
        let mut prompt = ScriptedPrompt::new(&["wrong", "right"]);

        let result = with_password_retries(&mut prompt, MAX_PASSWORD_ATTEMPTS, |p| async move {
            if p.as_str() == "right" {
                Ok("session")
            } else {
                Err(Sg300Error::auth("rejected"))
            }
        })
        .await;

        assert_eq!(result.unwrap(), "session");
        assert_eq!(prompt.asked.len(), 2);
    }

    #[tokio::test]
    async fn test_connection_error_is_not_retried() {
        let mut prompt = ScriptedPrompt::new(&["a", "b", "c"]);
        let mut calls = 0;

        let result: Result<()> = with_password_retries(&mut prompt, MAX_PASSWORD_ATTEMPTS, |_| {
            calls += 1;
            async { Err(Sg300Error::connection("Connection to 10.0.0.1 timed out")) }
        })
        .await;

        assert!(matches!(result, Err(Sg300Error::Connection(_))));
        assert_eq!(calls, 1);
        assert_eq!(prompt.asked.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_password_is_sent_to_the_switch() {
        let mut prompt = ScriptedPrompt::new(&[""]);
        let mut tried = Vec::new();

        let result = with_password_retries(&mut prompt, MAX_PASSWORD_ATTEMPTS, |p| {
            tried.push(p.to_string());
            async { Ok("session") }
        })
        .await;

        assert_eq!(result.unwrap(), "session");
        assert_eq!(tried, vec![String::new()]);
    }

    #[tokio::test]
    async fn test_prompt_failure_propagates() {
        let mut prompt = ScriptedPrompt::new(&[]);

        let result: Result<()> =
            with_password_retries(&mut prompt, MAX_PASSWORD_ATTEMPTS, |_| async { Ok(()) }).await;

        assert!(matches!(result, Err(Sg300Error::Io(_))));
    }
}
