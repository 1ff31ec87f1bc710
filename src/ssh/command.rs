//! Command execution on the switch CLI
//!
//! Commands are typed into the shell channel; the output is everything the
//! switch prints until its prompt comes back.

use async_trait::async_trait;
use tracing::debug;

use super::connection::SwitchConnection;
use super::shell::clean_output;
use super::stream::{read_until_prompt, write_line};
use crate::error::Result;
use crate::runner::CommandSession;

impl SwitchConnection {
    /// Run one command and return its cleaned output
    ///
    /// # Returns
    /// * `Ok(String)` - Output without the command echo and trailing prompt
    /// * `Err(Sg300Error::Timeout)` - If the prompt does not return in time
    /// * `Err(Sg300Error::Connection)` - If the channel closes
    pub async fn send_command(&mut self, command: &str) -> Result<String> {
        debug!("Sending command: {}", command);

        write_line(&mut self.channel, command).await?;
        let raw = read_until_prompt(
            &mut self.channel,
            &self.base_prompt,
            self.config.command_timeout,
        )
        .await?;
        let output = clean_output(&raw, command, &self.base_prompt);

        debug!(
            "Command completed: raw_len={}, output_len={}",
            raw.len(),
            output.len()
        );

        Ok(output)
    }
}

#[async_trait]
impl CommandSession for SwitchConnection {
    async fn send_command(&mut self, command: &str) -> Result<String> {
        SwitchConnection::send_command(self, command).await
    }

    async fn close(&mut self) {
        SwitchConnection::close(self).await
    }
}
