//! Terminal mode saved at startup
//!
//! The hidden password prompt turns echo off while it waits for input. A
//! signal that ends the process during that wait would leave the user's
//! shell without echo, so the mode captured here is put back before exit.

#[cfg(unix)]
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
#[cfg(unix)]
use tracing::warn;

/// Snapshot of the stdin terminal attributes
pub struct TerminalState {
    #[cfg(unix)]
    saved: Option<Termios>,
}

impl TerminalState {
    /// Record the current mode of stdin
    ///
    /// Does nothing when stdin is not a terminal.
    pub fn capture() -> Self {
        #[cfg(unix)]
        {
            use std::io::IsTerminal;

            let stdin = std::io::stdin();
            let saved = if stdin.is_terminal() {
                tcgetattr(&stdin).ok()
            } else {
                None
            };
            Self { saved }
        }
        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Whether there is a saved mode to put back
    pub fn is_saved(&self) -> bool {
        #[cfg(unix)]
        {
            self.saved.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// Put the captured mode back on stdin
    pub fn restore(&self) {
        #[cfg(unix)]
        {
            if let Some(saved) = &self.saved {
                if let Err(e) = tcsetattr(std::io::stdin(), SetArg::TCSANOW, saved) {
                    warn!("Failed to restore terminal mode: {}", e);
                }
            }
        }
    }
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalState")
            .field("saved", &self.is_saved())
            .finish()
    }
}
