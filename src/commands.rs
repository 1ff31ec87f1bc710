//! Command list loading
//!
//! Commands come either from an inline comma-separated `--commands` value or
//! from a `--file` with one command per line. Entries are trimmed and blank
//! ones dropped; order is preserved and nothing else is validated.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, Sg300Error};

/// Where the command list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSource {
    /// Comma-separated list given on the command line
    Inline(String),

    /// Text file, one command per line
    File(PathBuf),
}

impl CommandSource {
    /// Load the command list, rejecting an empty result
    pub fn load(&self) -> Result<Vec<String>> {
        match self {
            CommandSource::File(path) => read_command_file(path),
            CommandSource::Inline(list) => {
                let commands = parse_inline(list);
                if commands.is_empty() {
                    return Err(Sg300Error::commands(
                        "No commands given in --commands",
                    ));
                }
                Ok(commands)
            }
        }
    }
}

/// Split a comma-separated command list
///
/// # Examples
/// ```
/// use sg300_batch::commands::parse_inline;
///
/// let cmds = parse_inline("show version, show vlan,,show running-config");
/// assert_eq!(cmds, vec!["show version", "show vlan", "show running-config"]);
/// ```
pub fn parse_inline(list: &str) -> Vec<String> {
    split_non_blank(list.split(','))
}

/// Read commands from a file, one per line
pub fn read_command_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            Sg300Error::commands(format!("Command file '{}' not found", path.display()))
        }
        _ => Sg300Error::commands(format!(
            "Failed to read command file '{}': {}",
            path.display(),
            e
        )),
    })?;

    let commands = split_non_blank(content.lines());
    if commands.is_empty() {
        return Err(Sg300Error::commands("Command file was empty"));
    }

    debug!(
        "Loaded {} commands from {}",
        commands.len(),
        path.display()
    );
    Ok(commands)
}

fn split_non_blank<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
