//! Per-run transcript file
//!
//! Each run writes `<host>_<YYYYmmdd_HHMMSS>.log` under the log directory.
//! The file is created exclusively; when the name is already taken (two runs
//! in the same second) a `_<n>` suffix is added.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Result, Sg300Error};

/// Upper bound on suffixes tried for a single timestamp
const MAX_NAME_SUFFIX: u32 = 1000;

/// Open transcript file for one run
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    file: File,
}

impl SessionLog {
    /// Create a new transcript file for `host` inside `dir`
    pub async fn create(dir: &Path, host: &str) -> Result<Self> {
        fs::create_dir_all(dir).await.map_err(|e| {
            Sg300Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create log directory {}: {}", dir.display(), e),
            ))
        })?;

        let stem = format!(
            "{}_{}",
            host_file_stem(host),
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        );

        for n in 0..MAX_NAME_SUFFIX {
            let name = if n == 0 {
                format!("{stem}.log")
            } else {
                format!("{stem}_{n}.log")
            };
            let path = dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => {
                    debug!("Writing transcript to {}", path.display());
                    return Ok(Self { path, file });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(Sg300Error::Io(e)),
            }
        }

        Err(Sg300Error::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("No free log file name for {stem} in {}", dir.display()),
        )))
    }

    /// Append the output of one command and flush it to disk
    pub async fn record(&mut self, command: &str, output: &str) -> Result<()> {
        self.file
            .write_all(format_record(command, output).as_bytes())
            .await?;
        self.file.flush().await?;
        Ok(())
    }

    /// Path of the transcript file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Host part of the log file name
///
/// Dots and colons are replaced so IPv4 and IPv6 addresses give portable
/// file names.
pub fn host_file_stem(host: &str) -> String {
    host.replace(['.', ':'], "_")
}

/// One transcript record
pub fn format_record(command: &str, output: &str) -> String {
    format!("\n--- {command} ---\n{output}\n")
}
