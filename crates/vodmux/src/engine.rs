//! Transcoding engine collaborators.
//!
//! The conversion flow needs a virtual filesystem plus the ability to run
//! the transcoder over it. [`TranscodeEngine`] is that surface;
//! [`FfmpegEngine`] backs it with a host `ffmpeg` binary confined to a
//! private temporary directory.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::EngineConfig;

/// Virtual-filesystem-plus-exec sandbox the stager and the remux step
/// drive.
///
/// Paths are `/`-separated and rooted at the engine's own namespace.
/// `create_dir` creates a single level; ancestors are the caller's
/// concern.
#[async_trait]
pub trait TranscodeEngine: Send + Sync {
    /// Names of the entries in the directory at `path`.
    async fn list_dir(&self, path: &str) -> io::Result<Vec<String>>;

    async fn create_dir(&self, path: &str) -> io::Result<()>;

    async fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()>;

    /// Runs the transcoder with `args`. Arguments beginning with `/` are
    /// virtual absolute paths and are rebased into the sandbox.
    async fn exec(&self, args: &[String]) -> io::Result<()>;

    async fn read_file(&self, path: &str) -> io::Result<Bytes>;
}

/// [`TranscodeEngine`] backed by a host ffmpeg binary working inside a
/// temporary directory that is discarded with the engine.
pub struct FfmpegEngine {
    binary: PathBuf,
    root: TempDir,
}

impl FfmpegEngine {
    /// Creates the sandbox and verifies the configured binary responds to
    /// `-version`.
    pub async fn load(config: EngineConfig) -> io::Result<Self> {
        let root = tempfile::tempdir()?;
        let engine = Self {
            binary: config.ffmpeg_path,
            root,
        };
        engine.verify_binary().await?;
        debug!(root = %engine.root.path().display(), "transcoder sandbox ready");
        Ok(engine)
    }

    async fn verify_binary(&self) -> io::Result<()> {
        let output = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "`{} -version` exited with {}",
                self.binary.display(),
                output.status
            )));
        }
        Ok(())
    }

    /// Maps a virtual path onto the sandbox, rejecting traversal out of
    /// it.
    fn host_path(&self, path: &str) -> io::Result<PathBuf> {
        let mut mapped = self.root.path().to_path_buf();
        for component in path.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("path `{path}` escapes the sandbox"),
                    ));
                }
                component => mapped.push(component),
            }
        }
        Ok(mapped)
    }
}

#[async_trait]
impl TranscodeEngine for FfmpegEngine {
    async fn list_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(self.host_path(path)?).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn create_dir(&self, path: &str) -> io::Result<()> {
        tokio::fs::create_dir(self.host_path(path)?).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> io::Result<()> {
        tokio::fs::write(self.host_path(path)?, data).await
    }

    async fn exec(&self, args: &[String]) -> io::Result<()> {
        let mut command = Command::new(&self.binary);
        for arg in args {
            if arg.starts_with('/') {
                command.arg(self.host_path(arg)?);
            } else {
                command.arg(arg);
            }
        }
        let output = command
            .current_dir(self.root.path())
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "transcoder exited with failure");
            return Err(io::Error::other(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail(&stderr, 2000)
            )));
        }
        Ok(())
    }

    async fn read_file(&self, path: &str) -> io::Result<Bytes> {
        let data = tokio::fs::read(self.host_path(path)?).await?;
        Ok(Bytes::from(data))
    }
}

/// Last `max` bytes of `text`, starting on a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
