//! Interface to the PBS/Torque `pbsnodes` command
//!
//! Locates the `pbsnodes` binary, runs `pbsnodes -x` and hands back its XML
//! output. Decoding the document lives in [`crate::models::pbs_responses`].

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Name of the node-status binary
pub const PBSNODES: &str = "pbsnodes";

/// How the PBS binary path was resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    /// Explicitly configured via config file or environment variable
    Configured,
    /// Found pbsnodes in the user's PATH
    AutoDetected,
    /// Fell back to /usr/bin and pbsnodes was found there
    Fallback,
    /// Fell back to /usr/bin but pbsnodes was NOT found (likely misconfigured)
    FallbackUnverified,
}

/// Result of finding the PBS binary path
#[derive(Debug, Clone)]
pub struct PbsPathResult {
    pub path: PathBuf,
    pub resolution: PathResolution,
}

/// Find the directory containing `pbsnodes`.
///
/// Resolution order:
/// 1. Explicit path provided (from config), if it is an existing directory.
///    Otherwise a warning is logged and resolution continues.
/// 2. Auto-detect via PATH using the `which` crate.
/// 3. Fallback to `/usr/bin`.
pub fn find_pbs_bin_path(config_path: Option<&Path>) -> PbsPathResult {
    if let Some(path) = config_path {
        if path.is_dir() {
            return PbsPathResult {
                path: path.to_path_buf(),
                resolution: PathResolution::Configured,
            };
        }
        tracing::warn!(
            path = %path.display(),
            "configured pbs_bin_path is not a valid directory, trying auto-detection"
        );
    }

    if let Ok(pbsnodes_path) = which::which(PBSNODES)
        && let Some(parent) = pbsnodes_path.parent()
    {
        return PbsPathResult {
            path: parent.to_path_buf(),
            resolution: PathResolution::AutoDetected,
        };
    }

    let fallback_path = PathBuf::from("/usr/bin");
    if fallback_path.join(PBSNODES).exists() {
        PbsPathResult {
            path: fallback_path,
            resolution: PathResolution::Fallback,
        }
    } else {
        tracing::warn!(
            "{} not found in PATH or {}, the query will likely fail",
            PBSNODES,
            fallback_path.display()
        );
        PbsPathResult {
            path: fallback_path,
            resolution: PathResolution::FallbackUnverified,
        }
    }
}

/// Failure to obtain node status from the scheduler
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{} not found (is PBS/Torque installed and on PATH?)", .0.display())]
    NotFound(PathBuf),

    #[error("failed to execute {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("pbsnodes output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("{command} exited with {}: {stderr}", exit_description(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

/// PBS interface for querying node status
#[derive(Debug, Clone)]
pub struct PbsInterface {
    /// Directory containing pbsnodes
    pub pbs_bin_path: PathBuf,
}

impl Default for PbsInterface {
    fn default() -> Self {
        Self::with_config(None)
    }
}

impl PbsInterface {
    /// Create an interface using the configured directory, or auto-detect it.
    pub fn with_config(config_path: Option<&Path>) -> Self {
        let result = find_pbs_bin_path(config_path);
        tracing::debug!(
            path = %result.path.display(),
            resolution = ?result.resolution,
            "resolved pbs binary directory"
        );
        Self {
            pbs_bin_path: result.path,
        }
    }

    #[must_use]
    pub fn pbsnodes_path(&self) -> PathBuf {
        self.pbs_bin_path.join(PBSNODES)
    }

    /// Run `pbsnodes -x` and return its standard output with trailing
    /// whitespace removed.
    ///
    /// # Errors
    /// Returns [`FetchError`] if the binary cannot be run, exits non-zero, or
    /// prints output that is not UTF-8.
    pub fn fetch_node_status(&self) -> Result<String, FetchError> {
        let path = self.pbsnodes_path();
        let mut cmd = Command::new(&path);
        cmd.arg("-x");

        tracing::debug!(command = %path.display(), "running pbsnodes -x");

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.clone())
            } else {
                FetchError::Io {
                    path: path.clone(),
                    source: e,
                }
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(
                exit_code = ?output.status.code(),
                stderr = %stderr,
                "pbsnodes failed"
            );
            return Err(FetchError::NonZeroExit {
                command: format!("{} -x", PBSNODES),
                code: output.status.code(),
                stderr,
            });
        }

        decode_stdout(output.stdout)
    }
}

/// Decode command output strictly and drop trailing whitespace
fn decode_stdout(stdout: Vec<u8>) -> Result<String, FetchError> {
    let mut text = String::from_utf8(stdout)?;
    text.truncate(text.trim_end().len());
    Ok(text)
}
