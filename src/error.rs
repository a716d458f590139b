//! Error types for printer read and rename operations.

use thiserror::Error;

/// Failures while reading the host's printer directory.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("printer enumeration failed with OS error {code}")]
    NativeCallFailed { code: i32 },

    #[error("could not parse printer listing output")]
    ParseFailed { raw: String },

    #[error("listing command exited with {status}: {output}")]
    CommandFailed { status: String, output: String },

    #[error("listing command '{command}' did not finish within {timeout_secs}s")]
    CommandTimedOut { command: String, timeout_secs: u64 },

    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Failures while renaming a single printer.
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("could not open printer handle: OS error {code}")]
    HandleOpenFailed { code: i32 },

    #[error("could not fetch printer configuration: OS error {code}")]
    ConfigFetchFailed { code: i32 },

    #[error("could not apply printer configuration: OS error {code}")]
    ConfigSetFailed { code: i32 },

    #[error("rename command exited with {status}: {output}")]
    CommandFailed { status: String, output: String },

    #[error("rename command '{command}' did not finish within {timeout_secs}s")]
    CommandTimedOut { command: String, timeout_secs: u64 },

    #[error("failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Primary error type for the `prn` binary.
#[derive(Error, Debug)]
pub enum PrnError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Rename(#[from] RenameError),

    #[error("invalid new name: {reason}")]
    InvalidNewName { reason: String },

    #[error("backend '{backend}' is not available on this platform")]
    BackendUnavailable { backend: String },

    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl PrnError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidNewName { .. }
                | Self::BackendUnavailable { .. }
                | Self::ConfigParse(_)
                | Self::ConfigInvalid(_)
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidNewName { .. } => {
                Some("Pick a non-empty name that differs from the current one")
            }
            Self::BackendUnavailable { .. } => {
                Some("Use --backend powershell, or run on a Windows host")
            }
            Self::ConfigParse(_) | Self::ConfigInvalid(_) => {
                Some("Check the config file with: prn config")
            }
            Self::Read(ReadError::ParseFailed { .. }) => {
                Some("Re-run with -v to see the raw command output")
            }
            _ => None,
        }
    }
}

/// Convenience type alias for Results using PrnError.
pub type Result<T> = std::result::Result<T, PrnError>;
