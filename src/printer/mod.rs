//! Spooler abstraction layer.
//!
//! This module provides a trait-based abstraction over the two ways of
//! talking to the Windows print spooler (the native winspool API and the
//! PowerShell management cmdlets) plus a mock implementation, enabling
//! testability without a spooler on the host.

pub mod mock;
pub mod parse;
pub mod powershell;
mod record;
#[cfg(windows)]
pub mod winspool;

pub use record::{port_type, PrinterRecord};

use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ReadError, RenameError, Result};

/// Core spooler operations.
///
/// This trait is the narrow contract between the core and any frontend:
/// read the current printer directory, or rename one printer addressed by
/// its current name. Reading never performs reconciliation; that is the
/// caller's next step so the reader stays free of prior state.
pub trait Spooler {
    /// Read the current printer directory.
    ///
    /// Records come back in enumeration order with `previous_name` empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the enumeration call or listing command fails,
    /// or if command output matches no known shape.
    fn read_printers(&self) -> std::result::Result<Vec<PrinterRecord>, ReadError>;

    /// Rename one printer, addressed by its current name.
    ///
    /// Issues exactly one mutation request. On success the spooler's view
    /// changes immediately and every cached record naming `old_name` is
    /// stale; callers must re-read rather than patch the cache, because
    /// the OS may have normalized or truncated the accepted name.
    ///
    /// # Errors
    ///
    /// Returns an error if the printer cannot be opened, its configuration
    /// cannot be fetched or applied, or the rename command fails.
    fn rename_printer(
        &self,
        old_name: &str,
        new_name: &str,
    ) -> std::result::Result<(), RenameError>;
}

/// Type alias for boxed trait object.
pub type BoxedSpooler = Box<dyn Spooler>;

/// Which spooler implementation to talk through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Native winspool on Windows, PowerShell elsewhere.
    #[default]
    Auto,
    /// Native winspool enumeration (Windows only).
    Winspool,
    /// Spawned PowerShell management cmdlets.
    Powershell,
}

/// Options for spawned external calls.
#[derive(Debug, Clone, Copy)]
pub struct CallOptions {
    /// Upper bound on any one spawned command. The original tool blocked
    /// indefinitely; bounding the call is a deliberate change.
    pub timeout: Duration,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Open the selected backend as a boxed trait object.
///
/// # Errors
///
/// Returns [`crate::error::PrnError::BackendUnavailable`] when the winspool
/// backend is
/// requested off-Windows.
pub fn open_spooler(backend: Backend, opts: CallOptions) -> Result<BoxedSpooler> {
    match backend {
        Backend::Auto => {
            #[cfg(windows)]
            {
                let _ = opts;
                Ok(Box::new(winspool::WinspoolSpooler::new()))
            }
            #[cfg(not(windows))]
            {
                Ok(Box::new(powershell::PowershellSpooler::new(opts)))
            }
        }
        Backend::Winspool => {
            #[cfg(windows)]
            {
                let _ = opts;
                Ok(Box::new(winspool::WinspoolSpooler::new()))
            }
            #[cfg(not(windows))]
            {
                Err(crate::error::PrnError::BackendUnavailable {
                    backend: "winspool".to_string(),
                })
            }
        }
        Backend::Powershell => Ok(Box::new(powershell::PowershellSpooler::new(opts))),
    }
}
