//! Printer CLI library - list and rename Windows printers.
//!
//! This library exposes the core functionality of the `prn` CLI for use in
//! tests and potentially other applications.
//!
//! # Modules
//!
//! - `printer`: Spooler abstraction over winspool, PowerShell, and a mock
//! - `snapshot`: Read-cycle snapshots and previous-name reconciliation
//! - `error`: Error types with user-recoverable hints
//! - `config`: Configuration file handling
//! - `cli`: Argument definitions
#![cfg_attr(not(windows), forbid(unsafe_code))]
#![cfg_attr(windows, deny(unsafe_code))]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod printer;
pub mod snapshot;
