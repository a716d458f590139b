//! Mock spooler implementation for unit testing.
//!
//! This module provides a mock print spooler that records all operations
//! and supports assertions for testing, so the read-reconcile-rename cycle
//! can be exercised without a Windows host.
//!
//! # Example
//!
//! ```rust,ignore
//! use prn::printer::mock::{MockSpooler, Operation};
//! use prn::printer::Spooler;
//!
//! let mock = MockSpooler::office();
//! mock.rename_printer("HP-1", "Reception-Printer").unwrap();
//! mock.assert_operations(&[Operation::RenamePrinter {
//!     old_name: "HP-1".to_string(),
//!     new_name: "Reception-Printer".to_string(),
//! }]);
//! ```

use std::sync::Mutex;

use tracing::{debug, trace};

use super::record::PrinterRecord;
use super::Spooler;
use crate::error::{ReadError, RenameError};

/// Recorded operation for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ReadPrinters,
    RenamePrinter { old_name: String, new_name: String },
}

/// Configuration for mock behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Fail every operation after N operations (for testing error recovery).
    pub fail_after_ops: Option<usize>,
    /// Printer names that must fail to rename.
    pub failing_printers: Vec<String>,
    /// Applied to the accepted name on rename, simulating OS-side name
    /// normalization (case folding, truncation). Identity when `None`.
    pub name_mangler: Option<fn(&str) -> String>,
}

/// Mock spooler for testing without a print spooler.
///
/// Holds an in-memory printer table that renames mutate, records all
/// operations for later assertion, and supports error injection.
pub struct MockSpooler {
    printers: Mutex<Vec<PrinterRecord>>,
    operation_log: Mutex<Vec<Operation>>,
    read_error: Mutex<Option<ReadError>>,
    rename_error: Mutex<Option<RenameError>>,
    config: MockConfig,
    op_count: Mutex<usize>,
}

impl MockSpooler {
    /// Create a mock with the given printer table.
    pub fn new(printers: Vec<PrinterRecord>) -> Self {
        debug!(count = printers.len(), "Creating mock spooler");
        Self {
            printers: Mutex::new(printers),
            operation_log: Mutex::new(Vec::new()),
            read_error: Mutex::new(None),
            rename_error: Mutex::new(None),
            config: MockConfig::default(),
            op_count: Mutex::new(0),
        }
    }

    /// Create a mock with an empty printer table.
    pub fn disconnected_host() -> Self {
        Self::new(Vec::new())
    }

    /// A small office fixture: one USB printer, one network printer.
    pub fn office() -> Self {
        Self::new(vec![
            PrinterRecord::new("HP-1", "USB001", "HPDrv"),
            PrinterRecord::new("Front Desk MFP", "192.168.1.20", "KyoDrv"),
        ])
    }

    /// Configure mock behavior.
    #[must_use]
    pub fn with_config(mut self, config: MockConfig) -> Self {
        self.config = config;
        self
    }

    // === Error injection ===

    /// Inject an error for the next read.
    pub fn inject_read_error(&self, error: ReadError) {
        *self.read_error.lock().unwrap() = Some(error);
    }

    /// Inject an error for the next rename.
    pub fn inject_rename_error(&self, error: RenameError) {
        *self.rename_error.lock().unwrap() = Some(error);
    }

    // === Assertions ===

    /// Get all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.operation_log.lock().unwrap().clone()
    }

    /// Get the number of operations performed.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operation_log.lock().unwrap().len()
    }

    /// Assert specific operations were performed.
    ///
    /// # Panics
    ///
    /// Panics if the operations don't match.
    pub fn assert_operations(&self, expected: &[Operation]) {
        let actual = self.operations();
        assert_eq!(
            actual, expected,
            "Operation mismatch.\nExpected: {expected:#?}\nActual: {actual:#?}",
        );
    }

    /// Assert a specific operation was performed at least once.
    ///
    /// # Panics
    ///
    /// Panics if the operation was not found.
    pub fn assert_contains(&self, expected: &Operation) {
        let ops = self.operations();
        assert!(
            ops.contains(expected),
            "Expected operation {expected:?} not found in: {ops:#?}",
        );
    }

    /// Current table entry by name, if present.
    #[must_use]
    pub fn get_printer(&self, name: &str) -> Option<PrinterRecord> {
        self.printers
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    /// Clear the operation log for fresh assertions.
    pub fn clear_operations(&self) {
        self.operation_log.lock().unwrap().clear();
        *self.op_count.lock().unwrap() = 0;
    }

    // === Internal helpers ===

    fn record_op(&self, op: Operation) {
        trace!(?op, "Recording operation");
        self.operation_log.lock().unwrap().push(op);
        *self.op_count.lock().unwrap() += 1;
    }

    fn past_failure_limit(&self) -> bool {
        self.config
            .fail_after_ops
            .is_some_and(|limit| *self.op_count.lock().unwrap() >= limit)
    }
}

impl Spooler for MockSpooler {
    fn read_printers(&self) -> Result<Vec<PrinterRecord>, ReadError> {
        if let Some(error) = self.read_error.lock().unwrap().take() {
            return Err(error);
        }
        if self.past_failure_limit() {
            return Err(ReadError::NativeCallFailed { code: 1722 });
        }
        self.record_op(Operation::ReadPrinters);

        // Copy out, previous_name always blank from a reader.
        Ok(self
            .printers
            .lock()
            .unwrap()
            .iter()
            .map(|p| PrinterRecord::new(p.name.clone(), p.port_name.clone(), p.driver_name.clone()))
            .collect())
    }

    fn rename_printer(&self, old_name: &str, new_name: &str) -> Result<(), RenameError> {
        if let Some(error) = self.rename_error.lock().unwrap().take() {
            return Err(error);
        }
        if self.past_failure_limit() {
            return Err(RenameError::ConfigSetFailed { code: 1722 });
        }
        self.record_op(Operation::RenamePrinter {
            old_name: old_name.to_string(),
            new_name: new_name.to_string(),
        });

        if self.config.failing_printers.iter().any(|p| p == old_name) {
            return Err(RenameError::ConfigSetFailed { code: 5 });
        }

        let mut printers = self.printers.lock().unwrap();
        // ERROR_INVALID_PRINTER_NAME, same code the real spooler reports.
        let record = printers
            .iter_mut()
            .find(|p| p.name == old_name)
            .ok_or(RenameError::HandleOpenFailed { code: 1801 })?;

        record.name = self
            .config
            .name_mangler
            .map_or_else(|| new_name.to_string(), |mangle| mangle(new_name));
        Ok(())
    }
}
