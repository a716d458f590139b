//! Snapshot of a read cycle and reconciliation against the prior cycle.
//!
//! The snapshot is the only state this tool keeps: a fully-owned record
//! list replaced wholesale after every successful read-reconcile cycle,
//! never persisted, discarded at exit. The caller owns the single current
//! snapshot and threads it through `reconcile` explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::printer::PrinterRecord;

/// The full set of printer records from one read-reconcile cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Records in enumeration order.
    pub records: Vec<PrinterRecord>,
    /// When this cycle was captured.
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// The empty snapshot used before the first read.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture a record list as a snapshot, timestamped now.
    pub fn capture(records: Vec<PrinterRecord>) -> Self {
        Self {
            records,
            taken_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record matching on (port, driver), in this snapshot's order.
    pub fn find_identity(&self, port_name: &str, driver_name: &str) -> Option<&PrinterRecord> {
        self.records
            .iter()
            .find(|r| r.port_name == port_name && r.driver_name == driver_name)
    }
}

/// Restore each record's previous name by matching against the prior
/// snapshot, producing the snapshot for the next cycle.
///
/// Matching identity is (port, driver); the first match in `previous`'s
/// order wins and no further disambiguation is attempted. A record whose
/// matched prior name equals its current name keeps `previous_name` empty:
/// the field is a rename trail, not an echo of an unchanged name. An
/// unmatched record is a valid outcome (first sighting), never an error.
pub fn reconcile(current: Vec<PrinterRecord>, previous: &Snapshot) -> Snapshot {
    let mut records = current;
    let mut restored = 0usize;

    for record in &mut records {
        record.previous_name = previous
            .find_identity(&record.port_name, &record.driver_name)
            .filter(|prior| prior.name != record.name)
            .map(|prior| prior.name.clone());
        if record.previous_name.is_some() {
            restored += 1;
        }
    }

    debug!(
        count = records.len(),
        restored, "Reconciled read cycle against previous snapshot"
    );
    Snapshot::capture(records)
}
