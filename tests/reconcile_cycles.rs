//! Integration tests for the read-reconcile-rename lifecycle.
//!
//! Exercises the full cycle the CLI drives — read, reconcile against the
//! held snapshot, rename, re-read — against the mock spooler.

use prn::printer::mock::{MockConfig, MockSpooler, Operation};
use prn::printer::{PrinterRecord, Spooler};
use prn::snapshot::{reconcile, Snapshot};

fn rec(name: &str, port: &str, driver: &str) -> PrinterRecord {
    PrinterRecord::new(name, port, driver)
}

// ===== Read cycle =====

#[test]
fn first_cycle_has_no_previous_names() {
    let spooler = MockSpooler::office();

    let snapshot = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());

    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.records.iter().all(|r| r.previous_name.is_none()));
}

#[test]
fn stable_directory_reconciles_to_blank_previous_names() {
    let spooler = MockSpooler::office();

    let first = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    let second = reconcile(spooler.read_printers().unwrap(), &first);

    // Same names both cycles: matched, but never echoed.
    assert!(second.records.iter().all(|r| r.previous_name.is_none()));
}

// ===== Rename round-trip =====

#[test]
fn rename_round_trip_restores_old_name_via_reconcile() {
    let spooler = MockSpooler::office();

    let before = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    spooler.rename_printer("HP-1", "Reception-Printer").unwrap();

    let after = reconcile(spooler.read_printers().unwrap(), &before);
    let renamed = after
        .records
        .iter()
        .find(|r| r.name == "Reception-Printer")
        .expect("fresh read must show the new name");

    assert_eq!(renamed.previous_name.as_deref(), Some("HP-1"));
    assert_eq!(renamed.port_name, "USB001");

    // The untouched printer is unaffected.
    let untouched = after
        .records
        .iter()
        .find(|r| r.name == "Front Desk MFP")
        .unwrap();
    assert_eq!(untouched.previous_name, None);
}

#[test]
fn rename_issues_exactly_one_mutation() {
    let spooler = MockSpooler::office();
    spooler.rename_printer("HP-1", "Reception-Printer").unwrap();

    spooler.assert_operations(&[Operation::RenamePrinter {
        old_name: "HP-1".to_string(),
        new_name: "Reception-Printer".to_string(),
    }]);
}

#[test]
fn os_normalized_name_surfaces_only_through_re_read() {
    // The spooler accepts the rename but folds case. Only the fresh read
    // shows the authoritative name; reconcile still finds the old one.
    let spooler = MockSpooler::office().with_config(MockConfig {
        name_mangler: Some(|name| name.to_ascii_uppercase()),
        ..Default::default()
    });

    let before = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    spooler.rename_printer("HP-1", "quiet-corner").unwrap();

    let after = reconcile(spooler.read_printers().unwrap(), &before);
    let renamed = after.records.iter().find(|r| r.name == "QUIET-CORNER");
    assert!(renamed.is_some(), "accepted name differs from the request");
    assert_eq!(renamed.unwrap().previous_name.as_deref(), Some("HP-1"));
}

#[test]
fn failed_rename_leaves_snapshot_semantics_intact() {
    let spooler = MockSpooler::office().with_config(MockConfig {
        failing_printers: vec!["HP-1".to_string()],
        ..Default::default()
    });

    let before = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    assert!(spooler.rename_printer("HP-1", "Other").is_err());

    // Re-read after the failure: nothing changed, nothing reconciles to a
    // previous name.
    let after = reconcile(spooler.read_printers().unwrap(), &before);
    assert!(after.records.iter().any(|r| r.name == "HP-1"));
    assert!(after.records.iter().all(|r| r.previous_name.is_none()));
}

// ===== Multi-cycle history =====

#[test]
fn rename_history_survives_only_one_cycle() {
    let spooler = MockSpooler::office();

    let s1 = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    spooler.rename_printer("HP-1", "Reception-Printer").unwrap();

    let s2 = reconcile(spooler.read_printers().unwrap(), &s1);
    assert_eq!(
        s2.records
            .iter()
            .find(|r| r.name == "Reception-Printer")
            .unwrap()
            .previous_name
            .as_deref(),
        Some("HP-1")
    );

    // Next stable cycle: the old name is gone; previous_name is a
    // single-cycle trail, not an audit log.
    let s3 = reconcile(spooler.read_printers().unwrap(), &s2);
    assert_eq!(
        s3.records
            .iter()
            .find(|r| r.name == "Reception-Printer")
            .unwrap()
            .previous_name,
        None
    );
}

#[test]
fn chained_renames_track_each_hop() {
    let spooler = MockSpooler::office();

    let s1 = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    spooler.rename_printer("HP-1", "Middle").unwrap();
    let s2 = reconcile(spooler.read_printers().unwrap(), &s1);

    spooler.rename_printer("Middle", "Final").unwrap();
    let s3 = reconcile(spooler.read_printers().unwrap(), &s2);

    let rec3 = s3.records.iter().find(|r| r.name == "Final").unwrap();
    assert_eq!(rec3.previous_name.as_deref(), Some("Middle"));
}

// ===== Error propagation =====

#[test]
fn read_failure_is_surfaced_not_swallowed() {
    let spooler = MockSpooler::office();
    spooler.inject_read_error(prn::error::ReadError::NativeCallFailed { code: 1722 });

    let result = spooler.read_printers();
    assert!(matches!(
        result,
        Err(prn::error::ReadError::NativeCallFailed { code: 1722 })
    ));
}

#[test]
fn empty_host_yields_empty_snapshot() {
    let spooler = MockSpooler::disconnected_host();
    let snapshot = reconcile(spooler.read_printers().unwrap(), &Snapshot::empty());
    assert!(snapshot.is_empty());
}

// ===== Identity ambiguity =====

#[test]
fn duplicate_identity_resolves_to_first_previous_record() {
    // Two identical network printers distinguished only by name. First
    // match in the previous snapshot's order wins, every time.
    let previous = Snapshot::capture(vec![
        rec("Floor-1", "192.168.1.20", "KyoDrv"),
        rec("Floor-2", "192.168.1.20", "KyoDrv"),
    ]);

    for _ in 0..3 {
        let next = reconcile(vec![rec("Moved", "192.168.1.20", "KyoDrv")], &previous);
        assert_eq!(next.records[0].previous_name.as_deref(), Some("Floor-1"));
    }
}
