//! Normalization of printer-listing command output.
//!
//! `Get-Printer | ConvertTo-Json` emits a bare object when exactly one
//! printer matched and an array otherwise; older hosts hand back the
//! human-formatted table instead. Both shapes are normalized here into a
//! uniform record sequence, without touching any process state, so the
//! whole module is testable against synthetic output.

use serde::Deserialize;
use tracing::trace;

use super::record::PrinterRecord;
use crate::error::ReadError;

/// Wire shape of one `Get-Printer` result.
#[derive(Debug, Deserialize)]
struct RawPrinter {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "PortName", default)]
    port_name: String,
    #[serde(rename = "DriverName", default)]
    driver_name: String,
}

impl From<RawPrinter> for PrinterRecord {
    fn from(raw: RawPrinter) -> Self {
        Self::new(raw.name, raw.port_name, raw.driver_name)
    }
}

/// ConvertTo-Json drops the array wrapper for a single result.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawPrinter>),
    One(RawPrinter),
}

/// Parse raw listing output into records, `previous_name` left empty.
///
/// Accepts the JSON object/array shapes and the whitespace-separated table
/// with its optional two-line banner. Output matching neither shape fails
/// with [`ReadError::ParseFailed`] carrying the raw text verbatim.
pub fn parse_listing(raw: &str) -> Result<Vec<PrinterRecord>, ReadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return parse_json(trimmed).ok_or_else(|| ReadError::ParseFailed {
            raw: raw.to_string(),
        });
    }

    parse_table(raw).ok_or_else(|| ReadError::ParseFailed {
        raw: raw.to_string(),
    })
}

fn parse_json(trimmed: &str) -> Option<Vec<PrinterRecord>> {
    let parsed: OneOrMany = serde_json::from_str(trimmed).ok()?;
    let records = match parsed {
        OneOrMany::Many(list) => list.into_iter().map(PrinterRecord::from).collect(),
        OneOrMany::One(one) => vec![PrinterRecord::from(one)],
    };
    trace!(count = records.len(), "Parsed JSON printer listing");
    Some(records)
}

/// Parse the human-formatted `Name  PortName` table.
///
/// The printer name may itself contain spaces; the port is always the last
/// whitespace-separated field on the row.
fn parse_table(raw: &str) -> Option<Vec<PrinterRecord>> {
    let mut records = Vec::new();
    let mut saw_data_row = false;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_banner_line(line) {
            continue;
        }

        saw_data_row = true;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            continue;
        }

        let port = fields[fields.len() - 1];
        let name = fields[..fields.len() - 1].join(" ");
        records.push(PrinterRecord::new(name, port, ""));
    }

    if records.is_empty() && saw_data_row {
        return None;
    }
    trace!(count = records.len(), "Parsed table printer listing");
    Some(records)
}

fn is_banner_line(line: &str) -> bool {
    line.starts_with("Name")
        && line
            .split_whitespace()
            .all(|w| matches!(w, "Name" | "PortName" | "DriverName"))
        || line.chars().all(|c| c == '-' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANY: &str = r#"[{"Name":"HP-1","PortName":"USB001","DriverName":"HPDrv"},
        {"Name":"Front Desk","PortName":"192.168.1.20","DriverName":"KyoDrv"}]"#;

    #[test]
    fn json_array_yields_all_records() {
        let records = parse_listing(MANY).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "HP-1");
        assert_eq!(records[1].name, "Front Desk");
        assert_eq!(records[1].port_name, "192.168.1.20");
        assert!(records.iter().all(|r| r.previous_name.is_none()));
    }

    #[test]
    fn single_object_equals_one_element_array() {
        let object = r#"{"Name":"HP-1","PortName":"USB001","DriverName":"HPDrv"}"#;
        let array = r#"[{"Name":"HP-1","PortName":"USB001","DriverName":"HPDrv"}]"#;
        assert_eq!(parse_listing(object).unwrap(), parse_listing(array).unwrap());
    }

    #[test]
    fn missing_driver_field_defaults_to_empty() {
        let records = parse_listing(r#"{"Name":"HP-1","PortName":"USB001"}"#).unwrap();
        assert_eq!(records[0].driver_name, "");
    }

    #[test]
    fn table_with_banner_parses_rows() {
        let out = "\
Name            PortName
----            --------
HP-1            USB001
Front Desk MFP  192.168.1.20
";
        let records = parse_listing(out).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "HP-1");
        assert_eq!(records[0].port_name, "USB001");
        // Multi-word names keep everything before the final column.
        assert_eq!(records[1].name, "Front Desk MFP");
        assert_eq!(records[1].port_name, "192.168.1.20");
    }

    #[test]
    fn table_without_banner_parses_rows() {
        let records = parse_listing("HP-1 USB001\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "HP-1");
    }

    #[test]
    fn empty_output_is_an_empty_listing() {
        assert!(parse_listing("").unwrap().is_empty());
        assert!(parse_listing("  \n ").unwrap().is_empty());
    }

    #[test]
    fn malformed_json_fails_with_verbatim_raw() {
        let raw = r#"[{"Name": "HP-1", }]"#;
        let err = parse_listing(raw).unwrap_err();
        match err {
            ReadError::ParseFailed { raw: kept } => assert_eq!(kept, raw),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }

    #[test]
    fn json_with_wrong_shape_fails() {
        assert!(matches!(
            parse_listing("[1, 2, 3]"),
            Err(ReadError::ParseFailed { .. })
        ));
    }

    #[test]
    fn garbage_text_fails_with_verbatim_raw() {
        let raw = "unexpected\nspooler-chatter";
        let err = parse_listing(raw).unwrap_err();
        match err {
            ReadError::ParseFailed { raw: kept } => assert_eq!(kept, raw),
            other => panic!("expected ParseFailed, got {other:?}"),
        }
    }
}
