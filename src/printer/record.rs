//! Printer record value type and port classification.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One installed printer as known at a single read cycle.
///
/// `name` is the spooler's unique identifier for the printer, but only for
/// the current cycle: a rename changes it. `port_name` + `driver_name` is
/// the best-effort stable identity used to match a record to its
/// prior-cycle counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterRecord {
    /// Current display name.
    pub name: String,
    /// Port the printer is bound to (USB, IP, or vendor-specific).
    pub port_name: String,
    /// Driver identifier, used as a matching aid.
    pub driver_name: String,
    /// Name this printer held in the last cycle, if it was renamed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_name: Option<String>,
}

impl PrinterRecord {
    /// Create a record fresh from a read, with no previous name.
    pub fn new(
        name: impl Into<String>,
        port_name: impl Into<String>,
        driver_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            port_name: port_name.into(),
            driver_name: driver_name.into(),
            previous_name: None,
        }
    }

    /// Classified port type for display.
    pub fn port_type(&self) -> &str {
        port_type(&self.port_name)
    }
}

static DOTTED_QUAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("valid dotted-quad pattern"));

/// Classify a port string for display.
///
/// `"USB"` if the port contains `USB` in any case, `"IP"` if it contains a
/// dotted-quad address, otherwise the raw port string unchanged. Pure and
/// total; there is no failure case.
pub fn port_type(port: &str) -> &str {
    if port.to_ascii_uppercase().contains("USB") {
        "USB"
    } else if DOTTED_QUAD.is_match(port) {
        "IP"
    } else {
        port
    }
}
