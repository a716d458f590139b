//! Logging setup.
//!
//! Log lines always go to stderr so robot-mode JSON on stdout stays
//! parseable. The default filter follows the verbosity flags and yields
//! to `RUST_LOG` when set.

use std::io::{self, IsTerminal};

use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Robot mode logs JSON. Otherwise output is pretty on an interactive
/// terminal and compact without ANSI codes when stderr is piped.
pub fn init_logging(robot_mode: bool, verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let base = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    if robot_mode {
        registry.with(base.json().with_target(true)).init();
    } else if io::stderr().is_terminal() {
        registry.with(base.with_target(false)).init();
    } else {
        registry
            .with(base.compact().with_target(false).with_ansi(false))
            .init();
    }
}

/// Default filter directive for the given verbosity flags. Quiet wins
/// over any number of `-v`s.
fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "prn=error";
    }
    match verbose {
        0 => "prn=info",
        1 => "prn=debug",
        _ => "prn=trace",
    }
}
