//! PowerShell-backed spooler implementation.
//!
//! Shells out to the printer management cmdlets (`Get-Printer`,
//! `Rename-Printer`). Output parsing lives in [`super::parse`]; this
//! module owns process lifecycle, argument quoting, and the call deadline.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use super::parse::parse_listing;
use super::record::PrinterRecord;
use super::{CallOptions, Spooler};
use crate::error::{ReadError, RenameError};

const LIST_PIPELINE: &str = "Get-Printer | Select-Object Name,PortName,DriverName | ConvertTo-Json";

/// How often a running child is polled against the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spooler talking through spawned PowerShell commands.
pub struct PowershellSpooler {
    opts: CallOptions,
}

impl PowershellSpooler {
    pub fn new(opts: CallOptions) -> Self {
        Self { opts }
    }

    fn run(&self, label: &str, pipeline: &str) -> Result<CommandOutput, CommandFailure> {
        debug!(label, timeout_secs = self.opts.timeout.as_secs(), "Spawning powershell");
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", pipeline]);
        run_with_deadline(&mut command, self.opts.timeout)
    }
}

impl Spooler for PowershellSpooler {
    fn read_printers(&self) -> Result<Vec<PrinterRecord>, ReadError> {
        let output = self
            .run("Get-Printer", LIST_PIPELINE)
            .map_err(|failure| match failure {
                CommandFailure::Spawn(source) => ReadError::Spawn {
                    command: "powershell Get-Printer".to_string(),
                    source,
                },
                CommandFailure::TimedOut => ReadError::CommandTimedOut {
                    command: "Get-Printer".to_string(),
                    timeout_secs: self.opts.timeout.as_secs(),
                },
            })?;

        if !output.success {
            return Err(ReadError::CommandFailed {
                output: output.combined(),
                status: output.status,
            });
        }
        parse_listing(&output.stdout)
    }

    fn rename_printer(&self, old_name: &str, new_name: &str) -> Result<(), RenameError> {
        let pipeline = format!(
            "Rename-Printer -Name {} -NewName {}",
            quote_argument(old_name),
            quote_argument(new_name)
        );
        trace!(pipeline, "Built rename pipeline");

        let output = self
            .run("Rename-Printer", &pipeline)
            .map_err(|failure| match failure {
                CommandFailure::Spawn(source) => RenameError::Spawn {
                    command: "powershell Rename-Printer".to_string(),
                    source,
                },
                CommandFailure::TimedOut => RenameError::CommandTimedOut {
                    command: "Rename-Printer".to_string(),
                    timeout_secs: self.opts.timeout.as_secs(),
                },
            })?;

        if !output.success {
            return Err(RenameError::CommandFailed {
                output: output.combined(),
                status: output.status,
            });
        }
        Ok(())
    }
}

/// Quote a printer name as a single-quoted PowerShell string literal.
///
/// Inside single quotes only a single quote terminates the literal, and it
/// is escaped by doubling; every other character, including double quotes
/// and `$`, stays literal. A quote character in a printer name therefore
/// cannot break out of the argument.
fn quote_argument(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// === Bounded child execution ===

struct CommandOutput {
    success: bool,
    status: String,
    stdout: String,
    stderr: String,
}

impl CommandOutput {
    fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !combined.is_empty() {
                combined.push('\n');
            }
            combined.push_str(&self.stderr);
        }
        combined
    }
}

#[derive(Debug)]
enum CommandFailure {
    Spawn(std::io::Error),
    TimedOut,
}

/// Run a command to completion or kill it at the deadline.
///
/// stdout/stderr are drained on companion threads so a chatty child cannot
/// deadlock on a full pipe while the parent polls `try_wait`.
fn run_with_deadline(
    command: &mut Command,
    timeout: Duration,
) -> Result<CommandOutput, CommandFailure> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(CommandFailure::Spawn)?;

    let stdout_reader = drain_pipe(child.stdout.take());
    let stderr_reader = drain_pipe(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {}
            Err(source) => return Err(CommandFailure::Spawn(source)),
        }
        if Instant::now() >= deadline {
            warn!(timeout_secs = timeout.as_secs(), "Killing command at deadline");
            kill_and_reap(&mut child);
            return Err(CommandFailure::TimedOut);
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();
    trace!(status = %status, stdout_len = stdout.len(), "Command finished");

    Ok(CommandOutput {
        success: status.success(),
        status: status.to_string(),
        stdout,
        stderr,
    })
}

fn drain_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}

fn kill_and_reap(child: &mut Child) {
    if let Err(error) = child.kill() {
        warn!(%error, "Failed to kill timed-out command");
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_is_single_quoted() {
        assert_eq!(quote_argument("HP-1"), "'HP-1'");
    }

    #[test]
    fn embedded_single_quote_is_doubled() {
        assert_eq!(quote_argument("Bob's Printer"), "'Bob''s Printer'");
    }

    #[test]
    fn embedded_double_quote_stays_literal() {
        // Double quotes are inert inside a single-quoted literal; the
        // argument stays one balanced token targeting the intended name.
        assert_eq!(quote_argument(r#"The "Good" One"#), r#"'The "Good" One'"#);
    }

    #[test]
    fn rename_pipeline_is_balanced_for_hostile_names() {
        let hostile = "x'; Remove-Printer -Name '*";
        let quoted = quote_argument(hostile);
        // Every original quote is doubled, so quotes inside the literal
        // come in pairs and the argument cannot terminate early.
        assert_eq!(quoted.matches('\'').count() % 2, 0);
        assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
    }

    #[cfg(unix)]
    #[test]
    fn deadline_completes_fast_commands() {
        let mut command = Command::new("sh");
        command.args(["-c", "printf hello"]);
        let output = run_with_deadline(&mut command, Duration::from_secs(5))
            .expect("command should complete");
        assert!(output.success);
        assert_eq!(output.stdout, "hello");
    }

    #[cfg(unix)]
    #[test]
    fn deadline_kills_hung_commands() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 30"]);
        let started = Instant::now();
        let result = run_with_deadline(&mut command, Duration::from_millis(200));
        assert!(matches!(result, Err(CommandFailure::TimedOut)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_reported_with_output() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo oops >&2; exit 3"]);
        let output = run_with_deadline(&mut command, Duration::from_secs(5))
            .expect("command should complete");
        assert!(!output.success);
        assert!(output.combined().contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_failure_is_reported() {
        let mut command = Command::new("definitely-not-a-real-binary-prn");
        let result = run_with_deadline(&mut command, Duration::from_secs(1));
        assert!(matches!(result, Err(CommandFailure::Spawn(_))));
    }
}
