//! Printer CLI - list and rename Windows printers from the terminal.
//!
//! Provides both human-friendly and agent-friendly (robot mode) interfaces.

use std::io::{self, IsTerminal};

use clap::{CommandFactory, Parser};
use colored::Colorize;
use serde::Serialize;

use prn::cli::{self, Cli, Commands};
use prn::config::AppConfig;
use prn::error::{PrnError, Result};
use prn::printer::{self, BoxedSpooler, PrinterRecord};
use prn::snapshot::{reconcile, Snapshot};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    prn::logging::init_logging(cli.use_json(), cli.verbose, cli.quiet);

    // Handle no-color flag or non-TTY
    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(&cli) {
        output_error(&cli, &e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        None => print_quick_start(cli),
        Some(Commands::List(args)) => cmd_list(cli, args),
        Some(Commands::Rename(args)) => cmd_rename(cli, args),
        Some(Commands::Watch(args)) => cmd_watch(cli, args),
        Some(Commands::Config(args)) => cmd_config(cli, args),
        Some(Commands::Version) => cmd_version(cli),
        Some(Commands::Completions(args)) => cmd_completions(args),
    }
}

/// Effective config: file values overridden by global CLI flags.
fn effective_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(timeout) = cli.timeout {
        config.command_timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn open_spooler(cli: &Cli) -> Result<(BoxedSpooler, AppConfig)> {
    let config = effective_config(cli)?;
    let spooler = printer::open_spooler(config.backend, config.call_options())?;
    Ok((spooler, config))
}

// === Quick Start (Robot Mode Optimized) ===

/// Prints quick-start help optimized for both humans and AI agents.
#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn print_quick_start(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        print_robot_quick_start();
    } else {
        print_human_quick_start();
    }
    Ok(())
}

fn print_robot_quick_start() {
    let help = RobotQuickStart {
        tool: "prn",
        version: VERSION,
        description: "Windows printer inventory and rename CLI with robot mode",
        discovery: RobotDiscovery {
            list_printers: "prn list --robot",
            list_detailed: "prn list --long --robot",
            watch_changes: "prn watch --robot",
        },
        mutation: RobotMutation {
            rename: "prn rename <OLD_NAME> <NEW_NAME>",
            note: "A successful rename re-reads the directory; the reported record is the spooler's view, not an echo of the arguments",
        },
        backends: RobotBackends {
            auto: "winspool on Windows, powershell elsewhere",
            select: "--backend winspool|powershell",
        },
        output_modes: OutputModes {
            human: "--format=text (default)",
            robot: "--robot or --format=json",
            compact: "--format=json-compact",
        },
    };

    println!("{}", serde_json::to_string_pretty(&help).unwrap());
}

fn print_human_quick_start() {
    println!("{} {} - Printer CLI\n", "prn".bold().cyan(), VERSION);

    println!("{}", "QUICK START".bold().underline());
    println!();
    println!("  {}  List printers", "prn list".green());
    println!("  {}  Extended listing", "prn list --long".green());
    println!(
        "  {}  Rename a printer",
        "prn rename \"HP-1\" \"Reception\"".green()
    );
    println!("  {}  Watch for changes", "prn watch".green());
    println!();

    println!("{}", "ROBOT MODE (for scripts and agents)".bold().underline());
    println!();
    println!("  {}  JSON output", "prn --robot <command>".cyan());
    println!();

    println!("Run {} for full help", "prn --help".yellow());
}

// === Robot Mode JSON Structures ===

#[derive(Serialize)]
struct RobotQuickStart {
    tool: &'static str,
    version: &'static str,
    description: &'static str,
    discovery: RobotDiscovery,
    mutation: RobotMutation,
    backends: RobotBackends,
    output_modes: OutputModes,
}

#[derive(Serialize)]
struct RobotDiscovery {
    list_printers: &'static str,
    list_detailed: &'static str,
    watch_changes: &'static str,
}

#[derive(Serialize)]
struct RobotMutation {
    rename: &'static str,
    note: &'static str,
}

#[derive(Serialize)]
struct RobotBackends {
    auto: &'static str,
    select: &'static str,
}

#[derive(Serialize)]
struct OutputModes {
    human: &'static str,
    robot: &'static str,
    compact: &'static str,
}

// === Command Implementations ===

fn cmd_list(cli: &Cli, args: &cli::ListArgs) -> Result<()> {
    let (spooler, _) = open_spooler(cli)?;
    let records = spooler.read_printers()?;
    let snapshot = reconcile(records, &Snapshot::empty());

    if cli.use_json() {
        output_json(cli, &snapshot.records);
    } else if snapshot.is_empty() {
        println!("{}", "No printers installed".yellow());
    } else {
        print_table(&snapshot.records, args.long);
    }
    Ok(())
}

fn print_table(records: &[PrinterRecord], long: bool) {
    if long {
        println!(
            "{:<28} {:<6} {:<20} {:<20} {}",
            "NAME".bold(),
            "TYPE".bold(),
            "PORT".bold(),
            "DRIVER".bold(),
            "PREVIOUS NAME".bold()
        );
        for r in records {
            println!(
                "{:<28} {:<6} {:<20} {:<20} {}",
                r.name.green(),
                r.port_type(),
                r.port_name,
                r.driver_name,
                r.previous_name.as_deref().unwrap_or("")
            );
        }
    } else {
        println!(
            "{:<28} {:<6} {}",
            "NAME".bold(),
            "TYPE".bold(),
            "PORT".bold()
        );
        for r in records {
            println!("{:<28} {:<6} {}", r.name.green(), r.port_type(), r.port_name);
        }
    }
}

/// Outcome of a rename cycle, as reported to the user.
#[derive(Serialize)]
struct RenameReport {
    ok: bool,
    requested_name: String,
    /// The record as seen by a fresh read after the rename. Its name is
    /// authoritative; the OS may have normalized the requested one.
    record: Option<PrinterRecord>,
}

fn cmd_rename(cli: &Cli, args: &cli::RenameArgs) -> Result<()> {
    // Name preconditions are the caller's job; the backends assume them.
    if args.new_name.trim().is_empty() {
        return Err(PrnError::InvalidNewName {
            reason: "name is empty".to_string(),
        });
    }
    if args.new_name == args.old_name {
        return Err(PrnError::InvalidNewName {
            reason: "new name equals the current name".to_string(),
        });
    }

    let (spooler, _) = open_spooler(cli)?;

    // Pre-rename snapshot, so reconciliation can recover the old name.
    let before = reconcile(spooler.read_printers()?, &Snapshot::empty());

    spooler.rename_printer(&args.old_name, &args.new_name)?;

    // Unconditional re-read: the cached record has no authority over what
    // name the spooler actually accepted.
    let after = reconcile(spooler.read_printers()?, &before);
    let record = after
        .records
        .iter()
        .find(|r| r.previous_name.as_deref() == Some(args.old_name.as_str()))
        .or_else(|| after.records.iter().find(|r| r.name == args.new_name))
        .cloned();

    if cli.use_json() {
        output_json(
            cli,
            &RenameReport {
                ok: true,
                requested_name: args.new_name.clone(),
                record,
            },
        );
    } else if !cli.quiet {
        match record {
            Some(r) => println!(
                "Renamed {} {} {}",
                args.old_name.yellow(),
                "->".bold(),
                r.name.green()
            ),
            None => println!(
                "Rename accepted, but no record matching {} was found on re-read",
                args.new_name.yellow()
            ),
        }
    }
    Ok(())
}

/// One watch-cycle change event.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent {
    Renamed { from: String, to: String },
    Appeared { name: String, port: String },
    Disappeared { name: String },
    ReadFailed { message: String },
}

fn cmd_watch(cli: &Cli, args: &cli::WatchArgs) -> Result<()> {
    let (spooler, config) = open_spooler(cli)?;
    let interval = args
        .interval
        .map_or_else(|| config.watch_interval(), std::time::Duration::from_secs);

    let mut snapshot = Snapshot::empty();
    let mut cycle: u64 = 0;

    loop {
        cycle += 1;
        match spooler.read_printers() {
            Ok(records) => {
                let next = reconcile(records, &snapshot);
                for event in diff_cycle(&snapshot, &next) {
                    print_watch_event(cli, &event);
                }
                // The new snapshot wholly replaces the old one.
                snapshot = next;
            }
            Err(error) => {
                // A failed cycle keeps the prior snapshot untouched and is
                // retried on the next tick.
                print_watch_event(
                    cli,
                    &WatchEvent::ReadFailed {
                        message: error.to_string(),
                    },
                );
            }
        }

        if args.once || (args.cycles > 0 && cycle >= args.cycles) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn print_watch_event(cli: &Cli, event: &WatchEvent) {
    if cli.use_json() {
        println!("{}", serde_json::to_string(event).unwrap_or_default());
        return;
    }
    match event {
        WatchEvent::Renamed { from, to } => {
            println!("{} {} {}", from.yellow(), "->".bold(), to.green());
        }
        WatchEvent::Appeared { name, port } => {
            println!("{} {name} ({port})", "+".green().bold());
        }
        WatchEvent::Disappeared { name } => {
            println!("{} {name}", "-".red().bold());
        }
        WatchEvent::ReadFailed { message } => {
            eprintln!("{} {message}", "read failed:".red().bold());
        }
    }
}

/// Changes between two consecutive snapshots.
///
/// The first cycle (empty previous snapshot) reports nothing; it only
/// primes the baseline.
fn diff_cycle(previous: &Snapshot, next: &Snapshot) -> Vec<WatchEvent> {
    if previous.is_empty() {
        return Vec::new();
    }

    let mut events = Vec::new();
    for record in &next.records {
        if let Some(from) = &record.previous_name {
            events.push(WatchEvent::Renamed {
                from: from.clone(),
                to: record.name.clone(),
            });
        } else if !previous.records.iter().any(|p| p.name == record.name) {
            events.push(WatchEvent::Appeared {
                name: record.name.clone(),
                port: record.port_name.clone(),
            });
        }
    }
    for prior in &previous.records {
        let survived = next.records.iter().any(|r| {
            r.name == prior.name || r.previous_name.as_deref() == Some(prior.name.as_str())
        });
        if !survived {
            events.push(WatchEvent::Disappeared {
                name: prior.name.clone(),
            });
        }
    }
    events
}

#[derive(Serialize)]
struct ConfigReport {
    path: Option<String>,
    exists: bool,
    config: AppConfig,
}

fn cmd_config(cli: &Cli, args: &cli::ConfigArgs) -> Result<()> {
    let path = AppConfig::default_path();
    let exists = path.as_deref().is_some_and(std::path::Path::exists);

    if args.path {
        if let Some(p) = &path {
            println!("{}", p.display());
        }
        return Ok(());
    }

    let config = effective_config(cli)?;
    if cli.use_json() {
        output_json(
            cli,
            &ConfigReport {
                path: path.map(|p| p.display().to_string()),
                exists,
                config,
            },
        );
    } else {
        if let Some(p) = &path {
            let marker = if exists { "" } else { " (not present)" };
            println!("{}: {}{marker}", "Config file".bold(), p.display());
        }
        println!("{}: {:?}", "Backend".bold(), config.backend);
        println!("{}: {}s", "Command timeout".bold(), config.command_timeout_secs);
        println!("{}: {}s", "Watch interval".bold(), config.watch_interval_secs);
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_version(cli: &Cli) -> Result<()> {
    if cli.use_json() {
        output_json(cli, &serde_json::json!({ "tool": "prn", "version": VERSION }));
    } else {
        println!("prn {VERSION}");
    }
    Ok(())
}

#[allow(clippy::unnecessary_wraps)] // Consistent return type with other commands
fn cmd_completions(args: &cli::CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "prn", &mut io::stdout());
    Ok(())
}

// === Output Helpers ===

fn output_json<T: Serialize>(cli: &Cli, value: &T) {
    let rendered = if cli.use_compact_json() {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("JSON serialization failed: {e}"),
    }
}

fn output_error(cli: &Cli, error: &PrnError) {
    if cli.use_json() {
        let payload = serde_json::json!({
            "ok": false,
            "error": error.to_string(),
            "suggestion": error.suggestion(),
        });
        println!("{payload}");
    } else {
        eprintln!("{} {error}", "error:".red().bold());
        if let Some(suggestion) = error.suggestion() {
            eprintln!("{} {suggestion}", "hint:".yellow());
        }
    }
}
