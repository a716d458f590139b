//! CLI argument definitions and command dispatch.

use clap::{Parser, Subcommand, ValueEnum};

use crate::printer::Backend;

/// Printer CLI - list and rename Windows printers from the terminal.
///
/// Robot Mode: Use --robot or --format=json for machine-parseable output.
#[derive(Parser, Debug)]
#[command(name = "prn", version, about, long_about = None)]
#[command(propagate_version = true)]
#[allow(clippy::struct_excessive_bools)] // CLI flags naturally use multiple bools
pub struct Cli {
    /// Output format (text for humans, json for agents/scripts)
    #[arg(
        long,
        short = 'f',
        default_value = "text",
        global = true,
        env = "PRN_FORMAT"
    )]
    pub format: OutputFormat,

    /// Robot mode: equivalent to --format=json (optimized for AI agents)
    #[arg(long, global = true)]
    pub robot: bool,

    /// Verbose output (repeat for more detail)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Spooler backend to talk through
    #[arg(long, short = 'b', global = true, env = "PRN_BACKEND")]
    pub backend: Option<Backend>,

    /// Timeout for spawned commands, in seconds
    #[arg(long, global = true, env = "PRN_TIMEOUT")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format selection.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text with optional color
    #[default]
    Text,
    /// JSON output for scripts and agents
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

impl Cli {
    /// Returns true if output should be JSON (robot mode or explicit --format=json).
    pub const fn use_json(&self) -> bool {
        self.robot || matches!(self.format, OutputFormat::Json | OutputFormat::JsonCompact)
    }

    /// Returns true if output should be compact JSON.
    pub const fn use_compact_json(&self) -> bool {
        matches!(self.format, OutputFormat::JsonCompact)
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    // === Directory ===
    /// List installed printers
    List(ListArgs),

    /// Rename a printer, then re-read and reconcile
    Rename(RenameArgs),

    /// Poll the printer directory and report changes
    Watch(WatchArgs),

    // === Configuration ===
    /// Show effective configuration
    Config(ConfigArgs),

    // === Utilities ===
    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// === Argument Structs ===

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show extended details (driver, classified port type)
    #[arg(long, short = 'l')]
    pub long: bool,
}

#[derive(Parser, Debug)]
pub struct RenameArgs {
    /// Current printer name
    pub old_name: String,

    /// New printer name (non-empty, must differ from the current name)
    pub new_name: String,
}

#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Poll interval in seconds
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,

    /// Run a single poll cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Maximum number of cycles (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub cycles: u64,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show the config file path only
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn robot_flag_implies_json() {
        let cli = Cli::parse_from(["prn", "--robot", "list"]);
        assert!(cli.use_json());
    }

    #[test]
    fn compact_format_parses() {
        let cli = Cli::parse_from(["prn", "--format", "json-compact", "list"]);
        assert!(cli.use_json());
        assert!(cli.use_compact_json());
    }

    #[test]
    fn backend_flag_parses() {
        let cli = Cli::parse_from(["prn", "--backend", "powershell", "list"]);
        assert_eq!(cli.backend, Some(Backend::Powershell));
    }

    #[test]
    fn rename_takes_two_names() {
        let cli = Cli::parse_from(["prn", "rename", "HP-1", "Reception-Printer"]);
        match cli.command {
            Some(Commands::Rename(args)) => {
                assert_eq!(args.old_name, "HP-1");
                assert_eq!(args.new_name, "Reception-Printer");
            }
            other => panic!("expected rename, got {other:?}"),
        }
    }
}
