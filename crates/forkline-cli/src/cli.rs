use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use forkline_history::{EditHistory, HistoryConfig};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, Result};
use crate::render::{outcome_line, summary};
use crate::script;

#[derive(Debug, Parser)]
#[command(
    name = "forkline",
    about = "Replay edit-history scripts and inspect the resulting branches",
    version
)]
pub struct Cli {
    /// Log history events to stderr (-v debug, -vv trace). Defaults to RUST_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply a script of history operations and print the result.
    Replay(ReplayArgs),

    /// Print the default history config as TOML.
    #[command(name = "default-config")]
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Script file, or `-` for stdin.
    pub script: PathBuf,

    /// Per-branch entry cap (0 = unlimited). Overrides the config file.
    #[arg(long, conflicts_with = "unbounded")]
    pub max_entries: Option<usize>,

    /// Keep every entry. Overrides the config file.
    #[arg(long)]
    pub unbounded: bool,

    /// TOML or JSON config file (by extension; TOML otherwise).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Payload of the root branch's seed entry.
    #[arg(long, default_value = "")]
    pub initial: String,

    /// Print the final history as JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => {
            print!("{}", replay(&args)?);
            Ok(())
        }
        Commands::DefaultConfig => {
            print!("{}", HistoryConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("forkline=debug"),
        _ => EnvFilter::new("forkline=trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run a replay and return everything it would print.
pub fn replay(args: &ReplayArgs) -> Result<String> {
    let config = resolve_config(args)?;
    let source = read_script(&args.script)?;
    let lines = script::parse(&source)?;

    let mut history = EditHistory::with_config(args.initial.clone(), config)?;
    let mut out = String::new();
    for line in lines {
        let label = line.op.clone();
        let outcome = history
            .apply(line.op)
            .map_err(|source| CliError::History {
                line: line.line,
                source,
            })?;
        tracing::debug!(line = line.line, op = label.name(), ?outcome, "script op applied");
        if !args.json {
            out.push_str(&outcome_line(line.line, &label, outcome));
            out.push('\n');
        }
    }

    if args.json {
        out.push_str(&serde_json::to_string_pretty(&history)?);
        out.push('\n');
    } else {
        out.push('\n');
        out.push_str(&summary(&history));
    }
    Ok(out)
}

fn resolve_config(args: &ReplayArgs) -> Result<HistoryConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => HistoryConfig::default(),
    };
    if args.unbounded {
        config.max_entries = 0;
    } else if let Some(max_entries) = args.max_entries {
        config.max_entries = max_entries;
    }
    Ok(config)
}

fn load_config(path: &Path) -> Result<HistoryConfig> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        HistoryConfig::from_json_file(path)?
    } else {
        HistoryConfig::from_toml_file(path)?
    };
    Ok(config)
}

fn read_script(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return Ok(std::io::read_to_string(std::io::stdin())?);
    }
    Ok(std::fs::read_to_string(path)?)
}
