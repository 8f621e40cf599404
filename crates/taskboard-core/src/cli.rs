use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use taskboard_shared::BoardColumn;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskboard",
    version,
    about = "Taskboard: kanban board client for the task REST backend",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "taskboardrc")]
    pub taskboardrc: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every column with its cards
    Board,
    /// Show the details of one task
    Show { id: String },
    /// Move a task to another column (`done` or `done-box`)
    Move {
        id: String,
        #[arg(value_parser = parse_column)]
        column: BoardColumn,
    },
    /// Create a task
    Add(AddArgs),
    /// Change fields, assignees or priority of a task
    Edit(EditArgs),
    /// Delete a task; without --yes only the confirmation is shown
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    #[command(subcommand)]
    Subtask(SubtaskCommand),
    /// List the accounts tasks can be assigned to
    Accounts,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct AddArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// YYYY-MM-DD
    #[arg(long, default_value = "")]
    pub due: String,
    /// technicalTask or userStory
    #[arg(long, default_value = "")]
    pub category: String,
    #[arg(long, default_value = "medium")]
    pub priority: String,
    #[arg(long = "subtask", action = ArgAction::Append)]
    pub subtasks: Vec<String>,
    /// Account id, repeatable
    #[arg(long = "assign", action = ArgAction::Append)]
    pub assign: Vec<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    #[arg(long = "assign", action = ArgAction::Append)]
    pub assign: Vec<String>,
    #[arg(long = "unassign", action = ArgAction::Append)]
    pub unassign: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SubtaskCommand {
    Add { id: String, text: String },
    Rename { id: String, index: usize, text: String },
    Remove { id: String, index: usize },
    Toggle { id: String, index: usize },
}

fn parse_column(value: &str) -> Result<BoardColumn, String> {
    BoardColumn::from_box_id(value).ok_or_else(|| {
        format!("unknown column '{value}' (todo, in-progress, awaiting-feedback, done)")
    })
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls positional `rc.key=value` / `rc.key:value` overrides out of the
/// argument list before clap sees it.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = rest.split_once('=').or_else(|| rest.split_once(':'));
            if let Some((k, v)) = parsed {
                debug!(key = %k, value = %v, "captured positional rc override");
                overrides.push((format!("rc.{k}"), v.to_string()));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

/// The explicit command, or `default.command` from the rc file.
pub fn resolve_command(cfg: &Config, command: Option<Command>) -> anyhow::Result<Command> {
    if let Some(command) = command {
        return Ok(command);
    }

    let name = cfg
        .get("default.command")
        .unwrap_or_else(|| "board".to_string());
    debug!(command = %name, "no explicit command, using default");
    match name.trim() {
        "board" => Ok(Command::Board),
        "accounts" => Ok(Command::Accounts),
        other => Err(anyhow!(
            "default.command must be 'board' or 'accounts', got: {other}"
        )),
    }
}
