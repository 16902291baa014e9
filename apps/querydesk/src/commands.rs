//! Typed commands for the terminal front end and their controller events.

use std::path::{Path, PathBuf};

use anyhow::Context;
use controller::{Event, IncomingFile};
use shared::domain::ZoneId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Run,
    Random,
    Drop { zone: ZoneId, paths: Vec<PathBuf> },
    Pick(PathBuf),
    Sample(String),
    Tables,
    Remove(String),
    ExportResults,
    ExportTable(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command ':{0}' (try :help)")]
    Unknown(String),
    #[error(":{command} needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("{0}")]
    UnknownZone(String),
}

pub const HELP: &str = "\
<question>               ask in plain language
:run                     submit the current input again
:random                  suggest a question
:drop <zone> <path>...   drop files on query|tables|modal
:pick <path>             upload through the file picker
:sample <id>             load users|products|events
:tables                  list tables
:remove <table>          remove a table (asks y/n)
:export [table]          export the last results or a table
:quit";

pub const BUSY: &str = "busy: still working on the last question; input ignored";

impl Command {
    /// Commands that replace the query text, which the controller ignores
    /// while a query is debouncing or running.
    pub fn edits_input(&self) -> bool {
        matches!(self, Command::Ask(_))
    }

    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Ask(line.to_string()));
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let args: Vec<&str> = words.collect();

        let command = match name {
            "run" => Command::Run,
            "random" => Command::Random,
            "drop" => {
                let (zone, paths) = args.split_first().ok_or(CommandError::MissingArgument {
                    command: "drop",
                    argument: "a zone",
                })?;
                let zone = zone.parse().map_err(CommandError::UnknownZone)?;
                Command::Drop {
                    zone,
                    paths: paths.iter().map(PathBuf::from).collect(),
                }
            }
            "pick" => Command::Pick(PathBuf::from(required(&args, "pick", "a path")?)),
            "sample" => Command::Sample(required(&args, "sample", "a sample id")?.to_string()),
            "tables" => Command::Tables,
            "remove" => Command::Remove(required(&args, "remove", "a table name")?.to_string()),
            "export" => match args.first() {
                Some(table) => Command::ExportTable(table.to_string()),
                None => Command::ExportResults,
            },
            "help" => Command::Help,
            "quit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn required<'a>(
    args: &[&'a str],
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, CommandError> {
    args.first()
        .copied()
        .ok_or(CommandError::MissingArgument { command, argument })
}

/// Reads any files the command names. `Tables`, `Help` and `Quit` are handled
/// by the caller and map to no events.
pub async fn into_events(command: Command) -> anyhow::Result<Vec<Event>> {
    let events = match command {
        Command::Ask(text) => vec![Event::InputChanged(text), Event::SubmitClicked],
        Command::Run => vec![Event::SubmitClicked],
        Command::Random => vec![Event::RandomQueryClicked],
        Command::Drop { zone, paths } => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(read_file(path).await?);
            }
            vec![Event::DragOver(zone), Event::Dropped { zone, files }]
        }
        Command::Pick(path) => vec![Event::FilePicked(read_file(&path).await?)],
        Command::Sample(id) => vec![Event::SampleRequested(id)],
        Command::Remove(table) => vec![Event::RemoveTableClicked(table)],
        Command::ExportResults => vec![Event::ExportResultsClicked],
        Command::ExportTable(table) => vec![Event::ExportTableClicked(table)],
        Command::Tables | Command::Help | Command::Quit => Vec::new(),
    };
    Ok(events)
}

async fn read_file(path: &Path) -> anyhow::Result<IncomingFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(IncomingFile::new(name, bytes))
}

/// `y`/`yes` confirms; anything else declines.
pub fn confirmation(answer: &str, table: String) -> Event {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Event::RemovalConfirmed(table),
        _ => Event::RemovalDeclined(table),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
