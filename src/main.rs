// ABOUTME: Entry point for the rollbook binary.
// ABOUTME: Parses CLI arguments, initializes tracing, opens the file-backed roster, and runs one command.

mod cli;
mod config;
mod replay;
mod terminal;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::Parser;
use rollbook_core::{Outcome, Persistence, Roster, StorageProvider, UiEvent};
use rollbook_store::FileStorage;

use crate::cli::{Cli, Command, SortKey};
use crate::config::RollbookConfig;
use crate::terminal::TerminalUi;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("ROLLBOOK_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("rollbook=info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RollbookConfig::from_env()?.with_overrides(cli.home, cli.key)?;
    let storage = FileStorage::open(config.data_dir())
        .with_context(|| format!("failed to open {}", config.data_dir().display()))?;
    let mut roster = Roster::open(Persistence::with_key(storage, config.storage_key));
    let persistence = roster.store().persistence();
    tracing::debug!(
        "using {} under key {:?}",
        persistence.provider().dir().display(),
        persistence.key()
    );

    // A script read from stdin owns it, so prompts cannot be answered there.
    let script_on_stdin =
        matches!(&cli.command, Command::Replay { path } if path.as_os_str() == "-");
    let input: Box<dyn BufRead> = if script_on_stdin {
        Box::new(io::empty())
    } else {
        Box::new(io::stdin().lock())
    };
    let mut ui = TerminalUi::new(input, io::stdout(), cli.yes);

    let outcome = match cli.command {
        Command::Add(fields) => {
            for (field, value) in fields.changes() {
                roster.dispatch(UiEvent::SetField { field, value }, &mut ui)?;
            }
            roster.dispatch(UiEvent::Submit { fields: None }, &mut ui)?
        }
        Command::Edit { target, changes } => {
            let index = index_of_roll(&roster, &target)?;
            roster.dispatch(UiEvent::Edit { index }, &mut ui)?;
            for (field, value) in changes.changes() {
                roster.dispatch(UiEvent::SetField { field, value }, &mut ui)?;
            }
            roster.dispatch(UiEvent::Submit { fields: None }, &mut ui)?
        }
        Command::Delete { roll } => {
            let index = index_of_roll(&roster, &roll)?;
            roster.dispatch(UiEvent::Delete { index }, &mut ui)?
        }
        Command::List(filters) => {
            for (field, value) in filters.criteria() {
                roster.set_filter(field, value);
            }
            roster.render(&mut ui);
            Outcome::Applied
        }
        Command::Sort { by } => {
            let event = match by {
                SortKey::Roll => UiEvent::SortByRoll,
                SortKey::Cgpa => UiEvent::SortByCgpa,
            };
            roster.dispatch(event, &mut ui)?
        }
        Command::Clear => roster.dispatch(UiEvent::ClearAll, &mut ui)?,
        Command::Replay { path } => {
            let summary = if script_on_stdin {
                let script = io::stdin().lock();
                replay::replay(&mut roster, &mut ui, script, &mut io::stderr())?
            } else {
                let file = File::open(&path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                let script = BufReader::new(file);
                replay::replay(&mut roster, &mut ui, script, &mut io::stderr())?
            };
            if summary.failed > 0 {
                bail!("{} event(s) were rejected", summary.failed);
            }
            Outcome::Applied
        }
    };

    if outcome == Outcome::Declined {
        eprintln!("cancelled");
    }
    Ok(())
}

/// Row index of the student with `roll`, compared as text after trimming.
fn index_of_roll<S: StorageProvider>(roster: &Roster<S>, roll: &str) -> anyhow::Result<usize> {
    match roster.store().position_of_roll(roll.trim()) {
        Some(index) => Ok(index),
        None => bail!("no student with roll {:?}", roll),
    }
}
