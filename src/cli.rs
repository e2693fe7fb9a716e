// ABOUTME: Command-line surface of rollbook, parsed with clap derive.
// ABOUTME: Each subcommand maps onto one or more roster UI events.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rollbook_core::{FilterField, FormField};

#[derive(Debug, Parser)]
#[command(name = "rollbook", version, about = "Manage student records from the terminal")]
pub struct Cli {
    /// Data directory root (overrides ROLLBOOK_HOME)
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Storage key of the roster (overrides ROLLBOOK_STORAGE_KEY)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a student
    Add(FieldArgs),
    /// Edit the student with the given roll; only the given fields change
    Edit {
        #[arg(value_name = "ROLL")]
        target: String,
        #[command(flatten)]
        changes: FieldArgs,
    },
    /// Delete the student with the given roll
    Delete { roll: String },
    /// Show students, optionally filtered
    List(FilterArgs),
    /// Reorder the stored roster
    Sort {
        #[arg(value_enum)]
        by: SortKey,
    },
    /// Remove every student
    Clear,
    /// Dispatch a JSON-lines script of UI events ("-" reads stdin)
    Replay { path: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Roll number, ascending
    Roll,
    /// CGPA, descending
    Cgpa,
}

#[derive(Debug, Default, Args)]
pub struct FieldArgs {
    #[arg(long)]
    pub roll: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub department: Option<String>,
    #[arg(long)]
    pub semester: Option<String>,
    /// Leave empty ("") for no CGPA
    #[arg(long)]
    pub cgpa: Option<String>,
}

impl FieldArgs {
    /// The form fields given on the command line.
    pub fn changes(self) -> Vec<(FormField, String)> {
        [
            (FormField::Roll, self.roll),
            (FormField::Name, self.name),
            (FormField::Department, self.department),
            (FormField::Semester, self.semester),
            (FormField::Cgpa, self.cgpa),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Exact roll number
    #[arg(long)]
    pub roll: Option<String>,
    /// Case-insensitive part of the name
    #[arg(long)]
    pub name: Option<String>,
    /// Exact department
    #[arg(long)]
    pub department: Option<String>,
    /// Exact semester
    #[arg(long)]
    pub semester: Option<String>,
}

impl FilterArgs {
    pub fn criteria(self) -> Vec<(FilterField, String)> {
        [
            (FilterField::Roll, self.roll),
            (FilterField::Name, self.name),
            (FilterField::Department, self.department),
            (FilterField::Semester, self.semester),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}
