//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::person::NewPerson;
use crate::query::SearchFilter;

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Host or address to bind (overrides configuration)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides configuration)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Get command arguments.
#[derive(Debug, Args)]
pub struct GetCommand {
    /// Id of the person
    #[arg(allow_negative_numbers = true)]
    pub id: i64,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Only people of exactly this age
    #[arg(short, long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    /// Name to match approximately
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl SearchCommand {
    /// The search filter described by these arguments.
    #[must_use]
    pub fn filter(&self) -> SearchFilter {
        SearchFilter {
            age: self.age,
            name: self.name.clone(),
        }
    }
}

/// Fields of a person given on the command line.
#[derive(Debug, Args)]
pub struct PersonArgs {
    /// Name of the person
    #[arg(long)]
    pub name: String,

    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Gender label
    #[arg(long)]
    pub gender: String,
}

impl From<PersonArgs> for NewPerson {
    fn from(args: PersonArgs) -> Self {
        NewPerson::new(args.name, args.age, args.gender)
    }
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// The new person
    #[command(flatten)]
    pub person: PersonArgs,
}

/// Replace command arguments.
#[derive(Debug, Args)]
pub struct ReplaceCommand {
    /// Id of the person to replace
    #[arg(allow_negative_numbers = true)]
    pub id: i64,

    /// The replacement fields
    #[command(flatten)]
    pub person: PersonArgs,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the person to delete
    #[arg(allow_negative_numbers = true)]
    pub id: i64,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output, one person per line
    #[default]
    Plain,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_person_args_into_new_person() {
        let args = PersonArgs {
            name: "Bob".to_string(),
            age: 30,
            gender: "M".to_string(),
        };
        assert_eq!(NewPerson::from(args), NewPerson::new("Bob", 30, "M"));
    }

    #[test]
    fn test_search_command_filter() {
        let cmd = SearchCommand {
            age: Some(5),
            name: Some("Jon".to_string()),
            format: OutputFormat::Json,
        };
        assert_eq!(cmd.filter(), SearchFilter::by_name("Jon").with_age(5));
    }

    #[test]
    fn test_search_command_without_filters() {
        let cmd = SearchCommand {
            age: None,
            name: None,
            format: OutputFormat::Plain,
        };
        assert!(cmd.filter().is_empty());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
