use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use engine_logging::LogDestination;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "evalsheet",
    version,
    about = "Draft Korean student-record evaluations in bulk from keyword rows"
)]
pub struct Cli {
    /// Directory holding the session, API key and default export location.
    #[arg(long, global = true, default_value = ".")]
    pub workdir: PathBuf,

    /// Where log output goes.
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Minimum log level (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(flatten)]
    pub generator: GeneratorArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GeneratorArgs {
    /// Generation API base URL.
    #[arg(long, global = true, env = "EVALSHEET_BASE_URL")]
    pub base_url: Option<String>,

    /// Model used for generation.
    #[arg(long, global = true, env = "EVALSHEET_MODEL")]
    pub model: Option<String>,

    /// Give up on a generation request after this many seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToneArg {
    /// Noun endings (~함, ~임).
    Descriptive,
    /// Polite endings (~합니다, ~습니다).
    Formal,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the table.
    List {
        /// Also print generated text in full.
        #[arg(long)]
        full: bool,
    },
    /// Append blank rows using the current defaults.
    Add {
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Edit cells of one row.
    Set(SetArgs),
    /// Delete a row.
    Delete {
        /// One-based row number.
        row: usize,
    },
    /// Show or change the defaults applied to new and imported rows.
    Defaults {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        target_length: Option<u32>,
    },
    /// Show or change tone, custom instruction and style reference.
    Settings(SettingsArgs),
    /// Import rows from a CSV file (name, category, target length, keywords).
    Import { file: PathBuf },
    /// Export the table as CSV.
    Export {
        /// Output directory (defaults to the working directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a CSV import template.
    Template {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate evaluations.
    Generate {
        /// One-based row number.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        row: Option<usize>,
        /// Generate every row that has keywords.
        #[arg(long)]
        all: bool,
    },
    /// Manage the stored API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

impl Command {
    /// True for commands that may write the session file.
    pub fn mutates_session(&self) -> bool {
        !matches!(
            self,
            Command::List { .. }
                | Command::Export { .. }
                | Command::Template { .. }
                | Command::Key { .. }
        )
    }
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// One-based row number.
    pub row: usize,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub target_length: Option<u32>,
    #[arg(long)]
    pub keywords: Option<String>,
    /// Replace the generated text by hand.
    #[arg(long)]
    pub content: Option<String>,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[arg(long, value_enum)]
    pub tone: Option<ToneArg>,
    /// Custom instruction text.
    #[arg(long, conflicts_with_all = ["instruction_file", "reset_instruction"])]
    pub instruction: Option<String>,
    /// Read the custom instruction from a file.
    #[arg(long, conflicts_with = "reset_instruction")]
    pub instruction_file: Option<PathBuf>,
    /// Restore the built-in instruction.
    #[arg(long)]
    pub reset_instruction: bool,
    /// Style reference text.
    #[arg(long, conflicts_with_all = ["reference_file", "reference_example", "clear_reference"])]
    pub reference: Option<String>,
    /// Read the style reference from a file.
    #[arg(long, conflicts_with_all = ["reference_example", "clear_reference"])]
    pub reference_file: Option<PathBuf>,
    /// Use the built-in sample as style reference.
    #[arg(long, conflicts_with = "clear_reference")]
    pub reference_example: bool,
    /// Stop sending a style reference.
    #[arg(long)]
    pub clear_reference: bool,
}

#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Store a key (obfuscated, not encrypted).
    Set {
        key: String,
        /// Check the key against the API before saving.
        #[arg(long)]
        test: bool,
    },
    /// Show the stored key, masked.
    Show,
    /// Remove the stored key.
    Clear,
    /// Check the stored key against the API.
    Test,
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
    fn only_editing_commands_take_the_session_lock() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;
        assert!(parse(&["evalsheet", "add"]).mutates_session());
        assert!(parse(&["evalsheet", "generate", "--all"]).mutates_session());
        assert!(!parse(&["evalsheet", "list"]).mutates_session());
        assert!(!parse(&["evalsheet", "key", "show"]).mutates_session());
    }

    #[test]
    fn generate_requires_row_or_all() {
        assert!(Cli::try_parse_from(["evalsheet", "generate"]).is_err());
        assert!(Cli::try_parse_from(["evalsheet", "generate", "2", "--all"]).is_err());
        let cli = Cli::try_parse_from(["evalsheet", "generate", "--all"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Generate {
                row: None,
                all: true
            }
        ));
    }
}
