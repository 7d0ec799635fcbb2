use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a rendered statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// The full statement as pretty JSON
    #[default]
    Json,
    /// SQL on the first line, arguments on the second
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "qsql")]
#[command(about = "qsql - render SQL templates against JSON parameters")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine settings file (TOML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render a template and print the statement
    Render(RenderArgs),

    /// Compile a template and report syntax errors
    Check {
        /// Template file
        #[arg(short, long)]
        template: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Template file
    #[arg(short, long)]
    pub template: PathBuf,

    /// Parameter JSON file
    #[arg(short, long, conflicts_with = "json")]
    pub params: Option<PathBuf>,

    /// Inline parameter JSON
    #[arg(short, long)]
    pub json: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Exit with an error if diagnostics or validator errors were reported
    #[arg(long)]
    pub strict: bool,
}
