use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Computes a summary for a record from a declarative schema")]
pub struct Cli {
    /// Schema document (TOML or JSON).
    #[arg(long, env = "TALLY_SCHEMA")]
    pub schema: PathBuf,

    /// Record document (JSON).
    #[arg(long)]
    pub record: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Elements to include in JSON output. Defaults to every element.
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Locale overriding the schema's (e.g. fr-FR).
    #[arg(long)]
    pub locale: Option<String>,

    /// Optional settings file (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the log level.
    #[arg(long)]
    pub level: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Html,
}
