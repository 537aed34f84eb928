use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::input::InputFormat;

#[derive(Parser)]
#[command(
    name = "kbase",
    version,
    about = "Knowledge base of source files across repositories, served to AI agents over MCP",
    after_help = "Every command prints one JSON object on stdout. Logs go to stderr \
                  (set RUST_LOG or logging.level in .kb/config.toml)."
)]
pub struct Cli {
    /// Database file (default: .kb/knowledge.db in the current directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .kb/ with the database and a default config.toml
    Init,

    /// Index file knowledge from a JSON or YAML document.
    ///
    /// The document is either one record or an array of records. An array is
    /// indexed record by record; failures are counted and listed.
    Index {
        /// Input file, or "-" for stdin
        input: String,
        /// Input format (default: by file extension, YAML for stdin)
        #[arg(long, value_enum, default_value = "auto")]
        format: InputFormat,
    },

    /// Case-insensitive search over summaries, key elements and tags
    Search {
        /// Search text
        query: String,
        /// Restrict to a file type (repeatable)
        #[arg(long = "file-type")]
        file_types: Vec<String>,
        /// Restrict to a technology (repeatable)
        #[arg(long = "technology")]
        technologies: Vec<String>,
        /// Restrict to a repository (repeatable)
        #[arg(long = "repo")]
        repos: Vec<String>,
        /// Keep records with at least one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Maximum number of results (default 10, max 100)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show the stored record for one path
    Context {
        /// Exact file path
        path: String,
    },

    /// Other files in the same repository
    Related {
        /// File path
        path: String,
        /// Maximum number of results (default 10, max 50)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List files of one type
    ByType {
        /// File type
        file_type: String,
        /// Restrict to a repository
        #[arg(long)]
        repo: Option<String>,
        /// Maximum number of results (default 50, max 100)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Aggregate statistics
    Stats,

    /// Dependencies and dependents of a file
    Deps {
        /// File path
        path: String,
        /// Hops to follow along stored edges
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Check that the store answers queries
    Health,

    /// Start the MCP server on stdio
    Mcp,
}

impl Command {
    /// Operation name reported in error output.
    #[must_use]
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Index { .. } => "index",
            Self::Search { .. } => "search_knowledge",
            Self::Context { .. } => "get_file_context",
            Self::Related { .. } => "find_related",
            Self::ByType { .. } => "search_by_type",
            Self::Stats => "get_stats",
            Self::Deps { .. } => "analyze_dependencies",
            Self::Health => "health",
            Self::Mcp => "mcp",
        }
    }
}
