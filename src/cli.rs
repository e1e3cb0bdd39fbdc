use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse, normalize and edit GMP entity filter strings
///
/// Wherever a FILTER is expected, `@name` refers to a saved filter from the
/// config file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file with default and saved filters
    #[arg(short, long, global = true, env = "GMP_FILTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'F', long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// When to use colors
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    /// Do not merge the configured default meta keywords into the input
    #[arg(long, global = true)]
    pub no_defaults: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PageAction {
    First,
    Next,
    Previous,
    All,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the canonical form of a filter
    Normalize {
        /// Filter string or @saved-name
        filter: String,
    },
    /// Show the terms of a filter
    Parse {
        /// Filter string or @saved-name
        filter: String,
    },
    /// Print the value of a keyword
    Get {
        /// Filter string or @saved-name
        filter: String,
        /// Keyword to read
        keyword: String,
    },
    /// Set a keyword and print the resulting filter
    Set {
        /// Filter string or @saved-name
        filter: String,
        /// Keyword to set
        keyword: String,
        /// New value
        value: String,
        /// Relation between keyword and value: = ~ > <
        #[arg(short, long, default_value = "=")]
        relation: String,
        /// Remove existing terms for a repeatable keyword first
        #[arg(long)]
        replace: bool,
    },
    /// Remove every term for a keyword
    Delete {
        /// Filter string or @saved-name
        filter: String,
        /// Keyword to remove
        keyword: String,
    },
    /// AND one or more filters into the first one
    Merge {
        /// Base filter string or @saved-name
        filter: String,
        /// Filters to merge in, later ones win for meta keywords
        #[arg(required = true)]
        others: Vec<String>,
    },
    /// Check whether a filter already contains a term
    Contains {
        /// Filter string or @saved-name
        filter: String,
        /// A single term, e.g. 'text~"foo bar"'
        term: String,
    },
    /// Change the sort order
    Sort {
        /// Filter string or @saved-name
        filter: String,
        /// Field to sort by
        #[arg(required_unless_present = "clear")]
        field: Option<String>,
        /// Sort descending
        #[arg(short, long)]
        reverse: bool,
        /// Remove any sorting
        #[arg(long, conflicts_with_all = ["field", "reverse"])]
        clear: bool,
    },
    /// Move between result pages
    Page {
        /// Filter string or @saved-name
        filter: String,
        #[arg(value_enum)]
        action: PageAction,
    },
    /// Show which terms differ between two filters
    Diff {
        /// First filter string or @saved-name
        filter1: String,
        /// Second filter string or @saved-name
        filter2: String,
    },
    /// List the saved filters from the config file
    Saved,
}

impl Cli {
    /// Log level directive used when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
