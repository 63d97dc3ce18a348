use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docnav")]
#[command(version)]
#[command(about = "Search and navigate the sidebar of a static documentation page")]
#[command(
    long_about = "docnav - Incremental filtering for documentation navigation trees.\n\n\
    Launch without flags for an interactive search view: every keystroke re-filters the\n\
    category/section/entry tree. Use flags for CLI mode to print the index or run a single query.\n\n\
    Examples:\n  \
    docnav index.html                  # Interactive search\n  \
    docnav --tree index.html           # Show the indexed tree\n  \
    docnav -q setup:install index.html # Visible nodes for one query\n  \
    docnav -q vec -o json index.html   # Same, as JSON with inline styles"
)]
pub struct Cli {
    /// HTML documentation page containing the navigation sidebar
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Show the indexed navigation tree (non-interactive)
    #[arg(long = "tree")]
    pub tree: bool,

    /// Run one query and print the nodes left visible (non-interactive)
    ///
    /// The query is lowercased and ':' is treated as '.', so `setup:install`
    /// and `setup.install` are equivalent. Queries shorter than the minimum
    /// length reset the tree to its idle state.
    #[arg(short = 'q', long = "query", value_name = "QUERY")]
    pub query: Option<String>,

    /// Output format for --tree and --query
    ///
    ///   plain - Indented list with expand markers (default)
    ///   json  - Visible nodes with their visual state
    ///   tree  - Box-drawing tree structure
    #[arg(short = 'o', long = "output", default_value = "plain")]
    pub output: OutputFormat,

    /// Exclude a category from indexing (repeatable, added to the config skip-list)
    #[arg(long = "skip", value_name = "CATEGORY")]
    pub skip: Vec<String>,

    /// Minimum query length before searching
    #[arg(long = "min-query-len", value_name = "N")]
    pub min_query_len: Option<usize>,

    /// Disable disclosure transitions in the interactive view
    #[arg(long = "no-animation")]
    pub no_animation: bool,

    /// Use this config file instead of the default location
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long = "print-config")]
    pub print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
    /// Tree format with box-drawing
    Tree,
}

impl Cli {
    pub fn is_interactive(&self) -> bool {
        !self.tree && self.query.is_none() && !self.print_config
    }
}
