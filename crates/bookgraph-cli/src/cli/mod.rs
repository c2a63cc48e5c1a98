//! Clap CLI definition: root struct, subcommands, and shared argument types.
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
///
/// Parsing `"-"` yields [`PathOrStdin::Stdin`]; anything else yields
/// [`PathOrStdin::Path`].
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

impl PathOrStdin {
    /// Label used in error messages: `"-"` for stdin, otherwise the path.
    pub fn label(&self) -> String {
        match self {
            PathOrStdin::Stdin => "-".to_owned(),
            PathOrStdin::Path(path) => path.display().to_string(),
        }
    }
}

/// Output format for CLI commands.
///
/// `Human` emits indented trees and `node: roots` lines to stdout.
/// `Json` emits a single pretty-printed JSON document.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default).
    Human,
    /// Structured JSON output.
    Json,
}

/// All top-level subcommands exposed by the `bookgraph` binary.
///
/// Every subcommand reads a JSON array of relations. Each relation is either
/// a `[parent, child]` pair or a `{"id": parent, "child_id": child}` row.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the forest of trees, one per root.
    Trees {
        /// Path to a relations file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Only print the tree rooted at this id (repeatable).
        #[arg(long = "root", value_name = "ID")]
        roots: Vec<String>,
    },

    /// Print the tree rooted at a single id.
    Tree {
        /// Path to a relations file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// The root id.
        #[arg(value_name = "ROOT")]
        root: String,
    },

    /// Print the roots reaching every node, or a single node.
    Roots {
        /// Path to a relations file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
        /// Only print the roots of this node.
        #[arg(value_name = "NODE")]
        node: Option<String>,
    },

    /// Rebuild the forest from the file, replacing any cached result.
    Rebuild {
        /// Path to a relations file, or `-` for stdin.
        #[arg(value_name = "FILE")]
        file: PathOrStdin,
    },
}

/// Root CLI struct for the `bookgraph` binary.
///
/// All global flags are defined here and marked `global = true` so that clap
/// propagates them to every subcommand.
#[derive(Parser)]
#[command(
    name = "bookgraph",
    version,
    about = "Build and query forests of parent/child relations",
    long_about = "Builds one tree per root from a list of parent/child relations,\n\
                  rejecting any root whose subtree contains a cycle, and answers\n\
                  tree and roots queries from a cached result."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors to stderr (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log build stages and cache activity to stderr (incompatible with
    /// `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input file size in bytes.
    ///
    /// Can also be set via the `BOOKGRAPH_MAX_FILE_SIZE` environment variable.
    /// The CLI flag takes precedence over the environment variable.
    /// Default: 268435456 (256 MB).
    #[arg(
        long,
        global = true,
        env = "BOOKGRAPH_MAX_FILE_SIZE",
        default_value = "268435456"
    )]
    pub max_file_size: u64,

    /// Directory holding the cached build.
    ///
    /// Can also be set via the `BOOKGRAPH_CACHE_DIR` environment variable.
    /// Without it the build is kept in memory for the duration of the
    /// command only.
    #[arg(long, global = true, env = "BOOKGRAPH_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

impl Cli {
    /// The default tracing filter implied by `--quiet` / `--verbose`.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests;
