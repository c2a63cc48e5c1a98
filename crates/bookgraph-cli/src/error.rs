/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `bookgraph` binary. Every
/// variant maps to a stable exit code (1 or 2) via [`CliError::exit_code`]:
///
/// - Exit code **2**: input failure. The relations could not be read or
///   parsed, or the cache directory is unusable.
/// - Exit code **1**: logical failure. The forest was built but the
///   requested tree or node is not in it.
use std::fmt;
use std::path::PathBuf;

use bookgraph_core::{BookError, CacheError, SourceError};

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions that the `bookgraph` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// The process lacks permission to read a file.
    PermissionDenied {
        /// The path that could not be read.
        path: PathBuf,
    },

    /// The input exceeds the configured `--max-file-size` limit.
    FileTooLarge {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The configured size limit in bytes.
        limit: u64,
        /// The actual size in bytes (disk files only).
        actual: Option<u64>,
    },

    /// The input bytes are not valid UTF-8.
    InvalidUtf8 {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// The byte offset of the first invalid byte sequence.
        byte_offset: usize,
    },

    /// An I/O error occurred while reading from stdin.
    StdinReadError {
        /// The underlying I/O error message.
        detail: String,
    },

    /// A generic I/O error not covered by the more specific variants above.
    IoError {
        /// What was being read or written.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The input is not a JSON array of relations.
    MalformedRelations {
        /// `"-"` for stdin, or the filesystem path.
        source: String,
        /// What was wrong with it.
        detail: String,
    },

    /// The cache directory could not be created, read or written.
    CacheUnavailable {
        /// The underlying cache error message.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// No tree is rooted at the requested id.
    TreeNotFound {
        /// The requested root id.
        root: String,
    },

    /// The requested node is not reached from any root.
    NodeNotFound {
        /// The requested node id.
        node: String,
    },
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. }
            | Self::PermissionDenied { .. }
            | Self::FileTooLarge { .. }
            | Self::InvalidUtf8 { .. }
            | Self::StdinReadError { .. }
            | Self::IoError { .. }
            | Self::MalformedRelations { .. }
            | Self::CacheUnavailable { .. } => 2,

            Self::TreeNotFound { .. } | Self::NodeNotFound { .. } => 1,
        }
    }

    /// Returns a human-readable error message suitable for printing to stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::PermissionDenied { path } => {
                format!("error: permission denied: {}", path.display())
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: Some(actual),
            } => {
                format!("error: file too large: {source} is {actual} bytes, limit is {limit} bytes")
            }
            Self::FileTooLarge {
                source,
                limit,
                actual: None,
            } => {
                format!("error: file too large: {source} exceeded limit of {limit} bytes")
            }
            Self::InvalidUtf8 {
                source,
                byte_offset,
            } => {
                format!(
                    "error: invalid UTF-8 in {source}: first invalid byte at offset {byte_offset}"
                )
            }
            Self::StdinReadError { detail } => {
                format!("error: failed to read stdin: {detail}")
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error on {source}: {detail}")
            }
            Self::MalformedRelations { source, detail } => {
                format!("error: malformed relations in {source}: {detail}")
            }
            Self::CacheUnavailable { detail } => {
                format!("error: cache unavailable: {detail}")
            }
            Self::TreeNotFound { root } => {
                format!("error: no tree rooted at {root:?}")
            }
            Self::NodeNotFound { node } => {
                format!("error: node {node:?} is not reached from any root")
            }
        }
    }

    /// Maps a [`BookError`] raised while loading relations from `source`.
    pub fn from_book(source: &str, e: BookError) -> Self {
        match e {
            BookError::Source(SourceError::Malformed { detail })
            | BookError::Source(SourceError::Unavailable { detail }) => Self::MalformedRelations {
                source: source.to_owned(),
                detail,
            },
            BookError::Cache(e) => Self::from(e),
        }
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        Self::CacheUnavailable {
            detail: e.to_string(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
