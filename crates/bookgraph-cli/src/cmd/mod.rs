/// Command modules for the `bookgraph` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes an opened [`CliBook`] and the parsed arguments and returns
/// `Ok(())` on success or a [`CliError`] on failure.
pub mod rebuild;
pub mod roots;
pub mod tree;
pub mod trees;

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bookgraph_core::{Book, CacheStore, MemoryStore, TreeNode};
use serde::Serialize;

use crate::PathOrStdin;
use crate::error::CliError;
use crate::io::read_input;
use crate::relations::JsonRelations;
use crate::store::FileStore;

/// Shared store handle: a [`FileStore`] or a [`MemoryStore`].
pub type SharedStore = Arc<dyn CacheStore + Send + Sync>;

/// The [`Book`] every subcommand queries.
pub type CliBook = Book<String, JsonRelations, SharedStore>;

/// Reads `file` and opens a book over it.
///
/// With `cache_dir` the build is cached on disk and shared between
/// invocations; without it an in-memory store lives for this command only.
///
/// # Errors
///
/// Exit code 2 if the file cannot be read or the cache directory cannot be
/// created.
pub fn open_book(
    file: &PathOrStdin,
    max_file_size: u64,
    cache_dir: Option<&Path>,
) -> Result<CliBook, CliError> {
    let text = read_input(file, max_file_size)?;
    let store: SharedStore = match cache_dir {
        Some(dir) => Arc::new(FileStore::open(dir)?),
        None => Arc::new(MemoryStore::new()),
    };
    Ok(Book::new(JsonRelations::new(text), store))
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Writes `tree` as indented ids, two spaces per level.
pub(crate) fn write_tree<W: Write>(w: &mut W, tree: &TreeNode<String>) -> std::io::Result<()> {
    for (depth, node) in tree.walk() {
        writeln!(w, "{:indent$}{}", "", node.id(), indent = depth * 2)?;
    }
    Ok(())
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(
    w: &mut W,
    value: &T,
) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    writeln!(w, "{json}")
}

/// Converts a stdout write failure into a [`CliError`].
pub(crate) fn stdout_error(e: std::io::Error) -> CliError {
    CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    }
}
