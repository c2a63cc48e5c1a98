//! Implementation of `bookgraph tree <file> <root>`.
//!
//! Output (human mode): the tree as indented ids.
//! Output (JSON mode): the tree object, including its `nodes` visit list.
//!
//! Exit codes: 0 = success, 1 = no tree rooted at the id, 2 = input failure.
use super::{CliBook, stdout_error, write_json, write_tree};
use crate::OutputFormat;
use crate::error::CliError;

/// Runs the `tree` command.
pub fn run(book: &CliBook, source: &str, root: &str, format: OutputFormat) -> Result<(), CliError> {
    let tree = book
        .tree(&root.to_owned())
        .map_err(|e| CliError::from_book(source, e))?
        .ok_or_else(|| CliError::TreeNotFound {
            root: root.to_owned(),
        })?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => write_tree(&mut out, &tree),
        OutputFormat::Json => write_json(&mut out, &tree),
    }
    .map_err(stdout_error)
}
