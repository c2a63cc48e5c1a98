//! Implementation of `bookgraph trees <file> [--root <id>]...`.
//!
//! Prints every tree of the forest in root order, or only the trees rooted
//! at the given ids. Ids without a tree are silently left out.
//!
//! Output (human mode): each tree as indented ids, trees separated by a
//! blank line.
//! Output (JSON mode): the forest object `{"<root>": {"id": .., ...}}`.
//!
//! Exit codes: 0 = success (even if nothing matched), 2 = input failure.
use std::io::Write;

use bookgraph_core::Forest;

use super::{CliBook, stdout_error, write_json, write_tree};
use crate::OutputFormat;
use crate::error::CliError;

/// Runs the `trees` command.
pub fn run(
    book: &CliBook,
    source: &str,
    roots: &[String],
    format: OutputFormat,
) -> Result<(), CliError> {
    let filter = if roots.is_empty() { None } else { Some(roots) };
    let forest = book
        .trees(filter)
        .map_err(|e| CliError::from_book(source, e))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => print_human(&mut out, &forest),
        OutputFormat::Json => write_json(&mut out, &forest),
    }
    .map_err(stdout_error)
}

fn print_human<W: Write>(w: &mut W, forest: &Forest<String>) -> std::io::Result<()> {
    for (i, tree) in forest.values().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        write_tree(w, tree)?;
    }
    Ok(())
}
