//! Implementation of `bookgraph roots <file> [node]`.
//!
//! Without a node, prints the whole roots index in first-visit order. With a
//! node, prints only the roots that reach it.
//!
//! Output (human mode): one `node: root, root` line per node.
//! Output (JSON mode): the index object `{"<node>": ["<root>", ..]}`, or
//! `{"node": .., "roots": [..]}` for a single node.
//!
//! Exit codes: 0 = success, 1 = node not reached from any root,
//! 2 = input failure.
use std::io::Write;

use indexmap::IndexSet;
use serde_json::json;

use super::{CliBook, stdout_error, write_json};
use crate::OutputFormat;
use crate::error::CliError;

/// Runs the `roots` command.
pub fn run(
    book: &CliBook,
    source: &str,
    node: Option<&str>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let written = match node {
        Some(node) => {
            let roots = book
                .roots_of(&node.to_owned())
                .map_err(|e| CliError::from_book(source, e))?
                .ok_or_else(|| CliError::NodeNotFound {
                    node: node.to_owned(),
                })?;
            match format {
                OutputFormat::Human => print_line(&mut out, node, &roots),
                OutputFormat::Json => write_json(&mut out, &json!({ "node": node, "roots": roots })),
            }
        }
        None => {
            let index = book.roots().map_err(|e| CliError::from_book(source, e))?;
            match format {
                OutputFormat::Human => index
                    .iter()
                    .try_for_each(|(node, roots)| print_line(&mut out, node, roots)),
                OutputFormat::Json => write_json(&mut out, &index),
            }
        }
    };
    written.map_err(stdout_error)
}

fn print_line<W: Write>(w: &mut W, node: &str, roots: &IndexSet<String>) -> std::io::Result<()> {
    let joined: Vec<&str> = roots.iter().map(String::as_str).collect();
    writeln!(w, "{node}: {}", joined.join(", "))
}
