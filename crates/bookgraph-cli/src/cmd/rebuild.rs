//! Implementation of `bookgraph rebuild <file>`.
//!
//! Parses the file, builds the forest while ignoring any cached result, and
//! writes the new result through to the cache.
//!
//! Output (human mode): a summary line, then one line per rejected root.
//! Output (JSON mode): `{"trees": N, "indexed_nodes": M, "rejected": [{"root":
//! .., "node": ..}]}`.
//!
//! Exit codes: 0 = success (rejected roots are reported, not failures),
//! 2 = input failure.
use std::io::Write;

use bookgraph_core::{CycleDetected, Rebuilt};
use serde_json::{Value, json};

use super::{CliBook, stdout_error, write_json};
use crate::OutputFormat;
use crate::error::CliError;

/// Runs the `rebuild` command.
pub fn run(book: &CliBook, source: &str, format: OutputFormat) -> Result<(), CliError> {
    let rebuilt = book.rebuild().map_err(|e| CliError::from_book(source, e))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Human => print_human(&mut out, &rebuilt),
        OutputFormat::Json => write_json(&mut out, &summary(&rebuilt)),
    }
    .map_err(stdout_error)
}

fn summary(rebuilt: &Rebuilt<String>) -> Value {
    let rejected: Vec<Value> = rebuilt
        .cycles
        .iter()
        .map(|c| json!({ "root": c.root, "node": c.node }))
        .collect();
    json!({
        "trees": rebuilt.graph.tree_count(),
        "indexed_nodes": rebuilt.graph.roots().len(),
        "rejected": rejected,
    })
}

fn print_human<W: Write>(w: &mut W, rebuilt: &Rebuilt<String>) -> std::io::Result<()> {
    writeln!(
        w,
        "rebuilt {} trees, {} indexed nodes, {} rejected roots",
        rebuilt.graph.tree_count(),
        rebuilt.graph.roots().len(),
        rebuilt.cycles.len()
    )?;
    for CycleDetected { root, node } in &rebuilt.cycles {
        writeln!(w, "rejected {root}: cycle through {node}")?;
    }
    Ok(())
}
