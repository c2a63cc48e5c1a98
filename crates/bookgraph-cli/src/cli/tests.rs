#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use clap::CommandFactory;
use clap::Parser;

use super::*;

/// The root help output must contain all top-level subcommand names.
#[test]
fn test_root_help_lists_all_subcommands() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());

    for name in &["trees", "tree", "roots", "rebuild"] {
        assert!(
            help.contains(name),
            "root help should mention subcommand '{name}'"
        );
    }
}

/// The root help output must describe every global flag.
#[test]
fn test_root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());

    let expected_flags = [
        "--format",
        "--quiet",
        "--verbose",
        "--max-file-size",
        "--cache-dir",
        "--help",
        "--version",
    ];
    for flag in &expected_flags {
        assert!(
            help.contains(flag),
            "root help should mention flag '{flag}'"
        );
    }
}

#[test]
fn test_trees_help_mentions_root_filter() {
    let mut cmd = Cli::command();
    let sub = cmd
        .find_subcommand_mut("trees")
        .expect("trees subcommand should exist");
    let help = format!("{}", sub.render_help());
    assert!(help.contains("--root"), "trees help should mention --root");
    assert!(help.contains("FILE"), "trees help should mention FILE");
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_dash_parses_as_stdin() {
    let cli = Cli::try_parse_from(["bookgraph", "trees", "-"]).expect("parse");
    match cli.command {
        Command::Trees { file, roots } => {
            assert!(matches!(file, PathOrStdin::Stdin));
            assert!(roots.is_empty());
        }
        other => panic!("expected trees, got {other:?}"),
    }
}

#[test]
fn test_repeated_root_filter_is_collected_in_order() {
    let cli = Cli::try_parse_from([
        "bookgraph", "trees", "rel.json", "--root", "b", "--root", "a",
    ])
    .expect("parse");
    match cli.command {
        Command::Trees { file, roots } => {
            assert!(matches!(file, PathOrStdin::Path(_)));
            assert_eq!(roots, vec!["b".to_owned(), "a".to_owned()]);
        }
        other => panic!("expected trees, got {other:?}"),
    }
}

#[test]
fn test_roots_node_is_optional() {
    let cli = Cli::try_parse_from(["bookgraph", "roots", "rel.json"]).expect("parse");
    match cli.command {
        Command::Roots { node, .. } => assert!(node.is_none()),
        other => panic!("expected roots, got {other:?}"),
    }
}

#[test]
fn test_tree_requires_root() {
    assert!(Cli::try_parse_from(["bookgraph", "tree", "rel.json"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "bookgraph",
        "roots",
        "rel.json",
        "-f",
        "json",
        "--cache-dir",
        "/tmp/bg",
    ])
    .expect("parse");
    assert!(matches!(cli.format, OutputFormat::Json));
    assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/bg")));
}

#[test]
fn test_quiet_and_verbose_conflict() {
    assert!(Cli::try_parse_from(["bookgraph", "-q", "-v", "trees", "rel.json"]).is_err());
}

#[test]
fn test_log_level_follows_flags() {
    let quiet = Cli::try_parse_from(["bookgraph", "-q", "trees", "x"]).expect("parse");
    let verbose = Cli::try_parse_from(["bookgraph", "-v", "trees", "x"]).expect("parse");
    let default = Cli::try_parse_from(["bookgraph", "trees", "x"]).expect("parse");
    assert_eq!(quiet.log_level(), "error");
    assert_eq!(verbose.log_level(), "debug");
    assert_eq!(default.log_level(), "info");
}
