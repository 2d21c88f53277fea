use clap::{CommandFactory, Parser};
use grove::tooling::cli::{Cli, Commands};
use grove::SortMode;

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["grove", "add", "Pineapple"],
        vec!["grove", "add", "Apple", "--parent", "1", "--format", "json"],
        vec!["grove", "rename", "3", "Green apple"],
        vec!["grove", "delete", "3"],
        vec!["grove", "delete", "3", "--yes"],
        vec!["grove", "clear", "--yes"],
        vec!["grove", "up", "4"],
        vec!["grove", "down", "4"],
        vec!["grove", "move", "4", "--parent", "2"],
        vec!["grove", "move", "4", "--root"],
        vec!["grove", "show", "1", "--format", "json"],
        vec!["grove", "list"],
        vec!["grove", "list", "--parent", "1", "--sort", "custom-reversed"],
        vec!["grove", "tree", "--sort", "descending"],
        vec!["grove", "siblings", "5"],
        vec!["grove", "search", "berry"],
        vec!["grove", "seed", "--force"],
        vec!["grove", "validate", "--format", "json"],
        vec!["grove", "normalize"],
        vec!["grove", "normalize", "--parent", "2"],
        vec!["grove", "normalize", "--all"],
        vec!["grove", "--workspace", "/tmp/ws", "--log-level", "debug", "tree"],
        vec!["grove", "tree", "--log-output", "stderr", "--log-format", "json"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn parse_rejects_invalid_commands() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["grove", "add"],
        vec!["grove", "move", "4"],
        vec!["grove", "move", "4", "--parent", "2", "--root"],
        vec!["grove", "list", "--sort", "sideways"],
        vec!["grove", "normalize", "--parent", "2", "--all"],
        vec!["grove", "up", "not-a-number"],
        vec!["grove", "frobnicate"],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_err(), "expected parse failure for args: {args:?}");
    }
}

#[test]
fn parse_sort_mode_values() {
    let cli = Cli::try_parse_from(["grove", "list", "--sort", "custom-reversed"]).unwrap();
    match cli.command {
        Commands::List { sort, parent, .. } => {
            assert_eq!(sort, Some(SortMode::CustomReversed));
            assert_eq!(parent, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["grove", "tree"]).unwrap();
    assert!(matches!(cli.command, Commands::Tree { sort: None, .. }));
}

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn top_level_help_lists_every_command() {
    let mut command = Cli::command();
    let mut output = Vec::new();
    command.write_long_help(&mut output).unwrap();
    let output = String::from_utf8(output).unwrap();

    for token in [
        "add", "rename", "delete", "clear", "up", "down", "move", "show", "list", "tree",
        "siblings", "search", "seed", "validate", "normalize", "--workspace", "--log-level",
    ] {
        assert!(output.contains(token), "help is missing {token}");
    }
}
