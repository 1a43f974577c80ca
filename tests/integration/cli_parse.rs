use clap::{CommandFactory, Parser};
use framemerge::tooling::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn parse_valid_command_matrix() {
    let cases: Vec<Vec<&str>> = vec![
        vec!["framemerge", "path", "--snapshot", "canvas.json"],
        vec!["framemerge", "path", "--snapshot", "canvas.json", "--format", "json"],
        vec!["framemerge", "videos", "--snapshot", "canvas.json", "--frame", "F2"],
        vec!["framemerge", "merge", "--snapshot", "canvas.json"],
        vec![
            "framemerge",
            "merge",
            "--snapshot",
            "canvas.json",
            "--frame",
            "F2",
            "--output",
            "out",
        ],
        vec!["framemerge", "config", "show"],
        vec![
            "framemerge",
            "--log-level",
            "debug",
            "--log-output",
            "stderr",
            "config",
            "show",
        ],
    ];

    for args in cases {
        let parsed = Cli::try_parse_from(args.clone());
        assert!(parsed.is_ok(), "expected valid parse for args: {args:?}");
    }
}

#[test]
fn snapshot_is_required() {
    assert!(Cli::try_parse_from(["framemerge", "path"]).is_err());
    assert!(Cli::try_parse_from(["framemerge", "merge", "--frame", "F2"]).is_err());
}

#[test]
fn merge_arguments_are_captured() {
    let cli = Cli::try_parse_from([
        "framemerge",
        "--workspace",
        "/tmp/ws",
        "merge",
        "--snapshot",
        "canvas.json",
        "--output",
        "renders",
    ])
    .unwrap();

    assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
    match cli.command {
        Commands::Merge {
            snapshot,
            frame,
            output,
        } => {
            assert_eq!(snapshot, PathBuf::from("canvas.json"));
            assert_eq!(frame, None);
            assert_eq!(output, Some(PathBuf::from("renders")));
        }
        _ => panic!("expected merge command"),
    }
}

#[test]
fn help_lists_every_command() {
    let help = Cli::command().render_help().to_string();
    for name in ["path", "videos", "merge", "config"] {
        assert!(help.contains(name), "help is missing {name}: {help}");
    }
}
