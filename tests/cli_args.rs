// tests/cli_args.rs

use std::path::PathBuf;

use clap::Parser;
use rundag::cli::{CliArgs, Command, LogLevel};
use rundag::logging::build_filter;
use rundag::types::TaskRunStatus;

#[test]
fn watch_flags_parse_with_global_options_after_subcommand() {
    let args = CliArgs::try_parse_from([
        "rundag",
        "watch",
        "--snapshot",
        "run.json",
        "--until-done",
        "--interval-ms",
        "250",
        "--config",
        "ci.toml",
        "--log-level",
        "debug",
    ])
    .expect("valid args");

    assert_eq!(args.config, Some(PathBuf::from("ci.toml")));
    assert!(args.log_level.is_some());
    match args.command {
        Command::Watch {
            snapshot,
            once,
            until_done,
            interval_ms,
            json,
            dry_run,
        } => {
            assert_eq!(snapshot, PathBuf::from("run.json"));
            assert!(!once);
            assert!(until_done);
            assert_eq!(interval_ms, Some(250));
            assert!(!json);
            assert!(!dry_run);
        }
        other => panic!("expected watch, got {other:?}"),
    }
}

#[test]
fn push_payload_defaults_to_empty_object() {
    let args = CliArgs::try_parse_from(["rundag", "push", "--key", "order.created"])
        .expect("valid args");

    match args.command {
        Command::Push { key, payload, metadata, priority, scope } => {
            assert_eq!(key, "order.created");
            assert_eq!(payload, "{}");
            assert!(metadata.is_none());
            assert!(priority.is_none());
            assert!(scope.is_none());
        }
        other => panic!("expected push, got {other:?}"),
    }
}

#[test]
fn show_requires_a_step() {
    assert!(CliArgs::try_parse_from(["rundag", "show", "--snapshot", "run.json"]).is_err());
}

#[test]
fn cli_log_level_overrides_the_env_directive() {
    let filter = build_filter(Some(LogLevel::Debug), Some("rundag=trace"));

    assert_eq!(filter.to_string(), "debug");
}

#[test]
fn env_directives_apply_when_no_flag_is_given() {
    let filter = build_filter(None, Some(" rundag::events=trace "));
    assert!(filter.to_string().contains("rundag::events=trace"));

    assert_eq!(build_filter(None, Some("rundag=loud")).to_string(), "info");
    assert_eq!(build_filter(None, Some("  ")).to_string(), "info");
    assert_eq!(build_filter(None, None).to_string(), "info");
}

#[test]
fn runs_filters_parse_statuses_times_and_metadata() {
    let args = CliArgs::try_parse_from([
        "rundag",
        "runs",
        "--snapshot",
        "run.json",
        "--status",
        "failed",
        "--status",
        "SUCCEEDED",
        "--since",
        "2024-05-01T10:00:00Z",
        "--meta",
        "tenant=acme",
    ])
    .expect("valid args");

    match args.command {
        Command::Runs { statuses, since, until, metadata, bucket_minutes, .. } => {
            assert_eq!(statuses, vec![TaskRunStatus::Failed, TaskRunStatus::Succeeded]);
            assert_eq!(since.map(|t| t.to_rfc3339()), Some("2024-05-01T10:00:00+00:00".to_string()));
            assert!(until.is_none());
            assert_eq!(metadata, vec![("tenant".to_string(), "acme".to_string())]);
            assert_eq!(bucket_minutes, 60);
        }
        other => panic!("expected runs, got {other:?}"),
    }

    assert!(
        CliArgs::try_parse_from(["rundag", "runs", "--snapshot", "x", "--meta", "novalue"]).is_err()
    );
}
