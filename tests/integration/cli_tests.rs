use clap::Parser;
use hashdex::cli::Cli;
use hashdex::error::ExitCode;
use hashdex::run_app;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn run(index: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let index = index.to_str().unwrap();
    let mut argv = vec!["hashdex", "-q", "--index", index];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_full_command_cycle() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.db");
    let data_path = data.path().to_str().unwrap();
    fs::write(data.path().join("a.txt"), "same").unwrap();
    fs::write(data.path().join("b.txt"), "same").unwrap();
    fs::write(data.path().join("c.txt"), "different").unwrap();

    assert_eq!(run(&index, &["index", data_path]).unwrap(), ExitCode::Success);
    assert!(index.exists());

    assert_eq!(
        run(&index, &["duplicates", "--output", "json"]).unwrap(),
        ExitCode::Success
    );

    assert_eq!(
        run(&index, &["check", data_path, "--delete", "--permanent"]).unwrap(),
        ExitCode::Success
    );
    assert!(data.path().join("a.txt").exists());
    assert!(!data.path().join("b.txt").exists());
    assert!(data.path().join("c.txt").exists());

    fs::remove_file(data.path().join("c.txt")).unwrap();
    assert_eq!(run(&index, &["cleanup"]).unwrap(), ExitCode::Success);

    assert_eq!(
        run(&index, &["duplicates"]).unwrap(),
        ExitCode::NoDuplicates
    );
}

#[test]
fn test_index_missing_path_fails() {
    let state = tempdir().unwrap();
    let index = state.path().join("index.db");
    let missing = state.path().join("does-not-exist");

    let result = run(&index, &["index", missing.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_check_invalid_move_target_fails() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.db");
    let data_path = data.path().to_str().unwrap();
    fs::write(data.path().join("a.txt"), "same").unwrap();
    fs::write(data.path().join("b.txt"), "same").unwrap();
    let target = state.path().join("no-such-dir");

    run(&index, &["index", data.path().join("a.txt").to_str().unwrap()]).unwrap();
    let result = run(
        &index,
        &["check", data_path, "--move-to", target.to_str().unwrap()],
    );

    assert!(result.is_err());
    assert!(data.path().join("b.txt").exists());
}
