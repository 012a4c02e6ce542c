use hashdex::config::Config;
use hashdex::scanner::{DirectoryScanner, WalkerConfig};
use hashdex::workflow::IndexingWorkflow;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn config_for(index: &Path) -> Config {
    Config {
        index_path: Some(index.to_path_buf()),
        ..Config::default()
    }
}

#[test]
fn test_index_single_large_file() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    fs::write(data.path().join("a.bin"), vec![b'a'; 10_000]).unwrap();

    let config = config_for(&state.path().join("index.db"));
    let files = DirectoryScanner::new(data.path(), config.walker_config())
        .files()
        .unwrap();
    let mut workflow = IndexingWorkflow::open(&config).unwrap();
    let summary = workflow.add(&files).unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.fingerprints, 1);
    assert_eq!(workflow.store().count().unwrap(), 1);
}

#[test]
fn test_index_counts_distinct_fingerprints() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    fs::create_dir(data.path().join("nested")).unwrap();
    fs::write(data.path().join("one.txt"), "alpha").unwrap();
    fs::write(data.path().join("two.txt"), "alpha").unwrap();
    fs::write(data.path().join("nested").join("three.txt"), "beta").unwrap();
    fs::write(data.path().join("nested").join("four.txt"), "gamma").unwrap();

    let config = config_for(&state.path().join("index.db"));
    let files = DirectoryScanner::new(data.path(), config.walker_config())
        .files()
        .unwrap();
    let mut workflow = IndexingWorkflow::open(&config).unwrap();
    let summary = workflow.add(&files).unwrap();

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.added, 4);
    assert_eq!(workflow.store().file_count().unwrap(), 4);
    assert_eq!(workflow.store().count().unwrap(), 3);

    // Re-indexing the same tree adds nothing.
    let again = workflow.add(&files).unwrap();
    assert_eq!(again.already_indexed, 4);
    assert_eq!(workflow.store().file_count().unwrap(), 4);
    assert_eq!(workflow.store().count().unwrap(), 3);
}

#[test]
fn test_index_persists_across_reopen() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    fs::write(data.path().join("keep.txt"), "persisted").unwrap();
    let config = config_for(&state.path().join("index.db"));

    {
        let files = DirectoryScanner::new(data.path(), config.walker_config())
            .files()
            .unwrap();
        let mut workflow = IndexingWorkflow::open(&config).unwrap();
        workflow.add(&files).unwrap();
    }

    let workflow = IndexingWorkflow::open(&config).unwrap();
    assert_eq!(workflow.store().count().unwrap(), 1);
    assert!(workflow
        .store()
        .lookup_path(&data.path().join("keep.txt"))
        .unwrap()
        .is_some());
}

#[test]
fn test_index_respects_scan_options() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    fs::create_dir(data.path().join(".git")).unwrap();
    fs::write(data.path().join(".git").join("HEAD"), "ref").unwrap();
    fs::write(data.path().join("notes.tmp"), "scratch").unwrap();
    fs::write(data.path().join("photo.jpg"), "pixels").unwrap();

    let mut config = config_for(&state.path().join("index.db"));
    config.skip_hidden = true;
    config.ignore_patterns = vec!["*.tmp".to_string()];

    let files = DirectoryScanner::new(data.path(), config.walker_config())
        .files()
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "photo.jpg");

    let mut workflow = IndexingWorkflow::open(&config).unwrap();
    workflow.add(&files).unwrap();
    assert_eq!(workflow.store().file_count().unwrap(), 1);
}

#[test]
fn test_index_single_file_root() {
    let data = tempdir().unwrap();
    let file = data.path().join("only.txt");
    fs::write(&file, "just me").unwrap();

    let files = DirectoryScanner::new(&file, WalkerConfig::default())
        .files()
        .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].full_path, file.canonicalize().unwrap());
    assert_eq!(files[0].filename, "only.txt");
}

#[test]
fn test_index_sample_size_from_config() {
    let data = tempdir().unwrap();
    let state = tempdir().unwrap();
    // Same head and tail, different middle.
    fs::write(data.path().join("a.bin"), b"HEAD-1111111111-TAIL").unwrap();
    fs::write(data.path().join("b.bin"), b"HEAD-2222222222-TAIL").unwrap();

    let mut config = config_for(&state.path().join("index.db"));
    config.sample_size = 8;
    let files = DirectoryScanner::new(data.path(), config.walker_config())
        .files()
        .unwrap();
    let mut workflow = IndexingWorkflow::open(&config).unwrap();
    workflow.add(&files).unwrap();

    assert_eq!(workflow.store().file_count().unwrap(), 2);
    assert_eq!(workflow.store().count().unwrap(), 1);
}
