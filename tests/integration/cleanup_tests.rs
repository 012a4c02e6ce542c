use hashdex::index::IndexStore;
use hashdex::scanner::FileRecord;
use hashdex::workflow::IndexingWorkflow;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_cleanup_removes_deleted_file() {
    let dir = tempdir().unwrap();
    let state = tempdir().unwrap();
    let keep = dir.path().join("keep.txt");
    let gone = dir.path().join("gone.txt");
    fs::write(&keep, "stays").unwrap();
    fs::write(&gone, "leaves").unwrap();

    let store = IndexStore::open(&state.path().join("index.db")).unwrap();
    let mut workflow = IndexingWorkflow::from_store(store).unwrap();
    workflow
        .add(&[FileRecord::from_path(&keep), FileRecord::from_path(&gone)])
        .unwrap();
    assert_eq!(workflow.store().count().unwrap(), 2);

    fs::remove_file(&gone).unwrap();
    let summary = workflow.cleanup().unwrap();

    assert_eq!(summary.removed, vec![gone.clone()]);
    assert!(!summary.interrupted);
    assert!(workflow.store().lookup_path(&gone).unwrap().is_none());
    // The orphaned fingerprint went with it.
    assert_eq!(workflow.store().count().unwrap(), 1);
    assert_eq!(workflow.store().file_count().unwrap(), 1);
}

#[test]
fn test_cleanup_keeps_shared_fingerprint() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "shared").unwrap();
    fs::write(&b, "shared").unwrap();

    let mut workflow = IndexingWorkflow::from_store(IndexStore::open_in_memory().unwrap()).unwrap();
    workflow
        .add(&[FileRecord::from_path(&a), FileRecord::from_path(&b)])
        .unwrap();

    fs::remove_file(&a).unwrap();
    let summary = workflow.cleanup().unwrap();

    assert_eq!(summary.removed, vec![a]);
    assert_eq!(workflow.store().count().unwrap(), 1);
    assert!(workflow.store().lookup_path(&b).unwrap().is_some());
}

#[test]
fn test_cleanup_spans_multiple_pages() {
    let dir = tempdir().unwrap();
    let mut records = Vec::new();
    for i in 0..1_205 {
        let path = dir.path().join(format!("f{:04}.txt", i));
        fs::write(&path, format!("content {}", i)).unwrap();
        records.push(FileRecord::from_path(&path));
    }

    let mut workflow = IndexingWorkflow::from_store(IndexStore::open_in_memory().unwrap()).unwrap();
    workflow.add(&records).unwrap();
    for record in records.iter().step_by(2) {
        fs::remove_file(&record.full_path).unwrap();
    }

    let summary = workflow.cleanup().unwrap();

    assert_eq!(summary.scanned, 1_205);
    assert_eq!(summary.removed.len(), 603);
    assert_eq!(workflow.store().file_count().unwrap(), 602);
    assert_eq!(workflow.store().count().unwrap(), 602);
}

#[test]
fn test_cleanup_on_clean_index() {
    let mut workflow = IndexingWorkflow::from_store(IndexStore::open_in_memory().unwrap()).unwrap();
    let summary = workflow.cleanup().unwrap();

    assert_eq!(summary.scanned, 0);
    assert!(summary.removed.is_empty());
}
