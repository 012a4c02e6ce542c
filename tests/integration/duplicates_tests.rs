use hashdex::duplicates::{DuplicateGroup, GroupStats};
use hashdex::index::IndexStore;
use hashdex::output::JsonReport;
use hashdex::scanner::{FileRecord, Fingerprinter};
use hashdex::workflow::IndexingWorkflow;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn workflow_with(fingerprinter: Fingerprinter) -> IndexingWorkflow {
    let store = IndexStore::open_in_memory()
        .unwrap()
        .with_fingerprinter(fingerprinter);
    IndexingWorkflow::from_store(store).unwrap()
}

fn collect(workflow: &IndexingWorkflow) -> Vec<DuplicateGroup> {
    workflow
        .duplicates()
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_two_identical_files_form_one_group() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "twin").unwrap();
    fs::write(&b, "twin").unwrap();

    let mut workflow = workflow_with(Fingerprinter::new());
    workflow
        .add(&[FileRecord::from_path(&a), FileRecord::from_path(&b)])
        .unwrap();

    let groups = collect(&workflow);
    assert_eq!(groups.len(), 1);
    assert!(groups[0].is_equal());
    assert!(groups[0].same_members(&DuplicateGroup {
        hash_id: groups[0].hash_id,
        confirmed: vec![b, a],
        collisions: Vec::new(),
    }));
}

#[test]
fn test_collision_is_reported_separately() {
    let dir = tempdir().unwrap();
    let write = |name: &str, content: &[u8]| -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    };
    let a = write("a", b"HEAD-xxxxxxxxxx-TAIL");
    let b = write("b", b"HEAD-xxxxxxxxxx-TAIL");
    let c = write("c", b"HEAD-yyyyyyyyyy-TAIL");
    let unique = write("d", b"something else entirely");

    let mut workflow = workflow_with(Fingerprinter::new().with_sample_size(8));
    let records: Vec<_> = [&a, &b, &c, &unique]
        .iter()
        .map(|p| FileRecord::from_path(p))
        .collect();
    workflow.add(&records).unwrap();

    let groups = collect(&workflow);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].confirmed, vec![a, b]);
    assert_eq!(groups[0].collisions, vec![c]);
    assert!(!groups[0].is_equal());

    let stats = GroupStats::from_groups(&groups);
    assert_eq!(stats.collision_groups, 1);
    assert_eq!(stats.redundant_files, 1);
}

#[test]
fn test_groups_ordered_by_hash_id() {
    let dir = tempdir().unwrap();
    let mut records = Vec::new();
    for (name, content) in [("x1", "first"), ("y1", "second"), ("x2", "first"), ("y2", "second")] {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        records.push(FileRecord::from_path(&path));
    }

    let mut workflow = workflow_with(Fingerprinter::new());
    workflow.add(&records).unwrap();

    let groups = collect(&workflow);
    assert_eq!(groups.len(), 2);
    assert!(groups[0].hash_id < groups[1].hash_id);
    assert!(groups[0].confirmed[0].ends_with("x1"));
    assert!(groups[1].confirmed[0].ends_with("y1"));
}

#[test]
fn test_json_report_from_index() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();

    let mut workflow = workflow_with(Fingerprinter::new());
    workflow
        .add(&[FileRecord::from_path(&a), FileRecord::from_path(&b)])
        .unwrap();

    let report = JsonReport::new(&collect(&workflow));
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["summary"]["groups"], 1);
    assert_eq!(json["summary"]["equal_groups"], 1);
    assert_eq!(json["groups"][0]["is_equal"], true);
    assert_eq!(json["groups"][0]["confirmed"].as_array().unwrap().len(), 2);
}

#[test]
fn test_no_duplicates_in_empty_index() {
    let workflow = workflow_with(Fingerprinter::new());
    assert!(collect(&workflow).is_empty());
}
