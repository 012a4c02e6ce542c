use hashdex::actions::{ActionError, ActionOutcome, Disposition};
use hashdex::config::Config;
use hashdex::scanner::DirectoryScanner;
use hashdex::workflow::{IndexingWorkflow, WorkflowError};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// An index containing `library/original.txt`, plus an `incoming/` tree.
struct Fixture {
    _state: TempDir,
    root: TempDir,
    config: Config,
}

impl Fixture {
    fn new() -> Self {
        let state = tempdir().unwrap();
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("library")).unwrap();
        fs::create_dir(root.path().join("incoming")).unwrap();
        fs::write(root.path().join("library").join("original.txt"), "known").unwrap();

        let config = Config {
            index_path: Some(state.path().join("index.db")),
            ..Config::default()
        };
        let fixture = Self {
            _state: state,
            root,
            config,
        };
        let files = fixture.scan(&fixture.path("library"));
        fixture.workflow().add(&files).unwrap();
        fixture
    }

    fn path(&self, relative: &str) -> std::path::PathBuf {
        self.root.path().join(relative)
    }

    fn scan(&self, dir: &Path) -> Vec<hashdex::scanner::FileRecord> {
        DirectoryScanner::new(dir, self.config.walker_config())
            .files()
            .unwrap()
    }

    fn workflow(&self) -> IndexingWorkflow {
        IndexingWorkflow::open(&self.config).unwrap()
    }
}

#[test]
fn test_check_reports_without_touching() {
    let fx = Fixture::new();
    fs::write(fx.path("incoming/copy.txt"), "known").unwrap();
    fs::write(fx.path("incoming/new.txt"), "unknown").unwrap();

    let files = fx.scan(&fx.path("incoming"));
    let summary = fx.workflow().check(&files, &Disposition::Report).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.matches.len(), 1);
    assert_eq!(summary.matches[0].original, fx.path("library/original.txt"));
    assert!(matches!(summary.matches[0].outcome, ActionOutcome::Reported(_)));
    assert!(fx.path("incoming/copy.txt").exists());
    assert!(fx.path("incoming/new.txt").exists());
}

#[test]
fn test_check_permanent_delete() {
    let fx = Fixture::new();
    fs::write(fx.path("incoming/copy.txt"), "known").unwrap();
    fs::write(fx.path("incoming/new.txt"), "unknown").unwrap();

    let files = fx.scan(&fx.path("incoming"));
    let summary = fx
        .workflow()
        .check(&files, &Disposition::Delete { permanent: true })
        .unwrap();

    assert_eq!(summary.matches.len(), 1);
    assert!(!fx.path("incoming/copy.txt").exists());
    assert!(fx.path("incoming/new.txt").exists());
    assert!(fx.path("library/original.txt").exists());
}

#[test]
fn test_check_move_to_directory() {
    let fx = Fixture::new();
    fs::create_dir(fx.path("dupes")).unwrap();
    fs::write(fx.path("incoming/copy.txt"), "known").unwrap();

    let files = fx.scan(&fx.path("incoming"));
    let summary = fx
        .workflow()
        .check(
            &files,
            &Disposition::Move {
                target: fx.path("dupes"),
            },
        )
        .unwrap();

    assert_eq!(summary.matches.len(), 1);
    assert!(!fx.path("incoming/copy.txt").exists());
    assert_eq!(fs::read_to_string(fx.path("dupes/copy.txt")).unwrap(), "known");
}

#[test]
fn test_check_move_existing_destination_fails() {
    let fx = Fixture::new();
    fs::create_dir(fx.path("dupes")).unwrap();
    fs::write(fx.path("dupes/copy.txt"), "already here").unwrap();
    fs::write(fx.path("incoming/copy.txt"), "known").unwrap();

    let files = fx.scan(&fx.path("incoming"));
    let result = fx.workflow().check(
        &files,
        &Disposition::Move {
            target: fx.path("dupes"),
        },
    );

    match result {
        Err(WorkflowError::CheckAborted { summary, source }) => {
            assert!(summary.matches.is_empty());
            assert!(matches!(
                *source,
                WorkflowError::Action(ActionError::DestinationExists(_))
            ));
        }
        other => panic!("expected an aborted check, got {other:?}"),
    }
    assert!(fx.path("incoming/copy.txt").exists());
    assert_eq!(
        fs::read_to_string(fx.path("dupes/copy.txt")).unwrap(),
        "already here"
    );
}

#[test]
fn test_check_indexed_tree_keeps_originals() {
    let fx = Fixture::new();
    fs::write(fx.path("library/second.txt"), "known").unwrap();
    let library = fx.scan(&fx.path("library"));
    let mut workflow = fx.workflow();
    workflow.add(&library).unwrap();

    let summary = workflow
        .check(&library, &Disposition::Delete { permanent: true })
        .unwrap();

    assert_eq!(summary.skipped_originals, 1);
    assert_eq!(summary.matches.len(), 1);
    assert!(fx.path("library/original.txt").exists());
    assert!(!fx.path("library/second.txt").exists());
    assert!(workflow
        .store()
        .lookup_path(&fx.path("library/second.txt"))
        .unwrap()
        .is_none());
}

#[test]
fn test_check_empty_directory() {
    let fx = Fixture::new();
    let files = fx.scan(&fx.path("incoming"));
    let summary = fx.workflow().check(&files, &Disposition::Report).unwrap();

    assert_eq!(summary.processed, 0);
    assert!(summary.matches.is_empty());
}
