use std::{thread::sleep, time::Duration};

use tempfile::tempdir;

// Separate test binary: the global subscriber installed here must not leak
// into the file logging test.
#[test]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dashboard.log");

    neighborhood_dashboard::logging::init(false, None);
    tracing::info!("stdout only");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
