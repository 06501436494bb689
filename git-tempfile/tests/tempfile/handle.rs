use std::io::{Read, Write};

use git_tempfile::{AutoRemove, ContainingDirectory, Handle};

#[test]
fn a_closed_handle_persists_its_content_at_the_target_path() {
    let dir = tempfile::tempdir().unwrap();
    let mut handle = Handle::new(dir.path(), ContainingDirectory::Exists, AutoRemove::Tempfile).unwrap();
    handle.write_all(b"hello").unwrap();
    let target = dir.path().join("final");
    handle.close().unwrap().persist(&target).unwrap();

    let mut content = String::new();
    std::fs::File::open(&target).unwrap().read_to_string(&mut content).unwrap();
    assert_eq!(content, "hello");
}

#[test]
fn a_dropped_handle_removes_its_tempfile() {
    let dir = tempfile::tempdir().unwrap();
    let handle = Handle::new(dir.path(), ContainingDirectory::Exists, AutoRemove::Tempfile).unwrap();
    let path = handle.path().to_owned();
    assert!(path.is_file());
    drop(handle);
    assert!(!path.exists());
}

#[test]
fn creating_inside_a_missing_directory_fails_without_raceproof_creation() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist-yet");
    assert!(Handle::new(&missing, ContainingDirectory::Exists, AutoRemove::Tempfile).is_err());
}

#[test]
fn raceproof_creation_makes_the_containing_directory_first() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("a/b/c");
    let handle = Handle::new(&missing, ContainingDirectory::CreateAllRaceproof, AutoRemove::Tempfile).unwrap();
    assert!(handle.path().is_file());
}
