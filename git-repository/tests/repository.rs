use std::fs;

use bstr::BString;
use git_hash::Kind as HashKind;
use git_index::entry::{Entry, Stage};
use git_object::Object;
use git_ref::{FullName, Target};
use git_repository::Repository;

fn init_repo(dir: &std::path::Path) {
    fs::create_dir_all(dir.join("objects")).unwrap();
    fs::create_dir_all(dir.join("refs").join("heads")).unwrap();
    fs::write(dir.join("HEAD"), b"ref: refs/heads/main\n").unwrap();
    fs::write(dir.join("config"), b"[core]\n\tbare = false\n").unwrap();
}

#[test]
fn open_rejects_a_directory_with_no_objects_dir() {
    let dir = tempfile::tempdir().unwrap();
    let err = Repository::open(dir.path()).unwrap_err();
    assert!(matches!(err, git_repository::Error::NotARepository(_)));
}

#[test]
fn write_object_then_find_object_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = Repository::open(dir.path()).unwrap();

    let blob = Object::Blob(BString::from(b"hello\n".to_vec()));
    let id = repo.write_object(&blob).unwrap();

    let found = repo.find_object(&id).unwrap().expect("just written");
    match found {
        Object::Blob(data) => assert_eq!(data, BString::from(b"hello\n".to_vec())),
        other => panic!("expected a blob, got {:?}", other.kind()),
    }
}

#[test]
fn index_is_cached_until_the_file_changes_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = Repository::open(dir.path()).unwrap();

    let first = repo.read_index_direct(false, true).unwrap();
    assert!(first.entries().is_empty());

    let mut state = first;
    state.insert(Entry {
        stat: Default::default(),
        id: git_hash::ObjectId::null(HashKind::Sha1),
        mode: git_index::entry::Mode::File,
        stage: Stage::Resolved,
        assume_valid: false,
        skip_worktree: false,
        intent_to_add: false,
        path: "a.txt".into(),
    });
    repo.write_index_direct(&state).unwrap();

    let second = repo.read_index_direct(false, true).unwrap();
    assert_eq!(second.entries().len(), 1);
    assert_eq!(second.entries()[0].path, "a.txt");
}

#[test]
fn read_index_direct_rejects_unmerged_entries_unless_allowed() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = Repository::open(dir.path()).unwrap();

    let mut state = git_index::State::empty(HashKind::Sha1);
    state.insert(Entry {
        stat: Default::default(),
        id: git_hash::ObjectId::null(HashKind::Sha1),
        mode: git_index::entry::Mode::File,
        stage: Stage::Ours,
        assume_valid: false,
        skip_worktree: false,
        intent_to_add: false,
        path: "conflicted.txt".into(),
    });
    repo.write_index_direct(&state).unwrap();

    let err = repo.read_index_direct(false, false).unwrap_err();
    assert!(matches!(err, git_repository::Error::UnmergedIndex));
    assert!(repo.read_index_direct(false, true).is_ok());
}

#[test]
fn update_ref_then_find_reference_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    init_repo(dir.path());
    let repo = Repository::open(dir.path()).unwrap();

    let blob = Object::Blob(BString::from(b"hi\n".to_vec()));
    let id = repo.write_object(&blob).unwrap();

    let name = FullName::new("refs/heads/main").unwrap();
    repo.update_ref(&name, Target::Object(id), "test: point main at a blob")
        .unwrap();

    let (found_name, target) = repo.find_reference("main").unwrap().expect("just written");
    assert_eq!(found_name, name);
    assert_eq!(target, Target::Object(id));

    repo.delete_reference(&name).unwrap();
    assert!(repo.find_reference("main").unwrap().is_none());
}

#[test]
fn bare_repository_has_no_workdir_source() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("objects")).unwrap();
    fs::write(dir.path().join("config"), b"[core]\n\tbare = true\n").unwrap();

    let repo = Repository::open(dir.path()).unwrap();
    assert!(repo.work_dir().is_none());
    assert!(matches!(repo.workdir_source(), Err(git_repository::Error::Bare)));
}
