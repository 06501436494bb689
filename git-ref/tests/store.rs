use git_hash::{Kind as HashKind, ObjectId};
use git_ref::{FullName, Store, Target};

fn store(dir: &std::path::Path) -> Store {
    Store::at(dir, HashKind::Sha1)
}

fn oid(hex: &str) -> ObjectId {
    ObjectId::from_hex(hex.as_bytes()).unwrap()
}

#[test]
fn writing_a_ref_and_reading_it_back_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let name = FullName::new("refs/heads/main").unwrap();
    let id = oid("da39a3ee5e6b4b0d3255bfef95601890afd80709");

    store.write_ref(&name, Target::Object(id.clone())).unwrap();

    assert_eq!(store.read_ref(&name).unwrap(), Some(Target::Object(id.clone())));
    assert_eq!(store.resolve("refs/heads/main").unwrap(), id);
}

#[test]
fn resolve_follows_a_symbolic_ref_chain() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let main = FullName::new("refs/heads/main").unwrap();
    let id = oid("da39a3ee5e6b4b0d3255bfef95601890afd80709");
    store.write_ref(&main, Target::Object(id.clone())).unwrap();

    let head = FullName::new("HEAD").unwrap();
    store.write_ref(&head, Target::Symbolic(main)).unwrap();

    assert_eq!(store.resolve("HEAD").unwrap(), id);
}

#[test]
fn resolve_detects_a_symbolic_ref_loop() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let a = FullName::new("refs/heads/a").unwrap();
    let b = FullName::new("refs/heads/b").unwrap();
    store.write_ref(&a, Target::Symbolic(b.clone())).unwrap();
    store.write_ref(&b, Target::Symbolic(a.clone())).unwrap();

    assert!(matches!(store.resolve("refs/heads/a"), Err(git_ref::Error::SymrefLoop(_))));
}

#[test]
fn resolve_accepts_a_full_length_hex_oid_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let id = oid("da39a3ee5e6b4b0d3255bfef95601890afd80709");
    assert_eq!(store.resolve(&id.to_hex()).unwrap(), id);
}

#[test]
fn list_refs_unions_loose_and_packed_with_loose_taking_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let loose_id = oid("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    let packed_id = oid("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    let main = FullName::new("refs/heads/main").unwrap();
    store.write_ref(&main, Target::Object(loose_id.clone())).unwrap();

    let mut packed = git_ref::packed::Buffer::default();
    packed.upsert("refs/heads/main".into(), packed_id, None);
    packed.upsert("refs/tags/v1".into(), packed_id, None);
    packed.write_to(&dir.path().join("packed-refs")).unwrap();

    let names = store.list_refs("refs/").unwrap();
    assert_eq!(names, vec!["refs/heads/main".to_owned(), "refs/tags/v1".to_owned()]);
    assert_eq!(store.resolve("refs/heads/main").unwrap(), loose_id);
}

#[test]
fn delete_ref_removes_both_loose_and_packed_entries() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let name = FullName::new("refs/heads/main").unwrap();
    store.write_ref(&name, Target::Object(oid("da39a3ee5e6b4b0d3255bfef95601890afd80709"))).unwrap();

    store.delete_ref(&name).unwrap();
    assert_eq!(store.read_ref(&name).unwrap(), None);
}

#[test]
fn expand_ref_finds_head_and_searches_prefixes_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let id = oid("da39a3ee5e6b4b0d3255bfef95601890afd80709");
    let tag = FullName::new("refs/tags/v1.0").unwrap();
    store.write_ref(&tag, Target::Object(id)).unwrap();

    assert_eq!(store.expand_ref("v1.0").unwrap(), tag);
    assert_eq!(store.expand_ref("HEAD").unwrap(), FullName::new("HEAD").unwrap());
}

#[test]
fn expand_ref_fails_when_nothing_matches() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    assert!(matches!(store.expand_ref("nonexistent"), Err(git_ref::Error::NotFound(_))));
}

#[test]
fn writing_a_ref_appends_a_reflog_entry_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(dir.path());
    let name = FullName::new("refs/heads/main").unwrap();
    let first = oid("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    let second = oid("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");

    store.write_ref(&name, Target::Object(first.clone())).unwrap();
    store.write_ref(&name, Target::Object(second.clone())).unwrap();

    let entries = git_ref::reflog::read(dir.path(), &name, HashKind::Sha1).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].old, ObjectId::null(HashKind::Sha1));
    assert_eq!(entries[0].new, first);
    assert_eq!(entries[1].old, first);
    assert_eq!(entries[1].new, second);
}

#[test]
fn reflog_is_skipped_when_logallrefupdates_is_off() {
    let dir = tempfile::tempdir().unwrap();
    let store = git_ref::Store::at_with_reflog(dir.path(), HashKind::Sha1, false);
    let name = FullName::new("refs/heads/main").unwrap();
    store.write_ref(&name, Target::Object(oid("da39a3ee5e6b4b0d3255bfef95601890afd80709"))).unwrap();

    let entries = git_ref::reflog::read(dir.path(), &name, HashKind::Sha1).unwrap();
    assert!(entries.is_empty());
}
