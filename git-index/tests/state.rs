use bstr::ByteSlice;
use git_hash::{Kind as HashKind, ObjectId};
use git_index::entry::{Entry, Mode, Stage, Stat};
use git_index::{Error, State, Version};

fn oid(byte: u8) -> ObjectId {
    ObjectId::from_bytes(&[byte; 20]).unwrap()
}

fn entry_at(path: &str, stage: Stage, id: ObjectId) -> Entry {
    Entry {
        stat: Stat::default(),
        id,
        mode: Mode::File,
        stage,
        assume_valid: false,
        skip_worktree: false,
        intent_to_add: false,
        path: path.into(),
    }
}

#[test]
fn an_empty_index_round_trips() {
    let state = State::empty(HashKind::Sha1);
    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert_eq!(parsed.entries().len(), 0);
    assert_eq!(parsed.version(), Version::V2);
}

#[test]
fn inserting_entries_keeps_them_sorted_and_round_trips() {
    let mut state = State::empty(HashKind::Sha1);
    state.insert(entry_at("b.txt", Stage::Resolved, oid(2)));
    state.insert(entry_at("a.txt", Stage::Resolved, oid(1)));
    state.insert(entry_at("dir/c.txt", Stage::Resolved, oid(3)));

    let paths: Vec<_> = state.entries().iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["a.txt", "b.txt", "dir/c.txt"]);

    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert_eq!(parsed.entries().len(), 3);
    assert!(parsed.has("a.txt".as_bytes().as_bstr()));
}

#[test]
fn inserting_replaces_the_entry_at_the_same_path_and_stage() {
    let mut state = State::empty(HashKind::Sha1);
    state.insert(entry_at("a.txt", Stage::Resolved, oid(1)));
    state.insert(entry_at("a.txt", Stage::Resolved, oid(9)));

    assert_eq!(state.entries().len(), 1);
    assert_eq!(state.entries()[0].id, oid(9));
}

#[test]
fn conflict_stages_sort_after_the_resolved_stage_for_the_same_path() {
    let mut state = State::empty(HashKind::Sha1);
    state.insert(entry_at("a.txt", Stage::Theirs, oid(3)));
    state.insert(entry_at("a.txt", Stage::Base, oid(1)));
    state.insert(entry_at("a.txt", Stage::Ours, oid(2)));

    let stages: Vec<_> = state.entries().iter().map(|e| e.stage).collect();
    assert_eq!(stages, vec![Stage::Base, Stage::Ours, Stage::Theirs]);
    assert!(!state.has("a.txt".as_bytes().as_bstr()));
}

#[test]
fn removing_a_path_also_removes_its_subtree() {
    let mut state = State::empty(HashKind::Sha1);
    state.insert(entry_at("dir", Stage::Resolved, oid(1)));
    state.insert(entry_at("dir/a.txt", Stage::Resolved, oid(2)));
    state.insert(entry_at("dir-sibling", Stage::Resolved, oid(3)));

    assert!(state.remove("dir".as_bytes().as_bstr()));
    let paths: Vec<_> = state.entries().iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["dir-sibling"]);
}

#[test]
fn skip_worktree_bumps_the_index_to_version_3_and_round_trips() {
    let mut state = State::empty(HashKind::Sha1);
    let mut entry = entry_at("a.txt", Stage::Resolved, oid(1));
    entry.skip_worktree = true;
    state.insert(entry);

    assert_eq!(state.version(), Version::V3);
    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert!(parsed.entries()[0].skip_worktree);
}

#[test]
fn an_overlong_path_round_trips_via_the_name_length_sentinel() {
    let mut state = State::empty(HashKind::Sha1);
    let long_path = "a/".repeat(3000) + "file.txt";
    state.insert(entry_at(&long_path, Stage::Resolved, oid(1)));

    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert_eq!(parsed.entries()[0].path.to_string(), long_path);
}

#[test]
fn a_path_exactly_at_the_sentinel_length_round_trips() {
    let mut state = State::empty(HashKind::Sha1);
    let path = "a".repeat(4095);
    assert_eq!(path.len(), 4095);
    state.insert(entry_at(&path, Stage::Resolved, oid(1)));

    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert_eq!(parsed.entries()[0].path.to_string(), path);
}

#[test]
fn a_path_one_byte_past_the_sentinel_length_round_trips() {
    let mut state = State::empty(HashKind::Sha1);
    let path = "a".repeat(4096);
    state.insert(entry_at(&path, Stage::Resolved, oid(1)));

    let bytes = state.serialize();
    let parsed = State::parse(&bytes, HashKind::Sha1).unwrap();
    assert_eq!(parsed.entries()[0].path.to_string(), path);
}

#[test]
fn parsing_rejects_a_bad_signature() {
    let err = State::parse(b"NOPE0000", HashKind::Sha1).unwrap_err();
    assert!(matches!(err, Error::BadSignature) || matches!(err, Error::Truncated));
}

#[test]
fn parsing_rejects_a_tampered_checksum() {
    let state = State::empty(HashKind::Sha1);
    let mut bytes = state.serialize();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    assert!(matches!(State::parse(&bytes, HashKind::Sha1), Err(Error::ChecksumMismatch { .. })));
}

#[test]
fn clear_removes_every_entry() {
    let mut state = State::empty(HashKind::Sha1);
    state.insert(entry_at("a.txt", Stage::Resolved, oid(1)));
    state.clear();
    assert_eq!(state.entries().len(), 0);
}
