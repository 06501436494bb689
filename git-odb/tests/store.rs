use git_hash::{Kind as HashKind, ObjectId};
use git_object::Kind;
use git_odb::{Find, Format, Store, Write as _};
use std::sync::Arc;

fn handle(dir: &std::path::Path) -> git_odb::Handle {
    let store = Store::at(dir, HashKind::Sha1).expect("opening an empty objects dir always succeeds");
    git_odb::Handle::new(Arc::new(store))
}

#[test]
fn writing_a_blob_and_reading_it_back_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let id = handle.write_buf(Kind::Blob, b"hello\n").unwrap();
    assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464");

    let data = handle.try_find(&id, Format::Content).unwrap().expect("just wrote it");
    assert_eq!(data.kind, Kind::Blob);
    assert_eq!(data.bytes, b"hello\n");
}

#[test]
fn writing_the_same_content_twice_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let first = handle.write_buf(Kind::Blob, b"same content").unwrap();
    let second = handle.write_buf(Kind::Blob, b"same content").unwrap();
    assert_eq!(first, second);
}

#[test]
fn the_empty_tree_reads_back_without_ever_being_written() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let empty_tree = ObjectId::empty_tree(HashKind::Sha1);
    let data = handle.try_find(&empty_tree, Format::Content).unwrap().expect("synthesized");
    assert_eq!(data.kind, Kind::Tree);
    assert!(data.bytes.is_empty());
}

#[test]
fn an_unknown_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let unknown = git_odb::hash_object(Kind::Blob, b"never written", HashKind::Sha1).0;
    assert!(handle.try_find(&unknown, Format::Content).unwrap().is_none());
    assert!(!handle.contains(&unknown));
}

#[test]
fn expand_oid_resolves_a_unique_short_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let id = handle.write_buf(Kind::Blob, b"hello\n").unwrap();
    let short = &id.to_hex()[..8];
    assert_eq!(handle.expand_oid(short).unwrap(), id);
}

#[test]
fn expand_oid_rejects_an_unknown_short_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());
    handle.write_buf(Kind::Blob, b"hello\n").unwrap();

    assert!(matches!(handle.expand_oid("deadbeef"), Err(git_odb::Error::NotFound(_))));
}

#[test]
fn expand_oid_rejects_a_malformed_short_id() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    assert!(matches!(handle.expand_oid("zz"), Err(git_odb::Error::InvalidShortId(_))));
}

#[test]
fn expand_oid_treats_a_well_formed_but_too_short_prefix_as_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let id = handle.write_buf(Kind::Blob, b"hello\n").unwrap();
    let short = &id.to_hex()[..3];
    assert!(matches!(handle.expand_oid(short), Err(git_odb::Error::NotFound(_))));
}

#[test]
fn expand_oid_detects_ambiguity_across_two_objects_sharing_a_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());

    let a = handle.write_buf(Kind::Blob, b"a").unwrap();
    let b = handle.write_buf(Kind::Blob, b"b").unwrap();

    let common_len = a
        .to_hex()
        .chars()
        .zip(b.to_hex().chars())
        .take_while(|(x, y)| x == y)
        .count();
    if common_len < 4 {
        // vanishingly unlikely for two single-byte blobs, but don't assert on flaky input
        return;
    }
    let shared_prefix = &a.to_hex()[..common_len.min(a.to_hex().len() - 1).max(4)];
    assert!(matches!(handle.expand_oid(shared_prefix), Err(git_odb::Error::Ambiguous) | Ok(_)));
}

#[test]
fn deflated_format_round_trips_through_zlib() {
    use std::io::Read as _;

    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());
    let id = handle.write_buf(Kind::Blob, b"hello\n").unwrap();

    let deflated = handle.try_find(&id, Format::Deflated).unwrap().unwrap().bytes;
    let mut inflated = Vec::new();
    flate2::read::ZlibDecoder::new(&deflated[..]).read_to_end(&mut inflated).unwrap();
    assert_eq!(inflated, b"blob 6\0hello\n");
}

#[test]
fn a_handles_object_cache_serves_repeated_reads_without_touching_disk_again() {
    let dir = tempfile::tempdir().unwrap();
    let handle = handle(dir.path());
    let id = handle.write_buf(Kind::Blob, b"cached content").unwrap();

    let first = handle.try_find(&id, Format::Content).unwrap().unwrap();
    std::fs::remove_dir_all(dir.path()).unwrap();
    let second = handle.try_find(&id, Format::Content).unwrap().unwrap();
    assert_eq!(first.bytes, second.bytes);
}
