use bstr::ByteSlice;
use git_hash::ObjectId;
use git_object::{Commit, Kind, Object, Tag, Tree, TreeEntry, TreeEntryMode};

fn hash(byte: u8) -> ObjectId {
    ObjectId::from_bytes(&[byte; 20]).unwrap()
}

#[test]
fn tree_round_trips_through_encode_and_decode() {
    let mut entries = vec![
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "b.txt".into(),
            oid: hash(2),
        },
        TreeEntry {
            mode: TreeEntryMode::Tree,
            filename: "a".into(),
            oid: hash(1),
        },
        TreeEntry {
            mode: TreeEntryMode::BlobExecutable,
            filename: "run.sh".into(),
            oid: hash(3),
        },
    ];
    Tree::sort_entries(&mut entries);
    let tree = Tree { entries };

    let mut buf = Vec::new();
    tree.write_to(&mut buf).unwrap();
    let decoded = Tree::from_bytes(&buf, git_hash::Kind::Sha1).unwrap();
    assert_eq!(decoded, tree);
}

#[test]
fn tree_sort_order_places_subtrees_as_if_suffixed_with_slash() {
    // "a" as a tree sorts after "a-b" as a blob, because "a/" > "a-".
    let mut entries = vec![
        TreeEntry {
            mode: TreeEntryMode::Tree,
            filename: "a".into(),
            oid: hash(1),
        },
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "a-b".into(),
            oid: hash(2),
        },
    ];
    Tree::sort_entries(&mut entries);
    assert_eq!(entries[0].filename, "a-b");
    assert_eq!(entries[1].filename, "a");
}

#[test]
fn tree_rejects_out_of_order_entries() {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"100644 b.txt\0");
    buf.extend_from_slice(hash(2).as_bytes());
    buf.extend_from_slice(b"100644 a.txt\0");
    buf.extend_from_slice(hash(1).as_bytes());
    assert!(Tree::from_bytes(&buf, git_hash::Kind::Sha1).is_err());
}

fn signature(name: &str) -> git_actor::Signature {
    git_actor::Signature {
        name: name.into(),
        email: format!("{name}@example.com").into(),
        time: git_date::Time::new(1234567890, 3600),
    }
}

#[test]
fn commit_round_trips_through_encode_and_decode() {
    let commit = Commit {
        tree: hash(1),
        parents: vec![hash(2), hash(3)],
        author: signature("author"),
        committer: signature("committer"),
        gpgsig: None,
        message: "a commit message\n".into(),
    };
    let mut buf = Vec::new();
    commit.write_to(&mut buf).unwrap();
    let decoded = Commit::from_bytes(&buf).unwrap();
    assert_eq!(decoded, commit);
}

#[test]
fn commit_round_trips_with_a_gpg_signature() {
    let commit = Commit {
        tree: hash(1),
        parents: vec![],
        author: signature("author"),
        committer: signature("committer"),
        gpgsig: Some("-----BEGIN PGP SIGNATURE-----\n\nabcd\n-----END PGP SIGNATURE-----".into()),
        message: "signed commit\n".into(),
    };
    let mut buf = Vec::new();
    commit.write_to(&mut buf).unwrap();
    let decoded = Commit::from_bytes(&buf).unwrap();
    assert_eq!(decoded, commit);
}

#[test]
fn tag_round_trips_through_encode_and_decode() {
    let tag = Tag {
        target: hash(9),
        target_kind: Kind::Commit,
        name: "v1.0.0".into(),
        tagger: Some(signature("tagger")),
        message: "release\n".into(),
        pgp_signature: None,
    };
    let mut buf = Vec::new();
    tag.write_to(&mut buf).unwrap();
    let decoded = Tag::from_bytes(&buf).unwrap();
    assert_eq!(decoded, tag);
}

#[test]
fn tag_preserves_a_trailing_pgp_signature_separately_from_the_message() {
    let tag = Tag {
        target: hash(9),
        target_kind: Kind::Commit,
        name: "v1.0.0".into(),
        tagger: Some(signature("tagger")),
        message: "release\n".into(),
        pgp_signature: Some("-----BEGIN PGP SIGNATURE-----\n\nabcd\n-----END PGP SIGNATURE-----".into()),
    };
    let mut buf = Vec::new();
    tag.write_to(&mut buf).unwrap();
    let decoded = Tag::from_bytes(&buf).unwrap();
    assert_eq!(decoded, tag);
}

#[test]
fn object_dispatches_decode_by_kind() {
    let blob = Object::from_bytes(Kind::Blob, b"hello", git_hash::Kind::Sha1).unwrap();
    match blob {
        Object::Blob(data) => assert_eq!(data, "hello".as_bytes().as_bstr()),
        _ => panic!("expected a blob"),
    }
}
