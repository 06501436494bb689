use git_hash::{prefix, Kind, ObjectId, Prefix};

#[test]
fn short_prefix_below_minimum_length_is_rejected() {
    let err = Prefix::from_hex("abc").unwrap_err();
    assert_eq!(err, prefix::from_hex::Error::TooShort { hex_len: 3 });
}

#[test]
fn prefix_cmp_oid_matches_on_shared_nibbles() {
    let id = ObjectId::from_hex(b"ce013625030ba8dba906f756967f9e9ca394464a").unwrap();
    let prefix = Prefix::new(id, 7).unwrap();
    assert_eq!(prefix.cmp_oid(id.as_oid()), std::cmp::Ordering::Equal);
    assert_eq!(prefix.hex_len(), 7);
}

#[test]
fn prefix_from_hex_roundtrips_through_display() {
    let prefix = Prefix::from_hex("ce01362").unwrap();
    assert_eq!(prefix.to_string(), "ce01362");
    assert_eq!(prefix.hex_len(), 7);
}

#[test]
fn hash_of_known_blob_matches_git() {
    let wrapped = git_hash::wrap("blob", b"hello\n");
    let oid = git_hash::hash(Kind::Sha1, &wrapped);
    assert_eq!(oid.to_string(), "ce013625030ba8dba906f756967f9e9ca394464a");
}

#[test]
fn hashing_backend_matches_known_empty_digests() {
    assert!(git_hash::hash_kind(Kind::Sha1));
    assert!(git_hash::hash_kind(Kind::Sha256));
}

#[test]
fn empty_tree_and_blob_constants_parse() {
    assert_eq!(
        ObjectId::empty_tree(Kind::Sha1).to_string(),
        "4b825dc642cb6eb9a060e54bf8d69288fbee4904"
    );
    assert_eq!(
        ObjectId::empty_blob(Kind::Sha1).to_string(),
        "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391"
    );
    // sha256 variants are computed rather than hardcoded; confirm they're at least stable and
    // distinct from one another.
    assert_ne!(ObjectId::empty_tree(Kind::Sha256), ObjectId::empty_blob(Kind::Sha256));
}
