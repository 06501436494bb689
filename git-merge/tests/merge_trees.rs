use std::cell::RefCell;
use std::collections::HashMap;

use bstr::ByteSlice;
use git_hash::{oid, Kind as HashKind, ObjectId};
use git_index::entry::Stage;
use git_merge::{tree::merge_trees, ConflictKind, MergeOptions};
use git_object::{Kind, Tree, TreeEntry, TreeEntryMode};
use git_odb::{hash_object, Data, Error, Find, Format, Write};

#[derive(Default)]
struct MemOdb {
    objects: RefCell<HashMap<ObjectId, (Kind, Vec<u8>)>>,
}

impl MemOdb {
    fn insert_blob(&self, content: &[u8]) -> ObjectId {
        let (id, _) = hash_object(Kind::Blob, content, HashKind::Sha1);
        self.objects.borrow_mut().insert(id, (Kind::Blob, content.to_vec()));
        id
    }

    fn insert_tree(&self, mut entries: Vec<TreeEntry>) -> ObjectId {
        Tree::sort_entries(&mut entries);
        let tree = Tree { entries };
        let mut buf = Vec::new();
        tree.write_to(&mut buf).unwrap();
        let (id, _) = hash_object(Kind::Tree, &buf, HashKind::Sha1);
        self.objects.borrow_mut().insert(id, (Kind::Tree, buf));
        id
    }

    fn blob_content(&self, id: ObjectId) -> Vec<u8> {
        self.objects.borrow().get(&id).unwrap().1.clone()
    }
}

impl Find for MemOdb {
    fn try_find(&self, id: &oid, format: Format) -> Result<Option<Data>, Error> {
        assert_eq!(format, Format::Content);
        let id = id.to_owned();
        Ok(self.objects.borrow().get(&id).map(|(kind, bytes)| Data {
            id,
            kind: *kind,
            bytes: bytes.clone(),
        }))
    }

    fn contains(&self, id: &oid) -> bool {
        self.objects.borrow().contains_key(&id.to_owned())
    }

    fn expand_oid(&self, _short_hex: &str) -> Result<ObjectId, Error> {
        unimplemented!("not exercised by these tests")
    }
}

impl Write for MemOdb {
    fn write_buf(&self, kind: Kind, bytes: &[u8]) -> Result<ObjectId, Error> {
        let (id, _) = hash_object(kind, bytes, HashKind::Sha1);
        self.objects.borrow_mut().insert(id, (kind, bytes.to_vec()));
        Ok(id)
    }
}

fn blob_entry(name: &str, oid: ObjectId) -> TreeEntry {
    TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: name.into(),
        oid,
    }
}

#[test]
fn non_overlapping_edits_merge_cleanly() {
    let odb = MemOdb::default();
    let a_base = odb.insert_blob(b"a-base\n");
    let b_base = odb.insert_blob(b"b-base\n");
    let base_tree = odb.insert_tree(vec![blob_entry("a.txt", a_base), blob_entry("b.txt", b_base)]);

    let a_ours = odb.insert_blob(b"a-ours\n");
    let ours_tree = odb.insert_tree(vec![blob_entry("a.txt", a_ours), blob_entry("b.txt", b_base)]);

    let b_theirs = odb.insert_blob(b"b-theirs\n");
    let theirs_tree = odb.insert_tree(vec![blob_entry("a.txt", a_base), blob_entry("b.txt", b_theirs)]);

    let mut index = git_index::State::empty(HashKind::Sha1);
    let outcome = merge_trees(&odb, HashKind::Sha1, &mut index, ours_tree, base_tree, theirs_tree, MergeOptions::default()).unwrap();

    assert!(outcome.conflicts.is_empty());
    let merged = odb.try_find(&outcome.tree, Format::Content).unwrap().unwrap();
    let merged_tree = Tree::from_bytes(&merged.bytes, HashKind::Sha1).unwrap();
    assert_eq!(merged_tree.entries.len(), 2);
    let a = merged_tree.entries.iter().find(|e| e.filename.to_string() == "a.txt").unwrap();
    let b = merged_tree.entries.iter().find(|e| e.filename.to_string() == "b.txt").unwrap();
    assert_eq!(odb.blob_content(a.oid), b"a-ours\n");
    assert_eq!(odb.blob_content(b.oid), b"b-theirs\n");
}

#[test]
fn a_conflicting_blob_stages_all_three_sides_and_is_omitted_from_the_tree() {
    let odb = MemOdb::default();
    let base_blob = odb.insert_blob(b"line\n");
    let base_tree = odb.insert_tree(vec![blob_entry("a.txt", base_blob)]);

    let ours_blob = odb.insert_blob(b"ours line\n");
    let ours_tree = odb.insert_tree(vec![blob_entry("a.txt", ours_blob)]);

    let theirs_blob = odb.insert_blob(b"theirs line\n");
    let theirs_tree = odb.insert_tree(vec![blob_entry("a.txt", theirs_blob)]);

    let mut index = git_index::State::empty(HashKind::Sha1);
    let outcome = merge_trees(&odb, HashKind::Sha1, &mut index, ours_tree, base_tree, theirs_tree, MergeOptions::default()).unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].kind, ConflictKind::BothModified);
    let conflicted = outcome.conflicts[0].conflicted_blob.as_ref().unwrap();
    let text = String::from_utf8(conflicted.clone()).unwrap();
    assert!(text.contains("<<<<<<< ours\n"));
    assert!(text.contains(">>>>>>> theirs\n"));

    let merged = odb.try_find(&outcome.tree, Format::Content).unwrap().unwrap();
    let merged_tree = Tree::from_bytes(&merged.bytes, HashKind::Sha1).unwrap();
    assert!(merged_tree.entries.is_empty(), "the conflicting path is omitted from the written tree");

    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Base).is_some());
    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Ours).is_some());
    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Theirs).is_some());
}

#[test]
fn deleted_by_us_modified_by_them_conflicts_and_stages_base_and_theirs() {
    let odb = MemOdb::default();
    let base_blob = odb.insert_blob(b"line\n");
    let base_tree = odb.insert_tree(vec![blob_entry("a.txt", base_blob)]);
    let ours_tree = odb.insert_tree(vec![]);
    let theirs_blob = odb.insert_blob(b"changed\n");
    let theirs_tree = odb.insert_tree(vec![blob_entry("a.txt", theirs_blob)]);

    let mut index = git_index::State::empty(HashKind::Sha1);
    let outcome = merge_trees(&odb, HashKind::Sha1, &mut index, ours_tree, base_tree, theirs_tree, MergeOptions::default()).unwrap();

    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].kind, ConflictKind::DeleteByUs);
    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Base).is_some());
    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Theirs).is_some());
    assert!(index.entry("a.txt".as_bytes().as_bstr(), Stage::Ours).is_none());
}

#[test]
fn abort_on_conflict_raises_instead_of_mutating_the_index() {
    let odb = MemOdb::default();
    let base_blob = odb.insert_blob(b"line\n");
    let base_tree = odb.insert_tree(vec![blob_entry("a.txt", base_blob)]);
    let ours_blob = odb.insert_blob(b"ours\n");
    let ours_tree = odb.insert_tree(vec![blob_entry("a.txt", ours_blob)]);
    let theirs_blob = odb.insert_blob(b"theirs\n");
    let theirs_tree = odb.insert_tree(vec![blob_entry("a.txt", theirs_blob)]);

    let mut index = git_index::State::empty(HashKind::Sha1);
    let options = MergeOptions {
        abort_on_conflict: true,
        ..MergeOptions::default()
    };
    let result = merge_trees(&odb, HashKind::Sha1, &mut index, ours_tree, base_tree, theirs_tree, options);
    assert!(result.is_err());
    assert!(index.entries().is_empty(), "aborting must not mutate the caller's index");
}
