use std::collections::HashMap;

use git_diff::{tree_changes, Change};
use git_hash::{oid, Kind as HashKind, ObjectId};
use git_object::{Kind, Tree, TreeEntry, TreeEntryMode};
use git_odb::{Data, Error, Find, Format};

#[derive(Default)]
struct MemOdb {
    objects: HashMap<ObjectId, (Kind, Vec<u8>)>,
}

impl MemOdb {
    fn insert_blob(&mut self, content: &[u8]) -> ObjectId {
        let (id, _) = git_odb::hash_object(Kind::Blob, content, HashKind::Sha1);
        self.objects.insert(id, (Kind::Blob, content.to_vec()));
        id
    }

    fn insert_tree(&mut self, mut entries: Vec<TreeEntry>) -> ObjectId {
        Tree::sort_entries(&mut entries);
        let tree = Tree { entries };
        let mut buf = Vec::new();
        tree.write_to(&mut buf).unwrap();
        let (id, _) = git_odb::hash_object(Kind::Tree, &buf, HashKind::Sha1);
        self.objects.insert(id, (Kind::Tree, buf));
        id
    }
}

impl Find for MemOdb {
    fn try_find(&self, id: &oid, format: Format) -> Result<Option<Data>, Error> {
        assert_eq!(format, Format::Content, "this double only serves canonical content");
        let id = id.to_owned();
        Ok(self.objects.get(&id).map(|(kind, bytes)| Data {
            id,
            kind: *kind,
            bytes: bytes.clone(),
        }))
    }

    fn contains(&self, id: &oid) -> bool {
        self.objects.contains_key(&id.to_owned())
    }

    fn expand_oid(&self, _short_hex: &str) -> Result<ObjectId, Error> {
        unimplemented!("not exercised by these tests")
    }
}

#[test]
fn identical_trees_produce_no_changes() {
    let mut odb = MemOdb::default();
    let blob = odb.insert_blob(b"hello\n");
    let tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: "a.txt".into(),
        oid: blob,
    }]);

    let changes = tree_changes(&odb, HashKind::Sha1, tree, tree).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn a_changed_blob_is_reported_as_modified() {
    let mut odb = MemOdb::default();
    let old_blob = odb.insert_blob(b"hello\n");
    let new_blob = odb.insert_blob(b"goodbye\n");
    let old_tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: "a.txt".into(),
        oid: old_blob,
    }]);
    let new_tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: "a.txt".into(),
        oid: new_blob,
    }]);

    let changes = tree_changes(&odb, HashKind::Sha1, old_tree, new_tree).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].path.to_string(), "a.txt");
    match changes[0].change {
        Change::Modified {
            previous_oid, oid, ..
        } => {
            assert_eq!(previous_oid, old_blob);
            assert_eq!(oid, new_blob);
        }
        ref other => panic!("expected Modified, got {:?}", other),
    }
}

#[test]
fn an_added_and_a_removed_path_are_each_reported_once() {
    let mut odb = MemOdb::default();
    let kept = odb.insert_blob(b"kept\n");
    let removed = odb.insert_blob(b"gone\n");
    let added = odb.insert_blob(b"new\n");

    let old_tree = odb.insert_tree(vec![
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "keep.txt".into(),
            oid: kept,
        },
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "old.txt".into(),
            oid: removed,
        },
    ]);
    let new_tree = odb.insert_tree(vec![
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "keep.txt".into(),
            oid: kept,
        },
        TreeEntry {
            mode: TreeEntryMode::Blob,
            filename: "new.txt".into(),
            oid: added,
        },
    ]);

    let mut changes = tree_changes(&odb, HashKind::Sha1, old_tree, new_tree).unwrap();
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].path.to_string(), "new.txt");
    assert!(matches!(changes[0].change, Change::Added { .. }));
    assert_eq!(changes[1].path.to_string(), "old.txt");
    assert!(matches!(changes[1].change, Change::Removed { .. }));
}

#[test]
fn a_path_switching_between_blob_and_tree_is_reported_at_its_own_granularity() {
    let mut odb = MemOdb::default();
    let file_blob = odb.insert_blob(b"i am a file\n");
    let nested_blob = odb.insert_blob(b"i am nested\n");
    let nested_tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: "inner.txt".into(),
        oid: nested_blob,
    }]);

    let old_tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Blob,
        filename: "thing".into(),
        oid: file_blob,
    }]);
    let new_tree = odb.insert_tree(vec![TreeEntry {
        mode: TreeEntryMode::Tree,
        filename: "thing".into(),
        oid: nested_tree,
    }]);

    let changes = tree_changes(&odb, HashKind::Sha1, old_tree, new_tree).unwrap();
    assert_eq!(changes.len(), 2, "the removed file and the newly-added nested file each get reported");
    let paths: Vec<_> = changes.iter().map(|c| c.path.to_string()).collect();
    assert!(paths.contains(&"thing".to_string()));
    assert!(paths.contains(&"thing/inner.txt".to_string()));
}
