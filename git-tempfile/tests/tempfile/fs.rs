use std::io::Write;

use git_tempfile::{cleanup_all, AutoRemove, ContainingDirectory, Handle};

#[test]
fn cleanup_all_removes_every_still_registered_tempfile() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = Handle::new(dir.path(), ContainingDirectory::Exists, AutoRemove::Tempfile).unwrap();
    let mut b = Handle::new(dir.path(), ContainingDirectory::Exists, AutoRemove::Tempfile).unwrap();
    a.write_all(b"a").unwrap();
    b.write_all(b"b").unwrap();
    let (path_a, path_b) = (a.path().to_owned(), b.path().to_owned());

    cleanup_all();

    assert!(!path_a.exists());
    assert!(!path_b.exists());
    // the handles themselves still exist in memory; dropping them after their files are already
    // gone must not panic.
    drop(a);
    drop(b);
}
