use git_fs::{Filesystem, ReadOptions, StdFilesystem};

#[test]
fn read_returns_none_for_a_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    assert!(fs.read(&dir.path().join("missing"), ReadOptions::default()).unwrap().is_none());
}

#[test]
fn write_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("a/b/c/file");
    fs.write(&path, b"hello").unwrap();
    assert_eq!(fs.read(&path, ReadOptions::default()).unwrap().unwrap(), b"hello");
}

#[test]
fn read_normalizes_crlf_only_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("file");
    fs.write(&path, b"a\r\nb\r\n").unwrap();

    assert_eq!(fs.read(&path, ReadOptions::default()).unwrap().unwrap(), b"a\r\nb\r\n");
    assert_eq!(
        fs.read(&path, ReadOptions { autocrlf: true }).unwrap().unwrap(),
        b"a\nb\n"
    );
}

#[test]
fn autocrlf_normalization_leaves_binary_content_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("file");
    let binary = vec![0xff, 0x00, 0x0d, 0x0a, 0xfe];
    fs.write(&path, &binary).unwrap();
    assert_eq!(fs.read(&path, ReadOptions { autocrlf: true }).unwrap().unwrap(), binary);
}

#[test]
fn rm_and_rmdir_are_not_errors_on_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    fs.rm(&dir.path().join("missing")).unwrap();
    fs.rmdir(&dir.path().join("missing-dir")).unwrap();
}

#[test]
fn rmdir_recursively_removes_children() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    fs.write(&dir.path().join("a/b/file"), b"x").unwrap();
    fs.rmdir(&dir.path().join("a")).unwrap();
    assert!(!dir.path().join("a").exists());
}

#[test]
fn mkdir_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("x/y");
    fs.mkdir(&path).unwrap();
    fs.mkdir(&path).unwrap();
    assert!(path.is_dir());
}

#[test]
fn stat_and_lstat_report_none_for_missing_paths() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("missing");
    assert!(fs.stat(&path).unwrap().is_none());
    assert!(fs.lstat(&path).unwrap().is_none());
}

#[test]
fn stat_reports_file_size() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let path = dir.path().join("file");
    fs.write(&path, b"hello world").unwrap();
    let stat = fs.stat(&path).unwrap().unwrap();
    assert_eq!(stat.size, 11);
    assert_eq!(stat.mode, 0o100644);
}

#[cfg(unix)]
#[test]
fn symlink_and_readlink_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let fs = StdFilesystem;
    let target = std::path::Path::new("target-file");
    let link = dir.path().join("link");
    fs.symlink(target, &link).unwrap();
    assert_eq!(fs.readlink(&link).unwrap().unwrap(), b"target-file");
    let lstat = fs.lstat(&link).unwrap().unwrap();
    assert_eq!(lstat.mode, 0o120000);
}
