//! Small helpers shared by the integration test suites of the workspace's crates: locating a
//! fixture file checked into a crate's `tests/fixtures` directory, and scratch directories that
//! clean up after themselves.
use std::path::{Path, PathBuf};

/// Return the absolute path to `name` inside the `tests/fixtures` directory of the crate whose
/// manifest directory is `CARGO_MANIFEST_DIR` at the call site.
pub fn fixture_path(manifest_dir: &str, name: &str) -> PathBuf {
    Path::new(manifest_dir).join("tests").join("fixtures").join(name)
}

/// Create a fresh, empty temporary directory that is removed when the returned guard is dropped.
pub fn scratch_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("can create a temporary directory")
}
