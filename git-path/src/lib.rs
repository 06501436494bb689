//! Path conversions and checks used throughout the object, index and reference stores: turning
//! tree-entry and index byte strings into platform paths, validating that a path can't escape
//! its tree, and resolving symlinks the way the working tree checkout needs to.
#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use bstr::{BStr, BString, ByteSlice};

mod realpath;
pub use realpath::{function::realpath, Error as RealpathError};

/// Convert a path as used in the object model (tree entries, index paths) into a native
/// [`Path`]. Fails if the bytes aren't valid UTF-8.
pub fn from_byte_slice(input: &BStr) -> Result<&Path, std::str::Utf8Error> {
    input.to_str().map(Path::new)
}

/// Convert a path as used in the object model into an owned native [`PathBuf`].
pub fn from_bstring(input: BString) -> Result<PathBuf, std::str::Utf8Error> {
    Ok(PathBuf::from(input.to_str()?.to_owned()))
}

/// Convert a native [`Path`] back into the byte-string representation used by tree entries and
/// index paths. Returns `None` if the path isn't valid UTF-8.
pub fn into_bstr(path: &Path) -> Option<&BStr> {
    path.to_str().map(|s| s.as_bytes().as_bstr())
}

/// Reject any path segment that would let a tree entry, index entry or checkout path escape the
/// directory it's supposed to live under: a `..` component, or a `\` on a platform where `/` is
/// the only separator git itself uses.
pub fn check_component_is_safe(component: &BStr) -> Result<(), UnsafeComponentError> {
    if component.is_empty() {
        return Err(UnsafeComponentError::Empty);
    }
    if component == ".." {
        return Err(UnsafeComponentError::ParentTraversal);
    }
    if component == "." {
        return Err(UnsafeComponentError::CurrentDir);
    }
    if component.contains(&b'\\') {
        return Err(UnsafeComponentError::Backslash);
    }
    Ok(())
}

/// Validate a full, `/`-separated relative path made of one or more components, none of which
/// may be unsafe per [`check_component_is_safe()`].
pub fn check_path_is_safe(path: &BStr) -> Result<(), UnsafeComponentError> {
    for component in path.split(|b| *b == b'/') {
        check_component_is_safe(component.as_bstr())?;
    }
    Ok(())
}

/// The error produced by [`check_component_is_safe()`] and [`check_path_is_safe()`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnsafeComponentError {
    #[error("a path component must not be empty")]
    Empty,
    #[error("a path component must not be '..'")]
    ParentTraversal,
    #[error("a path component must not be '.'")]
    CurrentDir,
    #[error("a path component must not contain a backslash")]
    Backslash,
}
