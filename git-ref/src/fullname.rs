use bstr::{BStr, BString, ByteSlice};
use std::fmt;

/// A validated, full reference name such as `HEAD` or `refs/heads/main`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FullName(BString);

impl FullName {
    /// Validate `name` the way git validates reference names, rejecting anything not fit to be a
    /// ref.
    pub fn new(name: impl Into<BString>) -> Result<Self, git_validate::reference::name::Error> {
        let name = name.into();
        git_validate::reference::name(name.as_bstr())?;
        Ok(FullName(name))
    }

    /// The name as raw bytes.
    pub fn as_bstr(&self) -> &BStr {
        self.0.as_bstr()
    }

    /// The filesystem path this reference lives at, relative to the git directory.
    pub fn to_path(&self) -> std::path::PathBuf {
        String::from_utf8_lossy(&self.0).split('/').collect()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_bstr())
    }
}

impl AsRef<[u8]> for FullName {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}
