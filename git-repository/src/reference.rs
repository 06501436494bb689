//! Reference access, kept as thin forwarding over [`git_ref::Store`] rather than wrapping
//! `Target`/`FullName` in another owned type - there's no `Easy`/attach-detach object model in
//! this workspace for such a wrapper to plug into.
use git_fs::Filesystem;
use git_hash::ObjectId;
use git_ref::{FullName, Target};

use crate::{Error, Repository};

impl<F: Filesystem> Repository<F> {
    /// Resolve `name` (a short or full ref name, or `HEAD`) the way `git` does its `DWIM` search,
    /// returning its full name and current target, or `None` if nothing matches.
    pub fn find_reference(&self, name: &str) -> Result<Option<(FullName, Target)>, Error> {
        let full_name = match self.refs.expand_ref(name) {
            Ok(full_name) => full_name,
            Err(git_ref::Error::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(self.refs.read_ref(&full_name)?.map(|target| (full_name, target)))
    }

    /// Point `name` at `target`, creating it if absent and appending a reflog entry (if
    /// `core.logallrefupdates` is set) with `message`.
    pub fn update_ref(&self, name: &FullName, target: Target, message: &str) -> Result<(), Error> {
        Ok(self.refs.write_ref_with_message(name, target, message)?)
    }

    /// Remove `name`'s loose and packed entries.
    pub fn delete_reference(&self, name: &FullName) -> Result<(), Error> {
        Ok(self.refs.delete_ref(name)?)
    }

    /// Every reference name under `prefix` (pass `""` for all of them).
    pub fn references(&self, prefix: &str) -> Result<Vec<String>, Error> {
        Ok(self.refs.list_refs(prefix)?)
    }

    /// Resolve `HEAD`, following a symbolic target to the object it ultimately names.
    pub fn head_id(&self) -> Result<ObjectId, Error> {
        Ok(self.refs.resolve("HEAD")?)
    }
}
