//! A reference store: loose refs under the git directory, shadowing entries in `packed-refs`,
//! with symbolic-ref resolution, short-ref expansion and an optional reflog.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod fullname;
pub mod loose;
pub mod packed;
pub mod reflog;

pub use fullname::FullName;

use std::path::PathBuf;

use git_hash::{Kind as HashKind, ObjectId};

/// How many symbolic-ref hops [`Store::resolve()`] follows before declaring a loop.
const MAX_SYMREF_DEPTH: usize = 5;

/// The order in which [`Store::expand_ref()`] searches for a short name, mirroring git's own
/// `DWIM` ref search.
const SEARCH_PREFIXES: &[&str] = &["", "refs/", "refs/tags/", "refs/heads/", "refs/remotes/", "refs/remotes/"];

/// What a reference points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Points directly at an object.
    Object(ObjectId),
    /// Points at another reference by name.
    Symbolic(FullName),
}

/// The error returned by this crate's operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("reference {0} not found")]
    NotFound(String),
    #[error("following symbolic ref {0} exceeded the maximum depth of {}", MAX_SYMREF_DEPTH)]
    SymrefLoop(String),
    #[error(transparent)]
    InvalidName(#[from] git_validate::reference::name::Error),
    #[error(transparent)]
    Loose(#[from] loose::Error),
    #[error(transparent)]
    Packed(#[from] packed::Error),
    #[error(transparent)]
    Reflog(#[from] reflog::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A reference store rooted at a repository's git directory (e.g. `.git`).
pub struct Store {
    git_dir: PathBuf,
    hash_kind: HashKind,
    logallrefupdates: bool,
}

impl Store {
    /// Open a store at `git_dir`, appending to reflogs by default (git's default for
    /// non-bare repositories).
    pub fn at(git_dir: impl Into<PathBuf>, hash_kind: HashKind) -> Self {
        Store {
            git_dir: git_dir.into(),
            hash_kind,
            logallrefupdates: true,
        }
    }

    /// Open a store honoring an explicit `core.logallrefupdates` setting.
    pub fn at_with_reflog(git_dir: impl Into<PathBuf>, hash_kind: HashKind, logallrefupdates: bool) -> Self {
        Store {
            git_dir: git_dir.into(),
            hash_kind,
            logallrefupdates,
        }
    }

    fn packed(&self) -> Result<packed::Buffer, Error> {
        Ok(packed::Buffer::at(&packed::path(&self.git_dir))?)
    }

    /// Read `name`'s stored value: a direct object, a symbolic target, or `Ok(None)` if no loose
    /// or packed entry names it.
    pub fn read_ref(&self, name: &FullName) -> Result<Option<Target>, Error> {
        if let Some(target) = loose::read(&self.git_dir, name)? {
            return Ok(Some(target));
        }
        Ok(self.packed()?.find(&name.to_string()).map(|entry| Target::Object(entry.target)))
    }

    /// Follow `ref` (a full reference name, or a full-length hex object id) to the object it
    /// ultimately names, following symbolic refs up to [`MAX_SYMREF_DEPTH`] hops.
    pub fn resolve(&self, ref_: &str) -> Result<ObjectId, Error> {
        if ref_.len() == self.hash_kind.len_in_hex() {
            if let Ok(id) = ObjectId::from_hex(ref_.as_bytes()) {
                return Ok(id);
            }
        }
        let name = FullName::new(ref_.as_bytes().to_vec())?;
        self.resolve_name(&name, 0)
    }

    fn resolve_name(&self, name: &FullName, depth: usize) -> Result<ObjectId, Error> {
        if depth >= MAX_SYMREF_DEPTH {
            return Err(Error::SymrefLoop(name.to_string()));
        }
        match self.read_ref(name)? {
            Some(Target::Object(id)) => Ok(id),
            Some(Target::Symbolic(target)) => self.resolve_name(&target, depth + 1),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    /// All reference names under `prefix`, the union of loose and packed refs with loose taking
    /// precedence, sorted and duplicate-free.
    pub fn list_refs(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = loose::iter(&self.git_dir)?.into_iter().filter(|name| name.starts_with(prefix)).collect();
        let packed = self.packed()?;
        for name in packed.iter_prefixed(prefix) {
            if !names.iter().any(|existing| existing == &name.name) {
                names.push(name.name.clone());
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Write `target` at `name`, creating parent directories and appending a reflog entry if
    /// `core.logallrefupdates` is active.
    pub fn write_ref(&self, name: &FullName, target: Target) -> Result<(), Error> {
        self.write_ref_with_message(name, target, "update")
    }

    /// As [`write_ref()`][Self::write_ref()], with an explicit reflog message.
    pub fn write_ref_with_message(&self, name: &FullName, target: Target, message: &str) -> Result<(), Error> {
        let old = match self.read_ref(name)? {
            Some(Target::Object(id)) => id,
            _ => ObjectId::null(self.hash_kind),
        };
        loose::write(&self.git_dir, name, &target)?;
        if self.logallrefupdates {
            if let Target::Object(new) = &target {
                let committer = default_committer();
                reflog::append(&self.git_dir, name, &old, new, &committer, message)?;
            }
        }
        Ok(())
    }

    /// Remove `name`'s loose and packed entries.
    pub fn delete_ref(&self, name: &FullName) -> Result<(), Error> {
        loose::delete(&self.git_dir, name)?;
        let mut packed = self.packed()?;
        packed.remove(&name.to_string());
        packed.write_to(&packed::path(&self.git_dir))?;
        Ok(())
    }

    /// Resolve a short or full name to the first match in git's `DWIM` search order: `HEAD`,
    /// `<name>`, `refs/<name>`, `refs/tags/<name>`, `refs/heads/<name>`, `refs/remotes/<name>`,
    /// `refs/remotes/<name>/HEAD`.
    pub fn expand_ref(&self, short_or_full: &str) -> Result<FullName, Error> {
        if short_or_full == "HEAD" {
            return Ok(FullName::new(b"HEAD".to_vec())?);
        }
        for prefix in SEARCH_PREFIXES {
            let candidate = format!("{prefix}{short_or_full}");
            let name = match FullName::new(candidate.clone().into_bytes()) {
                Ok(name) => name,
                Err(_) => continue,
            };
            if self.read_ref(&name)?.is_some() {
                return Ok(name);
            }
        }
        let remote_head = format!("refs/remotes/{short_or_full}/HEAD");
        if let Ok(name) = FullName::new(remote_head.into_bytes()) {
            if self.read_ref(&name)?.is_some() {
                return Ok(name);
            }
        }
        Err(Error::NotFound(short_or_full.to_owned()))
    }

    /// This store's git directory.
    pub fn path(&self) -> &std::path::Path {
        &self.git_dir
    }
}

fn default_committer() -> git_actor::Signature {
    git_actor::Signature {
        name: "unknown".into(),
        email: "unknown@localhost".into(),
        time: git_date::Time::new(0, 0),
    }
}
