use bitflags::bitflags;

/// A tree entry mode, restricted to the five forms an index entry may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A regular, non-executable file (`100644`).
    File,
    /// A regular, executable file (`100755`).
    FileExecutable,
    /// A symlink, whose blob content is the link target (`120000`).
    Symlink,
    /// A submodule's commit (`160000`).
    Commit,
}

impl Mode {
    pub(crate) fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Mode::File),
            0o100755 => Some(Mode::FileExecutable),
            0o120000 => Some(Mode::Symlink),
            0o160000 => Some(Mode::Commit),
            _ => None,
        }
    }

    pub(crate) fn to_bits(self) -> u32 {
        match self {
            Mode::File => 0o100644,
            Mode::FileExecutable => 0o100755,
            Mode::Symlink => 0o120000,
            Mode::Commit => 0o160000,
        }
    }
}

bitflags! {
    /// The on-disk 16-bit flags field: merge stage, assume-valid, extended marker and (when not
    /// the 0xFFF sentinel) the entry's name length.
    pub struct Flags: u16 {
        const ASSUME_VALID = 1 << 15;
        const EXTENDED = 1 << 14;
        const STAGE_MASK = 0b11 << 12;
        const NAME_MASK = 0x0fff;
    }
}

bitflags! {
    /// Version-3 extended flags, stored in a second UInt16 present only when [`Flags::EXTENDED`]
    /// is set.
    pub struct ExtendedFlags: u16 {
        const INTENT_TO_ADD = 1 << 13;
        const SKIP_WORKTREE = 1 << 14;
    }
}

/// The merge stage of an entry: 0 for a resolved entry, 1/2/3 for base/ours/theirs of an
/// unresolved conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// A resolved entry.
    Resolved,
    /// The common ancestor of a conflict.
    Base,
    /// Our side of a conflict.
    Ours,
    /// Their side of a conflict.
    Theirs,
}

impl Stage {
    pub(crate) fn from_bits(bits: u16) -> Self {
        match bits {
            0 => Stage::Resolved,
            1 => Stage::Base,
            2 => Stage::Ours,
            3 => Stage::Theirs,
            _ => unreachable!("only the low 2 bits are ever passed in"),
        }
    }

    pub(crate) fn to_bits(self) -> u16 {
        match self {
            Stage::Resolved => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }
}

/// Filesystem metadata captured for an entry at the time it was staged, used to cheaply detect
/// whether a working tree file might have changed without rehashing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub ctime_secs: u32,
    pub ctime_nsecs: u32,
    pub mtime_secs: u32,
    pub mtime_nsecs: u32,
    pub dev: u32,
    pub ino: u32,
    pub uid: u32,
    pub gid: u32,
    /// The file's size, truncated to 32 bits as the on-disk format requires.
    pub size: u32,
}

#[cfg(unix)]
impl From<&std::fs::Metadata> for Stat {
    fn from(meta: &std::fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Stat {
            ctime_secs: meta.ctime() as u32,
            ctime_nsecs: meta.ctime_nsec() as u32,
            mtime_secs: meta.mtime() as u32,
            mtime_nsecs: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }
}

#[cfg(not(unix))]
impl From<&std::fs::Metadata> for Stat {
    fn from(meta: &std::fs::Metadata) -> Self {
        Stat {
            size: meta.len() as u32,
            ..Stat::default()
        }
    }
}

/// One staged path: a snapshot of its worktree metadata at stage time, its blob id, mode and
/// merge stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub stat: Stat,
    pub id: git_hash::ObjectId,
    pub mode: Mode,
    pub stage: Stage,
    pub assume_valid: bool,
    pub skip_worktree: bool,
    pub intent_to_add: bool,
    pub path: bstr::BString,
}
