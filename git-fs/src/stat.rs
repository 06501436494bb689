/// A normalized, platform-independent subset of `stat(2)`'s fields, as recorded in an index entry.
/// All numeric fields are truncated to fit 32 bits, matching the on-disk index format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    /// Seconds of the inode change time.
    pub ctime_seconds: u32,
    /// Nanoseconds of the inode change time.
    pub ctime_nanoseconds: u32,
    /// Seconds of the last modification time.
    pub mtime_seconds: u32,
    /// Nanoseconds of the last modification time.
    pub mtime_nanoseconds: u32,
    /// The device id the entry resides on.
    pub dev: u32,
    /// The inode number.
    pub ino: u32,
    /// The raw mode bits, as git records them (`0o100644`, `0o100755`, `0o120000`, or `0o040000`).
    pub mode: u32,
    /// The owning user id.
    pub uid: u32,
    /// The owning group id.
    pub gid: u32,
    /// The file's size in bytes; 0 for anything that isn't a regular file.
    pub size: u32,
}

impl Stat {
    /// Build a `Stat` from `std::fs::Metadata`, truncating every field to `u32` as the on-disk
    /// index format requires.
    pub fn from_metadata(meta: &std::fs::Metadata) -> Self {
        platform::from_metadata(meta)
    }
}

#[cfg(unix)]
mod platform {
    use std::os::unix::fs::MetadataExt;

    use super::Stat;

    pub(super) fn from_metadata(meta: &std::fs::Metadata) -> Stat {
        let raw_mode = meta.mode();
        let normalized_mode = if meta.file_type().is_symlink() {
            0o120000
        } else if meta.is_dir() {
            0o040000
        } else if raw_mode & 0o111 != 0 {
            0o100755
        } else {
            0o100644
        };
        Stat {
            ctime_seconds: meta.ctime() as u32,
            ctime_nanoseconds: meta.ctime_nsec() as u32,
            mtime_seconds: meta.mtime() as u32,
            mtime_nanoseconds: meta.mtime_nsec() as u32,
            dev: meta.dev() as u32,
            ino: meta.ino() as u32,
            mode: normalized_mode,
            uid: meta.uid(),
            gid: meta.gid(),
            size: meta.len() as u32,
        }
    }
}

#[cfg(not(unix))]
mod platform {
    use super::Stat;

    pub(super) fn from_metadata(meta: &std::fs::Metadata) -> Stat {
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .unwrap_or_default();
        Stat {
            ctime_seconds: mtime.as_secs() as u32,
            ctime_nanoseconds: mtime.subsec_nanos(),
            mtime_seconds: mtime.as_secs() as u32,
            mtime_nanoseconds: mtime.subsec_nanos(),
            dev: 0,
            ino: 0,
            mode: if meta.is_dir() {
                0o040000
            } else if meta.file_type().is_symlink() {
                0o120000
            } else if meta.is_file() {
                0o100644
            } else {
                0
            },
            uid: 0,
            gid: 0,
            size: meta.len() as u32,
        }
    }
}
