use crate::entry::{Entry, ExtendedFlags, Flags};
use crate::Version;

const NAME_LENGTH_SENTINEL: u16 = 0x0fff;

pub(crate) fn entry(out: &mut Vec<u8>, entry: &Entry, version: Version) {
    let start = out.len();
    out.extend_from_slice(&entry.stat.ctime_secs.to_be_bytes());
    out.extend_from_slice(&entry.stat.ctime_nsecs.to_be_bytes());
    out.extend_from_slice(&entry.stat.mtime_secs.to_be_bytes());
    out.extend_from_slice(&entry.stat.mtime_nsecs.to_be_bytes());
    out.extend_from_slice(&entry.stat.dev.to_be_bytes());
    out.extend_from_slice(&entry.stat.ino.to_be_bytes());
    out.extend_from_slice(&entry.mode.to_bits().to_be_bytes());
    out.extend_from_slice(&entry.stat.uid.to_be_bytes());
    out.extend_from_slice(&entry.stat.gid.to_be_bytes());
    out.extend_from_slice(&entry.stat.size.to_be_bytes());
    out.extend_from_slice(entry.id.as_bytes());

    let extended_flags = {
        let mut bits = ExtendedFlags::empty();
        if entry.skip_worktree {
            bits |= ExtendedFlags::SKIP_WORKTREE;
        }
        if entry.intent_to_add {
            bits |= ExtendedFlags::INTENT_TO_ADD;
        }
        bits
    };
    let needs_extended = version == Version::V3 && !extended_flags.is_empty();

    let overflowed_name = entry.path.len() > NAME_LENGTH_SENTINEL as usize;
    let name_field = if overflowed_name {
        NAME_LENGTH_SENTINEL
    } else {
        entry.path.len() as u16
    };

    let mut flags = Flags::from_bits_truncate(name_field) & Flags::NAME_MASK;
    if entry.assume_valid {
        flags |= Flags::ASSUME_VALID;
    }
    if needs_extended {
        flags |= Flags::EXTENDED;
    }
    flags |= Flags::from_bits_truncate((entry.stage.to_bits() as u16) << 12);
    out.extend_from_slice(&flags.bits().to_be_bytes());

    if needs_extended {
        out.extend_from_slice(&extended_flags.bits().to_be_bytes());
    }

    out.extend_from_slice(&entry.path);

    // A name field pinned at the sentinel (either a genuinely overflowing name, or one that
    // happens to be exactly NAME_LENGTH_SENTINEL bytes long) carries no explicit length; decode
    // recovers it by scanning for the NUL padding below, so make sure at least one NUL follows.
    let entry_len = out.len() - start;
    let padded_len = (entry_len + 8) & !7;
    out.resize(start + padded_len, 0);
}
