/// The sign of a timezone offset, kept explicit so `-0000` (UTC, but "I don't know my offset")
/// round-trips distinctly from `+0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum SignKind {
    /// Local time is behind or at UTC.
    Plus,
    /// Local time is ahead of UTC.
    Minus,
}

/// A timestamp as stored alongside every author and committer signature: seconds since the Unix
/// epoch plus the author's own timezone offset, which is kept separately because it is never
/// implied by the host writing the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    /// Seconds since 1970-01-01 00:00:00 UTC.
    pub seconds_since_unix_epoch: u32,
    /// The offset from UTC in seconds, positive for zones ahead of UTC.
    pub offset_in_seconds: i32,
    /// The explicit sign of the offset as written, distinguishing `-0000` from `+0000`.
    pub sign: SignKind,
}

impl Time {
    /// Create a new instance from its raw parts, inferring [`SignKind`] from `offset_in_seconds`.
    pub fn new(seconds_since_unix_epoch: u32, offset_in_seconds: i32) -> Self {
        Time {
            seconds_since_unix_epoch,
            offset_in_seconds,
            sign: if offset_in_seconds < 0 { SignKind::Minus } else { SignKind::Plus },
        }
    }

    /// Serialize this time the way git writes it into a commit or tag: `<seconds> <+HHMM>`.
    pub fn write_to(&self, mut out: impl std::io::Write) -> std::io::Result<()> {
        let mut itoa_buf = itoa::Buffer::new();
        out.write_all(itoa_buf.format(self.seconds_since_unix_epoch).as_bytes())?;
        out.write_all(b" ")?;
        let sign_char = match self.sign {
            SignKind::Plus => '+',
            SignKind::Minus => '-',
        };
        let total_minutes = self.offset_in_seconds.unsigned_abs() / 60;
        write!(out, "{}{:02}{:02}", sign_char, total_minutes / 60, total_minutes % 60)
    }

    /// Render this time the way git writes it, as a `String`.
    pub fn to_bstring(&self) -> String {
        let mut buf = Vec::new();
        self.write_to(&mut buf).expect("write to Vec never fails");
        String::from_utf8(buf).expect("only ascii digits and signs are written")
    }
}
