use bstr::{BStr, ByteSlice};

use crate::{SignKind, Time};

/// The error returned by [`time()`].
#[derive(Debug, thiserror::Error)]
#[allow(missing_docs)]
pub enum Error {
    #[error("The seconds portion of the time string was missing or not a number")]
    MissingOrInvalidSeconds,
    #[error("The timezone offset was missing or not in the expected '+HHMM'/'-HHMM' form")]
    MissingOrInvalidOffset,
}

/// Parse `input`, the trailing `<seconds> <+HHMM>` portion of an author or committer line, into
/// a [`Time`].
pub fn time(input: &BStr) -> Result<Time, Error> {
    let mut fields = input.fields();
    let seconds: u32 = fields
        .next()
        .and_then(|f| f.to_str().ok())
        .and_then(|s| s.parse().ok())
        .ok_or(Error::MissingOrInvalidSeconds)?;

    let offset = fields.next().ok_or(Error::MissingOrInvalidOffset)?;
    if offset.len() != 5 {
        return Err(Error::MissingOrInvalidOffset);
    }
    let sign = match offset[0] {
        b'+' => SignKind::Plus,
        b'-' => SignKind::Minus,
        _ => return Err(Error::MissingOrInvalidOffset),
    };
    let hours: i32 = offset[1..3]
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::MissingOrInvalidOffset)?;
    let minutes: i32 = offset[3..5]
        .to_str()
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::MissingOrInvalidOffset)?;
    let magnitude = hours * 3600 + minutes * 60;

    Ok(Time {
        seconds_since_unix_epoch: seconds,
        offset_in_seconds: if let SignKind::Minus = sign { -magnitude } else { magnitude },
        sign,
    })
}
