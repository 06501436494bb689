//! Coercion of a raw config value's bytes into the handful of typed shapes git-config uses:
//! booleans, integers with a `k`/`m`/`g` suffix, and plain strings/paths.

use std::borrow::Cow;

use bstr::{BStr, ByteSlice};

/// The error returned when a config value doesn't parse as the type requested.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid boolean value {0:?}, expected one of: true, false, yes, no, on, off, 1, 0")]
    Boolean(String),
    #[error("Invalid integer value {0:?}")]
    Integer(String),
}

/// Coerce a raw value into a `bool` the way git does: `yes`/`on`/`true`/`1` (case-insensitive) or
/// an empty value are true; `no`/`off`/`false`/`0` are false. A key with no `=value` at all (a bare
/// `key` line) is represented by the caller as an empty value, which is also true.
pub fn boolean(raw: &BStr) -> Result<bool, Error> {
    if raw.is_empty() {
        return Ok(true);
    }
    let lower = raw.to_str().map(str::to_ascii_lowercase).map_err(|_| Error::Boolean(raw.to_string()))?;
    match lower.as_str() {
        "yes" | "on" | "true" | "1" => Ok(true),
        "no" | "off" | "false" | "0" => Ok(false),
        _ => Err(Error::Boolean(raw.to_string())),
    }
}

/// Coerce a raw value into an `i64`, accepting an optional trailing `k`/`m`/`g` (case-insensitive)
/// multiplier of 1024, 1024² or 1024³ respectively, as git does for e.g. `core.bigFileThreshold`.
pub fn integer(raw: &BStr) -> Result<i64, Error> {
    let text = raw.to_str().map_err(|_| Error::Integer(raw.to_string()))?;
    let (digits, multiplier) = match text.as_bytes().last() {
        Some(b'k') | Some(b'K') => (&text[..text.len() - 1], 1024),
        Some(b'm') | Some(b'M') => (&text[..text.len() - 1], 1024 * 1024),
        Some(b'g') | Some(b'G') => (&text[..text.len() - 1], 1024 * 1024 * 1024),
        _ => (text, 1),
    };
    let value: i64 = digits.trim().parse().map_err(|_| Error::Integer(raw.to_string()))?;
    value.checked_mul(multiplier).ok_or_else(|| Error::Integer(raw.to_string()))
}

/// Strip a single layer of double-quoting and unescape `\"`, `\\`, `\n`, `\t` and `\b`, the way git
/// does for any config value. Borrows unchanged when no quoting or escaping is present.
pub fn unquote(raw: &BStr) -> Cow<'_, BStr> {
    if !raw.contains_str("\"") && !raw.contains_str("\\") {
        return Cow::Borrowed(raw);
    }
    let mut out = Vec::with_capacity(raw.len());
    let mut chars = raw.as_bytes().iter().copied();
    while let Some(b) = chars.next() {
        match b {
            b'"' => continue,
            b'\\' => match chars.next() {
                Some(b'n') => out.push(b'\n'),
                Some(b't') => out.push(b'\t'),
                Some(b'b') => out.push(0x08),
                Some(other) => out.push(other),
                None => {}
            },
            _ => out.push(b),
        }
    }
    Cow::Owned(out.into())
}
