//! A line-oriented parser for the subset of git-config's grammar needed to read a repository's
//! settings: `[section]`/`[section "subsection"]` headers and `key = value`/bare `key` entries,
//! with `#`/`;` comments and a trailing `\` line continuation.

use bstr::{BStr, BString, ByteSlice};

use crate::Entry;

/// The error returned when a config file's text can't be parsed at all (as opposed to a value that
/// parses but doesn't coerce to the requested type, see [`crate::value::Error`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Expected a closing ']' for section header: {0:?}")]
    UnterminatedSection(String),
    #[error("A key=value line outside of any [section] header: {0:?}")]
    EntryOutsideSection(String),
    #[error("Malformed key in line: {0:?}")]
    MalformedKey(String),
}

/// Parse a whole config file's contents into its flat list of entries, in file order.
pub fn entries(input: &BStr) -> Result<Vec<Entry>, Error> {
    let mut out = Vec::new();
    let mut section: Option<(BString, Option<BString>)> = None;
    for raw_line in join_continuations(input).lines() {
        let line = strip_comment(raw_line.as_bstr()).trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(b"[") {
            section = Some(parse_section_header(line)?);
            continue;
        }
        let (name, subsection) = section
            .clone()
            .ok_or_else(|| Error::EntryOutsideSection(line.to_string()))?;
        let (key, value) = parse_entry_line(line)?;
        out.push(Entry {
            section: name,
            subsection,
            key,
            value,
        });
    }
    Ok(out)
}

fn join_continuations(input: &BStr) -> BString {
    let mut out = BString::from(Vec::new());
    let mut pending = false;
    for line in input.lines() {
        if pending {
            out.pop();
        }
        pending = line.ends_with(b"\\");
        out.extend_from_slice(if pending { &line[..line.len() - 1] } else { line });
        out.push(b'\n');
    }
    out
}

fn strip_comment(line: &BStr) -> &BStr {
    let mut in_quotes = false;
    for (i, &b) in line.as_bytes().iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'#' | b';' if !in_quotes => return line[..i].as_bstr(),
            _ => {}
        }
    }
    line
}

fn parse_section_header(line: &BStr) -> Result<(BString, Option<BString>), Error> {
    let inner = line
        .strip_prefix(b"[")
        .and_then(|rest| rest.strip_suffix(b"]"))
        .ok_or_else(|| Error::UnterminatedSection(line.to_string()))?
        .as_bstr();
    match inner.find_byte(b' ').or_else(|| inner.find_byte(b'\t')) {
        None => Ok((inner.trim().to_ascii_lowercase().into(), None)),
        Some(space) => {
            let name = inner[..space].trim().to_ascii_lowercase();
            let rest = inner[space..].trim().as_bstr();
            let quoted = rest
                .strip_prefix(b"\"")
                .and_then(|r| r.strip_suffix(b"\""))
                .ok_or_else(|| Error::UnterminatedSection(line.to_string()))?;
            Ok((name.into(), Some(quoted.into())))
        }
    }
}

fn parse_entry_line(line: &BStr) -> Result<(BString, BString), Error> {
    match line.find_byte(b'=') {
        Some(eq) => {
            let key = line[..eq].trim().as_bstr();
            if key.is_empty() {
                return Err(Error::MalformedKey(line.to_string()));
            }
            let value = crate::value::unquote(line[eq + 1..].trim().as_bstr()).into_owned();
            Ok((key.to_ascii_lowercase().into(), value))
        }
        None => Ok((line.trim().to_ascii_lowercase().into(), BString::from(Vec::new()))),
    }
}
