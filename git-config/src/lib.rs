//! A minimal reader for the handful of `.git/config` knobs this workspace actually consults:
//! the object format, the `core.*` filesystem-behavior switches, and the user identity used to
//! stamp new commits and tags.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use bstr::{BStr, BString, ByteSlice};

pub mod parse;
pub mod value;

/// A single `key = value` line, attached to the `[section]` or `[section "subsection"]` header it
/// appeared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The section name, lower-cased (section names are case-insensitive).
    pub section: BString,
    /// The subsection name, if any, with its original case preserved (subsection names are
    /// case-sensitive).
    pub subsection: Option<BString>,
    /// The key, lower-cased (keys are case-insensitive).
    pub key: BString,
    /// The value, with a single layer of quoting and escaping already removed. A bare `key` line
    /// with no `=` is recorded as an empty value, which coerces to `true` as a boolean.
    pub value: BString,
}

/// The error returned when a config file's text can't be read as config at all.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] parse::Error),
    #[error(transparent)]
    Value(#[from] value::Error),
}

/// A parsed config file: its entries in file order, plus convenience lookups. Where the same key
/// is set more than once, git uses the last occurrence, which [`Config::raw()`] and the typed
/// getters all honor.
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: Vec<Entry>,
}

impl Config {
    /// Parse `.git/config`'s contents.
    pub fn from_bytes(input: &[u8]) -> Result<Self, Error> {
        Ok(Config {
            entries: parse::entries(input.as_bstr())?,
        })
    }

    /// The last value recorded for `section.key` (no subsection), or `None` if it was never set.
    pub fn raw(&self, section: &str, key: &str) -> Option<&BStr> {
        self.raw_subsection(section, None, key)
    }

    /// The last value recorded for `section.subsection.key`, or `None` if it was never set.
    pub fn raw_subsection(&self, section: &str, subsection: Option<&str>, key: &str) -> Option<&BStr> {
        self.entries
            .iter()
            .rev()
            .find(|e| {
                e.section == section.as_bytes()
                    && e.key == key.as_bytes()
                    && e.subsection.as_deref().map(|s| s.as_bytes()) == subsection.map(str::as_bytes)
            })
            .map(|e| e.value.as_bstr())
    }

    /// The last value recorded for `section.key`, coerced to a `bool`.
    pub fn boolean(&self, section: &str, key: &str) -> Result<Option<bool>, value::Error> {
        self.raw(section, key).map(value::boolean).transpose()
    }

    /// The last value recorded for `section.key`, coerced to an `i64`.
    pub fn integer(&self, section: &str, key: &str) -> Result<Option<i64>, value::Error> {
        self.raw(section, key).map(value::integer).transpose()
    }

    /// This repository's object format (hash algorithm), from `extensions.objectformat`, defaulting
    /// to SHA-1 when unset as git does for any repository that predates the extension.
    pub fn object_format(&self) -> Result<git_hash::Kind, Error> {
        match self.raw("extensions", "objectformat") {
            None => Ok(git_hash::Kind::Sha1),
            Some(v) if v == "sha1" => Ok(git_hash::Kind::Sha1),
            Some(v) if v == "sha256" => Ok(git_hash::Kind::Sha256),
            Some(v) => Err(Error::Value(value::Error::Boolean(v.to_string()))),
        }
    }

    /// The resolved `core.*` settings this workspace acts on, with git's documented defaults
    /// filled in for anything left unset.
    pub fn core_settings(&self) -> Result<CoreSettings, Error> {
        Ok(CoreSettings {
            bare: self.boolean("core", "bare")?.unwrap_or(false),
            filemode: self.boolean("core", "filemode")?.unwrap_or(true),
            symlinks: self.boolean("core", "symlinks")?.unwrap_or(true),
            ignorecase: self.boolean("core", "ignorecase")?.unwrap_or(false),
            autocrlf: self.boolean("core", "autocrlf")?.unwrap_or(false),
            logallrefupdates: self.boolean("core", "logallrefupdates")?.unwrap_or(true),
            big_file_threshold: self
                .integer("core", "bigfilethreshold")?
                .map(|v| v as u64)
                .unwrap_or(512 * 1024 * 1024),
        })
    }

    /// The `user.name`/`user.email` identity used to stamp new commits and tags, if both are set.
    pub fn user_identity(&self) -> Option<git_actor::Identity> {
        Some(git_actor::Identity {
            name: self.raw("user", "name")?.to_owned(),
            email: self.raw("user", "email")?.to_owned(),
        })
    }
}

/// The resolved `core.*` settings consulted by `git-fs`, `git-ref` and `git-odb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreSettings {
    /// Whether the repository has no working tree.
    pub bare: bool,
    /// Whether file permission bits (the executable bit) are trusted and recorded.
    pub filemode: bool,
    /// Whether symlinks are created as real symlinks rather than plain files containing the target.
    pub symlinks: bool,
    /// Whether path lookups in the working tree and index are case-insensitive.
    pub ignorecase: bool,
    /// Whether line endings are converted between `\n` and `\r\n` on checkout/checkin.
    pub autocrlf: bool,
    /// Whether ref updates are appended to each ref's reflog.
    pub logallrefupdates: bool,
    /// Blobs at or above this size are treated as binary-like and exempted from diffing/delta-ing.
    pub big_file_threshold: u64,
}
