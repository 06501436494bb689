/// The kind of hash function and resulting object id used to identify objects in a given
/// repository. A repository uses exactly one kind at a time, selected by
/// `extensions.objectformat` in its config.
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Copy)]
#[cfg_attr(feature = "serde1", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    /// The hash function initially used by git, SHA-1.
    Sha1,
    /// SHA-256 as used by repositories created with `extensions.objectformat = sha256`.
    Sha256,
}

impl Default for Kind {
    fn default() -> Self {
        Kind::Sha1
    }
}

impl Kind {
    /// Returns the amount of bytes the hash occupies in its binary form.
    pub const fn len_in_bytes(&self) -> usize {
        match self {
            Kind::Sha1 => 20,
            Kind::Sha256 => 32,
        }
    }

    /// Returns the amount of hexadecimal characters needed to display the hash in full.
    pub const fn len_in_hex(&self) -> usize {
        self.len_in_bytes() * 2
    }

    /// The `Kind` whose hex representation is the longest, currently [`Kind::Sha256`].
    pub const fn longest() -> Self {
        Kind::Sha256
    }

    /// Given the amount of hexadecimal characters in a valid short or full object id, figure out
    /// which `Kind` it could possibly be. Returns `None` if `hex_len` doesn't match either kind's
    /// full length nor falls within the range that could be a prefix of it.
    pub const fn from_hex_len(hex_len: usize) -> Option<Self> {
        if hex_len == Kind::Sha1.len_in_hex() {
            Some(Kind::Sha1)
        } else if hex_len <= Kind::Sha256.len_in_hex() {
            Some(Kind::Sha256)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Kind::Sha1 => "SHA1",
            Kind::Sha256 => "SHA256",
        })
    }
}
