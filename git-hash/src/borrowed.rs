use std::{cmp::Ordering, fmt};

use crate::{owned::ObjectId, Kind};

/// A borrowed reference to a complete hash identifying objects, much like `&str` is to `String`.
///
/// Note that it is used in conjunction with the `Kind` of hash to avoid mixing up hashes produced
/// with different algorithms.
#[allow(non_camel_case_types)]
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct oid {
    bytes: [u8],
}

impl oid {
    /// Create an `oid` reference out of a `bytes` slice, without performing any checks on the
    /// slice's length. Use [`Kind::len_in_bytes()`] to size `bytes` correctly if a particular
    /// `Kind` is known.
    pub fn from_bytes_unchecked(bytes: &[u8]) -> &Self {
        // SAFETY: `oid` is `#[repr(transparent)]` over `[u8]`, so this is a plain cast of the fat
        // pointer's metadata.
        #[allow(unsafe_code)]
        unsafe {
            &*(bytes as *const [u8] as *const Self)
        }
    }

    /// The kind of hash this instance represents, derived from the byte length.
    pub fn kind(&self) -> Kind {
        match self.bytes.len() {
            20 => Kind::Sha1,
            32 => Kind::Sha256,
            len => unreachable!("BUG: invalid hash length {len}, constructed outside validated entry points"),
        }
    }

    /// Provide the raw bytes making up this hash.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if this hash consists of zero bytes only, the 'null' object id which is used
    /// as a placeholder in reference transactions to signal 'create' or 'delete'.
    pub fn is_null(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Copy this instance into its [owned][ObjectId] form.
    pub fn to_owned(&self) -> ObjectId {
        ObjectId::from_bytes_or_panic(&self.bytes)
    }

    /// Returns the hexadecimal encoding of this hash.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// Returns the hexadecimal encoding of only the first `len` hex characters.
    pub fn to_hex_with_len(&self, len: usize) -> String {
        let mut out = hex::encode(&self.bytes);
        out.truncate(len);
        out
    }

    /// Compares this `oid` against `other`, but only over the leading `common_hex_len` hex
    /// characters - used to compare a [`Prefix`][crate::Prefix] against a candidate.
    pub fn cmp_prefix(&self, other: &oid, common_hex_len: usize) -> Ordering {
        let common_bytes = common_hex_len / 2;
        self.bytes[..common_bytes]
            .cmp(&other.bytes[..common_bytes])
            .then(if common_hex_len % 2 == 1 {
                let idx = common_bytes;
                (self.bytes[idx] & 0xf0).cmp(&(other.bytes[idx] & 0xf0))
            } else {
                Ordering::Equal
            })
    }
}

impl AsRef<oid> for oid {
    fn as_ref(&self) -> &oid {
        self
    }
}

impl ToOwned for oid {
    type Owned = ObjectId;
    fn to_owned(&self) -> Self::Owned {
        oid::to_owned(self)
    }
}

impl fmt::Display for oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self.to_hex())
    }
}
