use std::{cmp::Ordering, convert::TryFrom};

use quick_error::quick_error;

use crate::{owned::ObjectId, Kind};

const MIN_HEX_LEN: usize = 4;

quick_error! {
    /// The error returned by [`Prefix::new()`].
    #[derive(Debug)]
    #[allow(missing_docs)]
    pub enum Error {
        TooShort { hex_len: usize } {
            display("The minimum hex length of a short object id is {}, got {}", MIN_HEX_LEN, hex_len)
        }
        TooLong { object_kind: Kind, hex_len: usize } {
            display("An object of kind {} cannot be larger than {} in hex, but {} was requested", object_kind, object_kind.len_in_hex(), hex_len)
        }
    }
}

///
pub mod from_hex {
    use quick_error::quick_error;
    quick_error! {
        /// The error returned by [`Prefix::from_hex()`][super::Prefix::from_hex()].
        #[derive(Debug, PartialEq, Eq)]
        #[allow(missing_docs)]
        pub enum Error {
            TooShort { hex_len: usize } {
                display("The minimum hex length of a short object id is {}, got {}", super::MIN_HEX_LEN, hex_len)
            }
            TooLong { hex_len: usize } {
                display("An id cannot be larger than {} chars in hex, but {} was requested", crate::Kind::longest().len_in_hex(), hex_len)
            }
            Invalid { c: char, index: usize } {
                display("Invalid character {} at position {}", c, index)
            }
        }
    }
}

/// A possibly abbreviated object id of at least 4 hex characters, used to expand a short hex
/// input from a user (or a packed object reference) into a full [`ObjectId`].
#[derive(PartialEq, Eq, Debug, Hash, Ord, PartialOrd, Clone, Copy)]
pub struct Prefix {
    bytes: ObjectId,
    hex_len: usize,
}

impl Prefix {
    /// Create a new instance by taking a full `id` as input and truncating it to `hex_len`.
    ///
    /// For instance, with `hex_len` of 7 the resulting prefix is 3.5 bytes, or 3 bytes and 4 bits
    /// wide, with all other bytes and bits set to zero.
    pub fn new(id: impl AsRef<crate::oid>, hex_len: usize) -> Result<Self, Error> {
        let id = id.as_ref();
        if hex_len > id.kind().len_in_hex() {
            Err(Error::TooLong {
                object_kind: id.kind(),
                hex_len,
            })
        } else if hex_len < MIN_HEX_LEN {
            Err(Error::TooShort { hex_len })
        } else {
            let mut prefix = ObjectId::null(id.kind());
            let b = prefix.as_mut_slice();
            let copy_len = (hex_len + 1) / 2;
            b[..copy_len].copy_from_slice(&id.as_bytes()[..copy_len]);
            if hex_len % 2 == 1 {
                b[hex_len / 2] &= 0xf0;
            }

            Ok(Prefix { bytes: prefix, hex_len })
        }
    }

    /// Returns the prefix as object id.
    ///
    /// Note that it may be deceptive to use given that it looks like a full object id, even
    /// though its post-prefix bytes/bits are set to zero.
    pub fn as_oid(&self) -> &crate::oid {
        self.bytes.as_oid()
    }

    /// Return the amount of hexadecimal characters that are set in the prefix.
    ///
    /// This gives the prefix a granularity of 4 bits.
    pub fn hex_len(&self) -> usize {
        self.hex_len
    }

    /// Provided with a candidate id which is a full hash, determine how this prefix compares to
    /// it, only looking at the prefix bytes, ignoring everything behind that.
    pub fn cmp_oid(&self, candidate: &crate::oid) -> Ordering {
        self.bytes.as_oid().cmp_prefix(candidate, self.hex_len)
    }

    /// Create an instance from the given hexadecimal prefix `value`, e.g. `35e77c16` would yield a
    /// `Prefix` with `hex_len()` = 8.
    pub fn from_hex(value: &str) -> Result<Self, from_hex::Error> {
        let hex_len = value.len();

        if hex_len > Kind::longest().len_in_hex() {
            return Err(from_hex::Error::TooLong { hex_len });
        } else if hex_len < MIN_HEX_LEN {
            return Err(from_hex::Error::TooShort { hex_len });
        };

        let kind = Kind::from_hex_len(hex_len).expect("hex-len is already checked");
        let mut bytes = ObjectId::null(kind);
        let dst = bytes.as_mut_slice();

        let even_len = hex_len - (hex_len % 2);
        decode_hex_prefix(&value.as_bytes()[..even_len], &mut dst[..even_len / 2])?;
        if hex_len % 2 == 1 {
            let last = value.as_bytes()[hex_len - 1];
            let nibble = hex_nibble(last, hex_len - 1)?;
            dst[even_len / 2] = nibble << 4;
        }

        Ok(Prefix { bytes, hex_len })
    }
}

fn hex_nibble(c: u8, index: usize) -> Result<u8, from_hex::Error> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(from_hex::Error::Invalid {
            c: c as char,
            index,
        }),
    }
}

fn decode_hex_prefix(hex: &[u8], out: &mut [u8]) -> Result<(), from_hex::Error> {
    hex::decode_to_slice(hex, out).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => from_hex::Error::Invalid { c, index },
        _ => unreachable!("length mismatches are prevented by construction"),
    })
}

/// Create an instance from the given hexadecimal prefix, e.g. `35e77c16` would yield a `Prefix`
/// with `hex_len()` = 8.
impl TryFrom<&str> for Prefix {
    type Error = from_hex::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Prefix::from_hex(value)
    }
}

impl std::fmt::Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.bytes.as_oid().to_hex_with_len(self.hex_len).fmt(f)
    }
}
