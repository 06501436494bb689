//! Conversion helpers between the byte strings used throughout the object model and the
//! platform's notion of a path.
use std::path::Path;

use bstr::{BStr, ByteSlice};

/// Convert a possibly non-UTF8 byte slice, as found in tree entries and index paths, into a
/// [`Path`]. Fails if the bytes aren't valid UTF-8, which is the only representation `std::path`
/// can portably round-trip.
pub fn from_byte_slice(input: &BStr) -> Result<&Path, std::str::Utf8Error> {
    input.to_str().map(Path::new)
}

/// The inverse of [`from_byte_slice()`].
pub fn into_bytes(path: &Path) -> &BStr {
    path.to_str().expect("path roundtrips through utf8").as_bytes().into()
}
