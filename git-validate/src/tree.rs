///
pub mod name {
    use quick_error::quick_error;

    quick_error! {
        /// The error returned by [`name()`][super::name()].
        #[derive(Debug)]
        #[allow(missing_docs)]
        pub enum Error {
            Empty {
                display("A tree entry name must not be empty")
            }
            Slash {
                display("A tree entry name must not contain a '/'")
            }
            Backslash {
                display("A tree entry name must not contain a '\\'")
            }
            Reserved(name: bstr::BString) {
                display("'{}' is not a valid tree entry name", name)
            }
        }
    }
}

use bstr::BStr;

/// Validate a single tree entry name: it may not be empty, contain a path separator, or be `.`
/// or `..` which would otherwise let a maliciously crafted tree escape its own directory once
/// written to a working copy.
pub fn name(input: &BStr) -> Result<&BStr, name::Error> {
    if input.is_empty() {
        return Err(name::Error::Empty);
    }
    if input.contains(&b'/') {
        return Err(name::Error::Slash);
    }
    if input.contains(&b'\\') {
        return Err(name::Error::Backslash);
    }
    if input == "." || input == ".." || input == ".git" {
        return Err(name::Error::Reserved(input.to_owned()));
    }
    Ok(input)
}
