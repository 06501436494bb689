///
pub mod name {
    use bstr::BStr;
    use quick_error::quick_error;

    quick_error! {
        /// The error returned by [`name()`][super::name()].
        #[derive(Debug)]
        #[allow(missing_docs)]
        pub enum Error {
            Empty {
                display("Tag names must not be empty")
            }
            StartsWithDot {
                display("A tag name must not start with a dot")
            }
            EndsWithDot {
                display("A tag name must not end with a dot")
            }
            EndsWithSlash {
                display("A tag name must not end with a slash")
            }
            DoubleDot {
                display("A tag name must not contain '..'")
            }
            Control {
                display("A tag name must not contain ASCII control characters")
            }
            Disallowed {
                display("A tag name must not contain any of the characters ' ', '~', '^', ':', '?', '*', '[', '\\'")
            }
            LockSuffix {
                display("A tag name must not end with '.lock'")
            }
            AtOpenCurly {
                display("A tag name must not contain the sequence '@{{'")
            }
        }
    }
}

use bstr::BStr;

/// Assert `input` is a valid tag name according to the same rules git applies to everything below
/// `refs/`: the building block that both `reference::name()` and `reference::name_partial()` rely
/// on before layering reference-specific rules on top.
pub fn name(input: &BStr) -> Result<&BStr, name::Error> {
    if input.is_empty() {
        return Err(name::Error::Empty);
    }
    if input[0] == b'.' {
        return Err(name::Error::StartsWithDot);
    }
    if *input.last().expect("non-empty") == b'.' {
        return Err(name::Error::EndsWithDot);
    }
    if *input.last().expect("non-empty") == b'/' {
        return Err(name::Error::EndsWithSlash);
    }
    if input.ends_with(b".lock") {
        return Err(name::Error::LockSuffix);
    }
    if input.windows(2).any(|w| w == b"..") {
        return Err(name::Error::DoubleDot);
    }
    if input.windows(2).any(|w| w == b"@{") {
        return Err(name::Error::AtOpenCurly);
    }
    if input.iter().any(|b| *b < 0x20 || *b == 0x7f) {
        return Err(name::Error::Control);
    }
    if input
        .iter()
        .any(|b| matches!(b, b' ' | b'~' | b'^' | b':' | b'?' | b'*' | b'[' | b'\\'))
    {
        return Err(name::Error::Disallowed);
    }
    Ok(input)
}
