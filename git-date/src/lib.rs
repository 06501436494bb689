//! Parsing and formatting of the timestamps git stores with every commit and tag signature:
//! `<unix-seconds> <+HHMM-offset>`.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod time;
pub use time::{SignKind, Time};

/// Parsing of the single format git itself writes into objects.
pub mod parse;
