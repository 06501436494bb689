//! A tempfile that registers itself with a process-global registry so a forwarded `SIGTERM` or
//! `SIGINT` still cleans it up, instead of leaving a stray file next to `.git/index` or a loose
//! object whenever the process is killed mid-write.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

mod handle;
mod registry;

pub use handle::{AutoRemove, Closed, ContainingDirectory, Handle, Writable};
pub use registry::{cleanup_all, deregister, register, setup, Id, SignalHandlerMode};
