//! Small set of primitives shared across the gitoxide-style crates that make up the object
//! database, reference store, index and tree walker.
//!
//! Nothing in here is specific to any single format; it exists so the higher-level crates don't
//! each reinvent thread-safe shared ownership or path-to-utf8 conversion.
#![forbid(unsafe_code)]

pub mod path;
pub mod threading;
