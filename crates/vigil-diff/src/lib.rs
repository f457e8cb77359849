//! Unified-diff parsing and pre-analysis file filtering.
//!
//! Turns a raw `git diff` blob into per-file [`parser::FileDiff`] records
//! whose hunks carry line-level changes with resolved old/new line numbers,
//! then drops files matching the configured exclusion globs.

pub mod filter;
pub mod parser;
