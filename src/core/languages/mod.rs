//! Language front ends.
//!
//! A front end owns the external parser and shapes its syntax tree into the
//! program structure tree the translator consumes.

mod java;

pub use java::JavaFrontEnd;

use crate::error::Result;
use super::psi::JavaFile;

/// Trait that all front ends must implement
pub trait SourceFrontEnd {
    /// Parse source code into a program structure tree
    fn parse(&mut self, content: &str, file_path: &std::path::Path) -> Result<JavaFile>;

    /// Get the file extensions this front end handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name
    fn language_name(&self) -> &str;
}
