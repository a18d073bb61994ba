//! Source file discovery.
//!
//! Walks a source root recursively and yields every Python file beneath it.
//! The walk is lazy and read-only; each call to [`discover_source_files`]
//! starts a fresh traversal.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pydepgraph::discover::discover_source_files;
//!
//! for file in discover_source_files(Path::new("src"), ".py") {
//!     println!("{}", file.relative_path.display());
//! }
//! ```

mod walker;

pub use walker::{discover_source_files, SourceFile, SourceFiles};
