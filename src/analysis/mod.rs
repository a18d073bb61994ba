//! Source code analysis module.
//!
//! Parses Python source files with tree-sitter and extracts the dotted
//! module names referenced by their import statements.
//!
//! # Features
//!
//! - Plain imports: `import a.b, c as d`
//! - From-imports: `from a.b import x` (records `a.b`)
//! - Future imports: `from __future__ import annotations`
//! - Imports nested in functions, classes, conditionals and `try` blocks
//! - Rejects files that are not valid Python
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pydepgraph::analysis::ImportAnalyzer;
//!
//! let mut analyzer = ImportAnalyzer::new()?;
//! for import in analyzer.analyze_file(Path::new("src/app/main.py"))? {
//!     println!("{} (line {})", import.module, import.line);
//! }
//! ```

pub mod imports;

pub use imports::{
    analyze_file, AnalysisError, AnalysisResult, ImportAnalyzer, ImportKind, ImportReference,
    StatementKind,
};
