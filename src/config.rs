//! Run configuration.
//!
//! Everything the pipeline needs to know about a run lives in [`Config`].
//! The binary builds one from command-line arguments; tests build their own
//! against temporary trees.

use std::path::{Path, PathBuf};

use crate::export::ExportFormat;

/// Default directory scanned for sources, relative to the working directory.
pub const DEFAULT_SOURCE_ROOT: &str = "src";

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "knowledge_graph.dot";

/// File suffix identifying Python sources.
pub const SOURCE_SUFFIX: &str = ".py";

/// What to do when a discovered file is not valid Python.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseFailurePolicy {
    /// Fail the whole run; nothing is written.
    #[default]
    Abort,
    /// Log a warning and leave the file out of the graph.
    Skip,
}

/// Configuration for a single analysis run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory whose `.py` files are analyzed.
    pub source_root: PathBuf,
    /// Where the graph description is written.
    pub output: PathBuf,
    /// Prefix an import must start with to count as internal (e.g. `src.`).
    pub marker_prefix: String,
    /// Output serialization.
    pub format: ExportFormat,
    pub on_parse_failure: ParseFailurePolicy,
    /// Emit a bare node line for every module in DOT output.
    pub isolated_nodes: bool,
}

impl Config {
    /// Creates a configuration for `source_root` with every other setting
    /// at its default. The marker prefix is derived from the root's
    /// directory name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pydepgraph::config::Config;
    ///
    /// let config = Config::new("project/src");
    /// assert_eq!(config.marker_prefix, "src.");
    /// ```
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        let source_root = source_root.into();
        let marker_prefix = marker_for_root(&source_root);
        Self {
            source_root,
            output: PathBuf::from(DEFAULT_OUTPUT),
            marker_prefix,
            format: ExportFormat::default(),
            on_parse_failure: ParseFailurePolicy::default(),
            isolated_nodes: false,
        }
    }

    /// Sets the output path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Overrides the marker prefix. A trailing `.` is added when missing.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        let mut marker = marker.into();
        if !marker.is_empty() && !marker.ends_with('.') {
            marker.push('.');
        }
        self.marker_prefix = marker;
        self
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_parse_failure_policy(mut self, policy: ParseFailurePolicy) -> Self {
        self.on_parse_failure = policy;
        self
    }

    pub fn with_isolated_nodes(mut self, enabled: bool) -> Self {
        self.isolated_nodes = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_ROOT)
    }
}

/// Derives the marker prefix from the source root's final path component.
///
/// `./src` yields `src.`; a root with no usable name (such as `/` or `..`)
/// falls back to the default root name.
pub fn marker_for_root(root: &Path) -> String {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_SOURCE_ROOT);
    format!("{}.", name)
}
