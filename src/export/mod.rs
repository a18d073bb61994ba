//! Export functionality for dependency graphs.
//!
//! This module serializes a [`DependencyGraph`] as a Graphviz DOT digraph
//! or as JSON, and writes the result to disk with write-replace semantics.

pub mod dot;
pub mod json;

use crate::graph::{CycleInfo, DependencyGraph};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Graphviz DOT - input for `dot -Tpng` and friends
    #[default]
    Dot,
    /// JSON format - machine-readable, includes cycles and summary
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Ok(ExportFormat::Dot),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: dot, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Dot => write!(f, "dot"),
            ExportFormat::Json => write!(f, "json"),
        }
    }
}

/// Data container for export operations.
///
/// Bundles the graph with the derived facts some formats report.
#[derive(Debug, Clone)]
pub struct ExportData<'a> {
    pub graph: &'a DependencyGraph,
    /// Detected import cycles
    pub cycles: Vec<CycleInfo>,
    /// Emit a node statement for every module, not only edges (DOT only)
    pub isolated_nodes: bool,
}

impl<'a> ExportData<'a> {
    /// Create export data from a finished graph.
    pub fn new(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            cycles: graph.detect_cycles(),
            isolated_nodes: false,
        }
    }

    /// Create export data from a graph whose cycles are already known.
    pub fn with_cycles(graph: &'a DependencyGraph, cycles: Vec<CycleInfo>) -> Self {
        Self {
            graph,
            cycles,
            isolated_nodes: false,
        }
    }

    pub fn with_isolated_nodes(mut self, enabled: bool) -> Self {
        self.isolated_nodes = enabled;
        self
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData<'_>,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Dot => dot::DotExporter.export(data, writer),
        ExportFormat::Json => json::JsonExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData<'_>) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Serialize `data` and replace the file at `path` with the result.
///
/// The whole document is rendered in memory before anything touches the
/// filesystem.
pub fn write_graph(path: &Path, format: ExportFormat, data: &ExportData<'_>) -> io::Result<()> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    write_atomic(path, &buffer)
}

/// Write `contents` to `path` through a sibling temporary file and rename.
///
/// Readers see either the previous file or the complete new one. On error
/// the temporary file is removed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path)?;

    let result = (|| -> io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path has no file name: {}", path.display()),
        )
    })?;

    let mut temp_name = std::ffi::OsString::from(".");
    temp_name.push(name);
    temp_name.push(".tmp");
    Ok(path.with_file_name(temp_name))
}
