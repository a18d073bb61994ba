//! pydepgraph - module dependency graphs for Python source trees
//!
//! This crate walks a Python source root, extracts the import statements of
//! every file with tree-sitter, keeps the ones that point back into the
//! project, and writes the resulting module graph as Graphviz DOT (or JSON).
//!
//! The pipeline is [`discover`] -> [`analysis`] -> [`graph`] -> [`export`],
//! driven by a [`config::Config`].

pub mod analysis;
pub mod config;
pub mod discover;
pub mod export;
pub mod graph;

use std::io;

use thiserror::Error;
use tracing::warn;

use config::Config;
use export::ExportData;
use graph::DependencyGraph;

/// Errors from a full pipeline run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Analysis(#[from] analysis::AnalysisError),

    #[error("Failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Builds the graph for `config.source_root` and writes it to
/// `config.output`.
///
/// Nothing is written unless every file was analyzed successfully (or
/// skipped under the skip policy).
pub fn run(config: &Config) -> Result<DependencyGraph, RunError> {
    let graph = graph::build_dependency_graph(config)?;

    let cycles = graph.detect_cycles();
    for cycle in &cycles {
        warn!(cycle = %cycle.cycle_path(), "import cycle detected");
    }

    let data =
        ExportData::with_cycles(&graph, cycles).with_isolated_nodes(config.isolated_nodes);
    export::write_graph(&config.output, config.format, &data).map_err(|source| {
        RunError::Write {
            path: config.output.display().to_string(),
            source,
        }
    })?;

    Ok(graph)
}
