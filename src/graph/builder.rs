//! Builds a [`DependencyGraph`] from a source tree.
//!
//! Ties discovery and import extraction together: every discovered file
//! becomes one module entry holding the internal modules it imports.

use std::collections::BTreeSet;

use tracing::{info, warn};

use super::{DependencyGraph, ModuleId};
use crate::analysis::{AnalysisError, AnalysisResult, ImportAnalyzer, ImportReference};
use crate::config::{Config, ParseFailurePolicy, SOURCE_SUFFIX};
use crate::discover::{discover_source_files, SourceFile};

/// Reduces raw imports to the sorted set of internal module ids.
///
/// Names without `marker_prefix` are dropped; the prefix is stripped from
/// the rest.
pub fn internal_dependencies<'a>(
    imports: impl IntoIterator<Item = &'a ImportReference>,
    marker_prefix: &str,
) -> BTreeSet<ModuleId> {
    imports
        .into_iter()
        .filter_map(|import| ModuleId::from_import(&import.module, marker_prefix))
        .collect()
}

/// Accumulates module entries for one run.
pub struct GraphBuilder<'a> {
    config: &'a Config,
    analyzer: ImportAnalyzer,
    graph: DependencyGraph,
    skipped: usize,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(config: &'a Config) -> AnalysisResult<Self> {
        Ok(Self {
            config,
            analyzer: ImportAnalyzer::new()?,
            graph: DependencyGraph::new(),
            skipped: 0,
        })
    }

    /// Analyzes one file and records its entry.
    ///
    /// Syntax errors are returned or skipped according to the configured
    /// policy. Read errors are always returned.
    pub fn add_file(&mut self, file: &SourceFile) -> AnalysisResult<()> {
        let Some(module) = ModuleId::from_relative_path(&file.relative_path) else {
            warn!(path = %file.path.display(), "no module id for file; skipping");
            self.skipped += 1;
            return Ok(());
        };

        let imports = match self.analyzer.analyze_file(&file.path) {
            Ok(imports) => imports,
            Err(e @ AnalysisError::Syntax { .. })
                if self.config.on_parse_failure == ParseFailurePolicy::Skip =>
            {
                warn!(error = %e, "skipping unparsable file");
                self.skipped += 1;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let dependencies = internal_dependencies(&imports, &self.config.marker_prefix);
        if !self.graph.insert_module(module.clone(), dependencies) {
            warn!(
                module = %module,
                path = %file.path.display(),
                "module id produced by more than one file; merging dependencies"
            );
        }

        Ok(())
    }

    /// Number of files left out, either unparsable under the skip policy or
    /// without a module id.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Consumes the builder, logging a summary of the result.
    pub fn finish(self) -> DependencyGraph {
        info!(
            modules = self.graph.module_count(),
            edges = self.graph.edge_count(),
            skipped = self.skipped,
            "dependency graph built"
        );
        self.graph
    }
}

/// Builds the graph for an explicit sequence of files.
pub fn build_from_files(
    config: &Config,
    files: impl IntoIterator<Item = SourceFile>,
) -> AnalysisResult<DependencyGraph> {
    let mut builder = GraphBuilder::new(config)?;
    for file in files {
        builder.add_file(&file)?;
    }
    Ok(builder.finish())
}

/// Walks the configured source root and builds the dependency graph.
///
/// # Example
///
/// ```ignore
/// use pydepgraph::config::Config;
/// use pydepgraph::graph::build_dependency_graph;
///
/// let graph = build_dependency_graph(&Config::default())?;
/// for (module, deps) in graph.modules() {
///     println!("{} -> {:?}", module, deps);
/// }
/// ```
pub fn build_dependency_graph(config: &Config) -> AnalysisResult<DependencyGraph> {
    build_from_files(
        config,
        discover_source_files(&config.source_root, SOURCE_SUFFIX),
    )
}
