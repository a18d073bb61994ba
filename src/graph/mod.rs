//! Graph module for module dependency modeling.
//!
//! This module provides the [`DependencyGraph`] mapping from each project
//! module to the internal modules it imports, and the builder that fills
//! it from a source tree.
//!
//! # Example
//!
//! ```rust
//! use pydepgraph::graph::{DependencyGraph, ModuleId};
//!
//! let mut graph = DependencyGraph::new();
//! graph.insert_module(ModuleId::from("pkg.a"), [ModuleId::from("pkg.b")]);
//! graph.insert_module(ModuleId::from("pkg.b"), Vec::new());
//!
//! assert_eq!(graph.module_count(), 2);
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod builder;
mod dependency_graph;

pub use builder::{build_dependency_graph, build_from_files, internal_dependencies, GraphBuilder};
pub use dependency_graph::{CycleInfo, DependencyGraph, ModuleId};
