//! Module dependency graph.
//!
//! Stores the adjacency mapping from each project module to the sorted set
//! of internal modules it imports, and provides cycle detection on top of
//! petgraph.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::{Component, Path};

/// Canonical dotted identifier of a project module.
///
/// Derived from a file's path relative to the source root: path segments
/// joined by `.`, with the file extension removed.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use pydepgraph::graph::ModuleId;
///
/// let id = ModuleId::from_relative_path(Path::new("pkg/sub/a.py")).unwrap();
/// assert_eq!(id.as_str(), "pkg.sub.a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates an identifier from an already dotted name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derives the identifier for a file from its path relative to the
    /// source root.
    ///
    /// Returns `None` for a path with no normal components. Only the final
    /// extension is stripped, so `a.b.py` becomes `a.b`.
    pub fn from_relative_path(relative: &Path) -> Option<Self> {
        let stemmed = match relative.file_stem() {
            Some(stem) => relative.with_file_name(stem),
            None => return None,
        };

        let segments: Vec<String> = stemmed
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        if segments.is_empty() {
            None
        } else {
            Some(Self(segments.join(".")))
        }
    }

    /// Classifies a raw import name against the marker prefix.
    ///
    /// Returns the identifier with the prefix stripped when `import` is
    /// internal, `None` otherwise. A name equal to the bare marker leaves
    /// nothing to point at and is rejected too.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pydepgraph::graph::ModuleId;
    ///
    /// assert_eq!(
    ///     ModuleId::from_import("src.pkg.b", "src.").unwrap().as_str(),
    ///     "pkg.b"
    /// );
    /// assert!(ModuleId::from_import("os.path", "src.").is_none());
    /// ```
    pub fn from_import(import: &str, marker_prefix: &str) -> Option<Self> {
        import
            .strip_prefix(marker_prefix)
            .filter(|rest| !rest.is_empty())
            .map(|rest| Self(rest.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Information about a detected circular dependency cycle.
///
/// `nodes` holds every module of the strongly connected component, sorted by
/// name. `path` is one concrete import loop through the component, starting
/// at its first member, in which each module imports the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleInfo {
    pub nodes: Vec<String>,
    pub path: Vec<String>,
}

impl CycleInfo {
    /// Returns the import loop as a string, closed back on its start.
    ///
    /// For example: "a -> b -> c -> a"
    pub fn cycle_path(&self) -> String {
        match self.path.first() {
            Some(first) => format!("{} -> {}", self.path.join(" -> "), first),
            None => String::new(),
        }
    }

    /// Returns the number of modules in the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Mapping from each module to the internal modules it imports.
///
/// Keys and dependency sets are ordered, so iteration is deterministic.
/// Every analyzed module is a key even when its set is empty. Edges may
/// point at modules that are not keys; no cross-module validation happens.
///
/// # Example
///
/// ```rust
/// use pydepgraph::graph::{DependencyGraph, ModuleId};
///
/// let mut graph = DependencyGraph::new();
/// graph.insert_module(ModuleId::from("pkg.a"), [ModuleId::from("pkg.b")]);
/// graph.insert_module(ModuleId::from("pkg.b"), Vec::new());
///
/// assert_eq!(graph.module_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    modules: BTreeMap<ModuleId, BTreeSet<ModuleId>>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `module` with the given dependencies.
    ///
    /// Duplicates are collapsed. If the module is already present the new
    /// dependencies are merged into its set and `false` is returned.
    pub fn insert_module(
        &mut self,
        module: ModuleId,
        dependencies: impl IntoIterator<Item = ModuleId>,
    ) -> bool {
        let fresh = !self.modules.contains_key(&module);
        self.modules.entry(module).or_default().extend(dependencies);
        fresh
    }

    /// Adds a single edge, creating the source entry if needed.
    ///
    /// Returns `true` if the edge was not already present.
    pub fn add_edge(&mut self, from: impl Into<ModuleId>, to: impl Into<ModuleId>) -> bool {
        self.modules.entry(from.into()).or_default().insert(to.into())
    }

    /// Gets the sorted dependencies of a module, if it is a key.
    pub fn dependencies_of(&self, module: &str) -> Option<&BTreeSet<ModuleId>> {
        self.modules.get(&ModuleId::from(module))
    }

    /// Gets the modules that import `module`, in sorted order.
    pub fn dependents_of(&self, module: &str) -> Vec<&ModuleId> {
        self.modules
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d.as_str() == module))
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns true if `module` is a key of the graph.
    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains_key(&ModuleId::from(module))
    }

    /// Iterates over modules and their dependency sets in sorted order.
    pub fn modules(&self) -> impl Iterator<Item = (&ModuleId, &BTreeSet<ModuleId>)> {
        self.modules.iter()
    }

    /// Iterates over all edges ordered by (source, target).
    pub fn edges(&self) -> impl Iterator<Item = (&ModuleId, &ModuleId)> {
        self.modules
            .iter()
            .flat_map(|(from, deps)| deps.iter().map(move |to| (from, to)))
    }

    /// Edge targets that have no entry of their own, e.g. package
    /// `__init__` imports spelled as the package name, or typos.
    pub fn dangling_targets(&self) -> BTreeSet<&ModuleId> {
        self.edges()
            .map(|(_, to)| to)
            .filter(|to| !self.modules.contains_key(*to))
            .collect()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn edge_count(&self) -> usize {
        self.modules.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Builds a petgraph view of the mapping. Dangling targets get nodes
    /// of their own.
    fn to_digraph(&self) -> DiGraph<&ModuleId, ()> {
        let mut graph = DiGraph::with_capacity(self.modules.len(), self.edge_count());
        let mut indices: HashMap<&ModuleId, NodeIndex> = HashMap::new();

        for (from, deps) in &self.modules {
            let from_idx = *indices
                .entry(from)
                .or_insert_with(|| graph.add_node(from));
            for to in deps {
                let to_idx = *indices.entry(to).or_insert_with(|| graph.add_node(to));
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        graph
    }

    /// Checks if the graph contains cycles.
    pub fn has_cycles(&self) -> bool {
        !self.detect_cycles().is_empty()
    }

    /// Detects import cycles.
    ///
    /// Each strongly connected component with more than one module is a
    /// cycle, as is a module that imports itself. Members are sorted and
    /// cycles are ordered by their first member.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pydepgraph::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_edge("a", "b");
    /// graph.add_edge("b", "c");
    /// graph.add_edge("c", "a");
    ///
    /// let cycles = graph.detect_cycles();
    /// assert_eq!(cycles.len(), 1);
    /// assert_eq!(cycles[0].cycle_path(), "a -> b -> c -> a");
    /// ```
    pub fn detect_cycles(&self) -> Vec<CycleInfo> {
        let graph = self.to_digraph();
        let mut cycles = Vec::new();

        for scc in tarjan_scc(&graph) {
            let is_cycle = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
            if !is_cycle {
                continue;
            }

            let members: BTreeSet<&ModuleId> = scc.iter().map(|&idx| graph[idx]).collect();
            let Some(&start) = members.iter().next() else {
                continue;
            };

            cycles.push(CycleInfo {
                nodes: members.iter().map(|m| m.to_string()).collect(),
                path: self.shortest_loop(start, &members),
            });
        }

        cycles.sort_by(|a, b| a.nodes.cmp(&b.nodes));
        cycles
    }

    /// Breadth-first search for the shortest import loop from `start` back to
    /// itself, staying inside `members`. Successors are tried in name order.
    fn shortest_loop(&self, start: &ModuleId, members: &BTreeSet<&ModuleId>) -> Vec<String> {
        let mut parent: HashMap<&ModuleId, &ModuleId> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            for next in self.modules.get(current).into_iter().flatten() {
                if !members.contains(next) {
                    continue;
                }

                if next == start {
                    let mut path = vec![current.to_string()];
                    let mut node = current;
                    while node != start {
                        match parent.get(node) {
                            Some(&prev) => node = prev,
                            None => break,
                        }
                        path.push(node.to_string());
                    }
                    path.reverse();
                    return path;
                }

                if !parent.contains_key(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        vec![start.to_string()]
    }

    /// Returns the set of module names that are part of any cycle.
    pub fn get_nodes_in_cycles(&self) -> BTreeSet<String> {
        self.detect_cycles()
            .into_iter()
            .flat_map(|cycle| cycle.nodes)
            .collect()
    }
}
