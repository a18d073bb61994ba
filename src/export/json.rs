//! JSON export implementation.
//!
//! Exports the dependency graph in JSON format for machine-readable output.

use super::{ExportData, Exporter};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Serializable cycle info for JSON output.
#[derive(Serialize)]
struct JsonCycle<'a> {
    modules: &'a [String],
    path: String,
}

/// Summary statistics for JSON output.
#[derive(Serialize)]
struct JsonSummary {
    modules: usize,
    edges: usize,
    cycles: usize,
    dangling_targets: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
struct JsonExport<'a> {
    summary: JsonSummary,
    modules: BTreeMap<&'a str, Vec<&'a str>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cycles: Vec<JsonCycle<'a>>,
}

impl Exporter for JsonExporter {
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()> {
        let graph = data.graph;

        let modules: BTreeMap<&str, Vec<&str>> = graph
            .modules()
            .map(|(id, deps)| (id.as_str(), deps.iter().map(|d| d.as_str()).collect()))
            .collect();

        let cycles: Vec<JsonCycle<'_>> = data
            .cycles
            .iter()
            .map(|c| JsonCycle {
                modules: &c.nodes,
                path: c.cycle_path(),
            })
            .collect();

        let export = JsonExport {
            summary: JsonSummary {
                modules: graph.module_count(),
                edges: graph.edge_count(),
                cycles: data.cycles.len(),
                dangling_targets: graph.dangling_targets().len(),
            },
            modules,
            cycles,
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
