//! Graphviz DOT export implementation.
//!
//! Writes one `"from" -> "to";` line per edge inside a `digraph G` block.
//! Modules without outgoing edges produce no line unless isolated node
//! declarations are requested.

use super::{ExportData, Exporter};
use std::io::{self, Write};

/// DOT exporter implementation.
pub struct DotExporter;

impl DotExporter {
    /// Quote an identifier, escaping backslashes and double quotes.
    fn quote(id: &str) -> String {
        format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
    }

    /// Render the full document. Lines are joined with `\n` and there is
    /// no trailing newline after the closing brace.
    pub fn to_dot(data: &ExportData<'_>) -> String {
        let mut lines = vec!["digraph G {".to_string()];

        if data.isolated_nodes {
            for (module, _) in data.graph.modules() {
                lines.push(format!("    {};", Self::quote(module.as_str())));
            }
        }

        for (from, to) in data.graph.edges() {
            lines.push(format!(
                "    {} -> {};",
                Self::quote(from.as_str()),
                Self::quote(to.as_str())
            ));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }
}

impl Exporter for DotExporter {
    fn export<W: Write>(&self, data: &ExportData<'_>, writer: &mut W) -> io::Result<()> {
        writer.write_all(Self::to_dot(data).as_bytes())
    }
}
