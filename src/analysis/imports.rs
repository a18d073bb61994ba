//! Import extraction using tree-sitter for Python.
//!
//! This module parses source files and collects the module named by every
//! import statement in the file, wherever it appears in the syntax tree.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;
use tree_sitter::{Node, Parser, Tree, TreeCursor};

/// Errors that can occur during import analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid Python syntax in {path} at line {line}, column {column}")]
    Syntax {
        path: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse file: {path}")]
    ParseFailed { path: String },

    #[error("Tree-sitter language initialization failed")]
    LanguageInit,
}

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// The statement shape an import was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import a.b` or `import a.b as c`
    Plain,
    /// `from a.b import c`
    From,
}

/// A dotted module name captured from an import statement.
///
/// The name is raw: it has not been classified as internal or external.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReference {
    /// Dotted module name, e.g. `src.pkg.b` or `collections`.
    pub module: String,
    pub kind: ImportKind,
    /// Line number in the source file (1-indexed)
    pub line: usize,
}

impl ImportReference {
    /// Returns true if the module name begins with `prefix`.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.module.starts_with(prefix)
    }
}

/// Syntax node categories the extractor cares about.
///
/// Every tree-sitter node kind maps onto exactly one variant; only the
/// first two carry imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Import,
    FromImport,
    Other,
}

impl StatementKind {
    /// Classifies a tree-sitter node kind.
    pub fn from_node_kind(kind: &str) -> Self {
        match kind {
            "import_statement" => StatementKind::Import,
            "import_from_statement" | "future_import_statement" => StatementKind::FromImport,
            _ => StatementKind::Other,
        }
    }
}

/// Analyzer for extracting imports from Python source files.
///
/// Holds one parser that is reused for every file.
pub struct ImportAnalyzer {
    parser: Parser,
}

impl ImportAnalyzer {
    /// Create a new ImportAnalyzer.
    pub fn new() -> AnalysisResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|_| AnalysisError::LanguageInit)?;

        Ok(Self { parser })
    }

    /// Read a file and extract all imports.
    pub fn analyze_file(&mut self, path: &Path) -> AnalysisResult<Vec<ImportReference>> {
        let content = fs::read_to_string(path).map_err(|source| AnalysisError::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        self.analyze_source(&content, path)
    }

    /// Analyze source code directly. `path` is only used in errors.
    pub fn analyze_source(
        &mut self,
        source: &str,
        path: &Path,
    ) -> AnalysisResult<Vec<ImportReference>> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::ParseFailed {
                path: path.display().to_string(),
            })?;

        if let Some((line, column)) = first_syntax_error(&tree, source) {
            return Err(AnalysisError::Syntax {
                path: path.display().to_string(),
                line,
                column,
            });
        }

        let imports = extract_imports(&tree, source);
        debug!(path = %path.display(), count = imports.len(), "extracted imports");
        Ok(imports)
    }
}

/// Analyze a single file and return its imports.
pub fn analyze_file(path: &Path) -> AnalysisResult<Vec<ImportReference>> {
    let mut analyzer = ImportAnalyzer::new()?;
    analyzer.analyze_file(path)
}

/// Pre-order traversal over every node of a tree.
///
/// Driven by a single `TreeCursor`, so nesting depth does not grow the
/// call stack.
struct PreOrder<'t> {
    cursor: TreeCursor<'t>,
    done: bool,
}

impl<'t> PreOrder<'t> {
    fn new(tree: &'t Tree) -> Self {
        Self {
            cursor: tree.walk(),
            done: false,
        }
    }
}

impl<'t> Iterator for PreOrder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(node)
    }
}

/// Returns true for nodes the grammar accepts but Python 3 does not.
///
/// The grammar keeps Python 2 `print`/`exec` statements and lets a
/// compound statement end with an empty body.
fn is_invalid_node(node: &Node) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }

    match node.kind() {
        "print_statement" | "exec_statement" => true,
        "block" => {
            let mut cursor = node.walk();
            let has_statement = node.named_children(&mut cursor).any(|c| !c.is_extra());
            !has_statement
        }
        _ => false,
    }
}

/// Locates the first invalid construct, as 1-indexed (line, column).
fn first_syntax_error(tree: &Tree, source: &str) -> Option<(usize, usize)> {
    if source.starts_with('\u{feff}') {
        return Some((1, 1));
    }

    PreOrder::new(tree)
        .find(|node| is_invalid_node(node))
        .map(|node| {
            let pos = node.start_position();
            (pos.row + 1, pos.column + 1)
        })
}

/// Extract imports from a parsed tree, visiting every node.
fn extract_imports(tree: &Tree, source: &str) -> Vec<ImportReference> {
    let mut imports = Vec::new();

    for node in PreOrder::new(tree) {
        match StatementKind::from_node_kind(node.kind()) {
            StatementKind::Import => parse_plain_import(&node, source, &mut imports),
            StatementKind::FromImport => {
                if let Some(import) = parse_from_import(&node, source) {
                    imports.push(import);
                }
            }
            StatementKind::Other => {}
        }
    }

    imports
}

/// Parse `import a.b, c as d`, one reference per imported name.
fn parse_plain_import(node: &Node, source: &str, imports: &mut Vec<ImportReference>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();

    for name in node.children_by_field_name("name", &mut cursor) {
        let dotted = match name.kind() {
            "aliased_import" => name.child_by_field_name("name"),
            "dotted_name" => Some(name),
            _ => None,
        };

        if let Some(module) = dotted.and_then(|n| dotted_name_text(&n, source)) {
            imports.push(ImportReference {
                module,
                kind: ImportKind::Plain,
                line,
            });
        }
    }
}

/// Parse a from-import, returning the source module if there is one.
///
/// `from . import x` has no module and yields nothing. For
/// `from .pkg import x` only the dotted part (`pkg`) is kept, without the
/// leading dots, so `from .src.a import b` records `src.a`.
fn parse_from_import(node: &Node, source: &str) -> Option<ImportReference> {
    let line = node.start_position().row + 1;

    let module = if node.kind() == "future_import_statement" {
        "__future__".to_string()
    } else {
        let module_node = node.child_by_field_name("module_name")?;
        match module_node.kind() {
            "dotted_name" => dotted_name_text(&module_node, source)?,
            "relative_import" => {
                let mut cursor = module_node.walk();
                let dotted = module_node
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "dotted_name")?;
                dotted_name_text(&dotted, source)?
            }
            _ => return None,
        }
    };

    Some(ImportReference {
        module,
        kind: ImportKind::From,
        line,
    })
}

/// Rebuild a dotted name from its identifiers so that any whitespace
/// between the parts is dropped.
fn dotted_name_text(node: &Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let parts: Vec<&str> = node
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "identifier")
        .filter_map(|c| node_text(&c, source))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}

/// Extract the text content of a node.
fn node_text<'a>(node: &Node, source: &'a str) -> Option<&'a str> {
    source.get(node.start_byte()..node.end_byte())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_source(source: &str) -> Vec<ImportReference> {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        analyzer
            .analyze_source(source, Path::new("test.py"))
            .unwrap()
    }

    fn modules(source: &str) -> Vec<String> {
        parse_source(source).into_iter().map(|i| i.module).collect()
    }

    // ===== Plain Import Tests =====

    #[test]
    fn test_plain_import() {
        let imports = parse_source("import os\n");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "os");
        assert_eq!(imports[0].kind, ImportKind::Plain);
        assert_eq!(imports[0].line, 1);
    }

    #[test]
    fn test_dotted_import() {
        assert_eq!(modules("import src.pkg.b\n"), vec!["src.pkg.b"]);
    }

    #[test]
    fn test_multiple_names_in_one_statement() {
        assert_eq!(
            modules("import os, sys, src.pkg.b\n"),
            vec!["os", "sys", "src.pkg.b"]
        );
    }

    #[test]
    fn test_alias_is_ignored() {
        assert_eq!(
            modules("import numpy as np, src.pkg.b as b\n"),
            vec!["numpy", "src.pkg.b"]
        );
    }

    #[test]
    fn test_whitespace_inside_dotted_name() {
        assert_eq!(modules("import src . pkg . b\n"), vec!["src.pkg.b"]);
    }

    // ===== From Import Tests =====

    #[test]
    fn test_from_import_records_module() {
        let imports = parse_source("from collections import OrderedDict, defaultdict\n");

        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "collections");
        assert_eq!(imports[0].kind, ImportKind::From);
    }

    #[test]
    fn test_from_import_wildcard() {
        assert_eq!(modules("from src.pkg.util import *\n"), vec!["src.pkg.util"]);
    }

    #[test]
    fn test_from_import_parenthesized() {
        let source = "from src.pkg import (\n    a,\n    b as c,\n)\n";
        assert_eq!(modules(source), vec!["src.pkg"]);
    }

    #[test]
    fn test_bare_relative_import_contributes_nothing() {
        assert!(modules("from . import sibling\n").is_empty());
        assert!(modules("from .. import parent\n").is_empty());
    }

    #[test]
    fn test_relative_import_keeps_dotted_part() {
        assert_eq!(modules("from .helpers import tool\n"), vec!["helpers"]);
        assert_eq!(modules("from ..core.base import Base\n"), vec!["core.base"]);
    }

    #[test]
    fn test_relative_import_drops_leading_dots() {
        let imports = parse_source("from .src.a import b\n");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "src.a");
        assert_eq!(imports[0].kind, ImportKind::From);
    }

    #[test]
    fn test_future_import() {
        assert_eq!(
            modules("from __future__ import annotations\n"),
            vec!["__future__"]
        );
    }

    // ===== Nesting Tests =====

    #[test]
    fn test_nested_imports_are_found() {
        let source = r#"
import src.pkg.b

class Widget:
    from src.pkg import c

    def render(self):
        import src.pkg.b
        if True:
            from src.ui import theme
        try:
            import optional_dep
        except ImportError:
            pass
"#;
        let imports = parse_source(source);
        let names: Vec<_> = imports.iter().map(|i| i.module.as_str()).collect();

        assert_eq!(
            names,
            vec!["src.pkg.b", "src.pkg", "src.pkg.b", "src.ui", "optional_dep"]
        );
        assert_eq!(imports[0].line, 2);
        assert_eq!(imports[2].line, 8);
    }

    #[test]
    fn test_no_imports() {
        assert!(parse_source("x = 1\nprint(x)\n").is_empty());
        assert!(parse_source("").is_empty());
    }

    #[test]
    fn test_import_in_string_is_not_an_import() {
        assert!(parse_source("s = 'import src.pkg.b'\n").is_empty());
    }

    // ===== Failure Tests =====

    #[test]
    fn test_invalid_syntax_fails() {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        let result = analyzer.analyze_source("import os\ndef broken(:\n", Path::new("bad.py"));

        match result {
            Err(AnalysisError::Syntax { path, line, .. }) => {
                assert_eq!(path, "bad.py");
                assert_eq!(line, 2);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    fn syntax_error_position(source: &str) -> Option<(usize, usize)> {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        match analyzer.analyze_source(source, Path::new("bad.py")) {
            Err(AnalysisError::Syntax { line, column, .. }) => Some((line, column)),
            _ => None,
        }
    }

    #[test]
    fn test_python2_print_statement_fails() {
        assert_eq!(
            syntax_error_position("import src.a\nprint \"legacy\"\n"),
            Some((2, 1))
        );
    }

    #[test]
    fn test_python2_exec_statement_fails() {
        assert_eq!(syntax_error_position("exec \"code\"\n"), Some((1, 1)));
    }

    #[test]
    fn test_print_call_is_valid() {
        assert!(syntax_error_position("print(\"ok\")\nexec(\"x = 1\")\n").is_none());
    }

    #[test]
    fn test_missing_indented_block_fails() {
        assert!(syntax_error_position("if True:\nx = 1\n").is_some());
        assert!(syntax_error_position("def f():\n").is_some());
        assert!(syntax_error_position("class C:\n# only a comment\n").is_some());
    }

    #[test]
    fn test_indented_block_is_valid() {
        let source = "if True:\n    # note\n    x = 1\nclass C: pass\n";
        assert!(syntax_error_position(source).is_none());
    }

    #[test]
    fn test_byte_order_mark_fails() {
        assert_eq!(
            syntax_error_position("\u{feff}import src.a\n"),
            Some((1, 1))
        );
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 50_000;
        let source = format!(
            "x = {}1{}\nimport src.deep\n",
            "(".repeat(depth),
            ")".repeat(depth)
        );

        assert_eq!(modules(&source), vec!["src.deep"]);
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze_file(&dir.path().join("absent.py"));
        assert!(matches!(result, Err(AnalysisError::FileRead { .. })));
    }

    #[test]
    fn test_analyzer_is_reusable_after_error() {
        let mut analyzer = ImportAnalyzer::new().unwrap();
        assert!(analyzer
            .analyze_source("def (:\n", Path::new("bad.py"))
            .is_err());

        let imports = analyzer
            .analyze_source("import src.a\n", Path::new("good.py"))
            .unwrap();
        assert_eq!(imports.len(), 1);
    }

    #[test]
    fn test_statement_kind_classification() {
        assert_eq!(
            StatementKind::from_node_kind("import_statement"),
            StatementKind::Import
        );
        assert_eq!(
            StatementKind::from_node_kind("import_from_statement"),
            StatementKind::FromImport
        );
        assert_eq!(
            StatementKind::from_node_kind("future_import_statement"),
            StatementKind::FromImport
        );
        assert_eq!(
            StatementKind::from_node_kind("function_definition"),
            StatementKind::Other
        );
    }

    #[test]
    fn test_reference_prefix_check() {
        let import = ImportReference {
            module: "src.pkg.b".to_string(),
            kind: ImportKind::Plain,
            line: 1,
        };
        assert!(import.starts_with("src."));
        assert!(!import.starts_with("pkg."));
    }
}
