//! Benchmarks for graph building and export
//!
//! Measures a full scan of synthetic source trees and the DOT rendering of
//! graphs with many edges.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pydepgraph::config::Config;
use pydepgraph::export::{dot::DotExporter, ExportData};
use pydepgraph::graph::{build_dependency_graph, DependencyGraph};
use std::fs;
use std::path::Path;

/// Write `modules` files spread over packages, each importing a few
/// siblings plus some standard library modules.
fn create_source_tree(root: &Path, modules: usize, imports_per_module: usize) {
    for i in 0..modules {
        let package = format!("pkg{}", i % 10);
        let dir = root.join(&package);
        fs::create_dir_all(&dir).unwrap();

        let mut body = String::from("import os\nfrom collections import defaultdict\n");
        for j in 1..=imports_per_module {
            let target = (i + j) % modules;
            body.push_str(&format!("import src.pkg{}.mod{}\n", target % 10, target));
        }
        body.push_str("\n\ndef run():\n    return os.getcwd()\n");

        fs::write(dir.join(format!("mod{}.py", i)), body).unwrap();
    }
}

/// Build an in-memory graph with a fixed fan-out.
fn create_graph(modules: usize, fan_out: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for i in 0..modules {
        for j in 1..=fan_out {
            graph.add_edge(
                format!("pkg.mod{}", i).as_str(),
                format!("pkg.mod{}", (i + j) % modules).as_str(),
            );
        }
    }
    graph
}

/// Benchmark the full discover + parse + build pass
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_graph");
    group.sample_size(20);

    for size in [50, 200, 500].iter() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("src");
        create_source_tree(&root, *size, 5);
        let config = Config::new(&root);

        group.bench_with_input(BenchmarkId::new("modules", size), size, |b, _| {
            b.iter(|| black_box(build_dependency_graph(&config).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark DOT rendering
fn bench_to_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_dot");

    for size in [100, 1000, 5000].iter() {
        let graph = create_graph(*size, 8);
        let data = ExportData::new(&graph);

        group.bench_with_input(BenchmarkId::new("modules", size), &data, |b, data| {
            b.iter(|| black_box(DotExporter::to_dot(data)));
        });
    }

    group.finish();
}

/// Benchmark cycle detection on a graph where everything is one cycle
fn bench_detect_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_cycles");

    for size in [100, 1000, 5000].iter() {
        let graph = create_graph(*size, 3);

        group.bench_with_input(BenchmarkId::new("modules", size), &graph, |b, graph| {
            b.iter(|| black_box(graph.detect_cycles()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_to_dot, bench_detect_cycles);
criterion_main!(benches);
