use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use estr_core::parser::ParsedFile;
use estr_core::refactor::rename;
use estr_core::semantic::ScopeResolver;
use estr_core::syntax::Position;
use estr_core::tags::extract_tags;

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures");

/// `functions` nested closures sharing one top-level `state` variable,
/// declared on line 1.
fn generate_script(functions: usize) -> String {
    let mut code = String::with_capacity(functions * 200);
    code.push_str("var state = { total: 0 };\n");

    for i in 0..functions {
        code.push_str(&format!(
            r#"function handler{i}(event, options) {{
    var local{i} = event.value + state.total;
    try {{
        options.callback(function inner(result) {{
            state.total += result + local{i};
        }});
    }} catch (error) {{
        return error;
    }}
    return local{i};
}}
"#
        ));
    }

    code
}

fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("{}/{}", FIXTURES_DIR, path))
        .unwrap_or_else(|_| panic!("Failed to read fixture: {}", path))
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for functions in [10, 100] {
        let code = generate_script(functions);
        group.throughput(Throughput::Elements(code.lines().count() as u64));
        group.bench_with_input(BenchmarkId::new("parse", functions), &code, |b, code| {
            b.iter(|| ParsedFile::from_source(black_box("bench.js"), black_box(code)))
        });
    }

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for functions in [10, 100] {
        let parsed = ParsedFile::from_source("bench.js", &generate_script(functions));
        let Some(tree) = parsed.tree() else {
            panic!("generated script failed to parse");
        };
        group.bench_with_input(BenchmarkId::new("resolve", functions), tree, |b, tree| {
            b.iter(|| ScopeResolver::new(black_box(tree)).resolve())
        });
    }

    group.finish();
}

fn bench_rename(c: &mut Criterion) {
    let mut group = c.benchmark_group("rename");

    for functions in [10, 100] {
        let parsed = ParsedFile::from_source("bench.js", &generate_script(functions));
        group.bench_with_input(BenchmarkId::new("top_level", functions), &parsed, |b, parsed| {
            b.iter(|| rename(black_box(parsed), "state", Position::new(1, 4), "shared"))
        });
    }

    let counter = ParsedFile::from_source("counter.js", &read_fixture("rename/counter.js"));
    group.bench_function("counter_fixture", |b| {
        b.iter(|| rename(black_box(&counter), "count", Position::new(2, 4), "total"))
    });

    group.finish();
}

fn bench_tags(c: &mut Criterion) {
    let parsed = ParsedFile::from_source("bench.js", &generate_script(100));
    c.bench_function("tags/classic_100", |b| {
        b.iter(|| extract_tags(black_box(&parsed), true))
    });
}

criterion_group!(benches, bench_parsing, bench_resolution, bench_rename, bench_tags);
criterion_main!(benches);
