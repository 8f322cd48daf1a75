//! Benchmarks for loading and querying RDF.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rdfq::engine::Engine;
use rdfq::graph::sparql::Bindings;
use rdfq::loader::Source;
use rdfq::query::results::ResultFormat;

fn people_turtle(count: usize) -> String {
    let mut out = String::from(
        "@prefix ex: <http://example.org/> .\n@prefix foaf: <http://xmlns.com/foaf/0.1/> .\n",
    );
    for i in 0..count {
        out.push_str(&format!(
            "ex:p{i} a foaf:Person ; foaf:name \"Person {i}\" ; foaf:age {} .\n",
            i % 90
        ));
    }
    out
}

fn bench_load(c: &mut Criterion) {
    let engine = Engine::default();
    let data = people_turtle(1_000);

    c.bench_function("load_turtle_1k", |bench| {
        bench.iter(|| black_box(engine.load(Source::reader(data.as_bytes()), None).unwrap()))
    });
}

fn bench_select(c: &mut Criterion) {
    let engine = Engine::default();
    let graph = engine
        .load(Source::reader(people_turtle(1_000).as_bytes()), None)
        .unwrap();
    let query = "SELECT ?name WHERE { ?p foaf:name ?name ; foaf:age ?age FILTER(?age > 40) }";

    c.bench_function("select_filter_1k", |bench| {
        bench.iter(|| {
            black_box(
                engine
                    .dispatcher()
                    .query(&graph, query, ResultFormat::Json, &Bindings::new())
                    .unwrap(),
            )
        })
    });
}

fn bench_validate(c: &mut Criterion) {
    let engine = Engine::default();
    let graph = engine
        .load(Source::reader(people_turtle(1_000).as_bytes()), None)
        .unwrap();

    c.bench_function("validate_graph_1k", |bench| {
        bench.iter(|| black_box(engine.converter().validate(&graph)))
    });
}

criterion_group!(benches, bench_load, bench_select, bench_validate);
criterion_main!(benches);
