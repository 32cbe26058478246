//! FHIRPath interpreter benchmarks
//!
//! Covers tokenizing, parsing, cached compilation and evaluation against a
//! JSON-adapted Patient.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use octofhir_fhirpath_interp::parser::{parse_expression_pratt, tokenizer::Tokenizer};
use octofhir_fhirpath_interp::{EvaluationContext, FhirPathEngine, TreeAdapter};
use serde_json::json;
use std::hint::black_box;

const TEST_EXPRESSIONS: &[(&str, &str)] = &[
    ("simple", "Patient.name"),
    ("medium", "Patient.name.where(use = 'official')"),
    (
        "complex",
        "Patient.name.where(use = 'official').given.first()",
    ),
    (
        "aggregate",
        "Patient.telecom.rank.aggregate($this + $total, 0) > 2 and Patient.active",
    ),
];

fn patient() -> serde_json::Value {
    json!({
        "resourceType": "Patient",
        "id": "bench",
        "active": true,
        "birthDate": "1974-12-25",
        "name": [
            {"use": "official", "family": "Chalmers", "given": ["Peter", "James"]},
            {"use": "usual", "given": ["Jim"]}
        ],
        "telecom": [
            {"system": "phone", "value": "(03) 5555 6473", "use": "work", "rank": 1},
            {"system": "phone", "value": "(03) 3410 5613", "use": "mobile", "rank": 2}
        ]
    })
}

fn bench_tokenizer(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizer");
    group.throughput(Throughput::Elements(1));

    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("tokenize", complexity),
            expression,
            |b, expr| {
                b.iter(|| {
                    let mut tokenizer = Tokenizer::new(black_box(expr));
                    black_box(tokenizer.tokenize_all())
                })
            },
        );
    }

    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");
    group.throughput(Throughput::Elements(1));

    let engine = FhirPathEngine::new();
    for (complexity, expression) in TEST_EXPRESSIONS {
        group.bench_with_input(
            BenchmarkId::new("parse", complexity),
            expression,
            |b, expr| b.iter(|| black_box(parse_expression_pratt(black_box(expr)))),
        );
        group.bench_with_input(
            BenchmarkId::new("compile_cached", complexity),
            expression,
            |b, expr| b.iter(|| black_box(engine.compile(black_box(expr)))),
        );
    }

    group.finish();
}

fn bench_evaluator(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluator");
    group.throughput(Throughput::Elements(1));

    let engine = FhirPathEngine::new();
    let root = patient().to_node().unwrap();
    let context = EvaluationContext::new(root);

    for (complexity, expression) in TEST_EXPRESSIONS {
        let ast = engine.compile(expression).unwrap();
        group.bench_with_input(
            BenchmarkId::new("evaluate", complexity),
            expression,
            |b, expr| b.iter(|| black_box(engine.evaluate_with_context(black_box(expr), &context))),
        );
        group.bench_with_input(
            BenchmarkId::new("evaluate_compiled", complexity),
            &ast,
            |b, ast| b.iter(|| black_box(engine.evaluate_compiled(black_box(ast), &context))),
        );
    }

    group.finish();
}

fn bench_adapter(c: &mut Criterion) {
    let document = patient();
    c.bench_function("json_adapter_patient", |b| {
        b.iter(|| black_box(black_box(&document).to_node()))
    });
}

criterion_group!(
    benches,
    bench_tokenizer,
    bench_parser,
    bench_evaluator,
    bench_adapter
);
criterion_main!(benches);
