//! Benchmarks for detection, filter generation and filter evaluation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rust_data_filtering::detection::{DetectionOptions, TypeDetector};
use rust_data_filtering::filters::{
    FilterEngine, FilterUpdate, FilterValue, FilterValues, GeneratorOptions, SearchFilter,
    generate_filters,
};
use rust_data_filtering::types::{DataSet, Value};

const CITIES: [&str; 6] = ["London", "Paris", "Berlin", "Oslo", "Rome", "Madrid"];

fn synthetic(rows: usize) -> DataSet {
    let data = (0..rows)
        .map(|i| {
            vec![
                Value::Utf8(i.to_string()),
                Value::Utf8(CITIES[i % CITIES.len()].to_string()),
                if i % 17 == 0 {
                    Value::Null
                } else {
                    Value::Utf8(format!("{:.2}", (i % 1000) as f64 * 1.25))
                },
                Value::Utf8(if i % 3 == 0 { "yes" } else { "no" }.to_string()),
                Value::Utf8(format!("2024-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
                Value::Utf8(format!("comment number {i}")),
            ]
        })
        .collect();
    DataSet::new(
        ["id", "city", "amount", "flag", "day", "comment"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        data,
    )
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    for rows in [1_000, 10_000, 50_000] {
        let ds = synthetic(rows);
        let detector = TypeDetector::new(DetectionOptions::default());
        group.bench_with_input(BenchmarkId::new("rows", rows), &ds, |b, ds| {
            b.iter(|| detector.detect(black_box(ds)))
        });
    }
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let ds = synthetic(10_000);
    let columns = TypeDetector::default().detect(&ds);
    c.bench_function("generate_filters", |b| {
        b.iter(|| generate_filters(black_box(&columns)))
    });
}

fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_filters");
    for rows in [1_000, 10_000, 50_000] {
        let ds = synthetic(rows);
        let columns = TypeDetector::default().detect(&ds);
        let mut engine = FilterEngine::from_columns(&columns, &GeneratorOptions::default());
        engine.update_filter(
            "filter-1",
            FilterUpdate::values(FilterValues::Select(vec![
                FilterValue::new("London", true),
                FilterValue::new("Oslo", true),
            ])),
        );
        engine.update_filter(
            "filter-5",
            FilterUpdate::values(FilterValues::Search(SearchFilter {
                query: "NUMBER 1".into(),
                ..Default::default()
            })),
        );

        group.bench_with_input(BenchmarkId::new("rows", rows), &ds, |b, ds| {
            b.iter(|| engine.apply_filters(black_box(ds)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detection, bench_generation, bench_apply);
criterion_main!(benches);
