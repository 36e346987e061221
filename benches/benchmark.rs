// Filter and aggregation benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mybay::prelude::*;
use mybay_core::edit_distance;
use rand::prelude::*;
use serde_json::json;
use std::sync::Arc;

const RAMS: [f64; 5] = [8.0, 16.0, 20.0, 32.0, 64.0];
const COLORS: [&str; 4] = ["Silver", "Space Gray", "Gold", "Rose Gold"];
const CPUS: [&str; 5] = ["i5-7360U", "i7-7700HQ", "i7-7820HQ", "i7-7820HK", "i9-8950HK"];

fn generate_random_record(id: usize) -> Record {
    let mut rng = rand::rng();
    let mut record = Record::new(format!("item-{}", id));
    record.derived.ram_size = vec![RAMS[rng.random_range(0..RAMS.len())]];
    record.derived.color = vec![COLORS[rng.random_range(0..COLORS.len())].to_string()];
    record.derived.cpu_model = vec![CPUS[rng.random_range(0..CPUS.len())].to_string()];
    record.details.title = Some(format!("Apple MacBook Pro listing {}", id));
    record.details.price = Some(mybay_core::Price {
        value: rng.random_range(150.0..2500.0),
        currency: Some("USD".to_string()),
    });
    record
}

fn build_engine(size: usize) -> SearchEngine<Collection> {
    let collection = Collection::new(CollectionConfig {
        name: "bench".to_string(),
    });
    for i in 0..size {
        collection.upsert(generate_random_record(i)).unwrap();
    }
    SearchEngine::new(Arc::new(collection), EngineConfig::default()).unwrap()
}

fn benchmark_direct_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_filter");

    for size in [1000, 10000, 100000].iter() {
        let engine = build_engine(*size);
        let request = FilterRequest::new("bench")
            .filter(ClauseSpec::new("ramSize", vec![json!("16"), json!("32")]))
            .filter(ClauseSpec::new("color", vec![json!("silver")]))
            .paged(1, 20);

        group.bench_with_input(BenchmarkId::new("mybay", size), size, |b, _| {
            b.iter(|| black_box(engine.execute(black_box(&request)).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_variant_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("variant_filter");

    let engine = build_engine(10000);
    let request = FilterRequest::new("bench")
        .filter(ClauseSpec::new("cpuModel", vec![json!("i7-7820HQ")]).with_threshold(2.0))
        .filter(ClauseSpec::new("ramSize", vec![json!(16)]).with_threshold(4.0))
        .paged(3, 20);

    group.bench_function("mybay_variant", |b| {
        b.iter(|| black_box(engine.execute(black_box(&request)).unwrap()));
    });

    group.bench_function("edit_distance", |b| {
        b.iter(|| {
            black_box(edit_distance(
                black_box("apple macbook pro 15"),
                black_box("apple macbok pro 16"),
            ))
        });
    });

    group.finish();
}

fn benchmark_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    let engine = build_engine(10000);
    let mut request = FilterRequest::new("bench")
        .filter(ClauseSpec::new("color", vec![json!("space gray")]))
        .stats_for("ramSize");
    request.price_stats = true;
    request.facets = vec!["color".to_string(), "cpuModel".to_string()];

    group.bench_function("mybay_stats_and_facets", |b| {
        b.iter(|| black_box(engine.execute(black_box(&request)).unwrap()));
    });

    group.finish();
}

fn benchmark_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_reads");

    let engine = Arc::new(build_engine(1000));
    let request = FilterRequest::new("bench").filter(ClauseSpec::new("ramSize", vec![json!("16")]));

    group.bench_function("mybay_concurrent", |b| {
        b.iter(|| {
            use std::thread;
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let engine = engine.clone();
                    let request = request.clone();
                    thread::spawn(move || engine.execute(&request).map(|r| r.total_count))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_direct_filter,
    benchmark_variant_filter,
    benchmark_stats,
    benchmark_concurrent_reads
);
criterion_main!(benches);
