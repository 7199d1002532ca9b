//! Full analysis pipeline performance benchmarks.
//!
//! Measures loading, profiling and end-to-end dataset analysis.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Write;
use tabscope::{AnalysisEngine, Dataset, EngineConfig, Loader, Table, TypeProfiler};
use tempfile::NamedTempFile;

/// Generate a customers CSV.
fn generate_customers(rows: usize) -> String {
    let mut data = String::from("id,email,country,signup_date,lifetime_value\n");
    let countries = ["NZ", "AU", "US", "GB", "DE"];

    for row in 0..rows {
        // Every 97th value is an outlier.
        let value = if row % 97 == 0 { 50_000.0 } else { 100.0 + (row % 40) as f64 * 12.5 };
        data.push_str(&format!(
            "{},user{}@example.com,{},2023-{:02}-{:02},{:.2}\n",
            row + 1,
            row,
            countries[row % countries.len()],
            (row % 12) + 1,
            (row % 28) + 1,
            value
        ));
    }

    data
}

/// Generate an orders CSV referencing the customers.
fn generate_orders(rows: usize, customers: usize) -> String {
    let mut data = String::from("order_id,customer_id,amount,quantity\n");
    for row in 0..rows {
        let quantity = 1 + row % 5;
        data.push_str(&format!(
            "{},{},{:.2},{}\n",
            row + 1,
            (row * 7) % customers + 1,
            quantity as f64 * 19.99,
            quantity
        ));
    }
    data
}

fn load(name: &str, data: &str) -> Table {
    Loader::new()
        .load_bytes(name, data.as_bytes())
        .unwrap()
        .table
}

fn make_dataset(customers: usize) -> Dataset {
    Dataset::new(
        "bench",
        vec![
            load("customers.csv", &generate_customers(customers)),
            load("orders.csv", &generate_orders(customers * 3, customers)),
        ],
    )
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");

    for customers in [100, 1_000, 10_000].iter() {
        let dataset = make_dataset(*customers);

        group.throughput(Throughput::Elements(dataset.cell_count() as u64));
        group.bench_with_input(
            BenchmarkId::new("customers_orders", customers),
            &dataset,
            |b, dataset| {
                let engine = AnalysisEngine::new();
                b.iter(|| black_box(engine.analyze(dataset).unwrap()))
            },
        );
    }

    group.finish();
}

fn bench_parallel_vs_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallelism");
    group.sample_size(10);

    let dataset = make_dataset(10_000);
    for parallel in [true, false] {
        let engine = AnalysisEngine::with_config(EngineConfig {
            parallel,
            ..EngineConfig::default()
        });
        group.bench_function(if parallel { "parallel" } else { "sequential" }, |b| {
            b.iter(|| black_box(engine.analyze(&dataset).unwrap()))
        });
    }

    group.finish();
}

fn bench_profiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("profiling");

    let table = load("customers.csv", &generate_customers(50_000));
    let profiler = TypeProfiler::new();
    for column in &table.columns {
        group.bench_function(column.name.as_str(), |b| {
            b.iter(|| black_box(profiler.profile(column)))
        });
    }

    group.finish();
}

fn bench_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("loading");
    group.sample_size(10);

    let data = generate_customers(100_000);
    let mut temp = NamedTempFile::with_suffix(".csv").unwrap();
    temp.write_all(data.as_bytes()).unwrap();
    let path = temp.path().to_path_buf();

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("load_100k_rows", |b| {
        b.iter(|| black_box(Loader::new().load_file(&path).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_full_analysis,
    bench_parallel_vs_sequential,
    bench_profiling,
    bench_loading,
);
criterion_main!(benches);
