use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashMap;

use aqi_processor::models::{CellValue, Dataset, DatasetKey, Pollutant, Row};
use aqi_processor::processors::{compute_aqi, AqiCalculator, Cleaner};

// Create a synthetic dataset for benchmarking
fn create_test_dataset(rows: usize) -> Dataset {
    let key = DatasetKey::new("Los Angeles", "pm25");
    let columns = vec![
        "value".to_string(),
        "parameter".to_string(),
        "unit".to_string(),
    ];

    let data: Vec<Row> = (0..rows)
        .map(|i| {
            let mut row: Row = HashMap::new();
            // Spread concentrations across the breakpoint tiers, with a
            // sprinkling of missing cells for the imputation path.
            if i % 17 == 0 {
                row.insert("value".to_string(), CellValue::Null);
            } else {
                row.insert(
                    "value".to_string(),
                    CellValue::Number((i % 300) as f64 * 0.5),
                );
            }
            row.insert("parameter".to_string(), CellValue::Text("pm25".to_string()));
            row.insert("unit".to_string(), CellValue::Text("µg/m³".to_string()));
            row
        })
        .collect();

    Dataset::from_rows(key, columns, data)
}

fn benchmark_compute_aqi(c: &mut Criterion) {
    c.bench_function("compute_aqi_pm25", |b| {
        b.iter(|| {
            for concentration in [5.0, 20.0, 45.0, 100.0, 200.0, 400.0, 600.0] {
                black_box(compute_aqi(Pollutant::Pm25, black_box(concentration)));
            }
        })
    });
}

fn benchmark_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaner");

    for size in [100, 1_000, 10_000] {
        let dataset = create_test_dataset(size);
        group.bench_with_input(BenchmarkId::new("clean", size), &dataset, |b, dataset| {
            let cleaner = Cleaner::new();
            b.iter(|| black_box(cleaner.clean(dataset)));
        });
    }

    group.finish();
}

fn benchmark_annotation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aqi_calculator");

    for size in [100, 1_000, 10_000] {
        let dataset = create_test_dataset(size);
        let (cleaned, _) = Cleaner::new().clean(&dataset);
        group.bench_with_input(BenchmarkId::new("annotate", size), &cleaned, |b, cleaned| {
            let calculator = AqiCalculator::new();
            b.iter(|| black_box(calculator.annotate(cleaned)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_compute_aqi,
    benchmark_cleaning,
    benchmark_annotation
);
criterion_main!(benches);
