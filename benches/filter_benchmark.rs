use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use doctor_finder::prelude::*;
use std::hint::black_box;

const SPECIALTIES: [&str; 6] = ["Cardiology", "Neurology", "Dermatology", "Oncology", "Pediatrics", "Radiology"];
const REGIONS: [&str; 5] = ["Midwest", "Northeast", "Southeast", "Southwest", "West"];
const STATES: [&str; 8] = ["CA", "NY", "TX", "FL", "IL", "WA", "MA", "GA"];

// Deterministic synthetic panel
fn synthetic_panel(rows: usize) -> PanelDataset {
    let records = (0..rows)
        .map(|i| DoctorRecord::new(
            1_000_000_000 + i as u64,
            STATES[i % STATES.len()],
            (i % 240) as f64,
            REGIONS[(i / 7) % REGIONS.len()],
            SPECIALTIES[(i / 3) % SPECIALTIES.len()],
        ))
        .collect();
    PanelDataset::from_records(records)
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for rows in [1_000usize, 100_000] {
        let dataset = synthetic_panel(rows);

        group.bench_with_input(BenchmarkId::new("all_regions", rows), &dataset, |b, ds| {
            b.iter(|| {
                let results = ds.search(black_box("Cardiology"), None).unwrap();
                black_box(results.total_rows())
            })
        });

        group.bench_with_input(BenchmarkId::new("single_region", rows), &dataset, |b, ds| {
            b.iter(|| {
                let results = ds.search(black_box("Cardiology"), Some(black_box("West"))).unwrap();
                black_box(results.total_rows())
            })
        });
    }

    group.finish();
}

fn benchmark_selectors(c: &mut Criterion) {
    let dataset = synthetic_panel(100_000);

    c.bench_function("specialties_100k", |b| {
        b.iter(|| black_box(dataset.specialties().len()))
    });

    c.bench_function("panel_stats_100k", |b| {
        b.iter(|| black_box(dataset.analytics().panel_stats().unique_npis))
    });
}

criterion_group!(benches, benchmark_search, benchmark_selectors);
criterion_main!(benches);
