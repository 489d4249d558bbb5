//! Scoring and search benchmarks.
//!
//! Run with: cargo bench -p tailor-causal --bench score_bench

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tailor_causal::score::{IsScore, LocalScore, PopulationScore, ScoreKind};
use tailor_causal::search::IsFges;
use tailor_core::config::{InstanceStrategy, ScoreConfig, SearchConfig};
use tailor_core::traits::CancellationToken;
use test_fixtures::{collider, independent_uniform, instance_from_row};

fn population_local_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("population_local_score");
    for rows in [1_000, 10_000, 100_000] {
        let data = independent_uniform(rows, 6, 3, 1);
        let score = PopulationScore::new(Arc::clone(&data), ScoreKind::from_config(&ScoreConfig::default())).unwrap();
        group.bench_with_input(BenchmarkId::new("bdeu_3_parents", rows), &rows, |b, _| {
            b.iter(|| score.local_score(0, &[1, 2, 3]));
        });
    }
    group.finish();
}

fn instance_local_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("instance_local_score");
    let data = independent_uniform(10_000, 6, 3, 2);
    for (label, strategy) in [
        ("split_population", InstanceStrategy::SplitPopulation),
        ("posterior_ratio", InstanceStrategy::PosteriorRatio),
    ] {
        let config = ScoreConfig {
            strategy,
            // Disable the cache so each iteration scores from counts.
            cache_capacity: 0,
            ..ScoreConfig::default()
        };
        let score = IsScore::new(Arc::clone(&data), instance_from_row(&data, 0), &config).unwrap();
        group.bench_function(label, |b| {
            b.iter(|| score.local_score(0, &[1, 2], &[2, 3], &[4]));
        });
    }
    group.finish();
}

fn fges_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_fges");
    group.sample_size(10);
    for rows in [500, 5_000] {
        let data = collider(rows, 0.1, 3);
        group.bench_with_input(BenchmarkId::new("collider", rows), &rows, |b, _| {
            b.iter(|| {
                let score = IsScore::new(Arc::clone(&data), instance_from_row(&data, 0), &ScoreConfig::default()).unwrap();
                let fges = IsFges::new(&score, &SearchConfig::default()).unwrap();
                fges.search(&CancellationToken::new())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, population_local_score, instance_local_score, fges_search);
criterion_main!(benches);
