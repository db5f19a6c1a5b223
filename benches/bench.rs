//! Criterion benchmarks for the triage training pipeline.
//!
//! Covers the stages that dominate a training run:
//! - Message analysis and tokenization
//! - Feature union fit and transform
//! - Per-category logistic regression fits

use std::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use triage::analysis::MessageAnalyzer;
use triage::dataset::LabelMatrix;
use triage::features::{FeatureConfig, FeatureUnion};
use triage::pipeline::Pipeline;
use triage::search::{ClassWeight, ModelConfig, Solver};

/// Generate relief messages for benchmarking.
fn generate_messages(count: usize) -> Vec<String> {
    let words = [
        "water", "food", "shelter", "medical", "help", "need", "people", "children", "village",
        "road", "blocked", "flooded", "tents", "rice", "clean", "drinking", "urgent", "please",
        "destroyed", "houses", "injured", "hospital", "supplies", "were", "sending", "Leogane",
    ];

    (0..count)
        .map(|i| {
            let length = 8 + (i % 24);
            (0..length)
                .map(|j| words[(i * 7 + j * 13) % words.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

fn generate_labels(messages: &[String]) -> LabelMatrix {
    let rows = messages
        .iter()
        .map(|m| {
            vec![
                u8::from(m.contains("water")),
                u8::from(m.contains("food") || m.contains("rice")),
                u8::from(m.contains("medical") || m.contains("hospital")),
            ]
        })
        .collect();
    LabelMatrix::from_rows(
        vec!["water".into(), "food".into(), "medical_help".into()],
        rows,
    )
    .expect("labels are binary")
}

fn bench_text_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_analysis");

    let analyzer = MessageAnalyzer::new();
    let messages = generate_messages(1000);

    group.bench_function("analyze_single_message", |b| {
        b.iter(|| black_box(analyzer.tokens(black_box(&messages[0]))))
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("analyze_batch_messages", |b| {
        b.iter(|| {
            for message in messages.iter().take(100) {
                let _ = black_box(analyzer.tokens(black_box(message)));
            }
        })
    });

    group.finish();
}

fn bench_feature_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_union");
    group.sample_size(20);

    let messages = generate_messages(1000);
    let texts: Vec<&str> = messages.iter().map(String::as_str).collect();

    group.throughput(Throughput::Elements(texts.len() as u64));
    group.bench_function("fit", |b| {
        b.iter(|| {
            let mut union = FeatureUnion::new(FeatureConfig::default());
            union.fit_texts(black_box(&texts)).expect("fit");
            black_box(union)
        })
    });

    let mut union = FeatureUnion::new(FeatureConfig::default());
    union.fit_texts(&texts).expect("fit");
    group.bench_function("transform", |b| {
        b.iter(|| black_box(union.transform_texts(black_box(&texts))))
    });

    group.finish();
}

fn bench_pipeline_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_fit");
    group.sample_size(10);

    let messages = generate_messages(500);
    let texts: Vec<&str> = messages.iter().map(String::as_str).collect();
    let labels = generate_labels(&messages);

    for solver in [Solver::Lbfgs, Solver::Saga] {
        let config = ModelConfig {
            c: 5.0,
            max_iter: 5000,
            solver,
            class_weight: ClassWeight::Balanced,
            ..ModelConfig::default()
        };
        group.bench_function(solver.to_string(), |b| {
            b.iter(|| {
                let mut pipeline = Pipeline::new(FeatureConfig::default(), config);
                pipeline.fit(black_box(&texts), &labels).expect("fit");
                black_box(pipeline)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_text_analysis,
    bench_feature_union,
    bench_pipeline_fit
);
criterion_main!(benches);
