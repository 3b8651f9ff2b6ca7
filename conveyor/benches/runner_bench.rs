//! Benchmarks for pipeline execution and version parsing.

use conveyor::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn noop_registry(stages: usize) -> StageRegistry {
    let mut registry = StageRegistry::new();
    for i in 0..stages {
        registry
            .register(StageSpec::new(format!("stage-{i}"), Arc::new(NoOpAction)))
            .unwrap();
    }
    registry
}

fn runner_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("run_five_noop_stages", |b| {
        b.iter(|| {
            let runner = PipelineRunner::new("bench", noop_registry(5));
            let ctx = RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main");
            let report = runtime.block_on(runner.run(ctx)).unwrap();
            black_box(report.overall)
        });
    });

    c.bench_function("version_parse", |b| {
        b.iter(|| black_box(Version::parse(black_box("10.20.30")).unwrap()));
    });
}

criterion_group!(benches, runner_benchmark);
criterion_main!(benches);
