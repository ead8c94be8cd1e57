use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mq_estimator::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging() {
    // RUST_LOG=mq_estimator=debug shows every optimum while profiling
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn bench_estimator(c: &mut Criterion) {
    init_logging();

    // A fresh estimator per iteration, so nothing is served from the memo
    c.bench_function("table_q31_n15_m10", |b| {
        b.iter(|| {
            let estimator = Estimator::from_parameters(31, 15, 10).unwrap();
            black_box(estimator.table(black_box(2)));
        });
    });

    c.bench_function("table_q2_n15_m15", |b| {
        b.iter(|| {
            let estimator = Estimator::from_parameters(2, 15, 15).unwrap();
            black_box(estimator.table(black_box(2)));
        });
    });

    let instance = ProblemInstance::new(31, 15, 10).unwrap();
    c.bench_function("crossbred_optimum", |b| {
        b.iter(|| {
            let crossbred = Algorithm::for_instance(AlgorithmKind::Crossbred, instance.clone());
            black_box(crossbred.optimize().unwrap());
        });
    });
}

fn bench_series(c: &mut Criterion) {
    let engine = SeriesEngine::new(200);

    c.bench_function("degree_of_regularity_q31", |b| {
        b.iter(|| black_box(engine.degree_of_regularity(black_box(40), black_box(60), 31)));
    });

    c.bench_function("witness_degree_q2", |b| {
        b.iter(|| black_box(engine.witness_degree(black_box(60), black_box(80), 2)));
    });
}

criterion_group!(benches, bench_estimator, bench_series);
criterion_main!(benches);
