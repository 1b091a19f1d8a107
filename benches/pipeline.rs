//! Option pipeline benchmarks
//!
//! This benchmark suite measures:
//! - Plaintext pipeline runs (no file I/O)
//! - TLS pipeline runs with the system trust store
//! - TLS pipeline runs loading a custom CA bundle from disk
//!
//! Run with: cargo bench --bench pipeline

#[path = "../tests/common/mod.rs"]
mod common;

use common::{path_str, PemDir};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use connopts::config::{keys, ConfigView};
use connopts::options::OptionRegistry;

fn bench_pipeline(c: &mut Criterion) {
    let registry = OptionRegistry::with_defaults();
    let mut group = c.benchmark_group("pipeline_run");

    let plaintext = ConfigView::new().with(keys::SERVER, "relay:4245");
    group.bench_function("plaintext", |b| {
        b.iter(|| registry.run(black_box(&plaintext)).unwrap())
    });

    let system_roots = ConfigView::new().with(keys::SERVER, "tls://relay:4245");
    group.bench_function("tls_system_roots", |b| {
        b.iter(|| registry.run(black_box(&system_roots)).unwrap())
    });

    let pems = PemDir::new();
    for count in [1usize, 10, 50] {
        let cns: Vec<String> = (0..count).map(|i| format!("root-{}", i)).collect();
        let cns: Vec<&str> = cns.iter().map(String::as_str).collect();
        let path = pems.ca_bundle(&format!("bundle-{}.pem", count), &cns);

        let view = ConfigView::new()
            .with(keys::TLS, true)
            .with(keys::TLS_CA_CERT_FILES, vec![path_str(&path)]);
        group.bench_with_input(BenchmarkId::new("tls_ca_bundle", count), &view, |b, view| {
            b.iter(|| registry.run(black_box(view)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
