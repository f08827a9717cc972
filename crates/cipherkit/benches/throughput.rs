//! Digest and cipher throughput benchmarks.
//!
//! Run with:
//! ```bash
//! cargo bench --bench throughput
//! ```

#![allow(clippy::expect_used)]

use cipherkit::{BatchMode, Registry};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const SIZES: [usize; 3] = [64, 4096, 65536];

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// One-shot digests through the registry.
fn bench_digests(c: &mut Criterion) {
    let registry = Registry::with_builtins();
    let mut group = c.benchmark_group("digest");

    for size in SIZES {
        let data = payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        for name in ["md5", "sha1", "sha256"] {
            group.bench_with_input(BenchmarkId::new(name, size), &data, |b, data| {
                b.iter(|| {
                    registry
                        .digest_region(name, black_box(data))
                        .expect("built-in digest")
                });
            });
        }
    }
    group.finish();
}

/// Block and stream ciphers through contexts.
fn bench_ciphers(c: &mut Criterion) {
    let registry = Registry::with_builtins();
    let mut group = c.benchmark_group("encrypt");

    for size in SIZES {
        let data = payload(size);
        group.throughput(Throughput::Bytes(size as u64));

        let mut des = registry.context("des").expect("des is built in");
        des.set_key(&[0x13, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1])
            .expect("valid DES key");
        group.bench_with_input(BenchmarkId::new("des", size), &data, |b, data| {
            b.iter(|| des.encrypt(black_box(data)).expect("des encrypt"));
        });

        let mut des3 = registry.context("des3").expect("des3 is built in");
        des3.set_key(&[0x5A; 24]).expect("valid 3DES key");
        des3.set_iv(&[0; 8]).expect("valid IV");
        des3.set_batch_mode(BatchMode::Cbc).expect("des3 supports CBC");
        group.bench_with_input(BenchmarkId::new("des3-cbc", size), &data, |b, data| {
            b.iter(|| des3.encrypt(black_box(data)).expect("des3 encrypt"));
        });

        let mut rc4 = registry.context("rc4").expect("rc4 is built in");
        rc4.set_key_with_len(b"benchmark-key", 13)
            .expect("valid RC4 key");
        group.bench_with_input(BenchmarkId::new("rc4", size), &data, |b, data| {
            b.iter(|| rc4.encrypt(black_box(data)).expect("rc4 encrypt"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_digests, bench_ciphers);
criterion_main!(benches);
