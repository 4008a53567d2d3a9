//! Benchmarks for the widestream cipher engines.
//!
//! Measures key-schedule initialization cost and keystream throughput for
//! both variants, sequential and parallel, at several message sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use widestream::{AcsStream, RwsStream};

const KEY64: [u8; 64] = [0x5A; 64];
const ACS_NONCE: [u8; 32] = [0xC3; 32];
const RWS_NONCE: [u8; 64] = [0xC3; 64];

fn bench_initialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("initialize");

    group.bench_function("acs_512", |b| {
        b.iter(|| {
            let mut cipher = AcsStream::new(true);
            cipher
                .initialize(true, black_box(&KEY64), black_box(&ACS_NONCE), &[])
                .unwrap();
        });
    });

    group.bench_function("rws_512", |b| {
        b.iter(|| {
            let mut cipher = RwsStream::new(true);
            cipher
                .initialize(true, black_box(&KEY64), black_box(&RWS_NONCE), &[])
                .unwrap();
        });
    });

    group.finish();
}

fn bench_acs_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("acs_sequential");

    for size in [1024usize, 16 * 1024, 256 * 1024] {
        let input = vec![0u8; size];
        let mut output = vec![0u8; size];

        let mut cipher = AcsStream::new(false);
        cipher.set_parallel_max_degree(1).unwrap();
        cipher.initialize(true, &KEY64, &ACS_NONCE, &[]).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                cipher
                    .transform(black_box(&input), black_box(&mut output), size)
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_rws_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("rws_sequential");

    for size in [1024usize, 16 * 1024, 256 * 1024] {
        let input = vec![0u8; size];
        let mut output = vec![0u8; size];

        let mut cipher = RwsStream::new(false);
        cipher.set_parallel_max_degree(1).unwrap();
        cipher.initialize(true, &KEY64, &RWS_NONCE, &[]).unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                cipher
                    .transform(black_box(&input), black_box(&mut output), size)
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("acs_parallel");

    let size = 1 << 20;
    let input = vec![0u8; size];
    let mut output = vec![0u8; size];

    let mut cipher = AcsStream::new(false);
    if cipher.set_parallel_max_degree(2).is_ok() {
        cipher.initialize(true, &KEY64, &ACS_NONCE, &[]).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_function("degree_2_1mib", |b| {
            b.iter(|| {
                cipher
                    .transform(black_box(&input), black_box(&mut output), size)
                    .unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_initialize,
    bench_acs_sequential,
    bench_rws_sequential,
    bench_parallel
);
criterion_main!(benches);
