//! Benchmarks for point-set encoding and package decoding

use std::ffi::c_void;

use ccore_bridge::ffi::layout::PackageHeader;
use ccore_bridge::ffi::{ForeignPointSet, PackageHandle, PointSet, TypeTag};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// Deterministic `count` x `dimension` sample
fn create_sample(count: usize, dimension: usize) -> Vec<Vec<f64>> {
    (0..count)
        .map(|i| (0..dimension).map(|d| (i * dimension + d) as f64 * 0.5).collect())
        .collect()
}

/// Benchmark encode for varying sample sizes
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &count in &[16, 256, 4096] {
        let sample = create_sample(count, 8);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function(format!("{}x8", count), |b| {
            b.iter(|| {
                let encoded = ForeignPointSet::encode(black_box(&sample));
                black_box(encoded)
            })
        });
    }

    group.finish();
}

/// Benchmark encoding from an already validated point set
fn bench_point_set_to_foreign(c: &mut Criterion) {
    let points = PointSet::from_rows(&create_sample(1024, 4)).unwrap();

    c.bench_function("point_set_to_foreign_1024x4", |b| {
        b.iter(|| black_box(points.to_foreign()))
    });
}

unsafe extern "C" fn keep_alive(_: *mut c_void) {}

/// Benchmark decoding a list-of-double-lists package
fn bench_package_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("package_decode");

    for &rows in &[16, 256] {
        let mut values: Vec<Vec<f64>> = create_sample(rows, 16);
        let mut children: Vec<PackageHeader> = values
            .iter_mut()
            .map(|row| PackageHeader {
                size: row.len() as u32,
                type_: TypeTag::DOUBLE,
                data: row.as_mut_ptr().cast(),
            })
            .collect();
        let mut child_ptrs: Vec<*mut PackageHeader> =
            children.iter_mut().map(|child| child as *mut PackageHeader).collect();
        let mut root = PackageHeader {
            size: child_ptrs.len() as u32,
            type_: TypeTag::LIST,
            data: child_ptrs.as_mut_ptr().cast(),
        };

        // The buffers above outlive the handle; release is a no-op.
        let handle = unsafe { PackageHandle::from_raw(&mut root, keep_alive) };
        group.throughput(Throughput::Elements((rows * 16) as u64));
        group.bench_function(format!("{}x16", rows), |b| {
            b.iter(|| black_box(handle.decode()))
        });
        drop(handle);
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_point_set_to_foreign,
    bench_package_decode,
);
criterion_main!(benches);
