//! nalpack 性能基准测试.
//!
//! 覆盖起始码扫描、防竞争字节移除与增量组包路径.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalpack::codec::PacketFinder;
use nalpack::codec::parsers::h264::{remove_emulation_prevention, split_annex_b};

/// 构造合成码流: 每 30 帧一个 IDR, 切片中夹杂需要转义的零字节
fn make_stream(frames: usize, slice_len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * (slice_len + 8) + 64);
    for i in 0..frames {
        if i % 30 == 0 {
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0x00, 0x1E, 0xAB]);
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x38, 0x80]);
            data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x65]);
        } else {
            data.extend_from_slice(&[0x00, 0x00, 0x01, 0x41]);
        }
        for j in 0..slice_len {
            let b = match j % 64 {
                10 | 11 => 0x00,
                12 => 0x03,
                _ => (j as u8).wrapping_mul(31) | 0x10,
            };
            data.push(b);
        }
    }
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
    data
}

fn bench_split_annex_b(c: &mut Criterion) {
    let data = make_stream(300, 4096);
    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("split_annex_b_300x4k", |b| {
        b.iter(|| split_annex_b(black_box(&data)).len());
    });
    group.finish();
}

fn bench_remove_emulation_prevention(c: &mut Criterion) {
    let data = make_stream(1, 64 * 1024);
    c.bench_function("remove_emulation_prevention_64k", |b| {
        b.iter(|| remove_emulation_prevention(black_box(&data)));
    });
}

fn bench_finder_chunked(c: &mut Criterion) {
    let data = make_stream(300, 4096);
    let mut group = c.benchmark_group("finder");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("chunked_1500", |b| {
        b.iter(|| {
            let mut finder = PacketFinder::new(&[]);
            let mut count = 0usize;
            for chunk in data.chunks(1500) {
                finder.push(chunk);
                count += finder.packets().count();
            }
            black_box(count)
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_split_annex_b,
    bench_remove_emulation_prevention,
    bench_finder_chunked
);
criterion_main!(benches);
