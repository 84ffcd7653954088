//! Parser benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vt102_parser::Parser;

fn bench_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse_collect(black_box(plain_text.as_bytes()));
            black_box(actions)
        })
    });

    group.finish();
}

fn bench_csi_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let csi_heavy = "\x1b[1;7mX\x1b[0m \x1b[5;10H\x1b[2J".repeat(100);
    group.throughput(Throughput::Bytes(csi_heavy.len() as u64));

    group.bench_function("csi_sequences", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse_collect(black_box(csi_heavy.as_bytes()));
            black_box(actions)
        })
    });

    group.finish();
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let mixed = "Line 1: \x1b[4mOK\x1b[0m\r\nLine 2: \x1b[7mERROR\x1b[0m\r\n".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("mixed_content", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let actions = parser.parse_collect(black_box(mixed.as_bytes()));
            black_box(actions)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_plain_text, bench_csi_sequences, bench_mixed);

criterion_main!(benches);
