//! Criterion micro-benchmarks for the binary and text codecs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slate_alloc::default_allocator;
use slate_bench::{document, DocumentSize};
use slate_binary::{encode, BinaryParser, BinaryWriter};
use slate_text::{to_text_with, Parser, TextWriterConfig};

/// Benchmark: encode each profile to a sink.
fn bench_binary_encode(c: &mut Criterion) {
    let alloc = default_allocator();
    let mut group = c.benchmark_group("binary_encode");
    for size in DocumentSize::ALL {
        let doc = document(&alloc, size);
        let len = encode(&doc).unwrap().len();
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size.label()), &doc, |b, doc| {
            let mut writer = BinaryWriter::new(std::io::sink());
            b.iter(|| {
                writer.write_document(doc).unwrap();
            });
            black_box(writer.documents_written());
        });
    }
    group.finish();
}

/// Benchmark: decode each profile.
fn bench_binary_decode(c: &mut Criterion) {
    let alloc = default_allocator();
    let mut group = c.benchmark_group("binary_decode");
    for size in DocumentSize::ALL {
        let bytes = encode(&document(&alloc, size)).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size.label()),
            &bytes,
            |b, bytes| {
                let mut parser = BinaryParser::new();
                b.iter(|| {
                    let root = parser.parse(bytes).unwrap();
                    black_box(&root);
                });
            },
        );
    }
    group.finish();
}

/// Benchmark: parse the compact text form of each profile.
fn bench_text_parse(c: &mut Criterion) {
    let alloc = default_allocator();
    let mut group = c.benchmark_group("text_parse");
    for size in DocumentSize::ALL {
        let text = to_text_with(&document(&alloc, size), &TextWriterConfig::compact()).unwrap();
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size.label()), &text, |b, text| {
            let mut parser = Parser::new();
            b.iter(|| {
                let root = parser.parse_str(text).unwrap();
                black_box(&root);
            });
        });
    }
    group.finish();
}

/// Benchmark: write the medium profile as pretty text.
fn bench_text_write(c: &mut Criterion) {
    let doc = document(&default_allocator(), DocumentSize::Medium);
    let config = TextWriterConfig::default();

    c.bench_function("text_write_medium", |b| {
        b.iter(|| {
            let text = to_text_with(&doc, &config).unwrap();
            black_box(text.len());
        });
    });
}

criterion_group!(
    benches,
    bench_binary_encode,
    bench_binary_decode,
    bench_text_parse,
    bench_text_write
);
criterion_main!(benches);
