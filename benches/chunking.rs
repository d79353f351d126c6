//! Chunking Benchmarks
//!
//! Measures both chunking strategies over synthetic prose at realistic
//! document sizes.
//!
//! Run with: `cargo bench --bench chunking`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use palimpsest::Chunker;

/// Paragraph-shaped prose of roughly `size` bytes
fn synthetic_prose(size: usize) -> String {
    let sentence = "The quick brown fox jumps over the lazy dog near the river bank. ";
    let mut text = String::with_capacity(size + 128);
    let mut in_paragraph = 0;
    while text.len() < size {
        text.push_str(sentence);
        in_paragraph += 1;
        if in_paragraph == 5 {
            text.push_str("\n\n");
            in_paragraph = 0;
        }
    }
    text
}

fn bench_structure_chunking(c: &mut Criterion) {
    let chunker = Chunker::new();

    let mut group = c.benchmark_group("structure_chunking");
    group.measurement_time(Duration::from_secs(10));

    for size in [10_000usize, 50_000] {
        let text = synthetic_prose(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("prose", size), &text, |b, text| {
            b.iter(|| {
                let chunks = chunker.chunk_with_pages(black_box(text), &[], 1000, 100);
                black_box(chunks)
            })
        });
    }

    group.finish();
}

fn bench_fixed_chunking(c: &mut Criterion) {
    let chunker = Chunker::new();

    let mut group = c.benchmark_group("fixed_chunking");
    group.measurement_time(Duration::from_secs(10));

    // Above the large-text threshold the fixed-window walk is selected
    for size in [150_000usize, 500_000] {
        let text = synthetic_prose(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("prose", size), &text, |b, text| {
            b.iter(|| {
                let chunks = chunker.chunk_with_pages(black_box(text), &[], 1000, 100);
                black_box(chunks)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_structure_chunking, bench_fixed_chunking);
criterion_main!(benches);
