//! Criterion benchmarks for the stored-value codec.
//!
//! Every toggle persists one encoded bool and every startup decodes one value
//! per setting, so these paths should stay well under a microsecond.
//!
//! Run with:
//! ```bash
//! cargo bench --package extended-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use extended_core::storage::{decode_value, encode_value, StoredValue};

// ── Value fixtures ────────────────────────────────────────────────────────────

fn fixtures() -> Vec<(&'static str, StoredValue)> {
    vec![
        ("bool", StoredValue::Bool(true)),
        ("int", StoredValue::Int(1)),
        ("long", StoredValue::Long(1_718_000_000_000)),
        ("float", StoredValue::Float(1.25)),
        ("string", StoredValue::String("https://t.me/extended".to_string())),
        ("long_array_64", StoredValue::LongArray((0..64).collect())),
    ]
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_value");
    for (name, value) in fixtures() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, v| {
            b.iter(|| encode_value(black_box(v)))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_value");
    for (name, value) in fixtures() {
        let bytes = encode_value(&value);
        group.bench_with_input(BenchmarkId::from_parameter(name), &bytes, |b, bytes| {
            b.iter(|| decode_value(black_box(bytes)).expect("fixture must decode"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
