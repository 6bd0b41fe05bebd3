//! Criterion micro-benchmarks for the packet codec and trace digest.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lightyears_replay::codec::{encode_packet, unpack};
use lightyears_replay::types::{NODE, PIPE, TS};
use lightyears_replay::{TraceDigest, TraceReader, TraceWriter, Value};

fn node_values(i: usize) -> [Value; 5] {
    [
        Value::U8((i % 200) as u8),
        Value::U8((i / 200) as u8),
        Value::U8(2),
        Value::I32(i as i32),
        Value::F64(i as f64 * 0.5),
    ]
}

/// Encode a stream of `n` node samples behind one summary packet.
fn make_stream(n: usize) -> Vec<u8> {
    let mut w = TraceWriter::new(Vec::with_capacity(n * 24));
    w.write(
        TS.name,
        TS.format,
        &[
            Value::F64(1.0),
            Value::F64(2.0),
            Value::F64(3.0),
            Value::U32(0),
            Value::U32(n as u32),
            Value::U32(0),
        ],
    )
    .unwrap();
    for i in 0..n {
        w.write(NODE.name, NODE.format, &node_values(i)).unwrap();
    }
    w.into_inner()
}

/// Benchmark: encode one pipe sample.
fn bench_encode_packet(c: &mut Criterion) {
    let values = [
        Value::U8(2),
        Value::U8(3),
        Value::U8(2),
        Value::U8(4),
        Value::F64(0.125),
    ];
    c.bench_function("codec_encode_packet", |b| {
        b.iter(|| {
            let bytes = encode_packet(PIPE.name, PIPE.format, black_box(&values)).unwrap();
            black_box(bytes);
        });
    });
}

/// Benchmark: decode and unpack a 1000-node stream.
fn bench_decode_stream(c: &mut Criterion) {
    let encoded = make_stream(1000);
    c.bench_function("codec_decode_stream_1k", |b| {
        b.iter(|| {
            let mut reader = TraceReader::new(encoded.as_slice());
            reader.read_specific(TS.name, TS.format).unwrap();
            let mut charge = 0.0;
            while let Some(packet) = reader.next_packet().unwrap() {
                let values = unpack(NODE.format, &packet.payload).unwrap();
                charge += values[4].as_f64().unwrap_or_default();
            }
            black_box(charge);
        });
    });
}

/// Benchmark: digest 10K packets.
fn bench_digest_10k(c: &mut Criterion) {
    let payloads: Vec<Vec<u8>> = (0..10_000)
        .map(|i| encode_packet(NODE.name, NODE.format, &node_values(i)).unwrap())
        .collect();
    c.bench_function("trace_digest_10k", |b| {
        b.iter(|| {
            let mut digest = TraceDigest::new();
            for p in &payloads {
                digest.update(NODE.name.as_bytes(), &p[3..]);
            }
            black_box(digest.value());
        });
    });
}

criterion_group!(
    benches,
    bench_encode_packet,
    bench_decode_stream,
    bench_digest_10k
);
criterion_main!(benches);
