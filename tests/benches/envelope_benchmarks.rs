//! # Vote Certificate Service Benchmarks
//!
//! | Path | Operation | Dominant cost |
//! |------|-----------|---------------|
//! | CS-01 intake | open one envelope | RSA-OAEP unwrap + PSS verify |
//! | CS-01 guard | credential compare | constant-time compare |
//! | Transport | decode one frame | UTF-16 length scan |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use certificate_runtime::adapters::{encode_frame, FrameDecoder};
use cs_01_envelope_intake::{constant_time_compare, EnvelopeUnpacker};
use cs_tests::fixtures::{ana, seal_payload, service_keys, INTERNAL_API_KEY};

fn bench_envelope_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("cs-01-envelope-intake");
    group.measurement_time(Duration::from_secs(10));

    let unpacker = EnvelopeUnpacker::new(Arc::new(service_keys()));
    let envelope = seal_payload(&ana());

    group.bench_function("unpack_valid", |b| {
        b.iter(|| black_box(unpacker.unpack(black_box(&envelope)).is_ok()))
    });

    let mut tampered = envelope.clone();
    tampered.push('A');
    group.bench_function("unpack_tampered", |b| {
        b.iter(|| black_box(unpacker.unpack(black_box(&tampered)).is_err()))
    });

    group.bench_function("credential_compare", |b| {
        b.iter(|| black_box(constant_time_compare(black_box("wrong-guess-key"), INTERNAL_API_KEY)))
    });

    group.finish();
}

fn bench_frame_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("transport-framing");
    let envelope = seal_payload(&ana());

    for batch in [1usize, 10, 100] {
        let packet = serde_json::json!({
            "pattern": "vote.confirmed",
            "data": { "headers": { "x-api-key": INTERNAL_API_KEY, "x-security-envelope": envelope } },
            "id": "bench",
        })
        .to_string();
        let wire = encode_frame(&packet).repeat(batch);

        group.throughput(Throughput::Bytes(wire.len() as u64));
        group.bench_with_input(BenchmarkId::new("decode", batch), &wire, |b, wire| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                decoder.extend(wire.as_bytes());
                let mut frames = 0;
                while let Ok(Some(frame)) = decoder.next_frame() {
                    black_box(frame);
                    frames += 1;
                }
                frames
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_envelope_unpack, bench_frame_decoding);
criterion_main!(benches);
