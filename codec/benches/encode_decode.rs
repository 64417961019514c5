//! Encode/decode throughput for a typical movement packet.
//!
//! Run with: cargo bench --package wirepack-codec --bench encode_decode

use std::sync::Arc;

use codec::{decode, encode, encode_into, CodecLimits, PendingMessage};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use schema::{FieldType, RegistryBuilder, SchemaRegistry, Side};

fn registry() -> Arc<SchemaRegistry<()>> {
    let mut packet = RegistryBuilder::new("bench")
        .packet("move")
        .with(FieldType::VarUInt, "tick")
        .and_then(|p| p.with(FieldType::F32, "x"))
        .and_then(|p| p.with(FieldType::F32, "y"))
        .and_then(|p| p.with(FieldType::F32, "z"))
        .and_then(|p| p.with(FieldType::I16, "yaw"))
        .and_then(|p| p.with(FieldType::Text, "emote"))
        .expect("valid schema");
    for index in 0..6 {
        packet = packet
            .with(FieldType::Bool, format!("flag{index}"))
            .expect("valid schema");
    }
    Arc::new(
        packet
            .bound_to(Side::Server)
            .and_then(|p| p.handled_by(()))
            .expect("valid schema")
            .build(),
    )
}

fn message(registry: &Arc<SchemaRegistry<()>>) -> PendingMessage<()> {
    let mut message = PendingMessage::new(Arc::clone(registry))
        .packet("move")
        .and_then(|m| m.with_int("tick", 123_456))
        .and_then(|m| m.with_float("x", 12.5))
        .and_then(|m| m.with_float("y", 64.0))
        .and_then(|m| m.with_float("z", -3.25))
        .and_then(|m| m.with_int("yaw", -90))
        .and_then(|m| m.with_text("emote", "wave"))
        .expect("valid values");
    for index in 0..6 {
        message = message
            .with_bool(&format!("flag{index}"), index % 2 == 0)
            .expect("valid values");
    }
    message
}

fn benchmark_encode(c: &mut Criterion) {
    let registry = registry();
    let message = message(&registry);
    let limits = CodecLimits::default();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Elements(1));
    group.bench_function("move_packet", |b| {
        b.iter(|| black_box(encode(black_box(&message), &limits)));
    });
    group.bench_function("move_packet_reused_buffer", |b| {
        let mut out = Vec::with_capacity(64);
        b.iter(|| {
            out.clear();
            black_box(encode_into(black_box(&message), &limits, &mut out))
        });
    });
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let registry = registry();
    let limits = CodecLimits::default();
    let bytes = encode(&message(&registry), &limits).expect("encodes");

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("move_packet", |b| {
        b.iter(|| black_box(decode(&registry, Side::Server, black_box(&bytes), &limits)));
    });
    group.finish();
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
