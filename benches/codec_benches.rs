//! Benchmarks for frame encoding and response decoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use melsec_mc::{
    AccessOption, AccessRoute, BatchReadCommand, BatchWriteCommand, Command, CommandContext,
    DataType, Device, FrameVariant, McResponse, PlcSeries, RequestHeader, Tag, TagReadCommand,
    TransferMode, Value,
};

fn modes() -> [(TransferMode, &'static str); 2] {
    [(TransferMode::Binary, "binary"), (TransferMode::Ascii, "ascii")]
}

fn bench_batch_write_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_write_frame");
    let device = Device::parse("D0", PlcSeries::Q).unwrap();

    for size in [1usize, 64, 960] {
        let values: Vec<Value> = (0..size).map(|i| Value::Int(i as i64 % 1000)).collect();
        for (mode, name) in modes() {
            let ctx = CommandContext::new(PlcSeries::Q, mode);
            let header = RequestHeader::new(
                AccessOption::new(mode, FrameVariant::E3),
                AccessRoute::default(),
                4,
            );
            group.bench_with_input(BenchmarkId::new(name, size), &values, |b, values| {
                b.iter(|| {
                    let cmd = BatchWriteCommand::new(device, black_box(values), DataType::SWord).unwrap();
                    let request = cmd.request(ctx).unwrap();
                    header
                        .encode_frame(request.command, request.subcommand, &request.payload)
                        .unwrap()
                })
            });
        }
    }
    group.finish();
}

fn bench_batch_read_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_read_decode");
    let device = Device::parse("D0", PlcSeries::Q).unwrap();
    let cmd = BatchReadCommand::new(device, 480, DataType::Float, false).unwrap();

    let mut binary = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
    binary.extend_from_slice(&(2u16 + 1920).to_le_bytes());
    binary.extend_from_slice(&[0x00, 0x00]);
    for i in 0..480 {
        binary.extend_from_slice(&(i as f32 * 0.5).to_le_bytes());
    }

    let option = AccessOption::default();
    let ctx = CommandContext::default();
    group.bench_function("binary_float_480", |b| {
        b.iter(|| {
            let response = McResponse::from_bytes(black_box(&binary), option).unwrap();
            cmd.parse_response(&response.data, ctx).unwrap()
        })
    });
    group.finish();
}

fn bench_tag_plan(c: &mut Criterion) {
    let tags: Vec<Tag> = (0..50)
        .map(|i| match i % 3 {
            0 => Tag::read(format!("D{}", i * 4), DataType::SWord),
            1 => Tag::read(format!("D{}", i * 4), DataType::Float),
            _ => Tag::read(format!("W{:X}", i * 4), DataType::Double),
        })
        .collect();

    c.bench_function("tag_read_request", |b| {
        b.iter(|| {
            let cmd = TagReadCommand::new(black_box(&tags), PlcSeries::Q);
            cmd.request(CommandContext::default()).unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_batch_write_frame,
    bench_batch_read_decode,
    bench_tag_plan
);
criterion_main!(benches);
