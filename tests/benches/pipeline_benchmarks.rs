//! # Importer Pipeline Benchmarks
//!
//! | Stage | Measured |
//! |-------|----------|
//! | mn-03 Stream Files | Record file read + running hash check |
//! | mn-05 Record Parser | Items to table mutations |
//! | mn-06 Persistence | One-batch commit to the in-memory store |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mirror_tests::integration::network::{record_file, transfer, Transaction};
use mn_03_stream_files::{RecordFile, RecordFileReader, StreamFileData, StreamFileReader};
use mn_04_downloader::StreamCursor;
use mn_05_record_parser::{InMemoryEntityLookup, ParserConfig, RecordFileParser, RecordParserApi};
use mn_06_persistence::{InMemoryKVStore, PersistenceApi, PersistenceService};
use shared_types::{Sha384Hash, StreamType};
use std::sync::Arc;
use std::time::Duration;

const SIZES: [usize; 3] = [10, 100, 1_000];

fn transactions(count: usize) -> Vec<Transaction> {
    (0..count)
        .map(|i| transfer(10 + i as i64, 2, 1_000 + (i % 50) as i64, 1))
        .collect()
}

fn read(count: usize) -> (StreamFileData, RecordFile) {
    let file = record_file(Sha384Hash::ZERO, &transactions(count));
    let data = StreamFileData::new(file.name, file.bytes).unwrap();
    let parsed = RecordFileReader.read(&data).unwrap();
    (data, parsed)
}

fn parser() -> RecordFileParser {
    RecordFileParser::new(ParserConfig::default(), Arc::new(InMemoryEntityLookup::new())).unwrap()
}

fn bench_read_record_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("mn-03-stream-files");
    group.measurement_time(Duration::from_secs(5));
    for size in SIZES {
        let (data, _) = read(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("read_record_file", size), &data, |b, data| {
            b.iter(|| black_box(RecordFileReader.read(data).unwrap()))
        });
    }
    group.finish();
}

fn bench_parse_record_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("mn-05-record-parser");
    group.measurement_time(Duration::from_secs(5));
    let parser = parser();
    for size in SIZES {
        let (_, file) = read(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("parse_record_file", size), &file, |b, file| {
            b.iter(|| black_box(parser.parse_record_file(file, None).unwrap()))
        });
    }
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("mn-06-persistence");
    group.measurement_time(Duration::from_secs(5));
    let parser = parser();
    for size in SIZES {
        let (data, file) = read(size);
        let context = parser.parse_record_file(&file, None).unwrap();
        let cursor = StreamCursor::new(data.filename(), &file);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new("commit_record_file", size), |b| {
            b.iter_batched(
                || PersistenceService::new(Arc::new(InMemoryKVStore::new())),
                |persistence| {
                    black_box(
                        persistence
                            .commit(StreamType::Record, &cursor, &context)
                            .unwrap(),
                    )
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_read_record_file,
    bench_parse_record_file,
    bench_commit
);
criterion_main!(benches);
