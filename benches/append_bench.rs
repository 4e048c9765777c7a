use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zipcore::{Assembler, MemoryStore};

fn bench_append_many_small_entries(c: &mut Criterion) {
    let counts = vec![100usize, 1_000, 10_000];

    let mut group = c.benchmark_group("append_many_small_entries");
    for count in counts {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("entries", count), &count, |b, &count| {
            b.iter(|| {
                let mut store = MemoryStore::new();
                let mut asm = Assembler::open(&mut store).unwrap();
                for i in 0..count {
                    let name = format!("entry-{i}.txt");
                    asm.append(&mut store, black_box(name.as_bytes()), 0, 0, 1_700_000_000, 0o644)
                        .unwrap();
                }
                asm.finalize(&mut store).unwrap();
                asm.close(&mut store).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_append_growing_payloads(c: &mut Criterion) {
    let sizes = vec![10 * 1024u64, 100 * 1024, 1024 * 1024];

    let mut group = c.benchmark_group("append_growing_payloads");
    for size in sizes {
        group.throughput(Throughput::Bytes(size));
        let data = vec![0xABu8; size as usize];
        group.bench_with_input(BenchmarkId::new("bytes", size), &data, |b, data| {
            b.iter(|| {
                let mut store = MemoryStore::new();
                let mut asm = Assembler::open(&mut store).unwrap();
                asm.append(&mut store, b"payload.bin", 0, data.len() as u64, 1_700_000_000, 0o644)
                    .unwrap();
                asm.write_file_data(&mut store, black_box(data), 0).unwrap();
                asm.finalize(&mut store).unwrap();
                asm.close(&mut store).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_append_many_small_entries, bench_append_growing_payloads);
criterion_main!(benches);
