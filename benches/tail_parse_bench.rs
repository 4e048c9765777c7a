use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use zipcore::{Assembler, MemoryStore, RandomAccessStore};

fn build_archive(entry_count: usize) -> MemoryStore {
    let mut store = MemoryStore::new();
    let mut asm = Assembler::open(&mut store).unwrap();
    for i in 0..entry_count {
        let name = format!("entry-{i}.txt");
        asm.append(&mut store, name.as_bytes(), 0, 0, 1_700_000_000, 0o644)
            .unwrap();
    }
    asm.finalize(&mut store).unwrap();
    asm.close(&mut store).unwrap();
    store
}

fn bench_tail_parse(c: &mut Criterion) {
    let counts = vec![10usize, 100, 1_000];

    let mut group = c.benchmark_group("tail_parse");
    for count in counts {
        let archive = build_archive(count);
        let bytes = archive.bytes().to_vec();

        group.bench_with_input(BenchmarkId::new("entries", count), &bytes, |b, bytes| {
            b.iter(|| {
                let mut store = MemoryStore::new();
                store.open().unwrap();
                store.write_at(0, black_box(bytes)).unwrap();
                Assembler::open(&mut store).unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tail_parse);
criterion_main!(benches);
