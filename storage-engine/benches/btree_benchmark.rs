use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use storage_engine::index::{
    BTree, BigIntKeySerializer, IndexKey, IndexValue, MemoryPager, SlotPointer,
    SlotPointerValueSerializer,
};

const DEGREE: usize = 100;
const NUM_KEYS: i64 = 10_000;

fn slot(i: i64) -> IndexValue {
    IndexValue::Slot(SlotPointer {
        page_id: i,
        slot_index: (i % 1000) as i16,
    })
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree insert");
    group.sample_size(10);

    group.bench_function("sequential", |b| {
        b.iter_custom(|iters| {
            let start = std::time::Instant::now();
            for _ in 0..iters {
                let pager = Arc::new(MemoryPager::new(
                    Arc::new(BigIntKeySerializer),
                    Arc::new(SlotPointerValueSerializer),
                ));
                let mut tree = BTree::new(DEGREE, pager).unwrap();
                for i in 0..black_box(NUM_KEYS) {
                    tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
                }
            }
            start.elapsed()
        });
    });
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("btree find");
    group.sample_size(10);

    let pager = Arc::new(MemoryPager::new(
        Arc::new(BigIntKeySerializer),
        Arc::new(SlotPointerValueSerializer),
    ));
    let mut tree = BTree::new(DEGREE, pager).unwrap();
    for i in 0..NUM_KEYS {
        tree.insert(IndexKey::BigInt(i), slot(i)).unwrap();
    }

    group.bench_function("point_lookup", |b| {
        b.iter(|| {
            for i in 0..NUM_KEYS {
                black_box(tree.find(&IndexKey::BigInt(i)).unwrap());
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find);
criterion_main!(benches);
