use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tessera::Slab;

const OPS: u64 = 100_000;
const ARENA_BYTES: usize = 1 << 20;

/// tessera alloc/free throughput.
fn slab_alloc_free(size: usize) {
  let mut words = vec![0i32; ARENA_BYTES / 4];
  let mut slab = Slab::new(&mut words).unwrap();
  for _ in 0..OPS {
    let addr = slab.alloc(size).unwrap().unwrap();
    black_box(addr);
    slab.free(addr).unwrap();
  }
}

/// libc alloc/free throughput.
fn libc_malloc_free(size: usize) {
  for _ in 0..OPS {
    unsafe {
      let ptr = libc::malloc(size);
      black_box(ptr);
      libc::free(ptr);
    }
  }
}

fn benchmark_alloc_throughput(c: &mut Criterion) {
  let mut group = c.benchmark_group("alloc_throughput");

  for size in [16, 64, 256, 1024, 4096] {
    group.throughput(Throughput::Elements(OPS));

    group.bench_with_input(BenchmarkId::new("tessera", size), &size, |b, &size| {
      b.iter(|| slab_alloc_free(size))
    });

    group.bench_with_input(BenchmarkId::new("libc", size), &size, |b, &size| {
      b.iter(|| libc_malloc_free(size))
    });
  }

  group.finish();
}

criterion_group!(benches, benchmark_alloc_throughput);
criterion_main!(benches);
