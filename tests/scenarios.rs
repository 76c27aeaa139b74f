//! End-to-end allocation workloads over whole arenas.

use tessera::{verify_header, BlockInfo, Slab, FIRST_BLOCK_OFFSET, OVERHEAD};

const SIZES: [usize; 7] = [128, 64, 96, 256, 128, 72, 256];

fn snapshot(slab: &Slab<'_>) -> Vec<(usize, usize, bool)> {
  slab.blocks().map(|b| (b.offset, b.size, b.free)).collect()
}

fn single_free_block(slab: &Slab<'_>, capacity: usize) {
  slab.verify().unwrap();
  assert_eq!(
    snapshot(slab),
    vec![(FIRST_BLOCK_OFFSET, capacity - OVERHEAD, true)]
  );
}

#[test]
fn exhausts_a_small_arena_sixteen_bytes_at_a_time() {
  let mut words = vec![0i32; 4096 / 4];
  let mut slab = Slab::new(&mut words).unwrap();

  let mut offsets = Vec::new();
  while let Some(addr) = slab.alloc(16).unwrap() {
    offsets.push(addr);
  }
  assert_eq!(offsets.len(), 159);

  for &addr in &offsets {
    let size = slab.size_of(addr).unwrap();
    assert!((16..=32).contains(&size), "block size {size} out of range");
  }

  for &addr in offsets.iter().rev() {
    let freed = slab.free(addr).unwrap();
    assert!((16..=32).contains(&freed));
  }
  single_free_block(&slab, 4096);
}

#[test]
fn sequential_allocations_land_in_order() {
  let mut words = vec![0i32; 16000 / 4];
  let mut slab = Slab::new(&mut words).unwrap();

  let mut offsets = Vec::new();
  for &size in &SIZES {
    offsets.push(slab.alloc(size).unwrap().unwrap());
  }
  assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));

  let used: Vec<BlockInfo<'_>> = slab.blocks().filter(|b| !b.free).collect();
  assert_eq!(used.len(), SIZES.len());
  for ((info, &offset), &size) in used.iter().zip(&offsets).zip(&SIZES) {
    assert_eq!(info.offset, offset);
    assert_eq!(info.size, size);
  }

  for &offset in &offsets {
    slab.free(offset).unwrap();
  }
  single_free_block(&slab, 16000);
}

#[test]
fn alternating_free_and_realloc_recycles_cleanly() {
  let mut words = vec![0i32; 16000 / 4];
  let mut slab = Slab::new(&mut words).unwrap();

  let mut offsets = Vec::new();
  for &size in &SIZES {
    offsets.push(slab.alloc(size).unwrap().unwrap());
  }

  for i in 0..offsets.len() {
    slab.free(offsets[i]).unwrap();
    offsets[i] = slab.alloc(SIZES[(i + 1) % SIZES.len()]).unwrap().unwrap();
    slab.verify().unwrap();
  }

  for &offset in &offsets {
    slab.free(offset).unwrap();
  }
  single_free_block(&slab, 16000);
}

#[test]
fn checkerboard_frees_leave_alternating_blocks() {
  let mut words = vec![0i32; 8192 / 4];
  let mut slab = Slab::new(&mut words).unwrap();

  let mut offsets = Vec::new();
  for &size in &SIZES {
    offsets.push(slab.alloc(size).unwrap().unwrap());
    offsets.push(slab.alloc(size).unwrap().unwrap());
  }

  for i in (1..offsets.len()).step_by(2) {
    slab.free(offsets[i]).unwrap();
  }
  slab.verify().unwrap();
  for (i, info) in slab.blocks().enumerate() {
    assert_eq!(info.free, i % 2 == 1, "block {i} breaks the checkerboard");
  }

  // Every freed size fits back into the holes it left behind.
  let mut live: Vec<usize> = offsets.iter().copied().step_by(2).collect();
  for &size in &SIZES {
    live.push(slab.alloc(size).unwrap().unwrap());
  }

  for addr in live {
    slab.free(addr).unwrap();
  }
  single_free_block(&slab, 8192);
}

#[test]
fn a_second_slab_adopts_the_first_ones_arena() {
  let mut words = vec![0i32; 8192 / 4];
  let before;
  {
    let mut slab = Slab::new(&mut words).unwrap();
    for &size in &SIZES {
      slab.alloc(size).unwrap().unwrap();
    }
    before = snapshot(&slab);
  }
  assert!(verify_header(&words));

  let adopted = Slab::new(&mut words).unwrap();
  adopted.verify().unwrap();
  assert_eq!(snapshot(&adopted), before);
}

#[test]
fn garbage_regions_are_reinitialized() {
  let mut words = vec![0x7B7B_7B7Bu32 as i32; 4096 / 4];
  assert!(!verify_header(&words));
  let slab = Slab::new(&mut words).unwrap();
  single_free_block(&slab, 4096);
}
