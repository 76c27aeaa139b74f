//! Fixed-region slab allocator.
//!
//! A [`Slab`] manages one caller-supplied contiguous region, such as a mapped
//! file or a shared-memory segment, and hands out byte offsets into it. The
//! region is treated as an array of 32-bit signed words ("quads");
//! all block metadata lives in-band, so the arena itself is the persisted
//! format and an already-initialized region can be re-adopted, e.g. across
//! process restarts over the same mapping.
//!
//! Every block is bracketed by a pair of boundary tags:
//!
//! ```text
//!          B-1        B .. B+S-1        B+S
//!        ┌───────┬───────────────────┬───────┐
//!        │ ±S    │      payload      │ ±S    │
//!        └───────┴───────────────────┴───────┘
//! ```
//!
//! The tag sign doubles as the free bit: positive means free, negative means
//! used, magnitude is the payload size in quads. Two adjacent blocks satisfy
//! `B₂ = B₁ + S₁ + 2`, which is what lets `free` probe both neighbors with
//! single word reads and coalesce without any side table.
//!
//! Free blocks carry a skip-list node in their payload (height word followed
//! by one forward link per level), keyed by block size ascending. A sentinel
//! header block at a fixed offset anchors the list; `alloc` is a best-fit
//! descent through it, expected O(log n).
//!
//! The slab is single-threaded and non-suspending; wrap it in a mutex if it
//! must be shared. Out-of-memory is not an error: `alloc` returns
//! `Ok(None)` so callers can fall back without unwinding.
//!
//! ```
//! use tessera::Slab;
//!
//! let mut words = [0i32; 1024];
//! let mut slab = Slab::new(&mut words)?;
//! let addr = slab.alloc(64)?.expect("fresh arena has room");
//! assert_eq!(slab.size_of(addr)?, 64);
//! assert_eq!(slab.free(addr)?, 64);
//! # Ok::<(), tessera::SlabError>(())
//! ```

#![no_std]

use core::slice;

use rand::{rngs::SmallRng, RngCore, SeedableRng};
use snafu::{ensure, Snafu};

// =============================================================================
// Constants
// =============================================================================

/// Native word size in bytes; the allocator's unit of arithmetic ("quad").
pub const POINTER_SIZE: usize = 4;

/// Tallest skip-list node.
pub const MAX_HEIGHT: usize = 32;

/// Payload size of the sentinel header block, in quads.
pub const HEADER_SIZE: u32 = 1 + 2 * MAX_HEIGHT as u32;

/// Quad index of the sentinel header block.
const HEADER: u32 = 1;

/// Quad index of the first allocatable block.
const FIRST_BLOCK: u32 = HEADER + HEADER_SIZE + 2;

/// Byte offset of the first allocatable block; `alloc` never returns less.
pub const FIRST_BLOCK_OFFSET: usize = FIRST_BLOCK as usize * POINTER_SIZE;

/// Smallest legal allocation in quads: a freed block must hold its height
/// word plus at least one forward link inside the payload.
pub const MIN_ALLOC_QUADS: u32 = 3;

/// Smallest legal allocation in bytes.
pub const MIN_ALLOC: usize = MIN_ALLOC_QUADS as usize * POINTER_SIZE;

/// Fixed per-arena overhead in bytes: the header block with its tags, the
/// first block's head tag, and the tail foot word.
pub const OVERHEAD: usize = (FIRST_BLOCK as usize + 1) * POINTER_SIZE;

/// Smallest region that still yields one freeable block, in quads.
const MIN_REGION_QUADS: usize = FIRST_BLOCK as usize + 1 + MIN_ALLOC_QUADS as usize;

/// Default height-sampling seed ("TESSERA!").
const RNG_SEED: u64 = 0x5445_5353_4552_4121;

// =============================================================================
// Compile-Time Assertions
// =============================================================================

const _: () = assert!(HEADER_SIZE == 65);
const _: () = assert!(FIRST_BLOCK == 68);
const _: () = assert!(OVERHEAD == 276);
const _: () = assert!(MIN_ALLOC_QUADS >= 3);
// The header payload must hold its height word plus every level.
const _: () = assert!(HEADER_SIZE as usize >= MAX_HEIGHT + 1);

// =============================================================================
// Errors
// =============================================================================

/// Failure modes of the public operations.
///
/// Exhaustion is deliberately absent: a full arena makes [`Slab::alloc`]
/// return `Ok(None)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Snafu)]
pub enum SlabError {
  /// A size or address argument failed validation. Raised before any state
  /// is touched.
  #[snafu(display("argument out of range: {value}"))]
  OutOfRange { value: usize },

  /// The address does not name an allocated block: the tag there is absurd,
  /// positive, or the address was never returned by `alloc`.
  #[snafu(display("no allocated block at byte offset {addr}"))]
  InvalidBlock { addr: usize },

  /// A structural invariant does not hold. The arena was corrupted from
  /// outside (or a bug bit); the instance must not be trusted further.
  #[snafu(display("arena corrupted: {reason}"))]
  Corrupted { reason: &'static str },
}

// =============================================================================
// Slab
// =============================================================================

/// Allocator over a borrowed word arena.
///
/// Generic over the height-sampling RNG so tests can pin block placement;
/// defaults to [`SmallRng`] with a fixed seed, which keeps placement
/// reproducible for identical call sequences.
pub struct Slab<'a, R = SmallRng> {
  words: &'a mut [i32],
  /// Per-level predecessor scratch, fully rewritten by every index descent.
  updates: [u32; MAX_HEIGHT],
  rng: R,
}

impl<'a> Slab<'a, SmallRng> {
  /// Builds a slab over `words`, adopting an existing arena when
  /// [`verify_header`] accepts it and installing a fresh one otherwise.
  ///
  /// Fails with [`SlabError::OutOfRange`] when the region cannot hold the
  /// header plus one minimal block, and with [`SlabError::Corrupted`] when
  /// an adopted arena flunks the integrity audit.
  pub fn new(words: &'a mut [i32]) -> Result<Self, SlabError> {
    Self::with_rng(words, SmallRng::seed_from_u64(RNG_SEED))
  }

  /// Builds a slab over a byte region, optionally restricted to the
  /// sub-region `[offset, offset + len)`; `len = None` means the remainder.
  ///
  /// The sub-region must start 4-byte aligned (both the offset and the
  /// underlying memory); trailing bytes past the last whole word are
  /// ignored.
  pub fn from_bytes(
    region: &'a mut [u8],
    offset: usize,
    len: Option<usize>,
  ) -> Result<Self, SlabError> {
    ensure!(
      offset % POINTER_SIZE == 0 && offset <= region.len(),
      OutOfRangeSnafu { value: offset }
    );
    let rest = region.len() - offset;
    let len = len.unwrap_or(rest);
    ensure!(len <= rest, OutOfRangeSnafu { value: len });

    let sub = &mut region[offset..offset + len];
    // SAFETY: i32 has no invalid bit patterns and align_to_mut only hands
    // back the 4-aligned interior.
    let (head, words, _) = unsafe { sub.align_to_mut::<i32>() };
    ensure!(head.is_empty(), OutOfRangeSnafu { value: offset });

    Self::with_rng(words, SmallRng::seed_from_u64(RNG_SEED))
  }
}

impl<'a, R: RngCore> Slab<'a, R> {
  /// [`Slab::new`] with a caller-supplied height RNG.
  pub fn with_rng(words: &'a mut [i32], rng: R) -> Result<Self, SlabError> {
    ensure!(
      words.len() >= MIN_REGION_QUADS && words.len() <= i32::MAX as usize,
      OutOfRangeSnafu {
        value: words.len() * POINTER_SIZE
      }
    );

    let mut slab = Self {
      words,
      updates: [HEADER; MAX_HEIGHT],
      rng,
    };
    if verify_header(slab.words) {
      slab.verify()?;
    } else {
      slab.install();
    }
    Ok(slab)
  }

  /// Total arena size in bytes.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.words.len() * POINTER_SIZE
  }

  /// Writes a pristine header plus one free block spanning the remainder.
  fn install(&mut self) {
    for word in &mut self.words[HEADER as usize..(HEADER + HEADER_SIZE) as usize] {
      *word = 0;
    }
    self.write_free_tags(HEADER, HEADER_SIZE);
    self.set_height(HEADER, 1);
    self.set_next(HEADER, 0, FIRST_BLOCK);
    for level in 1..MAX_HEIGHT as u32 {
      self.set_next(HEADER, level, HEADER);
    }

    let size = self.words.len() as u32 - FIRST_BLOCK - 1;
    self.write_free_tags(FIRST_BLOCK, size);
    self.set_height(FIRST_BLOCK, 1);
    self.set_next(FIRST_BLOCK, 0, HEADER);
  }

  // ---------------------------------------------------------------------------
  // Word I/O and boundary tags
  // ---------------------------------------------------------------------------

  #[inline(always)]
  fn word(&self, idx: u32) -> i32 {
    self.words[idx as usize]
  }

  #[inline(always)]
  fn set_word(&mut self, idx: u32, value: i32) {
    self.words[idx as usize] = value;
  }

  /// Payload size in quads, free or used.
  #[inline]
  fn block_size(&self, block: u32) -> u32 {
    self.word(block - 1).unsigned_abs()
  }

  #[inline]
  fn is_free(&self, block: u32) -> bool {
    block >= HEADER_SIZE && self.word(block - 1) > 0
  }

  fn write_free_tags(&mut self, block: u32, size: u32) {
    self.set_word(block - 1, size as i32);
    self.set_word(block + size, size as i32);
  }

  fn write_used_tags(&mut self, block: u32, size: u32) {
    self.set_word(block - 1, -(size as i32));
    self.set_word(block + size, -(size as i32));
  }

  /// Start of the free block physically preceding `block`, if any.
  ///
  /// The neighbor's foot tag sits at `block - 2`; a positive foot of at
  /// least the tag-pair overhead pins down both the neighbor's freedom and
  /// its start.
  fn free_neighbor_before(&self, block: u32) -> Option<u32> {
    if block <= FIRST_BLOCK {
      return None;
    }
    let foot = self.word(block - 2);
    (foot >= 2).then(|| block - 2 - foot as u32)
  }

  /// Start of the free block physically following `block`, if any.
  fn free_neighbor_after(&self, block: u32) -> Option<u32> {
    let next = block + self.block_size(block) + 2;
    if next as usize >= self.words.len() {
      return None;
    }
    (self.word(next - 1) >= 2).then_some(next)
  }

  // ---------------------------------------------------------------------------
  // Freelist index (skip list keyed by size, ascending)
  // ---------------------------------------------------------------------------

  #[inline]
  fn height(&self, node: u32) -> u32 {
    self.word(node) as u32
  }

  #[inline]
  fn set_height(&mut self, node: u32, height: u32) {
    self.set_word(node, height as i32);
  }

  #[inline]
  fn next(&self, node: u32, level: u32) -> u32 {
    self.word(node + 1 + level) as u32
  }

  #[inline]
  fn set_next(&mut self, node: u32, level: u32, target: u32) {
    self.set_word(node + 1 + level, target as i32);
  }

  #[inline]
  fn list_height(&self) -> u32 {
    self.height(HEADER)
  }

  /// Geometric height, p = 1/2: one batched draw, trailing ones counted.
  fn random_height(&mut self) -> u32 {
    (1 + self.rng.next_u32().trailing_ones()).min(MAX_HEIGHT as u32)
  }

  /// Descends the index toward the smallest block of size >= `min`,
  /// recording the last node visited per level in `updates`. Returns the
  /// final level-0 position; its successor is the best fit (or the header).
  fn descend(&mut self, min: u32) -> u32 {
    let mut node = HEADER;
    for level in (0..self.list_height()).rev() {
      loop {
        let next = self.next(node, level);
        if next == HEADER || self.block_size(next) >= min {
          break;
        }
        node = next;
      }
      self.updates[level as usize] = node;
    }
    node
  }

  fn find_at_least(&mut self, min: u32) -> Option<u32> {
    let node = self.descend(min);
    let found = self.next(node, 0);
    (found != HEADER).then_some(found)
  }

  /// Links `block` into the index as a free block of `size` quads and
  /// writes its tags.
  fn link_free(&mut self, block: u32, size: u32) {
    self.descend(size);

    let mut height = self.random_height();
    // The payload must hold the height word plus every link.
    if size - 1 < height + 1 {
      height = size - 2;
    }
    // The list grows one level per insertion at most.
    let list = self.list_height();
    if height > list {
      height = list + 1;
      self.set_height(HEADER, height);
      self.set_next(HEADER, height - 1, HEADER);
      self.updates[(height - 1) as usize] = HEADER;
    }

    self.set_height(block, height);
    for level in 0..height {
      let prev = self.updates[level as usize];
      self.set_next(block, level, self.next(prev, level));
      self.set_next(prev, level, block);
    }
    self.write_free_tags(block, size);
  }

  /// Unlinks the free block at `block` (of `size` quads) from the index and
  /// marks it used.
  ///
  /// Sizes are not unique, so the descent may stop short of `block`; the
  /// level-0 walk closes the gap, re-pointing `updates` at whichever
  /// traversed node actually precedes `block` on each level.
  fn unlink_free(&mut self, block: u32, size: u32) -> Result<(), SlabError> {
    self.descend(size);

    let mut node = self.next(self.updates[0], 0);
    while node != block {
      ensure!(
        node != HEADER && self.block_size(node) <= size,
        CorruptedSnafu {
          reason: "free block missing from the size index"
        }
      );
      for level in 0..self.height(node) {
        if self.next(node, level) == block {
          self.updates[level as usize] = node;
        }
      }
      node = self.next(node, 0);
    }

    debug_assert!(self.is_free(block));
    debug_assert_eq!(self.word(block - 1), self.word(block + size));

    let height = self.height(block);
    debug_assert!(height >= 1 && height <= MAX_HEIGHT as u32);
    for level in 0..height {
      let prev = self.updates[level as usize];
      ensure!(
        self.next(prev, level) == block,
        CorruptedSnafu {
          reason: "stale predecessor link in the size index"
        }
      );
      self.set_next(prev, level, self.next(block, level));
    }

    let mut list = self.list_height();
    while list > 1 && self.next(HEADER, list - 1) == HEADER {
      list -= 1;
    }
    self.set_height(HEADER, list);

    self.write_used_tags(block, size);
    Ok(())
  }

  // ---------------------------------------------------------------------------
  // Allocation engine
  // ---------------------------------------------------------------------------

  /// Allocates `size` bytes and returns the byte offset of the block, or
  /// `Ok(None)` when no free block is large enough.
  ///
  /// `size` must be a multiple of [`POINTER_SIZE`], at least [`MIN_ALLOC`]
  /// and at most the arena capacity.
  pub fn alloc(&mut self, size: usize) -> Result<Option<usize>, SlabError> {
    ensure!(
      size >= MIN_ALLOC && size % POINTER_SIZE == 0 && size <= self.capacity(),
      OutOfRangeSnafu { value: size }
    );
    let want = (size / POINTER_SIZE) as u32;

    let Some(block) = self.find_at_least(want) else {
      return Ok(None);
    };
    let have = self.block_size(block);
    debug_assert!(have >= want);
    self.unlink_free(block, have)?;

    // Split only when the remainder still makes a legal free block once it
    // has paid for its own tag pair.
    if have >= want + 2 + MIN_ALLOC_QUADS {
      self.write_used_tags(block, want);
      self.link_free(block + want + 2, have - want - 2);
    }

    Ok(Some(block as usize * POINTER_SIZE))
  }

  /// Releases the block at byte offset `addr`, coalescing it with adjacent
  /// free neighbors. Returns the block's own size in bytes (pre-coalesce).
  pub fn free(&mut self, addr: usize) -> Result<usize, SlabError> {
    let block = self.checked_block(addr)?;
    let head = self.word(block - 1);
    ensure!(head < 0, InvalidBlockSnafu { addr });
    let size = head.unsigned_abs();
    self.check_block_size(addr, block, size)?;
    let released = size as usize * POINTER_SIZE;

    match (
      self.free_neighbor_before(block),
      self.free_neighbor_after(block),
    ) {
      (None, None) => self.link_free(block, size),
      (None, Some(right)) => {
        let right_size = self.block_size(right);
        self.unlink_free(right, right_size)?;
        // The combined foot coincides with the old foot of `right`.
        self.link_free(block, size + right_size + 2);
      }
      (Some(left), None) => {
        let left_size = self.block_size(left);
        self.unlink_free(left, left_size)?;
        self.link_free(left, left_size + 2 + size);
      }
      (Some(left), Some(right)) => {
        let left_size = self.block_size(left);
        let right_size = self.block_size(right);
        self.unlink_free(left, left_size)?;
        self.unlink_free(right, right_size)?;
        self.link_free(left, right - left + right_size);
      }
    }

    Ok(released)
  }

  /// Size in bytes of the block at `addr`.
  ///
  /// The tag is read regardless of the free bit, so this also reports
  /// blocks that have been freed (or absorbed into a larger free block);
  /// only call it on offsets currently owned.
  pub fn size_of(&self, addr: usize) -> Result<usize, SlabError> {
    let block = self.checked_block(addr)?;
    let size = self.block_size(block);
    self.check_block_size(addr, block, size)?;
    Ok(size as usize * POINTER_SIZE)
  }

  /// Read view of an allocated block's payload.
  pub fn payload(&self, addr: usize) -> Result<&[u8], SlabError> {
    let (block, size) = self.checked_used_block(addr)?;
    let words = &self.words[block as usize..(block + size) as usize];
    // SAFETY: every i32 is four valid bytes; the cast only narrows the
    // element type.
    Ok(unsafe { slice::from_raw_parts(words.as_ptr().cast(), words.len() * POINTER_SIZE) })
  }

  /// Write view of an allocated block's payload.
  pub fn payload_mut(&mut self, addr: usize) -> Result<&mut [u8], SlabError> {
    let (block, size) = self.checked_used_block(addr)?;
    let words = &mut self.words[block as usize..(block + size) as usize];
    // SAFETY: as in `payload`.
    Ok(unsafe { slice::from_raw_parts_mut(words.as_mut_ptr().cast(), words.len() * POINTER_SIZE) })
  }

  /// Out-of-range screen shared by every address-taking operation.
  fn checked_block(&self, addr: usize) -> Result<u32, SlabError> {
    ensure!(
      addr % POINTER_SIZE == 0 && addr >= FIRST_BLOCK_OFFSET && addr < self.capacity(),
      OutOfRangeSnafu { value: addr }
    );
    Ok((addr / POINTER_SIZE) as u32)
  }

  /// Rejects tags that cannot belong to any block of this arena.
  fn check_block_size(&self, addr: usize, block: u32, size: u32) -> Result<(), SlabError> {
    ensure!(
      size >= MIN_ALLOC_QUADS && ((block + size) as usize) < self.words.len(),
      InvalidBlockSnafu { addr }
    );
    Ok(())
  }

  fn checked_used_block(&self, addr: usize) -> Result<(u32, u32), SlabError> {
    let block = self.checked_block(addr)?;
    let head = self.word(block - 1);
    ensure!(head < 0, InvalidBlockSnafu { addr });
    let size = head.unsigned_abs();
    self.check_block_size(addr, block, size)?;
    Ok((block, size))
  }

  // ---------------------------------------------------------------------------
  // Inspection
  // ---------------------------------------------------------------------------

  /// Iterates every block in arena order. Pure read; never allocates.
  pub fn blocks(&self) -> Blocks<'_> {
    Blocks {
      words: &self.words[..],
      block: FIRST_BLOCK,
    }
  }

  /// Aggregate usage counters, computed by one tiling walk.
  pub fn stats(&self) -> Stats {
    let mut stats = Stats::default();
    for info in self.blocks() {
      if info.free {
        stats.free_blocks += 1;
        stats.free_bytes += info.size;
        stats.largest_free = stats.largest_free.max(info.size);
      } else {
        stats.used_blocks += 1;
        stats.used_bytes += info.size;
      }
    }
    stats
  }

  /// Full structural audit: tiling, tag agreement, coalescing, and index
  /// consistency. Pure read. `Err` means the arena must not be trusted.
  ///
  /// Runs automatically when a slab adopts an existing arena; exposed so
  /// embedders of persistent mappings can audit on their own schedule.
  pub fn verify(&self) -> Result<(), SlabError> {
    let quads = self.words.len();
    ensure!(
      verify_header(self.words),
      CorruptedSnafu {
        reason: "missing header block"
      }
    );
    let list = self.list_height();
    ensure!(
      list >= 1 && list <= MAX_HEIGHT as u32,
      CorruptedSnafu {
        reason: "header height out of range"
      }
    );

    // Pass 1: the blocks must tile the arena exactly.
    let mut block = FIRST_BLOCK as usize;
    let mut free_blocks = 0usize;
    let mut prev_free = false;
    while block != quads + 1 {
      ensure!(
        block < quads,
        CorruptedSnafu {
          reason: "tiling runs past the arena"
        }
      );
      let head = self.words[block - 1];
      let size = head.unsigned_abs() as usize;
      ensure!(
        size >= MIN_ALLOC_QUADS as usize && block + size < quads,
        CorruptedSnafu {
          reason: "tag size out of range"
        }
      );
      ensure!(
        self.words[block + size] == head,
        CorruptedSnafu {
          reason: "head and foot tags disagree"
        }
      );
      let free = head > 0;
      ensure!(
        !(free && prev_free),
        CorruptedSnafu {
          reason: "adjacent free blocks escaped coalescing"
        }
      );
      if free {
        free_blocks += 1;
        let height = self.words[block];
        ensure!(
          height >= 1 && height <= list as i32,
          CorruptedSnafu {
            reason: "node height out of range"
          }
        );
        ensure!(
          height as usize + 1 <= size,
          CorruptedSnafu {
            reason: "node height exceeds payload"
          }
        );
      }
      prev_free = free;
      block += size + 2;
    }

    // Pass 2: level 0 must visit exactly the free blocks, sizes ascending.
    let mut count = 0usize;
    let mut prev_size = 0u32;
    let mut node = self.checked_next(HEADER, 0)?;
    while node != HEADER {
      ensure!(
        self.is_free(node),
        CorruptedSnafu {
          reason: "index references a block that is not free"
        }
      );
      let size = self.block_size(node);
      ensure!(
        size >= MIN_ALLOC_QUADS && ((node + size) as usize) < quads,
        CorruptedSnafu {
          reason: "tag size out of range"
        }
      );
      ensure!(
        size >= prev_size,
        CorruptedSnafu {
          reason: "size index out of order"
        }
      );
      // Screens the height here as well, so the sublist walk below can read
      // any level link of a visited node without running off the arena.
      let height = self.height(node);
      ensure!(
        height >= 1 && height <= list && height < size,
        CorruptedSnafu {
          reason: "node height out of range"
        }
      );
      prev_size = size;
      count += 1;
      ensure!(
        count <= free_blocks,
        CorruptedSnafu {
          reason: "size index visits too many nodes"
        }
      );
      node = self.checked_next(node, 0)?;
    }
    ensure!(
      count == free_blocks,
      CorruptedSnafu {
        reason: "size index misses free blocks"
      }
    );

    // Pass 3: every upper level is a sublist of level 0, below each node's
    // height, and the header's top level is inhabited.
    for level in 1..list {
      let mut cursor = self.next(HEADER, 0);
      let mut node = self.checked_next(HEADER, level)?;
      let mut steps = 0usize;
      while node != HEADER {
        while cursor != HEADER && cursor != node {
          cursor = self.next(cursor, 0);
        }
        ensure!(
          cursor == node,
          CorruptedSnafu {
            reason: "upper level is not a sublist of level 0"
          }
        );
        ensure!(
          self.height(node) > level,
          CorruptedSnafu {
            reason: "node linked above its height"
          }
        );
        steps += 1;
        ensure!(
          steps <= count,
          CorruptedSnafu {
            reason: "size index visits too many nodes"
          }
        );
        node = self.checked_next(node, level)?;
      }
    }
    if list > 1 {
      ensure!(
        self.next(HEADER, list - 1) != HEADER,
        CorruptedSnafu {
          reason: "header height exceeds tallest node"
        }
      );
    }
    for level in list..MAX_HEIGHT as u32 {
      ensure!(
        self.next(HEADER, level) == HEADER,
        CorruptedSnafu {
          reason: "dangling entry above the list height"
        }
      );
    }

    Ok(())
  }

  /// `next` with the target screened against the arena bounds, for walking
  /// arenas that have not been trusted yet.
  fn checked_next(&self, node: u32, level: u32) -> Result<u32, SlabError> {
    let target = self.next(node, level);
    ensure!(
      target == HEADER || (target >= FIRST_BLOCK && (target as usize) < self.words.len()),
      CorruptedSnafu {
        reason: "index link out of range"
      }
    );
    Ok(target)
  }
}

/// True when `words` already carries an installed arena header, i.e. the
/// header block's head and foot tags both read [`HEADER_SIZE`].
pub fn verify_header(words: &[i32]) -> bool {
  let foot = (HEADER + HEADER_SIZE) as usize;
  words.len() > foot
    && words[HEADER as usize - 1] == HEADER_SIZE as i32
    && words[foot] == HEADER_SIZE as i32
}

// =============================================================================
// Inspection records
// =============================================================================

/// One block, as reported by [`Slab::blocks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo<'s> {
  /// Byte offset of the payload within the arena.
  pub offset: usize,
  /// Payload size in bytes.
  pub size: usize,
  pub free: bool,
  /// Forward links per level (quad indices); empty for used blocks.
  pub links: &'s [i32],
}

/// Arena-order block iterator; walks the boundary tags, not the index.
pub struct Blocks<'s> {
  words: &'s [i32],
  block: u32,
}

impl<'s> Iterator for Blocks<'s> {
  type Item = BlockInfo<'s>;

  fn next(&mut self) -> Option<Self::Item> {
    let words = self.words;
    let block = self.block as usize;
    if block + 1 > words.len() {
      return None;
    }
    let head = words[block - 1];
    let size = head.unsigned_abs() as usize;
    if size == 0 || block + size >= words.len() {
      // Torn tag; stop rather than walk garbage.
      return None;
    }

    let free = head > 0;
    let links = if free {
      let height = words[block].clamp(0, MAX_HEIGHT as i32) as usize;
      &words[block + 1..(block + 1 + height).min(block + size)]
    } else {
      &[]
    };

    self.block += size as u32 + 2;
    Some(BlockInfo {
      offset: block * POINTER_SIZE,
      size: size * POINTER_SIZE,
      free,
      links,
    })
  }
}

/// Usage counters from [`Slab::stats`]; all sizes in bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
  pub used_blocks: usize,
  pub used_bytes: usize,
  pub free_blocks: usize,
  pub free_bytes: usize,
  pub largest_free: usize,
}

// =============================================================================
// Tests
// =============================================================================
