use std::{
  marker::PhantomData,
  ptr::{self, NonNull},
  slice,
};

use log::{debug, trace};

use crate::{
  block::{BlockInfo, HEADER_SIZE, Header, MIN_SIZE},
  error::Error,
};

/// Where an arena is in its lifecycle. `Disabled` is terminal: an extent that
/// was too small once stays too small.
#[derive(Debug)]
enum State {
  Uninit,
  Disabled,
  Ready(Ring),
}

/// The carved extent: headers at 8-aligned offsets from `base`, the first one
/// at offset 0 and the sentinel at `sentinel`.
#[derive(Debug)]
struct Ring {
  base: NonNull<u8>,
  sentinel: usize,
  current: usize,
}

impl Ring {
  fn header(
    &self,
    offset: usize,
  ) -> *mut Header {
    // SAFETY: every offset handed to this function is either 0, the sentinel,
    // or a `next` link read from a live header, all of which lie inside the
    // extent and are 8-aligned.
    unsafe { self.base.as_ptr().add(offset).cast::<Header>() }
  }

  fn read(
    &self,
    offset: usize,
  ) -> Header {
    unsafe { ptr::read(self.header(offset)) }
  }

  fn write(
    &self,
    offset: usize,
    header: Header,
  ) {
    unsafe { ptr::write(self.header(offset), header) }
  }

  fn payload(
    &self,
    offset: usize,
  ) -> NonNull<u8> {
    unsafe { self.base.add(offset + HEADER_SIZE) }
  }

  /// Marks the free block at `offset` used, splitting off the tail as a new
  /// free block when it is big enough to stand on its own.
  fn take(
    &self,
    offset: usize,
    mut header: Header,
    wanted: usize,
  ) -> NonNull<u8> {
    let size = header.size(offset);

    if size - wanted < HEADER_SIZE + MIN_SIZE {
      debug!("handing out whole block at {offset:#x} ({size} bytes for {wanted})");
    } else {
      let remainder = offset + HEADER_SIZE + wanted;
      self.write(remainder, Header::new(header.next, true));
      header.next = remainder;
      debug!(
        "split block at {offset:#x}: {wanted} bytes used, {} bytes free at {remainder:#x}",
        size - wanted - HEADER_SIZE
      );
    }

    header.free = false;
    self.write(offset, header);

    self.payload(offset)
  }
}

/// Space usage totals of an arena, computed by walking every block.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
  pub blocks: usize,
  pub free_blocks: usize,
  pub free_bytes: usize,
  pub used_bytes: usize,
  /// Header overhead, sentinel included.
  pub header_bytes: usize,
}

/// A next-fit allocator over a fixed extent of memory.
///
/// The extent is carved lazily, on [`init`](Arena::init) or the first
/// [`allocate`](Arena::allocate). Adjacent free blocks are only merged while
/// an allocation scans over them; [`free`](Arena::free) never touches a
/// neighbour.
#[derive(Debug)]
pub struct Arena<'a> {
  start: *mut u8,
  len: usize,
  state: State,
  _extent: PhantomData<&'a mut [u8]>,
}

impl<'a> Arena<'a> {
  /// Creates an arena managing `buf`. Nothing is written until the arena is
  /// initialized.
  pub fn from_slice(buf: &'a mut [u8]) -> Self {
    Self {
      start: buf.as_mut_ptr(),
      len: buf.len(),
      state: State::Uninit,
      _extent: PhantomData,
    }
  }

  /// Carves the extent into one free block and the end sentinel.
  ///
  /// Calling this again is a no-op. If the aligned extent cannot hold a
  /// header, a [`MIN_SIZE`] payload and the sentinel, the arena is disabled
  /// for good and every allocation returns `None`.
  pub fn init(&mut self) {
    if !matches!(self.state, State::Uninit) {
      return;
    }

    self.state = match self.carve() {
      Some(ring) => {
        debug!(
          "arena initialized at {:p}: {} bytes, {} free",
          ring.base,
          ring.sentinel + HEADER_SIZE,
          ring.sentinel - HEADER_SIZE
        );
        State::Ready(ring)
      }
      None => {
        debug!("arena of {} bytes at {:p} is too small, disabling", self.len, self.start);
        State::Disabled
      }
    };
  }

  fn carve(&self) -> Option<Ring> {
    let addr = self.start.addr();
    let pad = crate::align_up!(addr) - addr;
    let usable = self.len.checked_sub(pad)?.checked_sub(HEADER_SIZE)?;
    let sentinel = crate::align_down!(usable);

    if sentinel < HEADER_SIZE + MIN_SIZE {
      return None;
    }

    let ring = Ring {
      base: NonNull::new(self.start.wrapping_add(pad))?,
      sentinel,
      current: 0,
    };
    ring.write(0, Header::new(sentinel, true));
    ring.write(sentinel, Header::new(0, false));

    Some(ring)
  }

  /// Returns a pointer to at least `size` bytes, aligned to [`MIN_SIZE`], or
  /// `None` if no free block is large enough.
  ///
  /// The scan resumes at the block the previous allocation stopped on and
  /// wraps around the whole ring at most once.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    self.init();

    let State::Ready(ring) = &mut self.state else {
      return None;
    };

    let Some(wanted) = round_request(size) else {
      debug!("request of {size} bytes cannot be rounded");
      return None;
    };

    let mut start = ring.current;

    loop {
      let mut header = ring.read(ring.current);
      trace!("visiting block at {:#x} (free: {})", ring.current, header.free);

      if header.free {
        let mut next = ring.read(header.next);
        while next.free {
          debug!("coalescing block at {:#x} into {:#x}", header.next, ring.current);
          // The scan must still end if it swallows the block it began on.
          if header.next == start {
            start = ring.current;
          }
          header.next = next.next;
          next = ring.read(header.next);
        }
        ring.write(ring.current, header);

        if header.size(ring.current) >= wanted {
          return Some(ring.take(ring.current, header, wanted));
        }
      }

      ring.current = header.next;
      if ring.current == start {
        debug!("no free block of {wanted} bytes");
        return None;
      }
    }
  }

  /// Releases a block returned by [`allocate`](Arena::allocate).
  ///
  /// A block that is already free is left alone.
  ///
  /// # Safety
  ///
  /// `ptr` must have been returned by `allocate` on this arena. Any other
  /// address corrupts the arena.
  pub unsafe fn free(
    &mut self,
    ptr: NonNull<u8>,
  ) {
    if let Err(err) = unsafe { self.try_free(ptr) } {
      debug!("ignoring free of {ptr:p}: {err}");
    }
  }

  /// Like [`free`](Arena::free), but reports a block that was already free
  /// as [`Error::DoubleFree`]. The arena is unchanged in that case.
  ///
  /// # Safety
  ///
  /// Same contract as [`free`](Arena::free).
  pub unsafe fn try_free(
    &mut self,
    ptr: NonNull<u8>,
  ) -> Result<(), Error> {
    let State::Ready(ring) = &self.state else {
      return Ok(());
    };

    let offset = ptr
      .as_ptr()
      .addr()
      .wrapping_sub(ring.base.as_ptr().addr())
      .wrapping_sub(HEADER_SIZE);
    debug_assert!(offset < ring.sentinel, "{ptr:p} is outside the arena");

    let mut header = ring.read(offset);
    if header.free {
      return Err(Error::DoubleFree { offset });
    }

    header.free = true;
    ring.write(offset, header);

    Ok(())
  }

  pub fn is_initialized(&self) -> bool {
    matches!(self.state, State::Ready(_))
  }

  /// Bytes from the first header to the end of the sentinel, or 0 when the
  /// arena is not carved.
  pub fn capacity(&self) -> usize {
    match &self.state {
      State::Ready(ring) => ring.sentinel + HEADER_SIZE,
      _ => 0,
    }
  }

  /// Whether `ptr` points into the payload area of the arena. This says
  /// nothing about whether `ptr` is a live allocation.
  pub fn contains(
    &self,
    ptr: *const u8,
  ) -> bool {
    let State::Ready(ring) = &self.state else {
      return false;
    };

    let base = ring.base.as_ptr().addr();
    (base + HEADER_SIZE..base + ring.sentinel).contains(&ptr.addr())
  }

  /// Walks every block in address order, sentinel excluded. Free neighbours
  /// that no scan has merged yet show up as separate blocks.
  pub fn blocks(&self) -> Blocks<'_> {
    let ring = match &self.state {
      State::Ready(ring) => Some(ring),
      _ => None,
    };

    Blocks { ring, offset: 0 }
  }

  pub fn stats(&self) -> Stats {
    let mut stats = Stats::default();

    if self.is_initialized() {
      stats.header_bytes = HEADER_SIZE;
    }

    for block in self.blocks() {
      stats.blocks += 1;
      stats.header_bytes += HEADER_SIZE;
      if block.free {
        stats.free_blocks += 1;
        stats.free_bytes += block.size;
      } else {
        stats.used_bytes += block.size;
      }
    }

    stats
  }

  /// Payload bytes of the block owning `ptr`.
  ///
  /// # Safety
  ///
  /// `ptr` must be a live allocation of this arena.
  pub unsafe fn block_size(
    &self,
    ptr: NonNull<u8>,
  ) -> usize {
    let State::Ready(ring) = &self.state else {
      return 0;
    };

    let offset = ptr.as_ptr().addr() - ring.base.as_ptr().addr() - HEADER_SIZE;
    ring.read(offset).size(offset)
  }

  /// The payload of a live allocation as a byte slice.
  ///
  /// # Safety
  ///
  /// `ptr` must be a live allocation of this arena, and no other reference
  /// to its payload may exist while the slice is alive.
  pub unsafe fn payload_mut(
    &mut self,
    ptr: NonNull<u8>,
  ) -> &mut [u8] {
    unsafe {
      let len = self.block_size(ptr);
      slice::from_raw_parts_mut(ptr.as_ptr(), len)
    }
  }
}

impl Arena<'static> {
  /// Creates an arena over `[start, end)`.
  ///
  /// # Safety
  ///
  /// The range must be valid for reads and writes and must not be accessed
  /// through anything but this arena (and the pointers it hands out) for as
  /// long as the arena is in use.
  pub unsafe fn from_raw_parts(
    start: *mut u8,
    end: *mut u8,
  ) -> Self {
    Self {
      start,
      len: end.addr().saturating_sub(start.addr()),
      state: State::Uninit,
      _extent: PhantomData,
    }
  }
}

/// Iterator returned by [`Arena::blocks`].
pub struct Blocks<'r> {
  ring: Option<&'r Ring>,
  offset: usize,
}

impl Iterator for Blocks<'_> {
  type Item = BlockInfo;

  fn next(&mut self) -> Option<Self::Item> {
    let ring = self.ring?;
    if self.offset == ring.sentinel {
      return None;
    }

    let header = ring.read(self.offset);
    let info = BlockInfo {
      offset: self.offset,
      size: header.size(self.offset),
      free: header.free,
    };
    self.offset = header.next;

    Some(info)
  }
}

/// Rounds a request up to the block granularity. Zero-sized requests still
/// get a minimum block.
fn round_request(size: usize) -> Option<usize> {
  let rounded = size.max(1).checked_add(MIN_SIZE - 1)?;
  Some(crate::align_down!(rounded))
}
