use std::mem;

/// Granularity of every block: payload sizes are multiples of this, and no
/// block is ever smaller.
pub const MIN_SIZE: usize = 8;

/// Bytes occupied by a header in front of each payload.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

const _: () = {
  assert!(HEADER_SIZE % MIN_SIZE == 0);
  assert!(mem::align_of::<Header>() <= MIN_SIZE);
};

/// In-band block header.
///
/// `next` is the arena-relative offset of the following header. The last
/// real block points at the sentinel, and the sentinel points back at offset
/// 0, closing the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub(crate) struct Header {
  pub next: usize,
  pub free: bool,
}

impl Header {
  pub fn new(
    next: usize,
    free: bool,
  ) -> Self {
    Self { next, free }
  }

  /// Payload bytes of the block whose header lives at `offset`.
  pub fn size(
    &self,
    offset: usize,
  ) -> usize {
    self.next - offset - HEADER_SIZE
  }
}

/// Snapshot of one block, as seen by [`Arena::blocks`](crate::Arena::blocks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  /// Offset of the header from the aligned arena start.
  pub offset: usize,
  /// Usable payload bytes.
  pub size: usize,
  pub free: bool,
}

impl BlockInfo {
  /// Offset of the payload from the aligned arena start.
  pub fn payload_offset(&self) -> usize {
    self.offset + HEADER_SIZE
  }

  /// Offset one past the last payload byte, which is where the next header starts.
  pub fn end_offset(&self) -> usize {
    self.payload_offset() + self.size
  }
}
