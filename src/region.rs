use std::{io, ptr};

use libc::{MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_READ, PROT_WRITE, c_void};
use log::debug;

use crate::Arena;

/// Anonymous private memory obtained with `mmap(2)` and returned with
/// `munmap(2)` on drop.
#[derive(Debug)]
pub struct MappedRegion {
  start: *mut u8,
  len: usize,
}

impl MappedRegion {
  pub fn new(len: usize) -> io::Result<Self> {
    if len == 0 {
      return Err(io::Error::new(io::ErrorKind::InvalidInput, "cannot map an empty region"));
    }

    let address = unsafe {
      libc::mmap(
        ptr::null_mut(),
        len,
        PROT_READ | PROT_WRITE,
        MAP_ANONYMOUS | MAP_PRIVATE,
        -1,
        0,
      )
    };

    if address == MAP_FAILED {
      return Err(io::Error::last_os_error());
    }

    debug!("mapped {len} bytes at {address:p}");

    Ok(Self {
      start: address.cast::<u8>(),
      len,
    })
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Hands the whole region to a new arena, which may not outlive it.
  pub fn arena(&mut self) -> Arena<'_> {
    let buf = unsafe { std::slice::from_raw_parts_mut(self.start, self.len) };
    Arena::from_slice(buf)
  }
}

impl Drop for MappedRegion {
  fn drop(&mut self) {
    unsafe {
      if libc::munmap(self.start.cast::<c_void>(), self.len) != 0 {
        debug!("munmap of {:p} failed: {}", self.start, io::Error::last_os_error());
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::HEADER_SIZE;

  #[test]
  fn mapped_region_backs_an_arena() {
    let mut region = MappedRegion::new(4096).unwrap();
    assert_eq!(region.len(), 4096);

    let mut arena = region.arena();
    let ptr = arena.allocate(128).unwrap();

    unsafe {
      ptr.as_ptr().write_bytes(0xee, 128);
      assert_eq!(*ptr.as_ptr().add(127), 0xee);
    }
    // mmap hands out page-aligned memory, so nothing is lost to alignment.
    assert_eq!(arena.capacity(), 4096);
    assert_eq!(ptr.as_ptr().addr() % 4096, HEADER_SIZE);
  }

  #[test]
  fn empty_region_is_rejected() {
    let err = MappedRegion::new(0).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
  }
}
