//! # ringalloc - A Fixed-Arena Next-Fit Allocator
//!
//! This crate manages a single, caller-supplied extent of memory as a ring of
//! variably sized blocks. It never asks its environment for more memory.
//!
//! ## Overview
//!
//! Every block starts with a small header holding the offset of the next
//! header and a free flag. Block sizes are not stored: a block ends where the
//! next header begins.
//!
//! ```text
//!   Arena Layout:
//!
//!   ┌──────┬────────────┬──────┬──────────────────┬──────┬──────────┬──────┐
//!   │ hdr  │  payload   │ hdr  │     payload      │ hdr  │ payload  │ end  │
//!   │ used │            │ free │                  │ used │          │ used │
//!   └──────┴────────────┴──────┴──────────────────┴──────┴──────────┴──────┘
//!      │         ▲         ▲                                            │
//!      │         │         └── roving cursor                            │
//!      │         └── pointer handed out                                 │
//!      │                                                                │
//!      └──── each header links to the next; the sentinel links back ◄───┘
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   ringalloc
//!   ├── align       - Alignment macros (align_up!, align_down!)
//!   ├── block       - Header layout, MIN_SIZE, BlockInfo
//!   ├── arena       - Arena: init, allocate, free
//!   ├── region      - MappedRegion, mmap-backed extents
//!   ├── collection  - Linked-list command interpreter on top of an arena
//!   └── error       - Error
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use ringalloc::Arena;
//!
//! let mut memory = [0u64; 64];
//! let bytes = unsafe {
//!     std::slice::from_raw_parts_mut(memory.as_mut_ptr().cast::<u8>(), 512)
//! };
//! let mut arena = Arena::from_slice(bytes);
//!
//! let ptr = arena.allocate(24).expect("arena has room");
//! unsafe {
//!     ptr.cast::<u64>().write(42);
//!     arena.free(ptr);
//! }
//! ```
//!
//! ## How It Works
//!
//! - **Init** aligns the extent to 8 bytes and writes two headers: one free
//!   block spanning everything, and a permanently used sentinel at the end
//!   that links back to the first block.
//! - **Allocate** rounds the request up to a multiple of [`MIN_SIZE`] and
//!   walks the ring from the roving cursor. Each free block visited first
//!   absorbs any free blocks directly after it. The first block that is big
//!   enough is split, or handed out whole when the rest would be a sliver.
//!   The cursor stays on that block for the next call.
//! - **Free** flips the block's flag and does nothing else.
//!
//! ```text
//!   Deferred Coalescing:
//!
//!   free(A), free(B)      ┌─ A free ─┬─ B free ─┬─ used ─┐
//!                         └──────────┴──────────┴────────┘
//!
//!   allocate(32) visits A ┌─ A free (absorbed B) ┬─ used ─┐
//!                         └──────────────────────┴────────┘
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: `Arena` is neither `Send` nor `Sync`
//! - **Fixed size**: the arena never grows or shrinks
//! - **8-byte alignment**: payloads are aligned to [`MIN_SIZE`], no more
//! - **No realloc**
//!
//! ## Safety
//!
//! Allocation is safe; releasing memory is `unsafe`, because the arena
//! trusts that the pointer it receives came from it.

pub mod align;
mod arena;
mod block;
pub mod collection;
mod error;
mod region;

pub use arena::{Arena, Blocks, Stats};
pub use block::{BlockInfo, HEADER_SIZE, MIN_SIZE};
pub use error::Error;
pub use region::MappedRegion;
