use std::ptr::NonNull;

use ringalloc::{Arena, HEADER_SIZE, MappedRegion};

/// Prints every block of the arena in address order.
fn print_blocks(
  label: &str,
  arena: &Arena<'_>,
) {
  println!("[{label}]");
  for block in arena.blocks() {
    println!(
      "  {:#06x}  {:>5} bytes  {}",
      block.offset,
      block.size,
      if block.free { "free" } else { "used" }
    );
  }
  let stats = arena.stats();
  println!(
    "  -> {} blocks, {} free bytes, {} used bytes, {} header bytes",
    stats.blocks, stats.free_bytes, stats.used_bytes, stats.header_bytes
  );
}

fn print_alloc(
  size: usize,
  addr: Option<NonNull<u8>>,
) {
  match addr {
    Some(addr) => println!("\nAllocated {size} bytes, address = {addr:p}"),
    None => println!("\nAllocation of {size} bytes failed"),
  }
}

fn main() {
  env_logger::init();

  // One page is plenty to watch the ring change shape.
  let mut region = match MappedRegion::new(4096) {
    Ok(region) => region,
    Err(err) => {
      eprintln!("could not map memory: {err}");
      return;
    }
  };
  let mut arena = region.arena();

  arena.init();
  print_blocks("fresh arena", &arena);

  // --------------------------------------------------------------------
  // 1) Two small allocations. Each one splits the big free block.
  // --------------------------------------------------------------------
  let a = arena.allocate(16);
  print_alloc(16, a);
  let b = arena.allocate(16);
  print_alloc(16, b);
  print_blocks("after a and b", &arena);

  // --------------------------------------------------------------------
  // 2) Odd sizes are rounded up to the 8 byte granularity.
  // --------------------------------------------------------------------
  let c = arena.allocate(13);
  print_alloc(13, c);
  print_blocks("after c (13 -> 16 bytes)", &arena);

  // --------------------------------------------------------------------
  // 3) Freeing a and b only flips their flags. They stay two blocks.
  // --------------------------------------------------------------------
  if let (Some(a), Some(b)) = (a, b) {
    unsafe {
      arena.free(a);
      arena.free(b);
    }
  }
  print_blocks("after freeing a and b", &arena);

  // --------------------------------------------------------------------
  // 4) Fill the tail so the next scan has to wrap around to the front.
  // --------------------------------------------------------------------
  let tail = arena.blocks().last().filter(|block| block.free);
  if let Some(tail) = tail {
    let filler = arena.allocate(tail.size);
    print_alloc(tail.size, filler);
  }

  // --------------------------------------------------------------------
  // 5) A request bigger than a or b alone. The scan wraps to a, absorbs b,
  //    and hands out the merged block.
  // --------------------------------------------------------------------
  let merged = 32 + HEADER_SIZE;
  let d = arena.allocate(merged);
  print_alloc(merged, d);
  println!("d == a? {}", d == a);
  print_blocks("after coalescing allocation", &arena);

  // --------------------------------------------------------------------
  // 6) The arena is full now; further requests fail instead of growing.
  // --------------------------------------------------------------------
  let e = arena.allocate(8);
  print_alloc(8, e);

  println!("\nEnd of walkthrough. The region is unmapped when it goes out of scope.");
}
