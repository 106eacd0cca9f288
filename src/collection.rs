//! Command interpreter that keeps a singly linked list of integers in arena
//! memory.
//!
//! Commands are single bytes:
//!
//! - `a` appends the counter to the list, then bumps the counter.
//! - `b` bumps the counter.
//! - `c` drops the last element, if any, then bumps the counter.
//!
//! Any other byte, or the end of input, stops the loop. The surviving values
//! are then printed head to tail as `v0,v1,...;` followed by a newline.

use std::{
  io::{Read, Write},
  mem,
  ptr::NonNull,
};

use log::debug;

use crate::{Arena, Error, MIN_SIZE};

#[repr(C)]
struct Node {
  element: i32,
  next: Option<NonNull<Node>>,
}

const _: () = assert!(mem::align_of::<Node>() <= MIN_SIZE);

#[derive(Default)]
struct Collection {
  head: Option<NonNull<Node>>,
  tail: Option<NonNull<Node>>,
}

impl Collection {
  fn push_back(
    &mut self,
    arena: &mut Arena<'_>,
    element: i32,
  ) -> Result<(), Error> {
    let node = arena
      .allocate(mem::size_of::<Node>())
      .ok_or(Error::OutOfMemory)?
      .cast::<Node>();

    unsafe {
      node.write(Node { element, next: None });
      match self.tail {
        Some(tail) => (*tail.as_ptr()).next = Some(node),
        None => self.head = Some(node),
      }
    }
    self.tail = Some(node);

    Ok(())
  }

  fn pop_back(
    &mut self,
    arena: &mut Arena<'_>,
  ) {
    let Some(tail) = self.tail else {
      return;
    };

    if self.head == Some(tail) {
      self.head = None;
      self.tail = None;
    } else if let Some(mut current) = self.head {
      unsafe {
        while (*current.as_ptr()).next != Some(tail) {
          match (*current.as_ptr()).next {
            Some(next) => current = next,
            None => return,
          }
        }
        (*current.as_ptr()).next = None;
      }
      self.tail = Some(current);
    }

    unsafe { arena.free(tail.cast()) };
  }

  fn pop_front(
    &mut self,
    arena: &mut Arena<'_>,
  ) -> Option<i32> {
    let head = self.head?;

    let (element, next) = unsafe { ((*head.as_ptr()).element, (*head.as_ptr()).next) };
    self.head = next;
    if next.is_none() {
      self.tail = None;
    }
    unsafe { arena.free(head.cast()) };

    Some(element)
  }

  fn interpret(
    &mut self,
    arena: &mut Arena<'_>,
    input: impl Read,
  ) -> Result<i32, Error> {
    let mut counter: i32 = 0;

    for byte in input.bytes() {
      match byte? {
        b'a' => self.push_back(arena, counter)?,
        b'b' => {}
        b'c' => self.pop_back(arena),
        _ => break,
      }
      counter = counter.wrapping_add(1);
    }

    Ok(counter)
  }

  /// Writes and releases every node, head first.
  fn drain_into(
    &mut self,
    arena: &mut Arena<'_>,
    mut output: impl Write,
  ) -> Result<(), Error> {
    let mut separator = "";
    while let Some(element) = self.pop_front(arena) {
      write!(output, "{separator}{element}")?;
      separator = ",";
    }
    writeln!(output, ";")?;
    output.flush()?;

    Ok(())
  }

  fn clear(
    &mut self,
    arena: &mut Arena<'_>,
  ) {
    while self.pop_front(arena).is_some() {}
  }
}

/// Runs the interpreter over `input`, keeping list nodes in `arena`, and
/// prints the final list to `output`.
///
/// Every node is released before returning, also on error. Running out of
/// arena space on an `a` command is [`Error::OutOfMemory`].
pub fn run(
  arena: &mut Arena<'_>,
  input: impl Read,
  output: impl Write,
) -> Result<(), Error> {
  let mut collection = Collection::default();

  let result = collection
    .interpret(arena, input)
    .and_then(|counter| {
      debug!("interpreter stopped with counter at {counter}");
      collection.drain_into(arena, output)
    });

  collection.clear(arena);

  result
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::HEADER_SIZE;

  fn interpret(
    arena: &mut Arena<'_>,
    commands: &str,
  ) -> Result<String, Error> {
    let mut output = Vec::new();
    run(arena, commands.as_bytes(), &mut output)?;
    Ok(String::from_utf8(output).unwrap())
  }

  fn with_arena<T>(
    bytes: usize,
    f: impl FnOnce(&mut Arena<'_>) -> T,
  ) -> T {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut backing = vec![0u64; bytes / 8];
    let len = backing.len() * 8;
    let buf = unsafe { std::slice::from_raw_parts_mut(backing.as_mut_ptr().cast::<u8>(), len) };
    let mut arena = Arena::from_slice(buf);
    f(&mut arena)
  }

  #[test]
  fn append_remove_and_skip() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "aaacb.").unwrap(), "0,1;\n");
      assert_eq!(arena.stats().used_bytes, 0);
    });
  }

  #[test]
  fn end_of_input_terminates() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "aaacb").unwrap(), "0,1;\n");
    });
  }

  #[test]
  fn empty_input_prints_empty_list() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "").unwrap(), ";\n");
      assert_eq!(interpret(arena, "x").unwrap(), ";\n");
    });
  }

  #[test]
  fn remove_on_empty_list_still_counts() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "cca").unwrap(), "2;\n");
      assert_eq!(interpret(arena, "abca").unwrap(), "3;\n");
    });
  }

  #[test]
  fn remove_down_to_empty() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "aacca").unwrap(), "4;\n");
    });
  }

  #[test]
  fn stops_at_first_unknown_command() {
    with_arena(1024, |arena| {
      assert_eq!(interpret(arena, "ab\naaa").unwrap(), "0;\n");
    });
  }

  #[test]
  fn freed_nodes_are_reused() {
    let node = crate::align_up!(mem::size_of::<Node>());
    // Room for two nodes at a time.
    with_arena(3 * HEADER_SIZE + 2 * node, |arena| {
      assert_eq!(interpret(arena, "aacacaca").unwrap(), "0,7;\n");
    });
  }

  #[test]
  fn exhaustion_releases_every_node() {
    let node = crate::align_up!(mem::size_of::<Node>());
    with_arena(3 * HEADER_SIZE + 2 * node, |arena| {
      let err = interpret(arena, "aaa").unwrap_err();

      assert!(matches!(err, Error::OutOfMemory));
      let stats = arena.stats();
      assert_eq!(stats.used_bytes, 0);
      assert_eq!(stats.free_blocks, stats.blocks);
    });
  }
}
