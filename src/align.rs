/// Rounds `value` up to the next multiple of the block granularity
/// ([`MIN_SIZE`](crate::MIN_SIZE)), or of an explicit power-of-two alignment.
///
/// # Examples
///
/// ```rust
/// use ringalloc::align_up;
///
/// assert_eq!(align_up!(13), 16);
/// assert_eq!(align_up!(16), 16);
/// assert_eq!(align_up!(17, 32), 32);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr) => {
    $crate::align_up!($value, $crate::MIN_SIZE)
  };
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Rounds `value` down to the previous multiple of the block granularity,
/// or of an explicit power-of-two alignment.
///
/// ```rust
/// use ringalloc::align_down;
///
/// assert_eq!(align_down!(13), 8);
/// assert_eq!(align_down!(63, 16), 48);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr) => {
    $crate::align_down!($value, $crate::MIN_SIZE)
  };
  ($value:expr, $align:expr) => {
    $value & !($align - 1)
  };
}

#[cfg(test)]
mod tests {
  use crate::MIN_SIZE;

  #[test]
  fn test_align_up() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (MIN_SIZE * i + 1)..=(MIN_SIZE * (i + 1));

      let expected_alignment = MIN_SIZE * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align_up!(size));
      }
    }

    assert_eq!(0, align_up!(0usize));
  }

  #[test]
  fn test_align_down() {
    for i in 0..10 {
      for size in (MIN_SIZE * i)..(MIN_SIZE * (i + 1)) {
        assert_eq!(MIN_SIZE * i, align_down!(size));
      }
    }
  }

  #[test]
  fn test_explicit_alignment() {
    assert_eq!(align_up!(0x1001usize, 0x1000), 0x2000);
    assert_eq!(align_down!(0x1fffusize, 0x1000), 0x1000);
  }
}
