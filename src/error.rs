use std::{fmt, io};

#[derive(Debug)]
pub enum Error {
  /// No free block large enough for the request, or the arena is disabled.
  OutOfMemory,
  /// The header at `offset` was already free when it was released.
  DoubleFree { offset: usize },
  Io(io::Error),
}

impl fmt::Display for Error {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      Error::OutOfMemory => write!(f, "arena exhausted"),
      Error::DoubleFree { offset } => write!(f, "block at offset {offset:#x} is already free"),
      Error::Io(err) => write!(f, "i/o error: {err}"),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Io(err) => Some(err),
      _ => None,
    }
  }
}

impl From<io::Error> for Error {
  fn from(value: io::Error) -> Self {
    Self::Io(value)
  }
}
