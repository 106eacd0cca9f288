use std::{env, io, process};

use log::error;
use ringalloc::{Error, MappedRegion, collection};

const DEFAULT_ARENA_SIZE: usize = 64 * 1024;
const ARENA_SIZE_VAR: &str = "RINGALLOC_ARENA_SIZE";

fn arena_size() -> Result<usize, String> {
  match env::var(ARENA_SIZE_VAR) {
    Ok(value) => value
      .trim()
      .parse()
      .map_err(|err| format!("invalid {ARENA_SIZE_VAR} {value:?}: {err}")),
    Err(env::VarError::NotPresent) => Ok(DEFAULT_ARENA_SIZE),
    Err(err) => Err(format!("invalid {ARENA_SIZE_VAR}: {err}")),
  }
}

fn run(size: usize) -> Result<(), Error> {
  let mut region = MappedRegion::new(size)?;
  let mut arena = region.arena();

  collection::run(&mut arena, io::stdin().lock(), io::stdout().lock())
}

fn main() {
  env_logger::init();

  let size = match arena_size() {
    Ok(size) => size,
    Err(message) => {
      error!("{message}");
      process::exit(1);
    }
  };

  if let Err(err) = run(size) {
    error!("{err}");
    process::exit(1);
  }
}
