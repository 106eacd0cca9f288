use ringalloc::{MappedRegion, collection};

fn run(commands: &str) -> String {
  let mut region = MappedRegion::new(4096).unwrap();
  let mut arena = region.arena();
  let mut output = Vec::new();

  collection::run(&mut arena, commands.as_bytes(), &mut output).unwrap();

  assert_eq!(arena.stats().used_bytes, 0);
  String::from_utf8(output).unwrap()
}

#[test]
fn append_append_append_remove_skip() {
  assert_eq!(run("aaacb\n"), "0,1;\n");
}

#[test]
fn long_session_in_small_arena() {
  let commands = "ab".repeat(50) + &"ac".repeat(200) + "q";
  let expected = (0..50).map(|i| (2 * i).to_string()).collect::<Vec<_>>().join(",") + ";\n";

  assert_eq!(run(&commands), expected);
}
