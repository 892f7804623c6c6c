use std::io::{IsTerminal, Read};

use rmemkit::{InlineText, InlineVec, Text, WideText, append_all, page_size};

/// Waits until the user presses ENTER, when there is a terminal to press it on.
/// Useful when you want to inspect the mappings with `pmap` or
/// `/proc/<pid>/maps` between steps.
fn block_until_enter_pressed() {
  if !std::io::stdin().is_terminal() {
    return;
  }
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_block(
  label: &str,
  ptr: *mut u8,
) {
  println!(
    "[{}] ptr = {:?}, size = {}, mapped = {}, ptr % 4096 = {}",
    label,
    ptr,
    rmemkit::size(ptr),
    rmemkit::mapped_len(ptr),
    ptr as usize % 4096,
  );
}

fn main() {
  println!("PID = {}, page size = {}", unsafe { libc::getpid() }, page_size());
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) A 4 KiB-aligned block of 100 bytes.
  //    The mapping is trimmed down to whole pages around the header.
  // --------------------------------------------------------------------
  let first = rmemkit::allocate(100, 4096);
  if first.is_null() {
    eprintln!("allocation failed");
    return;
  }
  println!("\n[1] allocate(100, 4096)");
  print_block("1", first);

  unsafe {
    first.write_bytes(0xAB, 100);
  }
  println!("[1] Filled with 0xAB");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Grow it well past the mapping. Alignment survives the move.
  // --------------------------------------------------------------------
  let grown = unsafe { rmemkit::reallocate(first, 64 * 1024, 4096) };
  if grown.is_null() {
    eprintln!("reallocation failed");
    unsafe { rmemkit::free(first) };
    return;
  }
  println!("\n[2] reallocate(.., 64 KiB)");
  print_block("2", grown);
  println!("[2] First byte still 0x{:X}, moved = {}", unsafe { grown.read() }, grown != first);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) Free it. A freed pointer is no longer recognised.
  // --------------------------------------------------------------------
  unsafe { rmemkit::free(grown) };
  println!("\n[3] Freed {:?}", grown);
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Inline storage spilling to the heap and coming back.
  // --------------------------------------------------------------------
  let mut values: InlineVec<u64, 4> = InlineVec::new();
  for i in 0..4 {
    values.push(i * 10);
  }
  println!("\n[4] 4 values, inline = {}, capacity = {}", values.is_inline(), values.capacity());
  values.push(40);
  println!("[4] 5 values, inline = {}, capacity = {}", values.is_inline(), values.capacity());
  values.truncate(2);
  println!("[4] 2 values, inline = {}, capacity = {}", values.is_inline(), values.capacity());
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Text with numbers rendered in place.
  // --------------------------------------------------------------------
  let mut text = Text::new();
  append_all!(text, "pid=", std::process::id(), " ratio=", 2.0f64 / 3.0, " ok=", true);
  text.insert_unsigned::<16>(0, 0xCAFEu32);
  text.insert_str(4, " ");
  println!("\n[5] {}", text);

  let mut label: InlineText<16> = InlineText::new();
  label.append(-12i32);
  label.append(" items");
  println!("[5] {} (inline = {})", label, label.is_inline());

  let wide = WideText::from("utf-16 units");
  println!("[5] {:?} has {} units", wide, wide.len());

  println!("\n[6] End of walkthrough.");
}
