//! Thin wrappers over the virtual-memory system calls the allocator uses.

use std::{io, ptr, sync::OnceLock};

use libc::c_void;

/// System page size, cached after the first query. Falls back to 4 KiB.
pub fn page_size() -> usize {
  static SIZE: OnceLock<usize> = OnceLock::new();
  *SIZE.get_or_init(|| match read_page_size() {
    Ok(size) if size.is_power_of_two() => size,
    _ => 4 * 1024,
  })
}

fn read_page_size() -> io::Result<usize> {
  let res = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
  if res <= 0 {
    return Err(io::Error::last_os_error());
  }
  Ok(res as usize)
}

/// Maps `len` bytes of private, anonymous, read/write memory.
pub fn map(len: usize) -> io::Result<*mut u8> {
  let addr = unsafe {
    libc::mmap(
      ptr::null_mut(),
      len,
      libc::PROT_READ | libc::PROT_WRITE,
      libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
      -1,
      0,
    )
  };
  if addr.is_null() || addr == libc::MAP_FAILED {
    return Err(io::Error::last_os_error());
  }
  log::trace!("mmap {len} bytes at {addr:?}");
  Ok(addr as *mut u8)
}

/// Unmaps `[addr, addr + len)`.
///
/// # Safety
///
/// The range must have been produced by [`map`] or [`remap`] and nothing may
/// reference it afterwards.
pub unsafe fn unmap(
  addr: *mut u8,
  len: usize,
) -> io::Result<()> {
  let res = unsafe { libc::munmap(addr as *mut c_void, len) };
  if res < 0 {
    return Err(io::Error::last_os_error());
  }
  log::trace!("munmap {len} bytes at {addr:?}");
  Ok(())
}

/// Resizes a mapping, moving it when it cannot grow in place.
///
/// # Safety
///
/// `[addr, addr + old_len)` must be a live mapping. On success the old range
/// must no longer be used.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub unsafe fn remap(
  addr: *mut u8,
  old_len: usize,
  new_len: usize,
) -> io::Result<*mut u8> {
  let moved = unsafe { libc::mremap(addr as *mut c_void, old_len, new_len, libc::MREMAP_MAYMOVE) };
  if moved == libc::MAP_FAILED {
    return Err(io::Error::last_os_error());
  }
  log::trace!("mremap {addr:?} ({old_len} bytes) -> {moved:?} ({new_len} bytes)");
  Ok(moved as *mut u8)
}

/// `mremap` is Linux-only; other targets take the allocate-copy-free path.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub unsafe fn remap(
  _addr: *mut u8,
  _old_len: usize,
  _new_len: usize,
) -> io::Result<*mut u8> {
  Err(io::Error::from(io::ErrorKind::Unsupported))
}

/// Whether every page overlapping `[addr, addr + len)` is currently mapped.
///
/// Used to probe a header slot before reading it, so that stale or foreign
/// pointers are rejected instead of faulting.
pub fn is_mapped(
  addr: usize,
  len: usize,
) -> bool {
  let page = page_size();
  let start = crate::align_down!(addr, page);
  let Some(end) = addr.checked_add(len).and_then(|end| crate::align::checked_align_up(end, page)) else {
    return false;
  };
  if start == 0 || end <= start {
    return false;
  }
  // msync reports ENOMEM for ranges that are not fully mapped.
  let res = unsafe { libc::msync(start as *mut c_void, end - start, libc::MS_ASYNC) };
  res == 0
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_size_is_power_of_two() {
    let page = page_size();
    assert!(page.is_power_of_two());
    assert!(page >= 4096);
  }

  #[test]
  fn test_map_unmap() {
    let page = page_size();
    let addr = map(page * 2).expect("map");
    assert!(crate::align::is_aligned(addr as usize, page));
    assert!(is_mapped(addr as usize, page * 2));

    unsafe {
      addr.write(7);
      assert_eq!(addr.read(), 7);
      unmap(addr, page * 2).expect("unmap");
    }
  }

  #[test]
  fn test_is_mapped_rejects_null_page() {
    assert!(!is_mapped(0, 8));
    assert!(!is_mapped(16, 8));
    assert!(!is_mapped(usize::MAX - 4, 8));
  }

  #[cfg(any(target_os = "linux", target_os = "android"))]
  #[test]
  fn test_remap_preserves_contents() {
    let page = page_size();
    let addr = map(page).expect("map");
    unsafe {
      addr.write(42);
      let moved = remap(addr, page, page * 8).expect("remap");
      assert_eq!(moved.read(), 42);
      moved.add(page * 8 - 1).write(1);
      unmap(moved, page * 8).expect("unmap");
    }
  }
}
