use std::{ptr, slice};

use crate::{
  align::{self, MIN_ALIGN},
  align_down, align_up,
  block::{BlockHeader, HEADER_SIZE},
  error::{Error, Result},
  sys,
};

/// Resolves a user pointer to its live header, or null when the pointer is
/// not one of ours (null, misaligned, unmapped or carrying a bad signature).
fn header_of(user: *mut u8) -> *mut BlockHeader {
  if user.is_null() || !align::is_aligned(user as usize, MIN_ALIGN) {
    return ptr::null_mut();
  }
  let Some(header_start) = (user as usize).checked_sub(HEADER_SIZE) else {
    return ptr::null_mut();
  };
  if !sys::is_mapped(header_start, HEADER_SIZE) {
    return ptr::null_mut();
  }

  let header = BlockHeader::slot(user);
  if unsafe { (*header).is_live() } {
    header
  } else {
    ptr::null_mut()
  }
}

/// Allocates `size` bytes aligned to `align` straight from the page mapper.
///
/// The mapping is over-sized by `align + HEADER_SIZE`, then the head and tail
/// pages outside the aligned range are trimmed:
///
/// ```text
///   initial map  ┌────────┬──────────┬──────────────────────┬──────────┐
///                │  head  │  header  │      user data       │   tail   │
///                └────────┴──────────┴──────────────────────┴──────────┘
///                 unmapped ▲          ▲ aligned to `align`    unmapped
///                          └ keep start rounded down to a page
/// ```
///
/// Returns null if `size` is zero, `align` is not a power of two at least a
/// machine word wide, the size arithmetic overflows, or the mapping fails.
pub fn allocate(
  size: usize,
  align: usize,
) -> *mut u8 {
  if size == 0 || !align::is_valid_alignment(align) {
    return ptr::null_mut();
  }

  let page = sys::page_size();
  let Some(map_len) = size
    .checked_add(align)
    .and_then(|n| n.checked_add(HEADER_SIZE))
    .and_then(|n| align::checked_align_up(n, page))
  else {
    return ptr::null_mut();
  };

  let base = match sys::map(map_len) {
    Ok(base) => base,
    Err(err) => {
      log::warn!("failed to map {map_len} bytes for a {size} byte block: {err}");
      return ptr::null_mut();
    }
  };

  let map_start = base as usize;
  let map_end = map_start + map_len;
  let user = align_up!(map_start + HEADER_SIZE, align);
  let keep_start = align_down!(user - HEADER_SIZE, page);
  let keep_end = align_up!(user + size, page);

  unsafe {
    if keep_start > map_start {
      if let Err(err) = sys::unmap(base, keep_start - map_start) {
        log::warn!("failed to trim head of {base:?}: {err}");
      }
    }
    if keep_end < map_end {
      if let Err(err) = sys::unmap(keep_end as *mut u8, map_end - keep_end) {
        log::warn!("failed to trim tail of {base:?}: {err}");
      }
    }

    let user = user as *mut u8;
    BlockHeader::write(
      user,
      BlockHeader::new(keep_start as *mut u8, size, keep_end - keep_start),
    );
    log::trace!("allocated {size} bytes aligned to {align} at {user:?}");
    user
  }
}

/// Releases a block produced by [`allocate`] or [`reallocate`].
///
/// Pointers this allocator did not produce are ignored.
///
/// # Safety
///
/// If `user` is one of ours, nothing may use it (or copies of it) afterwards.
pub unsafe fn free(user: *mut u8) {
  let header = header_of(user);
  if header.is_null() {
    return;
  }

  unsafe {
    (*header).poison();
    let (base, map_len) = ((*header).base, (*header).map_len);
    if let Err(err) = sys::unmap(base, map_len) {
      log::warn!("failed to unmap block {user:?} ({map_len} bytes): {err}");
    }
  }
  log::trace!("freed {user:?}");
}

/// Resizes a block, keeping its alignment.
///
/// * null `user` behaves like [`allocate`];
/// * `new_size == 0` frees the block and returns null;
/// * when the new size still fits the current mapping only the recorded size
///   changes;
/// * otherwise the mapping is resized or moved with `mremap`, and as a last
///   resort a new block is allocated, `min(old, new)` bytes copied and the
///   old block freed.
///
/// Returns null (leaving the old block untouched) on failure or for a
/// foreign pointer.
///
/// # Safety
///
/// `user` must be null or a pointer that is safe to pass to [`free`]. When
/// the result differs from `user`, the old pointer is dangling.
pub unsafe fn reallocate(
  user: *mut u8,
  new_size: usize,
  align: usize,
) -> *mut u8 {
  if user.is_null() {
    return allocate(new_size, align);
  }
  if new_size == 0 {
    unsafe { free(user) };
    return ptr::null_mut();
  }
  if !align::is_valid_alignment(align) {
    return ptr::null_mut();
  }

  let header = header_of(user);
  if header.is_null() {
    return ptr::null_mut();
  }

  let user_addr = user as usize;
  let (base, old_size, old_len, map_end) =
    unsafe { ((*header).base, (*header).size, (*header).map_len, (*header).map_end()) };

  if let Some(need_end) = user_addr.checked_add(new_size) {
    if need_end <= map_end {
      unsafe { (*header).size = new_size };
      log::trace!("resized {user:?} in place: {old_size} -> {new_size} bytes");
      return user;
    }
  }

  let page = sys::page_size();
  // A moved mapping only keeps its page alignment.
  if align <= page {
    let delta = user_addr - base as usize;
    let new_len = user_addr
      .checked_add(new_size)
      .and_then(|end| align::checked_align_up(end, page))
      .map(|end| end - base as usize);

    if let Some(new_len) = new_len {
      match unsafe { sys::remap(base, old_len, new_len) } {
        Ok(new_base) => {
          let new_user = new_base.wrapping_add(delta);
          unsafe { BlockHeader::write(new_user, BlockHeader::new(new_base, new_size, new_len)) };
          log::trace!("remapped {user:?} -> {new_user:?}: {old_size} -> {new_size} bytes");
          return new_user;
        }
        Err(err) => log::trace!("mremap unavailable for {user:?}: {err}"),
      }
    }
  }

  let moved = allocate(new_size, align);
  if moved.is_null() {
    return ptr::null_mut();
  }
  unsafe {
    ptr::copy_nonoverlapping(user, moved, old_size.min(new_size));
    free(user);
  }
  log::trace!("moved {user:?} -> {moved:?}: {old_size} -> {new_size} bytes");
  moved
}

/// Logical size recorded for `user`, or 0 when the pointer is not ours.
pub fn size(user: *mut u8) -> usize {
  let header = header_of(user);
  if header.is_null() {
    0
  } else {
    unsafe { (*header).size }
  }
}

/// Number of bytes actually mapped for `user` (whole pages), or 0.
pub fn mapped_len(user: *mut u8) -> usize {
  let header = header_of(user);
  if header.is_null() {
    0
  } else {
    unsafe { (*header).map_len }
  }
}

/// Owning handle over one aligned block; frees it on drop.
pub struct AlignedBlock {
  ptr: *mut u8,
  len: usize,
  align: usize,
}

impl AlignedBlock {
  pub fn allocate(
    len: usize,
    align: usize,
  ) -> Result<Self> {
    if len == 0 {
      return Err(Error::ZeroSize);
    }
    if !align::is_valid_alignment(align) {
      return Err(Error::InvalidAlignment {
        align,
        min: MIN_ALIGN,
      });
    }

    let ptr = allocate(len, align);
    if ptr.is_null() {
      return Err(Error::AllocationFailed { bytes: len, align });
    }
    Ok(Self { ptr, len, align })
  }

  /// Grows or shrinks the block; the contents up to `min(old, new)` survive.
  pub fn resize(
    &mut self,
    len: usize,
  ) -> Result<()> {
    if len == 0 {
      return Err(Error::ZeroSize);
    }
    let ptr = unsafe { reallocate(self.ptr, len, self.align) };
    if ptr.is_null() {
      return Err(Error::AllocationFailed {
        bytes: len,
        align: self.align,
      });
    }
    self.ptr = ptr;
    self.len = len;
    Ok(())
  }

  pub fn as_ptr(&self) -> *mut u8 {
    self.ptr
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn alignment(&self) -> usize {
    self.align
  }

  pub fn mapped_len(&self) -> usize {
    mapped_len(self.ptr)
  }

  pub fn as_slice(&self) -> &[u8] {
    unsafe { slice::from_raw_parts(self.ptr, self.len) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [u8] {
    unsafe { slice::from_raw_parts_mut(self.ptr, self.len) }
  }
}

impl Drop for AlignedBlock {
  fn drop(&mut self) {
    unsafe { free(self.ptr) };
  }
}

impl std::fmt::Debug for AlignedBlock {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("AlignedBlock")
      .field("ptr", &self.ptr)
      .field("len", &self.len)
      .field("align", &self.align)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_allocate_aligned_and_sized() {
    let p = allocate(100, 64);
    assert!(!p.is_null());
    assert_eq!(p as usize % 64, 0);
    assert_eq!(size(p), 100);

    unsafe { free(p) };
    assert_eq!(size(p), 0);
  }

  #[test]
  fn test_allocate_large_alignment() {
    let page = sys::page_size();
    for align in [page, page * 4, 1 << 20] {
      let p = allocate(3, align);
      assert!(!p.is_null());
      assert_eq!(p as usize % align, 0);
      assert_eq!(size(p), 3);
      // Head and tail were trimmed: at most the header page plus the data page.
      assert!(mapped_len(p) <= 2 * page);
      unsafe { free(p) };
    }
  }

  #[test]
  fn test_mapping_covers_whole_pages() {
    let page = sys::page_size();
    let p = allocate(page * 3 + 17, MIN_ALIGN);
    assert!(!p.is_null());
    assert_eq!(mapped_len(p) % page, 0);
    assert!(mapped_len(p) >= page * 3 + 17 + HEADER_SIZE);

    unsafe {
      ptr::write_bytes(p, 0xAB, page * 3 + 17);
      assert_eq!(*p.add(page * 3 + 16), 0xAB);
      free(p);
    }
  }

  #[test]
  fn test_allocate_rejects_bad_arguments() {
    assert!(allocate(0, 64).is_null());
    assert!(allocate(16, 0).is_null());
    assert!(allocate(16, 3).is_null());
    assert!(allocate(16, MIN_ALIGN / 2).is_null());
    assert!(allocate(usize::MAX - 8, 64).is_null());
  }

  #[test]
  fn test_foreign_pointers_are_ignored() {
    let mut storage = vec![0usize; 64];
    let foreign = unsafe { (storage.as_mut_ptr() as *mut u8).add(HEADER_SIZE * 2) };

    assert_eq!(size(foreign), 0);
    assert_eq!(size(ptr::null_mut()), 0);
    assert_eq!(mapped_len(foreign), 0);
    unsafe {
      free(foreign);
      free(ptr::null_mut());
      assert!(reallocate(foreign, 32, 64).is_null());
    }
    assert!(storage.iter().all(|&word| word == 0));
  }

  #[test]
  fn test_reallocate_fast_path_keeps_pointer() {
    let p = allocate(10, 16);
    let mapped = mapped_len(p);
    unsafe {
      ptr::copy_nonoverlapping(b"0123456789".as_ptr(), p, 10);

      let q = reallocate(p, 40, 16);
      assert_eq!(p, q);
      assert_eq!(size(q), 40);
      assert_eq!(mapped_len(q), mapped);

      let r = reallocate(q, 4, 16);
      assert_eq!(r, q);
      assert_eq!(size(r), 4);
      assert_eq!(slice::from_raw_parts(r, 4), b"0123");

      free(r);
    }
  }

  #[test]
  fn test_reallocate_grow_preserves_contents() {
    let page = sys::page_size();
    let p = allocate(256, 32);
    unsafe {
      for i in 0..256 {
        *p.add(i) = i as u8;
      }

      let q = reallocate(p, page * 16, 32);
      assert!(!q.is_null());
      assert_eq!(q as usize % 32, 0);
      assert_eq!(size(q), page * 16);
      for i in 0..256 {
        assert_eq!(*q.add(i), i as u8);
      }
      *q.add(page * 16 - 1) = 9;

      free(q);
    }
  }

  #[test]
  fn test_reallocate_over_page_alignment_moves_aligned() {
    let align = sys::page_size() * 4;
    let p = allocate(8, align);
    unsafe {
      p.write(5);
      let q = reallocate(p, align * 3, align);
      assert!(!q.is_null());
      assert_eq!(q as usize % align, 0);
      assert_eq!(q.read(), 5);
      assert_eq!(size(q), align * 3);
      free(q);
    }
  }

  #[test]
  fn test_reallocate_null_and_zero() {
    unsafe {
      let p = reallocate(ptr::null_mut(), 24, 256);
      assert!(!p.is_null());
      assert_eq!(size(p), 24);

      assert!(reallocate(p, 0, 256).is_null());
      assert_eq!(size(p), 0);
    }
  }

  #[test]
  fn test_aligned_block_lifecycle() {
    let mut block = AlignedBlock::allocate(48, 128).expect("allocate");
    assert_eq!(block.as_ptr() as usize % 128, 0);
    assert_eq!(block.len(), 48);
    assert!(!block.is_empty());
    block.as_mut_slice().fill(7);

    block.resize(sys::page_size() * 2).expect("resize");
    assert_eq!(block.as_ptr() as usize % 128, 0);
    assert!(block.as_slice()[..48].iter().all(|&b| b == 7));
    assert!(block.mapped_len() >= sys::page_size() * 2);
  }

  #[test]
  fn test_aligned_block_errors() {
    assert_eq!(AlignedBlock::allocate(0, 128).unwrap_err(), Error::ZeroSize);
    assert_eq!(
      AlignedBlock::allocate(8, 12).unwrap_err(),
      Error::InvalidAlignment {
        align: 12,
        min: MIN_ALIGN
      }
    );

    let mut block = AlignedBlock::allocate(8, 8).expect("allocate");
    assert_eq!(block.resize(0), Err(Error::ZeroSize));
    assert_eq!(block.len(), 8);
  }
}
