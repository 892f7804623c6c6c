use std::{mem, ptr};

/// Signature stored in every live header ("RMEM").
pub const BLOCK_MAGIC: u32 = 0x524D_454D;

/// Metadata placed immediately before the user pointer, inside the same mapping.
#[repr(C)]
pub struct BlockHeader {
  /// Mapping base address (after the head trim).
  pub base: *mut u8,
  /// Logical size requested by the user.
  pub size: usize,
  /// Full mapped length, what `munmap`/`mremap` get.
  pub map_len: usize,
  pub magic: u32,
}

pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

impl BlockHeader {
  pub fn new(
    base: *mut u8,
    size: usize,
    map_len: usize,
  ) -> Self {
    Self {
      base,
      size,
      map_len,
      magic: BLOCK_MAGIC,
    }
  }

  /// Header slot for a user pointer. The slot is not validated.
  #[inline]
  pub fn slot(user: *mut u8) -> *mut BlockHeader {
    user.wrapping_sub(HEADER_SIZE) as *mut BlockHeader
  }

  /// Writes a fresh header right before `user`.
  ///
  /// # Safety
  ///
  /// `[user - HEADER_SIZE, user)` must be mapped and writable.
  pub unsafe fn write(
    user: *mut u8,
    header: BlockHeader,
  ) {
    unsafe { ptr::write(Self::slot(user), header) }
  }

  /// End address of the mapping this header describes.
  #[inline]
  pub fn map_end(&self) -> usize {
    self.base as usize + self.map_len
  }

  #[inline]
  pub fn is_live(&self) -> bool {
    self.magic == BLOCK_MAGIC
  }

  #[inline]
  pub fn poison(&mut self) {
    self.magic = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_keeps_word_alignment() {
    assert_eq!(HEADER_SIZE % mem::align_of::<usize>(), 0);
    assert!(mem::align_of::<BlockHeader>() <= crate::align::MIN_ALIGN);
  }

  #[test]
  fn test_header_roundtrip_in_buffer() {
    let mut storage = [0usize; 16];
    let user = unsafe { (storage.as_mut_ptr() as *mut u8).add(HEADER_SIZE) };

    unsafe {
      BlockHeader::write(user, BlockHeader::new(storage.as_mut_ptr() as *mut u8, 10, 128));

      let header = &mut *BlockHeader::slot(user);
      assert!(header.is_live());
      assert_eq!(header.size, 10);
      assert_eq!(header.map_end(), storage.as_ptr() as usize + 128);

      header.poison();
      assert!(!header.is_live());
    }
  }
}
