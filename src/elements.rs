//! Raw element moves used by the growable containers.
//!
//! Everything here works on slots, not on initialized values: a moved-from
//! slot is logically uninitialized and must not be dropped again.

use std::ptr;

/// Which way a shift walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shift {
  /// Nothing to move.
  None,
  /// Towards lower indices; copies front to back.
  Left,
  /// Towards higher indices; copies back to front.
  Right,
}

impl Shift {
  pub(crate) fn between(
    src: usize,
    dst: usize,
    count: usize,
  ) -> Self {
    if count == 0 || src == dst {
      Shift::None
    } else if dst < src {
      Shift::Left
    } else {
      Shift::Right
    }
  }
}

/// Moves `count` slots from `base + src` to `base + dst`. The ranges may
/// overlap.
///
/// # Safety
///
/// Both ranges must lie inside one allocation of at least
/// `max(src, dst) + count` slots.
pub(crate) unsafe fn shift<T>(
  base: *mut T,
  src: usize,
  dst: usize,
  count: usize,
) -> Shift {
  let direction = Shift::between(src, dst, count);
  if direction != Shift::None {
    // `ptr::copy` has memmove semantics, so the direction is only reported.
    unsafe { ptr::copy(base.add(src), base.add(dst), count) };
  }
  direction
}

/// Moves `count` slots between two distinct allocations.
///
/// # Safety
///
/// `src` must hold `count` initialized values; `dst` must have room for them
/// and not overlap `src`.
pub(crate) unsafe fn relocate<T>(
  src: *const T,
  dst: *mut T,
  count: usize,
) {
  if count > 0 {
    unsafe { ptr::copy_nonoverlapping(src, dst, count) };
  }
}

/// Drops `count` values starting at `base + start`.
///
/// # Safety
///
/// The range must hold initialized values that are not used afterwards.
pub(crate) unsafe fn drop_range<T>(
  base: *mut T,
  start: usize,
  count: usize,
) {
  if count > 0 {
    unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), count)) };
  }
}
