/// Rounds `$value` up to the next multiple of `$alignment`.
///
/// `$alignment` must be a non-zero power of two. The addition is not checked;
/// use [`checked_align_up`](crate::align::checked_align_up) when `$value` can
/// come close to `usize::MAX`.
///
/// # Examples
///
/// ```rust
/// use rmemkit::align_up;
///
/// assert_eq!(align_up!(13usize, 8), 16);
/// assert_eq!(align_up!(4096usize, 4096), 4096);
/// assert_eq!(align_up!(4097usize, 4096), 8192);
/// ```
#[macro_export]
macro_rules! align_up {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}

/// Rounds `$value` down to the previous multiple of `$alignment`.
///
/// # Examples
///
/// ```rust
/// use rmemkit::align_down;
///
/// assert_eq!(align_down!(13usize, 8), 8);
/// assert_eq!(align_down!(8191usize, 4096), 4096);
/// ```
#[macro_export]
macro_rules! align_down {
  ($value:expr, $alignment:expr) => {
    $value & !($alignment - 1)
  };
}

/// Like [`align_up!`] but returns `None` instead of wrapping around.
#[inline]
pub fn checked_align_up(
  value: usize,
  alignment: usize,
) -> Option<usize> {
  debug_assert!(alignment.is_power_of_two());
  value
    .checked_add(alignment - 1)
    .map(|v| v & !(alignment - 1))
}

/// Whether `value` lies on an `alignment` boundary.
#[inline]
pub fn is_aligned(
  value: usize,
  alignment: usize,
) -> bool {
  debug_assert!(alignment.is_power_of_two());
  value & (alignment - 1) == 0
}

/// Smallest alignment the aligned allocator accepts: the machine word.
pub const MIN_ALIGN: usize = std::mem::size_of::<usize>();

/// Checks the allocator's alignment contract: a power of two, at least a word.
#[inline]
pub fn is_valid_alignment(alignment: usize) -> bool {
  alignment.is_power_of_two() && alignment >= MIN_ALIGN
}
