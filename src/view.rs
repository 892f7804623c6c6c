//! Non-owning windows over one contiguous array.
//!
//! A [`View`] is a borrowed `{count, base}` pair. Slicing never faults: out of
//! range positions clamp to the end and yield an empty view. Element access
//! through [`View::at`] is checked and fatal; [`View::get`] is the quiet
//! variant.
//!
//! ```text
//!   base                                      base + count
//!    │                                              │
//!    ▼                                              ▼
//!    ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//!    │  0  │  1  │  2  │  3  │  4  │  5  │  6  │  7  │
//!    └─────┴─────┴─────┴─────┴─────┴─────┴─────┴─────┘
//!    └── first(3) ──┘                 └─ last(2) ─┘
//!                └──── subview(2, 4) ────┘
//! ```
//!
//! Searches return [`INVALID_INDEX`] when nothing matches.

use std::{cmp::Ordering, fmt, mem, ops::Index, slice};

use crate::diag;

/// "Not found" sentinel returned by every search in the crate.
pub const INVALID_INDEX: usize = usize::MAX;

/// First `i >= from` with `items[i] == *value`.
pub(crate) fn find_value<T: PartialEq>(
  items: &[T],
  value: &T,
  from: usize,
) -> usize {
  if from >= items.len() {
    return INVALID_INDEX;
  }
  items[from..]
    .iter()
    .position(|item| item == value)
    .map_or(INVALID_INDEX, |i| from + i)
}

/// Last `i <= from` with `items[i] == *value`. `from` past the end scans the
/// whole array.
pub(crate) fn rfind_value<T: PartialEq>(
  items: &[T],
  value: &T,
  from: usize,
) -> usize {
  if items.is_empty() {
    return INVALID_INDEX;
  }
  let start = from.min(items.len() - 1);
  items[..=start]
    .iter()
    .rposition(|item| item == value)
    .unwrap_or(INVALID_INDEX)
}

#[inline]
fn matches_at<T: PartialEq>(
  items: &[T],
  needle: &[T],
  at: usize,
) -> bool {
  // First element is checked on its own before walking the rest.
  items[at] == needle[0] && items[at + 1..at + needle.len()] == needle[1..]
}

/// First start `i >= from` where `needle` occurs.
///
/// An empty needle matches at `min(from, len)`.
pub(crate) fn find_run<T: PartialEq>(
  items: &[T],
  needle: &[T],
  from: usize,
) -> usize {
  let count = items.len();
  if needle.is_empty() {
    return from.min(count);
  }
  if from > count || needle.len() > count - from {
    return INVALID_INDEX;
  }

  let last = count - needle.len();
  (from..=last)
    .find(|&at| matches_at(items, needle, at))
    .unwrap_or(INVALID_INDEX)
}

/// Last start `i <= from` where `needle` occurs, scanning backwards.
///
/// [`INVALID_INDEX`] as `from` searches the whole array. Any other `from`
/// past the last position where the needle fits finds nothing. An empty
/// needle matches at `from`, or at `len` for [`INVALID_INDEX`].
pub(crate) fn rfind_run<T: PartialEq>(
  items: &[T],
  needle: &[T],
  from: usize,
) -> usize {
  let count = items.len();
  if needle.is_empty() {
    return match from {
      INVALID_INDEX => count,
      from if from <= count => from,
      _ => INVALID_INDEX,
    };
  }
  if needle.len() > count {
    return INVALID_INDEX;
  }

  let last = count - needle.len();
  let start = match from {
    INVALID_INDEX => last,
    from if from <= last => from,
    _ => return INVALID_INDEX,
  };
  (0..=start)
    .rev()
    .find(|&at| matches_at(items, needle, at))
    .unwrap_or(INVALID_INDEX)
}

/// `(start, len)` of `subview(start, count)` over `total` elements.
#[inline]
pub(crate) fn clamp_range(
  total: usize,
  start: usize,
  count: usize,
) -> (usize, usize) {
  if start >= total {
    (total, 0)
  } else {
    (start, count.min(total - start))
  }
}

/// Read-only window over `count` elements.
pub struct View<'a, T> {
  items: &'a [T],
}

impl<'a, T> View<'a, T> {
  pub const fn new(items: &'a [T]) -> Self {
    Self { items }
  }

  pub const fn empty() -> Self {
    Self { items: &[] }
  }

  /// Number of elements.
  #[inline]
  pub const fn len(&self) -> usize {
    self.items.len()
  }

  #[inline]
  pub const fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  #[inline]
  pub const fn is_valid_index(
    &self,
    index: usize,
  ) -> bool {
    index < self.items.len()
  }

  /// Size of one element in bytes.
  #[inline]
  pub const fn stride(&self) -> usize {
    mem::size_of::<T>()
  }

  /// Size of the whole window in bytes.
  #[inline]
  pub const fn size_in_bytes(&self) -> usize {
    self.len() * self.stride()
  }

  #[inline]
  pub const fn as_ptr(&self) -> *const T {
    self.items.as_ptr()
  }

  #[inline]
  pub const fn as_slice(&self) -> &'a [T] {
    self.items
  }

  /// Element at `index`.
  ///
  /// An out of range index is reported as a fatal fault.
  #[track_caller]
  pub fn at(
    &self,
    index: usize,
  ) -> &'a T {
    match self.items.get(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "view index out of bounds"),
    }
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<&'a T> {
    self.items.get(index)
  }

  #[track_caller]
  pub fn front(&self) -> &'a T {
    match self.items.first() {
      Some(item) => item,
      None => diag::fatal("count > 0", "front of an empty view"),
    }
  }

  #[track_caller]
  pub fn back(&self) -> &'a T {
    match self.items.last() {
      Some(item) => item,
      None => diag::fatal("count > 0", "back of an empty view"),
    }
  }

  /// Up to `count` elements starting at `start`.
  pub fn subview(
    &self,
    start: usize,
    count: usize,
  ) -> Self {
    let (start, len) = clamp_range(self.len(), start, count);
    Self::new(&self.items[start..start + len])
  }

  pub fn first(
    &self,
    count: usize,
  ) -> Self {
    self.subview(0, count)
  }

  pub fn last(
    &self,
    count: usize,
  ) -> Self {
    let count = count.min(self.len());
    self.subview(self.len() - count, count)
  }

  pub fn drop_front(
    &self,
    count: usize,
  ) -> Self {
    self.subview(count, self.len())
  }

  pub fn drop_back(
    &self,
    count: usize,
  ) -> Self {
    self.first(self.len().saturating_sub(count))
  }

  pub fn iter(&self) -> slice::Iter<'a, T> {
    self.items.iter()
  }
}

impl<'a, T: PartialEq> View<'a, T> {
  pub fn find(
    &self,
    value: &T,
    from: usize,
  ) -> usize {
    find_value(self.items, value, from)
  }

  /// Last match at or before `from`; pass [`INVALID_INDEX`] to search all.
  pub fn rfind(
    &self,
    value: &T,
    from: usize,
  ) -> usize {
    rfind_value(self.items, value, from)
  }

  pub fn find_view(
    &self,
    needle: View<'_, T>,
    from: usize,
  ) -> usize {
    find_run(self.items, needle.items, from)
  }

  pub fn rfind_view(
    &self,
    needle: View<'_, T>,
    from: usize,
  ) -> usize {
    rfind_run(self.items, needle.items, from)
  }

  pub fn contains(
    &self,
    value: &T,
  ) -> bool {
    self.find(value, 0) != INVALID_INDEX
  }

  pub fn starts_with(
    &self,
    prefix: View<'_, T>,
  ) -> bool {
    self.items.starts_with(prefix.items)
  }

  pub fn ends_with(
    &self,
    suffix: View<'_, T>,
  ) -> bool {
    self.items.ends_with(suffix.items)
  }
}

impl<T: Ord> View<'_, T> {
  /// Three-way lexicographic comparison; a strict prefix orders first.
  pub fn compare(
    &self,
    other: View<'_, T>,
  ) -> Ordering {
    self.items.cmp(other.items)
  }
}

impl<T> Clone for View<'_, T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for View<'_, T> {}

impl<T> Default for View<'_, T> {
  fn default() -> Self {
    Self::empty()
  }
}

impl<'a, T> From<&'a [T]> for View<'a, T> {
  fn from(items: &'a [T]) -> Self {
    Self::new(items)
  }
}

impl<'a, T, const N: usize> From<&'a [T; N]> for View<'a, T> {
  fn from(items: &'a [T; N]) -> Self {
    Self::new(items)
  }
}

impl<T> Index<usize> for View<'_, T> {
  type Output = T;

  #[track_caller]
  fn index(
    &self,
    index: usize,
  ) -> &T {
    self.at(index)
  }
}

impl<'a, T> IntoIterator for View<'a, T> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}

impl<T: PartialEq> PartialEq<View<'_, T>> for View<'_, T> {
  fn eq(
    &self,
    other: &View<'_, T>,
  ) -> bool {
    self.items == other.items
  }
}

impl<T: Eq> Eq for View<'_, T> {}

impl<T: PartialOrd> PartialOrd<View<'_, T>> for View<'_, T> {
  fn partial_cmp(
    &self,
    other: &View<'_, T>,
  ) -> Option<Ordering> {
    self.items.partial_cmp(other.items)
  }
}

impl<T: Ord> Ord for View<'_, T> {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    self.compare(*other)
  }
}

impl<T: fmt::Debug> fmt::Debug for View<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.items).finish()
  }
}

/// Read/write window over `count` elements.
pub struct ViewMut<'a, T> {
  items: &'a mut [T],
}

impl<'a, T> ViewMut<'a, T> {
  pub fn new(items: &'a mut [T]) -> Self {
    Self { items }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.items.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Reborrows as a read-only view.
  pub fn as_view(&self) -> View<'_, T> {
    View::new(self.items)
  }

  pub fn into_view(self) -> View<'a, T> {
    View::new(self.items)
  }

  pub fn as_slice(&self) -> &[T] {
    self.items
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    self.items
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    self.items.as_mut_ptr()
  }

  #[track_caller]
  pub fn at(
    &self,
    index: usize,
  ) -> &T {
    self.as_view().at(index)
  }

  #[track_caller]
  pub fn at_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    match self.items.get_mut(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "view index out of bounds"),
    }
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<&T> {
    self.items.get(index)
  }

  pub fn get_mut(
    &mut self,
    index: usize,
  ) -> Option<&mut T> {
    self.items.get_mut(index)
  }

  #[track_caller]
  pub fn front_mut(&mut self) -> &mut T {
    match self.items.first_mut() {
      Some(item) => item,
      None => diag::fatal("count > 0", "front of an empty view"),
    }
  }

  #[track_caller]
  pub fn back_mut(&mut self) -> &mut T {
    match self.items.last_mut() {
      Some(item) => item,
      None => diag::fatal("count > 0", "back of an empty view"),
    }
  }

  /// Clamped like [`View::subview`].
  pub fn subview_mut(
    &mut self,
    start: usize,
    count: usize,
  ) -> ViewMut<'_, T> {
    let (start, len) = clamp_range(self.len(), start, count);
    ViewMut::new(&mut self.items[start..start + len])
  }

  pub fn iter(&self) -> slice::Iter<'_, T> {
    self.items.iter()
  }

  pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
    self.items.iter_mut()
  }

  pub fn fill(
    &mut self,
    value: T,
  ) where
    T: Clone,
  {
    self.items.fill(value);
  }
}

impl<'a, T> From<&'a mut [T]> for ViewMut<'a, T> {
  fn from(items: &'a mut [T]) -> Self {
    Self::new(items)
  }
}

impl<T> Index<usize> for ViewMut<'_, T> {
  type Output = T;

  #[track_caller]
  fn index(
    &self,
    index: usize,
  ) -> &T {
    self.at(index)
  }
}

impl<T> std::ops::IndexMut<usize> for ViewMut<'_, T> {
  #[track_caller]
  fn index_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    self.at_mut(index)
  }
}

impl<T: fmt::Debug> fmt::Debug for ViewMut<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.items.iter()).finish()
  }
}
