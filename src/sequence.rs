//! Owning growable sequence with small-buffer storage.
//!
//! An [`InlineVec<T, N>`] keeps up to `N` elements inside the value itself
//! and spills to a block from the aligned allocator once a capacity request
//! goes past `N`. The block is handed back (and the elements moved inline
//! again) as soon as a request fits `N`:
//!
//! ```text
//!                 request > N
//!        ┌────────┐ ───────────────► ┌──────────────────────────────┐
//!        │ Inline │                  │ Heap { ptr, capacity = 2^k } │ ◄─┐
//!        │ [T; N] │ ◄─────────────── └──────────────────────────────┘   │
//!        └────────┘   request <= N                 │  request > capacity
//!                                                  └────────────────────┘
//!                                                   capacity * 2^j
//! ```
//!
//! [`Vector<T>`] is the heap-only flavour (`N = 0`).
//!
//! Fallible growth goes through [`InlineVec::try_reserve`]. Every other
//! mutating entry point treats a failed allocation as fatal and reports it
//! through [`crate::diag`].

use std::{
  fmt,
  mem::{self, MaybeUninit},
  ops::{Deref, DerefMut},
  ptr::NonNull,
  slice,
};

use crate::{
  align::MIN_ALIGN,
  aligned, capacity, diag, elements,
  error::{Error, Result},
  view::{self, View, ViewMut},
};

enum Storage<T, const N: usize> {
  Inline([MaybeUninit<T>; N]),
  Heap { ptr: NonNull<T>, capacity: usize },
}

/// Growable sequence holding up to `N` elements without allocating.
pub struct InlineVec<T, const N: usize> {
  count: usize,
  storage: Storage<T, N>,
}

/// Heap-only growable sequence.
pub type Vector<T> = InlineVec<T, 0>;

// The sequence owns its elements like `Vec<T>` does.
unsafe impl<T: Send, const N: usize> Send for InlineVec<T, N> {}
unsafe impl<T: Sync, const N: usize> Sync for InlineVec<T, N> {}

#[inline]
const fn is_zst<T>() -> bool {
  mem::size_of::<T>() == 0
}

#[inline]
fn heap_align<T>() -> usize {
  mem::align_of::<T>().max(MIN_ALIGN)
}

/// Largest element count whose byte size still fits `isize`.
#[inline]
fn max_capacity<T>() -> usize {
  isize::MAX as usize / mem::size_of::<T>().max(1)
}

#[inline]
fn heap_bytes<T>(capacity: usize) -> Option<usize> {
  (capacity <= max_capacity::<T>()).then(|| capacity * mem::size_of::<T>())
}

#[inline]
const fn uninit_inline<T, const N: usize>() -> [MaybeUninit<T>; N] {
  [const { MaybeUninit::uninit() }; N]
}

impl<T, const N: usize> InlineVec<T, N> {
  /// Number of elements stored without a heap block.
  pub const INLINE_CAPACITY: usize = N;

  pub const fn new() -> Self {
    Self {
      count: 0,
      storage: Storage::Inline(uninit_inline()),
    }
  }

  #[track_caller]
  pub fn with_capacity(capacity: usize) -> Self {
    let mut seq = Self::new();
    seq.reserve(capacity);
    seq
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.count
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  /// Slots available before the next growth.
  pub fn capacity(&self) -> usize {
    if is_zst::<T>() {
      return usize::MAX;
    }
    match self.storage {
      Storage::Inline(_) => N,
      Storage::Heap { capacity, .. } => capacity,
    }
  }

  #[inline]
  pub fn is_inline(&self) -> bool {
    matches!(self.storage, Storage::Inline(_))
  }

  #[inline]
  pub fn is_heap(&self) -> bool {
    !self.is_inline()
  }

  pub fn as_ptr(&self) -> *const T {
    match &self.storage {
      Storage::Inline(inline) => inline.as_ptr() as *const T,
      Storage::Heap { ptr, .. } => ptr.as_ptr(),
    }
  }

  pub fn as_mut_ptr(&mut self) -> *mut T {
    match &mut self.storage {
      Storage::Inline(inline) => inline.as_mut_ptr() as *mut T,
      Storage::Heap { ptr, .. } => ptr.as_ptr(),
    }
  }

  pub fn as_slice(&self) -> &[T] {
    unsafe { slice::from_raw_parts(self.as_ptr(), self.count) }
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.count) }
  }

  pub fn view(&self) -> View<'_, T> {
    View::new(self.as_slice())
  }

  pub fn view_mut(&mut self) -> ViewMut<'_, T> {
    ViewMut::new(self.as_mut_slice())
  }

  /// Element at `index`; out of range is fatal.
  #[track_caller]
  pub fn at(
    &self,
    index: usize,
  ) -> &T {
    match self.as_slice().get(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "sequence index out of bounds"),
    }
  }

  #[track_caller]
  pub fn at_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    match self.as_mut_slice().get_mut(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "sequence index out of bounds"),
    }
  }

  /// Makes room for `additional` more elements.
  pub fn try_reserve(
    &mut self,
    additional: usize,
  ) -> Result<()> {
    let requested = self
      .count
      .checked_add(additional)
      .ok_or(Error::CapacityOverflow {
        requested: usize::MAX,
      })?;
    self.try_ensure(requested)
  }

  #[track_caller]
  pub fn reserve(
    &mut self,
    additional: usize,
  ) {
    if let Err(err) = self.try_reserve(additional) {
      diag::fatal("reserve succeeds", &err.to_string());
    }
  }

  /// Adjusts storage for a total of `requested` slots. `requested` is never
  /// below the current count.
  fn try_ensure(
    &mut self,
    requested: usize,
  ) -> Result<()> {
    debug_assert!(requested >= self.count);
    if is_zst::<T>() {
      return Ok(());
    }

    match self.storage {
      Storage::Inline(_) if requested <= N => Ok(()),
      Storage::Inline(_) => self.spill(requested),
      Storage::Heap { ptr, .. } if requested <= N => {
        self.unspill(ptr);
        Ok(())
      }
      Storage::Heap { capacity, .. } if requested <= capacity => Ok(()),
      Storage::Heap { ptr, capacity } => self.regrow(ptr, capacity, requested),
    }
  }

  #[track_caller]
  fn ensure(
    &mut self,
    requested: usize,
  ) {
    if let Err(err) = self.try_ensure(requested) {
      diag::fatal("capacity request satisfied", &err.to_string());
    }
  }

  fn allocate_heap(
    capacity: usize,
    requested: usize,
  ) -> Result<NonNull<T>> {
    let bytes = heap_bytes::<T>(capacity).ok_or(Error::CapacityOverflow { requested })?;
    let align = heap_align::<T>();
    NonNull::new(aligned::allocate(bytes, align) as *mut T).ok_or_else(|| {
      log::warn!("sequence could not allocate {capacity} elements ({bytes} bytes)");
      Error::AllocationFailed { bytes, align }
    })
  }

  /// Inline -> Heap.
  fn spill(
    &mut self,
    requested: usize,
  ) -> Result<()> {
    let capacity = capacity::next_pow2(requested.max(N));
    if capacity < requested {
      return Err(Error::CapacityOverflow { requested });
    }

    let ptr = Self::allocate_heap(capacity, requested)?;
    unsafe { elements::relocate(self.as_ptr(), ptr.as_ptr(), self.count) };
    self.storage = Storage::Heap { ptr, capacity };
    log::debug!("sequence moved to heap: {} elements, capacity {capacity}", self.count);
    Ok(())
  }

  /// Heap -> Inline. The count must already fit `N`.
  fn unspill(
    &mut self,
    ptr: NonNull<T>,
  ) {
    debug_assert!(self.count <= N);
    let mut inline = uninit_inline::<T, N>();
    unsafe {
      elements::relocate(ptr.as_ptr(), inline.as_mut_ptr() as *mut T, self.count);
      aligned::free(ptr.as_ptr() as *mut u8);
    }
    self.storage = Storage::Inline(inline);
    log::debug!("sequence moved inline: {} elements", self.count);
  }

  /// Heap -> Heap.
  fn regrow(
    &mut self,
    ptr: NonNull<T>,
    capacity: usize,
    requested: usize,
  ) -> Result<()> {
    let new_capacity = capacity::grow_target(capacity, requested, N.max(1), max_capacity::<T>());
    if new_capacity < requested {
      return Err(Error::CapacityOverflow { requested });
    }
    let bytes = heap_bytes::<T>(new_capacity).ok_or(Error::CapacityOverflow { requested })?;
    let align = heap_align::<T>();

    let moved = unsafe { aligned::reallocate(ptr.as_ptr() as *mut u8, bytes, align) };
    let Some(moved) = NonNull::new(moved as *mut T) else {
      log::warn!("sequence could not grow from {capacity} to {new_capacity} elements");
      return Err(Error::AllocationFailed { bytes, align });
    };
    self.storage = Storage::Heap {
      ptr: moved,
      capacity: new_capacity,
    };
    Ok(())
  }

  /// Makes `n` uninitialized slots at `index` and returns the old count.
  ///
  /// The count is left at `index` until the caller commits, so a panic while
  /// filling the gap leaks the tail instead of dropping uninitialized slots.
  #[track_caller]
  fn open_gap(
    &mut self,
    index: usize,
    n: usize,
  ) -> usize {
    let old = self.count;
    if index > old {
      diag::fatal("index <= count", "insert position out of bounds");
    }
    let Some(new) = old.checked_add(n) else {
      diag::fatal("count + n <= usize::MAX", "capacity overflow");
    };

    self.ensure(new);
    unsafe { elements::shift(self.as_mut_ptr(), index, index + n, old - index) };
    self.count = index;
    old
  }

  /// Inserts `value` at `index` and returns `index + 1`.
  #[track_caller]
  pub fn insert(
    &mut self,
    index: usize,
    value: T,
  ) -> usize {
    let old = self.open_gap(index, 1);
    unsafe { self.as_mut_ptr().add(index).write(value) };
    self.count = old + 1;
    index + 1
  }

  #[track_caller]
  pub fn push(
    &mut self,
    value: T,
  ) {
    self.insert(self.count, value);
  }

  #[track_caller]
  pub fn push_front(
    &mut self,
    value: T,
  ) {
    self.insert(0, value);
  }

  /// Inserts clones of `values` at `index`; returns the index just past them.
  #[track_caller]
  pub fn insert_slice(
    &mut self,
    index: usize,
    values: &[T],
  ) -> usize
  where
    T: Clone,
  {
    let old = self.open_gap(index, values.len());
    let base = self.as_mut_ptr();
    for (offset, value) in values.iter().enumerate() {
      unsafe { base.add(index + offset).write(value.clone()) };
    }
    self.count = old + values.len();
    index + values.len()
  }

  /// Inserts `n` clones of `value` at `index`; returns the index just past them.
  #[track_caller]
  pub fn insert_fill(
    &mut self,
    index: usize,
    n: usize,
    value: T,
  ) -> usize
  where
    T: Clone,
  {
    let old = self.open_gap(index, n);
    let base = self.as_mut_ptr();
    for offset in 0..n {
      unsafe { base.add(index + offset).write(value.clone()) };
    }
    self.count = old + n;
    index + n
  }

  #[track_caller]
  pub fn extend_from_slice(
    &mut self,
    values: &[T],
  ) where
    T: Clone,
  {
    self.insert_slice(self.count, values);
  }

  pub fn pop(&mut self) -> Option<T> {
    if self.count == 0 {
      return None;
    }
    self.count -= 1;
    let value = unsafe { self.as_ptr().add(self.count).read() };
    self.ensure(self.count);
    Some(value)
  }

  /// Removes `n` elements starting at `index` and returns `index`.
  #[track_caller]
  pub fn remove(
    &mut self,
    index: usize,
    n: usize,
  ) -> usize {
    let count = self.count;
    if index > count || n > count - index {
      diag::fatal("index + n <= count", "remove range out of bounds");
    }

    let base = self.as_mut_ptr();
    self.count = index;
    unsafe {
      elements::drop_range(base, index, n);
      elements::shift(base, index + n, index, count - index - n);
    }
    self.count = count - n;
    self.ensure(self.count);
    index
  }

  /// Removes and returns the element at `index`, shifting the tail left.
  #[track_caller]
  pub fn take(
    &mut self,
    index: usize,
  ) -> T {
    let count = self.count;
    if index >= count {
      diag::fatal("index < count", "sequence index out of bounds");
    }
    let base = self.as_mut_ptr();
    let value = unsafe { base.add(index).read() };
    unsafe { elements::shift(base, index + 1, index, count - index - 1) };
    self.count = count - 1;
    self.ensure(self.count);
    value
  }

  /// Drops everything from `len` on. Does nothing when `len >= len()`.
  pub fn truncate(
    &mut self,
    len: usize,
  ) {
    let count = self.count;
    if len >= count {
      return;
    }
    self.count = len;
    unsafe { elements::drop_range(self.as_mut_ptr(), len, count - len) };
    self.ensure(len);
  }

  pub fn clear(&mut self) {
    self.truncate(0);
  }

  /// Resizes to `count` elements; new slots are `T::default()`.
  #[track_caller]
  pub fn set_count(
    &mut self,
    count: usize,
  ) where
    T: Default,
  {
    let old = self.count;
    if count <= old {
      self.truncate(count);
      return;
    }

    self.ensure(count);
    let base = self.as_mut_ptr();
    for index in old..count {
      unsafe { base.add(index).write(T::default()) };
      self.count = index + 1;
    }
  }

  /// Appends `n` default elements and returns the new count.
  #[track_caller]
  pub fn grow(
    &mut self,
    n: usize,
  ) -> usize
  where
    T: Default,
  {
    let Some(count) = self.count.checked_add(n) else {
      diag::fatal("count + n <= usize::MAX", "capacity overflow");
    };
    self.set_count(count);
    count
  }

  /// Replaces `[index, index + remove)` (clamped to the count) with clones of
  /// `values`. Returns the index just past the written values.
  #[track_caller]
  pub fn replace_range(
    &mut self,
    index: usize,
    remove: usize,
    values: &[T],
  ) -> usize
  where
    T: Clone,
  {
    let count = self.count;
    if index > count {
      diag::fatal("index <= count", "replace position out of bounds");
    }
    let remove = remove.min(count - index);
    let tail = index + remove;
    let Some(new_count) = (count - remove).checked_add(values.len()) else {
      diag::fatal("count + n <= usize::MAX", "capacity overflow");
    };

    self.ensure(new_count.max(count));
    let base = self.as_mut_ptr();
    self.count = index;
    unsafe {
      elements::drop_range(base, index, remove);
      elements::shift(base, tail, index + values.len(), count - tail);
    }
    for (offset, value) in values.iter().enumerate() {
      unsafe { base.add(index + offset).write(value.clone()) };
    }
    self.count = new_count;
    self.ensure(new_count);
    index + values.len()
  }

  /// Exchanges contents and storage with `other`.
  pub fn swap_storage(
    &mut self,
    other: &mut Self,
  ) {
    mem::swap(self, other);
  }

  pub fn find(
    &self,
    value: &T,
    from: usize,
  ) -> usize
  where
    T: PartialEq,
  {
    view::find_value(self.as_slice(), value, from)
  }

  pub fn rfind(
    &self,
    value: &T,
    from: usize,
  ) -> usize
  where
    T: PartialEq,
  {
    view::rfind_value(self.as_slice(), value, from)
  }
}

impl<T, const N: usize> Drop for InlineVec<T, N> {
  fn drop(&mut self) {
    let count = mem::replace(&mut self.count, 0);
    unsafe { elements::drop_range(self.as_mut_ptr(), 0, count) };
    if let Storage::Heap { ptr, .. } = self.storage {
      unsafe { aligned::free(ptr.as_ptr() as *mut u8) };
    }
  }
}

impl<T, const N: usize> Default for InlineVec<T, N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone, const N: usize> Clone for InlineVec<T, N> {
  fn clone(&self) -> Self {
    let mut copy = Self::new();
    copy.extend_from_slice(self.as_slice());
    copy
  }
}

impl<T, const N: usize> Deref for InlineVec<T, N> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    self.as_slice()
  }
}

impl<T, const N: usize> DerefMut for InlineVec<T, N> {
  fn deref_mut(&mut self) -> &mut [T] {
    self.as_mut_slice()
  }
}

impl<T: PartialEq, const N: usize, const M: usize> PartialEq<InlineVec<T, M>> for InlineVec<T, N> {
  fn eq(
    &self,
    other: &InlineVec<T, M>,
  ) -> bool {
    self.as_slice() == other.as_slice()
  }
}

impl<T: Eq, const N: usize> Eq for InlineVec<T, N> {}

impl<T: fmt::Debug, const N: usize> fmt::Debug for InlineVec<T, N> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.as_slice()).finish()
  }
}

impl<T, const N: usize> Extend<T> for InlineVec<T, N> {
  fn extend<I: IntoIterator<Item = T>>(
    &mut self,
    iter: I,
  ) {
    let iter = iter.into_iter();
    self.reserve(iter.size_hint().0);
    for value in iter {
      self.push(value);
    }
  }
}

impl<T, const N: usize> FromIterator<T> for InlineVec<T, N> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut seq = Self::new();
    seq.extend(iter);
    seq
  }
}

impl<T: Clone, const N: usize> From<&[T]> for InlineVec<T, N> {
  fn from(values: &[T]) -> Self {
    let mut seq = Self::new();
    seq.extend_from_slice(values);
    seq
  }
}

impl<'a, T, const N: usize> IntoIterator for &'a InlineVec<T, N> {
  type Item = &'a T;
  type IntoIter = slice::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.as_slice().iter()
  }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut InlineVec<T, N> {
  type Item = &'a mut T;
  type IntoIter = slice::IterMut<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.as_mut_slice().iter_mut()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::view::INVALID_INDEX;
  use proptest::prelude::*;
  use std::{cell::Cell, rc::Rc};

  struct Counted(Rc<Cell<usize>>);

  impl Drop for Counted {
    fn drop(&mut self) {
      self.0.set(self.0.get() + 1);
    }
  }

  #[test]
  fn test_starts_inline() {
    let seq: InlineVec<u32, 4> = InlineVec::new();
    assert!(seq.is_inline());
    assert!(seq.is_empty());
    assert_eq!(seq.capacity(), 4);
    assert_eq!(InlineVec::<u32, 4>::INLINE_CAPACITY, 4);

    let vector: Vector<u32> = Vector::new();
    assert!(vector.is_inline());
    assert_eq!(vector.capacity(), 0);
  }

  #[test]
  fn test_migration_round_trip() {
    let mut seq: InlineVec<u64, 4> = InlineVec::new();
    for value in 0..4 {
      seq.push(value);
      assert!(seq.is_inline());
    }

    seq.push(4);
    assert!(seq.is_heap());
    assert_eq!(seq.capacity(), 8);
    assert_eq!(seq.as_ptr() as usize % MIN_ALIGN, 0);
    assert_eq!(seq.as_slice(), &[0, 1, 2, 3, 4]);

    seq.remove(0, 1);
    assert!(seq.is_inline());
    assert_eq!(seq.as_slice(), &[1, 2, 3, 4]);

    seq.remove(1, 2);
    assert!(seq.is_inline());
    assert_eq!(seq.as_slice(), &[1, 4]);
  }

  #[test]
  fn test_heap_growth_is_power_of_two() {
    let mut seq: Vector<u16> = Vector::new();
    seq.push(1);
    assert!(seq.is_heap());
    assert_eq!(seq.capacity(), 1);

    for value in 2..=100 {
      seq.push(value);
      assert!(seq.capacity().is_power_of_two());
      assert!(seq.capacity() >= seq.len());
    }
    assert_eq!(seq.capacity(), 128);
    assert_eq!(seq.len(), 100);
    assert_eq!(seq[99], 100);

    seq.clear();
    assert!(seq.is_inline());
    assert_eq!(seq.capacity(), 0);
  }

  #[test]
  fn test_overaligned_elements() {
    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    #[repr(align(64))]
    struct Line(u8);

    let mut seq: InlineVec<Line, 1> = InlineVec::new();
    seq.extend((0..20).map(Line));
    assert!(seq.is_heap());
    assert_eq!(seq.as_ptr() as usize % 64, 0);
    assert_eq!(seq[19], Line(19));
  }

  #[test]
  fn test_insert_returns_index_past() {
    let mut seq: InlineVec<char, 2> = InlineVec::new();
    assert_eq!(seq.insert(0, 'c'), 1);
    assert_eq!(seq.insert(0, 'a'), 1);
    assert_eq!(seq.insert_slice(1, &['b', 'b', 'x']), 4);
    assert_eq!(seq.as_slice(), &['a', 'b', 'b', 'x', 'c']);
    seq.push_front('_');
    seq.push('!');
    assert_eq!(seq.insert_fill(3, 2, '-'), 5);
    assert_eq!(seq.iter().collect::<String>(), "_ab--bxc!");
    seq.remove(3, 2);
    assert_eq!(seq.iter().collect::<String>(), "_abbxc!");
    assert_eq!(seq.find(&'b', 0), 2);
    assert_eq!(seq.rfind(&'b', INVALID_INDEX), 3);
    assert_eq!(seq.find(&'z', 0), INVALID_INDEX);
  }

  #[test]
  fn test_remove_take_and_pop() {
    let mut seq: Vector<i32> = (0..10).collect();
    assert_eq!(seq.remove(2, 3), 2);
    assert_eq!(seq.as_slice(), &[0, 1, 5, 6, 7, 8, 9]);
    assert_eq!(seq.take(0), 0);
    assert_eq!(seq.pop(), Some(9));
    assert_eq!(seq.as_slice(), &[1, 5, 6, 7, 8]);
    assert_eq!(seq.remove(5, 0), 5);
    assert_eq!(seq.len(), 5);
  }

  #[test]
  #[should_panic(expected = "remove range out of bounds")]
  fn test_remove_out_of_range_is_fatal() {
    let mut seq: InlineVec<u8, 4> = InlineVec::from(&[1u8, 2, 3][..]);
    diag::with_fault_sink(|_| {}, || {
      seq.remove(2, 2);
    });
  }

  #[test]
  #[should_panic(expected = "insert position out of bounds")]
  fn test_insert_past_end_is_fatal() {
    let mut seq: InlineVec<u8, 4> = InlineVec::new();
    diag::with_fault_sink(|_| {}, || {
      seq.insert(1, 0);
    });
  }

  #[test]
  fn test_set_count_and_grow() {
    let mut seq: InlineVec<String, 2> = InlineVec::new();
    seq.push("a".to_string());
    seq.set_count(3);
    assert!(seq.is_heap());
    assert_eq!(seq.as_slice(), &["a", "", ""]);

    assert_eq!(seq.grow(2), 5);
    assert_eq!(seq.len(), 5);

    seq.set_count(1);
    assert!(seq.is_inline());
    assert_eq!(seq.as_slice(), &["a"]);
  }

  #[test]
  fn test_replace_range() {
    let mut seq: InlineVec<u8, 8> = InlineVec::from(&b"hello world"[..]);
    assert_eq!(seq.replace_range(0, 5, b"HELLO"), 5);
    assert_eq!(seq.as_slice(), b"HELLO world");

    assert_eq!(seq.replace_range(6, 5, b"you"), 9);
    assert_eq!(seq.as_slice(), b"HELLO you");

    assert_eq!(seq.replace_range(5, 1, b", dear "), 12);
    assert_eq!(seq.as_slice(), b"HELLO, dear you");

    // `remove` clamps to the end.
    assert_eq!(seq.replace_range(11, 100, b""), 11);
    assert_eq!(seq.as_slice(), b"HELLO, dear");

    seq.replace_range(0, 11, b"ok");
    assert!(seq.is_inline());
    assert_eq!(seq.as_slice(), b"ok");
  }

  #[test]
  fn test_drops_each_element_once() {
    let drops = Rc::new(Cell::new(0));
    {
      let mut seq: InlineVec<Counted, 2> = InlineVec::new();
      for _ in 0..6 {
        seq.push(Counted(drops.clone()));
      }
      seq.remove(1, 2);
      assert_eq!(drops.get(), 2);
      seq.truncate(3);
      assert_eq!(drops.get(), 3);
      let taken = seq.take(0);
      drop(taken);
      assert_eq!(drops.get(), 4);
      seq.remove(0, 1);
      assert!(seq.is_inline());
      assert_eq!(drops.get(), 5);
    }
    assert_eq!(drops.get(), 6);
  }

  #[test]
  fn test_clone_eq_and_take_ownership() {
    let mut a: InlineVec<String, 1> = ["x", "y", "z"].iter().map(|s| s.to_string()).collect();
    let b = a.clone();
    assert_eq!(a, b);
    assert!(b.is_heap());
    assert_ne!(a.as_ptr(), b.as_ptr());

    let c: InlineVec<String, 8> = b.iter().cloned().collect();
    assert_eq!(a, c);

    let moved = mem::take(&mut a);
    assert!(a.is_empty());
    assert!(a.is_inline());
    assert_eq!(moved.len(), 3);

    let mut d: InlineVec<String, 1> = InlineVec::new();
    let mut e = moved;
    d.swap_storage(&mut e);
    assert_eq!(d.len(), 3);
    assert!(e.is_empty());
    assert_eq!(format!("{d:?}"), r#"["x", "y", "z"]"#);
  }

  #[test]
  fn test_zero_sized_elements_never_allocate() {
    let mut seq: InlineVec<(), 2> = InlineVec::new();
    for _ in 0..1000 {
      seq.push(());
    }
    assert!(seq.is_inline());
    assert_eq!(seq.len(), 1000);
    assert_eq!(seq.capacity(), usize::MAX);
    seq.remove(0, 999);
    assert_eq!(seq.len(), 1);
  }

  #[test]
  fn test_try_reserve_reports_overflow() {
    let mut seq: Vector<u64> = Vector::new();
    assert_eq!(
      seq.try_reserve(usize::MAX),
      Err(Error::CapacityOverflow {
        requested: usize::MAX
      })
    );
    assert_eq!(
      seq.try_reserve(usize::MAX / 16),
      Err(Error::CapacityOverflow {
        requested: usize::MAX / 16
      })
    );
    assert!(seq.is_inline());

    seq.push(1);
    assert_eq!(
      seq.try_reserve(usize::MAX),
      Err(Error::CapacityOverflow {
        requested: usize::MAX
      })
    );
    assert_eq!(seq.as_slice(), &[1]);
  }

  #[test]
  fn test_views_and_at() {
    let mut seq: InlineVec<i32, 4> = InlineVec::from(&[3, 1, 2][..]);
    assert_eq!(seq.view().find(&2, 0), 2);
    seq.view_mut().as_mut_slice().sort();
    assert_eq!(*seq.at(0), 1);
    *seq.at_mut(2) = 30;
    assert_eq!(seq.as_slice(), &[1, 2, 30]);
  }

  #[derive(Debug, Clone)]
  enum Op {
    Insert(usize, i32),
    Remove(usize, usize),
    Pop,
    Truncate(usize),
  }

  fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
      3 => (any::<usize>(), any::<i32>()).prop_map(|(at, value)| Op::Insert(at, value)),
      1 => (any::<usize>(), 0usize..4).prop_map(|(at, n)| Op::Remove(at, n)),
      1 => Just(Op::Pop),
      1 => any::<usize>().prop_map(Op::Truncate),
    ]
  }

  proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(op(), 0..200)) {
      let mut seq: InlineVec<i32, 8> = InlineVec::new();
      let mut model: Vec<i32> = Vec::new();

      for op in ops {
        match op {
          Op::Insert(at, value) => {
            let at = at % (model.len() + 1);
            prop_assert_eq!(seq.insert(at, value), at + 1);
            model.insert(at, value);
          }
          Op::Remove(at, n) => {
            if model.is_empty() {
              continue;
            }
            let at = at % model.len();
            let n = n.min(model.len() - at);
            seq.remove(at, n);
            model.drain(at..at + n);
          }
          Op::Pop => {
            prop_assert_eq!(seq.pop(), model.pop());
          }
          Op::Truncate(len) => {
            let len = len % (model.len() + 2);
            seq.truncate(len);
            model.truncate(len);
          }
        }

        prop_assert_eq!(seq.as_slice(), model.as_slice());
        prop_assert_eq!(seq.is_heap(), model.len() > 8);
        prop_assert!(seq.capacity() >= seq.len());
        if seq.is_heap() {
          prop_assert!(seq.capacity().is_power_of_two());
        }
      }
    }
  }
}
