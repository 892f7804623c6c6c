//! Structure-of-arrays views.
//!
//! A [`MultiView`] keeps N parallel slices under one shared count. Slicing
//! moves every column by the same offset, and each column is reached with a
//! compile-time index:
//!
//! ```text
//!   MultiView<(&[u32], &[f32], &[u8])>        count = 4
//!
//!   column::<0>()  ┌────┬────┬────┬────┐
//!                  │ id │ id │ id │ id │   u32
//!                  └────┴────┴────┴────┘
//!   column::<1>()  ┌────┬────┬────┬────┐
//!                  │ w  │ w  │ w  │ w  │   f32
//!                  └────┴────┴────┴────┘
//!   column::<2>()  ┌────┬────┬────┬────┐
//!                  │ f  │ f  │ f  │ f  │   u8
//!                  └────┴────┴────┴────┘
//!                       └ drop_front(1) advances all three ┘
//! ```
//!
//! ```rust
//! use rmemkit::MultiView;
//!
//! let ids = [7u32, 8, 9];
//! let weights = [0.5f32, 1.5, 2.5];
//! let rows = MultiView::new((&ids[..], &weights[..]));
//!
//! assert_eq!(rows.find::<0>(&8, 0), 1);
//! assert_eq!(*rows.at::<1>(1), 1.5);
//! assert_eq!(rows.drop_front(1).column::<0>().as_slice(), &[8, 9]);
//! ```

use std::{marker::PhantomData, mem};

use crate::{
  check, diag,
  view::{self, View, ViewMut},
};

/// A tuple of equally long slices.
pub trait Columns<'a>: Copy {
  /// Number of columns.
  const ARITY: usize;

  /// One reference per column.
  type Row;

  /// Shortest column length.
  fn min_len(&self) -> usize;

  /// Whether every column has exactly `len` elements.
  fn all_len(
    &self,
    len: usize,
  ) -> bool;

  /// `[start, end)` of every column.
  fn slice(
    self,
    start: usize,
    end: usize,
  ) -> Self;

  fn row(
    self,
    index: usize,
  ) -> Self::Row;

  /// Sum of the element sizes of every column.
  fn row_stride() -> usize;
}

/// Typed access to column `K`.
pub trait Column<'a, const K: usize>: Columns<'a> {
  type Item: 'a;

  fn column(self) -> &'a [Self::Item];
}

macro_rules! impl_columns {
  ($($name:ident : $idx:tt),+) => {
    impl<'a, $($name),+> Columns<'a> for ($(&'a [$name],)+) {
      const ARITY: usize = [$(stringify!($name)),+].len();

      type Row = ($(&'a $name,)+);

      fn min_len(&self) -> usize {
        let mut len = usize::MAX;
        $(len = len.min(self.$idx.len());)+
        len
      }

      fn all_len(
        &self,
        len: usize,
      ) -> bool {
        true $(&& self.$idx.len() == len)+
      }

      fn slice(
        self,
        start: usize,
        end: usize,
      ) -> Self {
        ($(&self.$idx[start..end],)+)
      }

      fn row(
        self,
        index: usize,
      ) -> Self::Row {
        ($(&self.$idx[index],)+)
      }

      fn row_stride() -> usize {
        0 $(+ mem::size_of::<$name>())+
      }
    }
  };
}

macro_rules! impl_column {
  (($($name:ident),+), $idx:tt => $item:ident) => {
    impl<'a, $($name),+> Column<'a, $idx> for ($(&'a [$name],)+) {
      type Item = $item;

      #[inline]
      fn column(self) -> &'a [$item] {
        self.$idx
      }
    }
  };
}

impl_columns!(A: 0);
impl_columns!(A: 0, B: 1);
impl_columns!(A: 0, B: 1, C: 2);
impl_columns!(A: 0, B: 1, C: 2, D: 3);

impl_column!((A), 0 => A);
impl_column!((A, B), 0 => A);
impl_column!((A, B), 1 => B);
impl_column!((A, B, C), 0 => A);
impl_column!((A, B, C), 1 => B);
impl_column!((A, B, C), 2 => C);
impl_column!((A, B, C, D), 0 => A);
impl_column!((A, B, C, D), 1 => B);
impl_column!((A, B, C, D), 2 => C);
impl_column!((A, B, C, D), 3 => D);

/// A tuple of equally long mutable slices.
pub trait ColumnsMut<'a>: Sized {
  const ARITY: usize;

  /// The same columns borrowed for a shorter lifetime.
  type Reborrow<'b>: ColumnsMut<'b>
  where
    Self: 'b;

  /// The same columns as shared slices.
  type Shared<'b>: Columns<'b>
  where
    Self: 'b;

  fn min_len(&self) -> usize;

  fn all_len(
    &self,
    len: usize,
  ) -> bool;

  fn slice(
    self,
    start: usize,
    end: usize,
  ) -> Self;

  fn reborrow<'b>(&'b mut self) -> Self::Reborrow<'b>;

  fn shared<'b>(&'b self) -> Self::Shared<'b>;

  fn row_stride() -> usize;
}

/// Typed mutable access to column `K`.
pub trait ColumnMut<'a, const K: usize>: ColumnsMut<'a> {
  type Item;

  fn column_ref(&self) -> &[Self::Item];

  fn column_mut(&mut self) -> &mut [Self::Item];
}

macro_rules! impl_columns_mut {
  ($($name:ident : $idx:tt),+) => {
    impl<'a, $($name),+> ColumnsMut<'a> for ($(&'a mut [$name],)+) {
      const ARITY: usize = [$(stringify!($name)),+].len();

      type Reborrow<'b> = ($(&'b mut [$name],)+)
      where
        Self: 'b;

      type Shared<'b> = ($(&'b [$name],)+)
      where
        Self: 'b;

      fn min_len(&self) -> usize {
        let mut len = usize::MAX;
        $(len = len.min(self.$idx.len());)+
        len
      }

      fn all_len(
        &self,
        len: usize,
      ) -> bool {
        true $(&& self.$idx.len() == len)+
      }

      fn slice(
        self,
        start: usize,
        end: usize,
      ) -> Self {
        ($(&mut self.$idx[start..end],)+)
      }

      fn reborrow<'b>(&'b mut self) -> Self::Reborrow<'b> {
        ($(&mut *self.$idx,)+)
      }

      fn shared<'b>(&'b self) -> Self::Shared<'b> {
        ($(&*self.$idx,)+)
      }

      fn row_stride() -> usize {
        0 $(+ mem::size_of::<$name>())+
      }
    }
  };
}

macro_rules! impl_column_mut {
  (($($name:ident),+), $idx:tt => $item:ident) => {
    impl<'a, $($name),+> ColumnMut<'a, $idx> for ($(&'a mut [$name],)+) {
      type Item = $item;

      #[inline]
      fn column_ref(&self) -> &[$item] {
        &*self.$idx
      }

      #[inline]
      fn column_mut(&mut self) -> &mut [$item] {
        &mut *self.$idx
      }
    }
  };
}

impl_columns_mut!(A: 0);
impl_columns_mut!(A: 0, B: 1);
impl_columns_mut!(A: 0, B: 1, C: 2);
impl_columns_mut!(A: 0, B: 1, C: 2, D: 3);

impl_column_mut!((A), 0 => A);
impl_column_mut!((A, B), 0 => A);
impl_column_mut!((A, B), 1 => B);
impl_column_mut!((A, B, C), 0 => A);
impl_column_mut!((A, B, C), 1 => B);
impl_column_mut!((A, B, C), 2 => C);
impl_column_mut!((A, B, C, D), 0 => A);
impl_column_mut!((A, B, C, D), 1 => B);
impl_column_mut!((A, B, C, D), 2 => C);
impl_column_mut!((A, B, C, D), 3 => D);

/// N parallel read-only arrays sharing one count.
pub struct MultiView<'a, C> {
  columns: C,
  count: usize,
  _borrow: PhantomData<&'a ()>,
}

impl<'a, C: Columns<'a>> MultiView<'a, C> {
  /// Columns of different lengths are a fault; the view then covers the
  /// shortest one.
  #[track_caller]
  pub fn new(columns: C) -> Self {
    let count = columns.min_len();
    check!(columns.all_len(count), "multi view columns differ in length");
    Self {
      columns: columns.slice(0, count),
      count,
      _borrow: PhantomData,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.count
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  pub fn columns(&self) -> C {
    self.columns
  }

  /// Bytes per row across all columns.
  pub fn stride(&self) -> usize {
    C::row_stride()
  }

  pub fn size_in_bytes(&self) -> usize {
    self.count * C::row_stride()
  }

  pub fn column<const K: usize>(&self) -> View<'a, <C as Column<'a, K>>::Item>
  where
    C: Column<'a, K>,
  {
    View::new(self.columns.column())
  }

  #[track_caller]
  pub fn at<const K: usize>(
    &self,
    index: usize,
  ) -> &'a <C as Column<'a, K>>::Item
  where
    C: Column<'a, K>,
  {
    self.column::<K>().at(index)
  }

  pub fn get<const K: usize>(
    &self,
    index: usize,
  ) -> Option<&'a <C as Column<'a, K>>::Item>
  where
    C: Column<'a, K>,
  {
    self.column::<K>().get(index)
  }

  /// One reference per column for row `index`.
  #[track_caller]
  pub fn row(
    &self,
    index: usize,
  ) -> C::Row {
    if index >= self.count {
      diag::fatal("index < count", "multi view row out of bounds");
    }
    self.columns.row(index)
  }

  pub fn rows(&self) -> impl Iterator<Item = C::Row> + use<'a, C> {
    let columns = self.columns;
    (0..self.count).map(move |index| columns.row(index))
  }

  pub fn find<const K: usize>(
    &self,
    value: &<C as Column<'a, K>>::Item,
    from: usize,
  ) -> usize
  where
    C: Column<'a, K>,
    <C as Column<'a, K>>::Item: PartialEq,
  {
    view::find_value(self.columns.column(), value, from)
  }

  pub fn rfind<const K: usize>(
    &self,
    value: &<C as Column<'a, K>>::Item,
    from: usize,
  ) -> usize
  where
    C: Column<'a, K>,
    <C as Column<'a, K>>::Item: PartialEq,
  {
    view::rfind_value(self.columns.column(), value, from)
  }

  pub fn subview(
    &self,
    start: usize,
    count: usize,
  ) -> Self {
    let (start, len) = view::clamp_range(self.count, start, count);
    Self {
      columns: self.columns.slice(start, start + len),
      count: len,
      _borrow: PhantomData,
    }
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
    let count = count.min(self.count);
    self.subview(self.count - count, count)
  }

  pub fn drop_front(
    &self,
    count: usize,
  ) -> Self {
    self.subview(count, self.count)
  }

  pub fn drop_back(
    &self,
    count: usize,
  ) -> Self {
    self.first(self.count.saturating_sub(count))
  }
}

impl<C: Copy> Clone for MultiView<'_, C> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<C: Copy> Copy for MultiView<'_, C> {}

impl<C: std::fmt::Debug> std::fmt::Debug for MultiView<'_, C> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("MultiView")
      .field("count", &self.count)
      .field("columns", &self.columns)
      .finish()
  }
}

/// N parallel writable arrays sharing one count.
///
/// Slicing borrows the view again for a shorter lifetime, so a window can be
/// written through while the parent waits.
pub struct MultiViewMut<'a, C> {
  columns: C,
  count: usize,
  _borrow: PhantomData<&'a mut ()>,
}

impl<'a, C: ColumnsMut<'a>> MultiViewMut<'a, C> {
  /// Columns of different lengths are a fault; the view then covers the
  /// shortest one.
  #[track_caller]
  pub fn new(columns: C) -> Self {
    let count = columns.min_len();
    check!(columns.all_len(count), "multi view columns differ in length");
    Self {
      columns: columns.slice(0, count),
      count,
      _borrow: PhantomData,
    }
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.count
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.count == 0
  }

  pub fn stride(&self) -> usize {
    C::row_stride()
  }

  pub fn size_in_bytes(&self) -> usize {
    self.count * C::row_stride()
  }

  /// Read-only view over the same rows, for searching.
  pub fn as_view(&self) -> MultiView<'_, C::Shared<'_>> {
    MultiView::new(self.columns.shared())
  }

  pub fn column<const K: usize>(&self) -> View<'_, <C as ColumnMut<'a, K>>::Item>
  where
    C: ColumnMut<'a, K>,
  {
    View::new(self.columns.column_ref())
  }

  pub fn column_mut<const K: usize>(&mut self) -> ViewMut<'_, <C as ColumnMut<'a, K>>::Item>
  where
    C: ColumnMut<'a, K>,
  {
    ViewMut::new(self.columns.column_mut())
  }

  #[track_caller]
  pub fn at<const K: usize>(
    &self,
    index: usize,
  ) -> &<C as ColumnMut<'a, K>>::Item
  where
    C: ColumnMut<'a, K>,
  {
    match self.columns.column_ref().get(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "multi view index out of bounds"),
    }
  }

  #[track_caller]
  pub fn at_mut<const K: usize>(
    &mut self,
    index: usize,
  ) -> &mut <C as ColumnMut<'a, K>>::Item
  where
    C: ColumnMut<'a, K>,
  {
    match self.columns.column_mut().get_mut(index) {
      Some(item) => item,
      None => diag::fatal("index < count", "multi view index out of bounds"),
    }
  }

  pub fn get_mut<const K: usize>(
    &mut self,
    index: usize,
  ) -> Option<&mut <C as ColumnMut<'a, K>>::Item>
  where
    C: ColumnMut<'a, K>,
  {
    self.columns.column_mut().get_mut(index)
  }

  /// Clamped window over the same rows; every column advances by `start`.
  pub fn subview_mut(
    &mut self,
    start: usize,
    count: usize,
  ) -> MultiViewMut<'_, C::Reborrow<'_>> {
    let (start, len) = view::clamp_range(self.count, start, count);
    MultiViewMut {
      columns: self.columns.reborrow().slice(start, start + len),
      count: len,
      _borrow: PhantomData,
    }
  }

  pub fn first_mut(
    &mut self,
    count: usize,
  ) -> MultiViewMut<'_, C::Reborrow<'_>> {
    self.subview_mut(0, count)
  }

  pub fn last_mut(
    &mut self,
    count: usize,
  ) -> MultiViewMut<'_, C::Reborrow<'_>> {
    let count = count.min(self.count);
    self.subview_mut(self.count - count, count)
  }

  pub fn drop_front_mut(
    &mut self,
    count: usize,
  ) -> MultiViewMut<'_, C::Reborrow<'_>> {
    let total = self.count;
    self.subview_mut(count, total)
  }

  pub fn drop_back_mut(
    &mut self,
    count: usize,
  ) -> MultiViewMut<'_, C::Reborrow<'_>> {
    let keep = self.count.saturating_sub(count);
    self.subview_mut(0, keep)
  }
}

impl<C: std::fmt::Debug> std::fmt::Debug for MultiViewMut<'_, C> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("MultiViewMut")
      .field("count", &self.count)
      .field("columns", &self.columns)
      .finish()
  }
}
