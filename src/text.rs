//! Growable code-unit text with in-place numeric formatting.
//!
//! A [`TextBuffer`] is an [`InlineVec`] of code units. It knows nothing about
//! encodings: `&str` input is copied byte by byte, each byte widened to one
//! code unit, and only ASCII whitespace is recognised by the trims.
//!
//! Numbers are rendered straight into the buffer. The digit count is worked
//! out first, then a single gap of exactly that size is opened and filled
//! back to front:
//!
//! ```text
//!   insert_signed::<10>(3, -42)
//!
//!   before   a b c d e          count = 5
//!                 ▲ index 3
//!   gap      a b c _ _ _ d e    one shift of the tail
//!   fill     a b c - 4 2 d e    returns 6
//! ```
//!
//! ```rust
//! use rmemkit::{Text, append_all};
//!
//! let mut text = Text::new();
//! append_all!(text, "x = ", 42u32, ", ok = ", true);
//! assert_eq!(text, "x = 42, ok = true");
//!
//! text.set("hello world");
//! assert_eq!(text.replace_all(b"o", b"0"), 2);
//! assert_eq!(text, "hell0 w0rld");
//! ```

use std::{cmp::Ordering, fmt, ops::Index};

use num_traits::{Float, PrimInt, Signed, Unsigned};

use crate::{
  check,
  error::Result,
  number,
  sequence::InlineVec,
  view::{self, INVALID_INDEX, View},
};

/// One element of a text buffer.
pub trait CodeUnit: Copy + Eq + Ord + Default + From<u8> + fmt::Debug + 'static {
  fn to_u32(self) -> u32;

  /// Space, tab, carriage return or line feed.
  #[inline]
  fn is_ascii_space(self) -> bool {
    matches!(self.to_u32(), 0x20 | 0x09 | 0x0D | 0x0A)
  }
}

impl CodeUnit for u8 {
  #[inline]
  fn to_u32(self) -> u32 {
    self as u32
  }
}

impl CodeUnit for u16 {
  #[inline]
  fn to_u32(self) -> u32 {
    self as u32
  }
}

impl CodeUnit for u32 {
  #[inline]
  fn to_u32(self) -> u32 {
    self
  }
}

/// Growable text of `C` code units, `N` of them stored inline.
pub struct TextBuffer<C: CodeUnit, const N: usize> {
  units: InlineVec<C, N>,
}

/// Heap-backed byte text.
pub type Text = TextBuffer<u8, 0>;
/// Byte text with `N` units of inline storage.
pub type InlineText<const N: usize> = TextBuffer<u8, N>;
/// 16-bit code-unit text.
pub type WideText = TextBuffer<u16, 0>;
/// 32-bit code-unit text.
pub type Text32 = TextBuffer<u32, 0>;

/// Values that know how to render themselves into a [`TextBuffer`].
pub trait TextArg<C: CodeUnit> {
  /// Inserts at `index` and returns the index just past what was written.
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize;
}

impl<C: CodeUnit, const N: usize> TextBuffer<C, N> {
  pub const fn new() -> Self {
    Self {
      units: InlineVec::new(),
    }
  }

  pub fn from_units(units: &[C]) -> Self {
    let mut text = Self::new();
    text.units.extend_from_slice(units);
    text
  }

  /// Number of code units.
  #[inline]
  pub fn length(&self) -> usize {
    self.units.len()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.units.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.units.is_empty()
  }

  /// The code units; an empty text yields a static empty slice.
  pub fn units(&self) -> &[C] {
    if self.units.is_empty() {
      return &[];
    }
    self.units.as_slice()
  }

  pub fn units_mut(&mut self) -> &mut [C] {
    self.units.as_mut_slice()
  }

  pub fn view(&self) -> View<'_, C> {
    View::new(self.units())
  }

  pub fn capacity(&self) -> usize {
    self.units.capacity()
  }

  pub fn is_inline(&self) -> bool {
    self.units.is_inline()
  }

  pub fn try_reserve(
    &mut self,
    additional: usize,
  ) -> Result<()> {
    self.units.try_reserve(additional)
  }

  #[track_caller]
  pub fn reserve(
    &mut self,
    additional: usize,
  ) {
    self.units.reserve(additional);
  }

  pub fn clear(&mut self) {
    self.units.clear();
  }

  pub fn truncate(
    &mut self,
    len: usize,
  ) {
    self.units.truncate(len);
  }

  #[track_caller]
  pub fn insert_unit(
    &mut self,
    index: usize,
    unit: C,
  ) -> usize {
    self.units.insert(index, unit)
  }

  #[track_caller]
  pub fn insert_units(
    &mut self,
    index: usize,
    units: &[C],
  ) -> usize {
    self.units.insert_slice(index, units)
  }

  /// Inserts the bytes of `s`, one code unit per byte.
  #[track_caller]
  pub fn insert_str(
    &mut self,
    index: usize,
    s: &str,
  ) -> usize {
    let end = self.units.insert_fill(index, s.len(), C::default());
    for (slot, &byte) in self.units[index..end].iter_mut().zip(s.as_bytes()) {
      *slot = C::from(byte);
    }
    end
  }

  #[track_caller]
  pub fn insert_bool(
    &mut self,
    index: usize,
    value: bool,
  ) -> usize {
    self.insert_str(index, if value { "true" } else { "false" })
  }

  /// Opens one gap for an optional sign plus the digits and fills it.
  #[track_caller]
  fn insert_digits<const BASE: u32>(
    &mut self,
    index: usize,
    magnitude: u128,
    negative: bool,
  ) -> usize {
    let sign = usize::from(negative);
    let digits = number::digit_count::<BASE>(magnitude);
    let end = self.units.insert_fill(index, sign + digits, C::from(b'0'));

    let gap = &mut self.units[index..end];
    if negative {
      gap[0] = C::from(b'-');
    }
    number::write_digits::<C, BASE>(magnitude, &mut gap[sign..]);
    end
  }

  /// Inserts `value` in base `BASE` (2..=36, upper-case letters).
  #[track_caller]
  pub fn insert_unsigned<const BASE: u32>(
    &mut self,
    index: usize,
    value: impl PrimInt + Unsigned,
  ) -> usize {
    let magnitude = value.to_u128().unwrap_or_default();
    self.insert_digits::<BASE>(index, magnitude, false)
  }

  /// Inserts `value` in base `BASE`; negatives get a leading `-`.
  #[track_caller]
  pub fn insert_signed<const BASE: u32>(
    &mut self,
    index: usize,
    value: impl PrimInt + Signed,
  ) -> usize {
    let value = value.to_i128().unwrap_or_default();
    self.insert_digits::<BASE>(index, value.unsigned_abs(), value < 0)
  }

  /// Inserts `value` with exactly `P` fractional digits, rounded half up.
  ///
  /// A fraction that rounds up to `10^P` is written as zeros without
  /// carrying into the integer part, so `0.999` with `P = 2` gives `0.00`.
  /// NaN and infinities are written as `nan`, `inf` and `-inf`. An integer
  /// part of `2^128` or more is a fault and saturates.
  #[track_caller]
  pub fn insert_float_fixed<const P: u32>(
    &mut self,
    index: usize,
    value: impl Float,
  ) -> usize {
    const { assert!(P <= 19, "precision must fit in u64") };

    let mut x = value.to_f64().unwrap_or(f64::NAN);
    if x.is_nan() {
      return self.insert_str(index, "nan");
    }

    let mut at = index;
    if x < 0.0 {
      at = self.insert_unit(at, C::from(b'-'));
      x = -x;
    }
    if x.is_infinite() {
      return self.insert_str(at, "inf");
    }

    let whole = x.trunc();
    check!(whole < u128::MAX as f64, "float integer part does not fit in u128");
    at = self.insert_digits::<10>(at, whole as u128, false);
    if P == 0 {
      return at;
    }

    at = self.insert_unit(at, C::from(b'.'));
    let scale = 10u64.pow(P);
    let mut fraction = ((x - whole) * scale as f64 + 0.5) as u64;
    if fraction >= scale {
      fraction = 0;
    }

    let end = self.units.insert_fill(at, P as usize, C::from(b'0'));
    number::write_digits::<C, 10>(fraction as u128, &mut self.units[at..end]);
    end
  }

  /// Inserts the address of `ptr` as `0x` followed by upper-case hex.
  #[track_caller]
  pub fn insert_pointer<T: ?Sized>(
    &mut self,
    index: usize,
    ptr: *const T,
  ) -> usize {
    let at = self.insert_str(index, "0x");
    self.insert_unsigned::<16>(at, ptr.cast::<u8>() as usize)
  }

  /// Inserts any [`TextArg`] value at `index`.
  #[track_caller]
  pub fn insert(
    &mut self,
    index: usize,
    arg: impl TextArg<C>,
  ) -> usize {
    arg.insert_into(self, index)
  }

  /// Appends `arg` and returns the new length.
  #[track_caller]
  pub fn append(
    &mut self,
    arg: impl TextArg<C>,
  ) -> usize {
    let end = self.len();
    arg.insert_into(self, end)
  }

  /// Replaces the whole text with `arg` and returns the new length.
  #[track_caller]
  pub fn set(
    &mut self,
    arg: impl TextArg<C>,
  ) -> usize {
    self.clear();
    arg.insert_into(self, 0)
  }

  pub fn find(
    &self,
    needle: &[C],
    from: usize,
  ) -> usize {
    view::find_run(self.units(), needle, from)
  }

  pub fn rfind(
    &self,
    needle: &[C],
    from: usize,
  ) -> usize {
    view::rfind_run(self.units(), needle, from)
  }

  pub fn find_unit(
    &self,
    unit: C,
    from: usize,
  ) -> usize {
    view::find_value(self.units(), &unit, from)
  }

  pub fn contains(
    &self,
    needle: &[C],
  ) -> bool {
    self.find(needle, 0) != INVALID_INDEX
  }

  pub fn starts_with(
    &self,
    prefix: &[C],
  ) -> bool {
    self.units().starts_with(prefix)
  }

  pub fn ends_with(
    &self,
    suffix: &[C],
  ) -> bool {
    self.units().ends_with(suffix)
  }

  /// Replaces `[index, index + remove)` with `with` in place.
  ///
  /// Equal lengths overwrite, a shorter replacement pulls the tail left and a
  /// longer one pushes it right. Returns the index just past the replacement.
  #[track_caller]
  pub fn replace(
    &mut self,
    index: usize,
    remove: usize,
    with: &[C],
  ) -> usize {
    self.units.replace_range(index, remove, with)
  }

  /// Replaces the first `what`; returns where it was found or
  /// [`INVALID_INDEX`].
  #[track_caller]
  pub fn replace_first(
    &mut self,
    what: &[C],
    with: &[C],
  ) -> usize {
    if what.is_empty() {
      return INVALID_INDEX;
    }
    let found = self.find(what, 0);
    if found != INVALID_INDEX {
      self.replace(found, what.len(), with);
    }
    found
  }

  /// Replaces every non-overlapping `what` and returns how many were
  /// replaced. An empty `what` does nothing.
  ///
  /// The search resumes just past each replacement, so a replacement never
  /// matches again. With an empty `with` it resumes one unit past the match,
  /// which skips a match that starts right there (`"aaa"` becomes `"a"`).
  #[track_caller]
  pub fn replace_all(
    &mut self,
    what: &[C],
    with: &[C],
  ) -> usize {
    if what.is_empty() {
      return 0;
    }

    let mut replaced = 0;
    let mut from = 0;
    loop {
      let found = self.find(what, from);
      if found == INVALID_INDEX {
        break;
      }
      self.replace(found, what.len(), with);
      replaced += 1;

      from = found + with.len().max(1);
      if from > self.len() {
        break;
      }
    }
    replaced
  }

  /// Swaps every `from` unit for `to`; returns the number of swaps.
  pub fn replace_char(
    &mut self,
    from: C,
    to: C,
  ) -> usize {
    let mut swapped = 0;
    for unit in self.units.iter_mut().filter(|unit| **unit == from) {
      *unit = to;
      swapped += 1;
    }
    swapped
  }

  /// Drops leading ASCII whitespace; returns the new length.
  pub fn trim_left(&mut self) -> usize {
    let leading = self.units().iter().take_while(|unit| unit.is_ascii_space()).count();
    if leading > 0 {
      self.units.remove(0, leading);
    }
    self.len()
  }

  /// Drops trailing ASCII whitespace; returns the new length.
  pub fn trim_right(&mut self) -> usize {
    let trailing = self.units().iter().rev().take_while(|unit| unit.is_ascii_space()).count();
    self.units.truncate(self.len() - trailing);
    self.len()
  }

  pub fn trim(&mut self) -> usize {
    self.trim_right();
    self.trim_left()
  }
}

impl<const N: usize> TextBuffer<u8, N> {
  /// The text as `&str` when it holds valid UTF-8.
  pub fn as_str(&self) -> Option<&str> {
    std::str::from_utf8(self.units()).ok()
  }
}

impl<C: CodeUnit, const N: usize> Default for TextBuffer<C, N> {
  fn default() -> Self {
    Self::new()
  }
}

impl<C: CodeUnit, const N: usize> Clone for TextBuffer<C, N> {
  fn clone(&self) -> Self {
    Self {
      units: self.units.clone(),
    }
  }
}

impl<C: CodeUnit, const N: usize> From<&str> for TextBuffer<C, N> {
  fn from(s: &str) -> Self {
    let mut text = Self::new();
    text.insert_str(0, s);
    text
  }
}

impl<C: CodeUnit, const N: usize> Index<usize> for TextBuffer<C, N> {
  type Output = C;

  #[track_caller]
  fn index(
    &self,
    index: usize,
  ) -> &C {
    self.units.at(index)
  }
}

impl<C: CodeUnit, const N: usize, const M: usize> PartialEq<TextBuffer<C, M>> for TextBuffer<C, N> {
  fn eq(
    &self,
    other: &TextBuffer<C, M>,
  ) -> bool {
    self.units() == other.units()
  }
}

impl<C: CodeUnit, const N: usize> Eq for TextBuffer<C, N> {}

impl<C: CodeUnit, const N: usize> PartialEq<str> for TextBuffer<C, N> {
  fn eq(
    &self,
    other: &str,
  ) -> bool {
    self.len() == other.len()
      && self
        .units()
        .iter()
        .zip(other.as_bytes())
        .all(|(&unit, &byte)| unit == C::from(byte))
  }
}

impl<C: CodeUnit, const N: usize> PartialEq<&str> for TextBuffer<C, N> {
  fn eq(
    &self,
    other: &&str,
  ) -> bool {
    *self == **other
  }
}

impl<C: CodeUnit, const N: usize> PartialOrd for TextBuffer<C, N> {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<C: CodeUnit, const N: usize> Ord for TextBuffer<C, N> {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    self.view().compare(other.view())
  }
}

impl<C: CodeUnit, const N: usize> fmt::Debug for TextBuffer<C, N> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let shown: String = self
      .units()
      .iter()
      .map(|unit| char::from_u32(unit.to_u32()).unwrap_or(char::REPLACEMENT_CHARACTER))
      .collect();
    fmt::Debug::fmt(&shown, f)
  }
}

impl<const N: usize> fmt::Display for TextBuffer<u8, N> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(&String::from_utf8_lossy(self.units()))
  }
}

impl<const N: usize> fmt::Write for TextBuffer<u8, N> {
  fn write_str(
    &mut self,
    s: &str,
  ) -> fmt::Result {
    self.append(s);
    Ok(())
  }
}

impl<C: CodeUnit> TextArg<C> for &str {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_str(index, self)
  }
}

impl<C: CodeUnit> TextArg<C> for &[C] {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_units(index, self)
  }
}

impl<C: CodeUnit, const K: usize> TextArg<C> for &[C; K] {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_units(index, self)
  }
}

impl<C: CodeUnit> TextArg<C> for View<'_, C> {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_units(index, self.as_slice())
  }
}

impl<C: CodeUnit, const M: usize> TextArg<C> for &TextBuffer<C, M> {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_units(index, self.units())
  }
}

impl<C: CodeUnit> TextArg<C> for bool {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_bool(index, self)
  }
}

impl<C: CodeUnit, T: ?Sized> TextArg<C> for *const T {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_pointer(index, self)
  }
}

impl<C: CodeUnit, T: ?Sized> TextArg<C> for *mut T {
  fn insert_into<const N: usize>(
    self,
    text: &mut TextBuffer<C, N>,
    index: usize,
  ) -> usize {
    text.insert_pointer(index, self as *const T)
  }
}

macro_rules! text_arg_numbers {
  ($method:ident::<$param:literal> => $($ty:ty),+) => {
    $(
      impl<C: CodeUnit> TextArg<C> for $ty {
        fn insert_into<const N: usize>(
          self,
          text: &mut TextBuffer<C, N>,
          index: usize,
        ) -> usize {
          text.$method::<$param>(index, self)
        }
      }
    )+
  };
}

text_arg_numbers!(insert_unsigned::<10> => u8, u16, u32, u64, u128, usize);
text_arg_numbers!(insert_signed::<10> => i8, i16, i32, i64, i128, isize);
text_arg_numbers!(insert_float_fixed::<6> => f32, f64);

/// Appends every argument to a text in order and evaluates to the new length.
///
/// ```rust
/// use rmemkit::{InlineText, append_all};
///
/// let mut text: InlineText<32> = InlineText::new();
/// let len = append_all!(text, "[", -7i32, "] ", 1.25f64);
/// assert_eq!(text, "[-7] 1.250000");
/// assert_eq!(len, text.len());
/// ```
#[macro_export]
macro_rules! append_all {
  ($text:expr $(, $arg:expr)* $(,)?) => {{
    let text = &mut $text;
    $(text.append($arg);)*
    text.len()
  }};
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diag;
  use proptest::prelude::*;
  use std::fmt::Write as _;

  #[test]
  fn test_unsigned_bases() {
    let mut text = Text::new();
    assert_eq!(text.insert_unsigned::<10>(0, 12345u32), 5);
    assert_eq!(text, "12345");

    text.clear();
    text.insert_unsigned::<16>(0, 255u8);
    assert_eq!(text, "FF");

    text.clear();
    text.insert_unsigned::<2>(0, 5u64);
    text.insert_unsigned::<8>(0, 8usize);
    assert_eq!(text, "10101");

    text.set(0u16);
    assert_eq!(text, "0");
  }

  #[test]
  fn test_signed() {
    let mut text = Text::new();
    assert_eq!(text.insert_signed::<10>(0, -42i32), 3);
    assert_eq!(text, "-42");

    text.clear();
    text.insert_signed::<10>(0, i64::MIN);
    assert_eq!(text, "-9223372036854775808");

    text.clear();
    text.insert_signed::<16>(0, -255i16);
    assert_eq!(text, "-FF");

    text.set(17i8);
    assert_eq!(text, "17");
  }

  #[test]
  fn test_insert_in_the_middle_returns_index_past() {
    let mut text = Text::from("abcde");
    assert_eq!(text.insert_signed::<10>(3, -42i32), 6);
    assert_eq!(text, "abc-42de");
    assert_eq!(text.insert_str(0, ">>"), 2);
    assert_eq!(text.insert_bool(text.len(), false), text.len());
    assert_eq!(text, ">>abc-42defalse");
  }

  #[test]
  fn test_float_fixed() {
    let mut text = Text::new();
    text.insert_float_fixed::<2>(0, 3.5f64);
    assert_eq!(text, "3.50");

    text.set("");
    text.insert_float_fixed::<3>(0, -2.0625f32);
    assert_eq!(text, "-2.063");

    text.clear();
    text.insert_float_fixed::<0>(0, 7.9f64);
    assert_eq!(text, "7");

    text.clear();
    text.insert_float_fixed::<2>(0, 0.05f64);
    assert_eq!(text, "0.05");

    text.clear();
    text.insert_float_fixed::<4>(0, 1.0f64);
    assert_eq!(text, "1.0000");
  }

  #[test]
  fn test_float_rounding_overflow_clamps_fraction() {
    let mut text = Text::new();
    text.insert_float_fixed::<2>(0, 0.999f64);
    assert_eq!(text, "0.00");
  }

  #[test]
  fn test_float_beyond_u64_keeps_integer_part() {
    let mut text = Text::new();
    text.insert_float_fixed::<0>(0, 1e20f64);
    assert_eq!(text, "100000000000000000000");

    text.set("");
    text.insert_float_fixed::<1>(0, -3e19f64);
    assert_eq!(text, "-30000000000000000000.0");
  }

  #[test]
  fn test_float_beyond_u128_is_a_fault() {
    let before = diag::tests::faults_seen();
    let mut text = Text::new();
    diag::with_fault_sink(diag::tests::counting_sink, || {
      text.insert_float_fixed::<0>(0, 1e300f64);
    });
    assert_eq!(diag::tests::faults_seen(), before + 1);
    assert_eq!(text.len(), 39);
  }

  #[test]
  fn test_float_special_values() {
    let mut text = Text::new();
    text.insert_float_fixed::<2>(0, f64::NAN);
    assert_eq!(text, "nan");
    text.set("");
    text.insert_float_fixed::<2>(0, f32::NEG_INFINITY);
    assert_eq!(text, "-inf");
  }

  #[test]
  fn test_pointer() {
    let mut text = Text::new();
    text.insert_pointer(0, 0x1F0usize as *const u8);
    assert_eq!(text, "0x1F0");

    text.set(std::ptr::null::<u32>());
    assert_eq!(text, "0x0");
  }

  #[test]
  fn test_replace_cases() {
    let mut text = Text::from("hello world");
    assert_eq!(text.replace(0, 5, b"HOWDY"), 5);
    assert_eq!(text, "HOWDY world");

    assert_eq!(text.replace(0, 5, b"hi"), 2);
    assert_eq!(text, "hi world");

    assert_eq!(text.replace(3, 5, b"everyone"), 11);
    assert_eq!(text, "hi everyone");

    assert_eq!(text.replace(2, 9, b""), 2);
    assert_eq!(text, "hi");
  }

  #[test]
  fn test_replace_all() {
    let mut text = Text::from("hello world");
    assert_eq!(text.replace_all(b"o", b"0"), 2);
    assert_eq!(text, "hell0 w0rld");

    assert_eq!(text.replace_all(b"", b"x"), 0);
    assert_eq!(text.replace_all(b"l", b"ll"), 3);
    assert_eq!(text, "hellll0 w0rlld");

    let mut spaced = Text::from("a-b-c");
    assert_eq!(spaced.replace_all(b"-", b" - "), 2);
    assert_eq!(spaced, "a - b - c");
    assert_eq!(spaced.replace_all(b" ", b""), 4);
    assert_eq!(spaced, "a-b-c");
  }

  #[test]
  fn test_replace_all_with_nothing_steps_one_unit() {
    let mut text = Text::from("aaa");
    assert_eq!(text.replace_all(b"a", b""), 2);
    assert_eq!(text, "a");

    let mut spaced = Text::from("a a a");
    assert_eq!(spaced.replace_all(b" ", b""), 2);
    assert_eq!(spaced, "aaa");
  }

  #[test]
  fn test_replace_first_and_char() {
    let mut text = Text::from("one two one");
    assert_eq!(text.replace_first(b"one", b"1"), 0);
    assert_eq!(text, "1 two one");
    assert_eq!(text.replace_first(b"three", b"3"), INVALID_INDEX);
    assert_eq!(text.replace_char(b'o', b'0'), 2);
    assert_eq!(text, "1 tw0 0ne");
  }

  #[test]
  fn test_trim() {
    let mut text = Text::from(" \t hello \r\n");
    assert_eq!(text.trim(), 5);
    assert_eq!(text, "hello");

    let mut left = Text::from("\n\nx ");
    assert_eq!(left.trim_left(), 2);
    assert_eq!(left, "x ");
    assert_eq!(left.trim_right(), 1);

    let mut blank = Text::from(" \t\r\n ");
    assert_eq!(blank.trim(), 0);
    assert!(blank.is_empty());

    // Only the four ASCII whitespace units count.
    let mut vertical = Text::from("\x0Bv\x0C");
    assert_eq!(vertical.trim(), 3);
  }

  #[test]
  fn test_search() {
    let text = Text::from("abcabc");
    assert_eq!(text.find(b"bc", 0), 1);
    assert_eq!(text.find(b"bc", 2), 4);
    assert_eq!(text.rfind(b"bc", INVALID_INDEX), 4);
    assert_eq!(text.find(b"", 3), 3);
    assert_eq!(text.find(b"x", 0), INVALID_INDEX);
    assert_eq!(text.find_unit(b'c', 3), 5);
    assert!(text.contains(b"ca"));
    assert!(text.starts_with(b"abc"));
    assert!(text.ends_with(b"bc"));
  }

  #[test]
  fn test_units_never_dangle() {
    let text = Text::new();
    assert!(text.units().is_empty());
    assert!(!text.units().as_ptr().is_null());
    assert_eq!(text.length(), 0);
    assert_eq!(text.view().len(), 0);
  }

  #[test]
  fn test_inline_text_spills() {
    let mut text: InlineText<8> = InlineText::new();
    text.append("12345678");
    assert!(text.is_inline());
    text.append(9u8);
    assert!(!text.is_inline());
    assert_eq!(text, "123456789");
    text.truncate(4);
    assert!(text.is_inline());
  }

  #[test]
  fn test_wide_text() {
    let mut text = WideText::from("id=");
    text.append(0xBEEFu32);
    text.insert_unsigned::<16>(text.len(), 0xBEEFu32);
    assert_eq!(text, "id=48879BEEF");
    assert_eq!(text.units()[0], b'i' as u16);

    let mut wide = Text32::new();
    wide.append(&[0x1F600u32, 0x20][..]);
    assert_eq!(wide.len(), 2);
    assert_eq!(format!("{wide:?}"), "\"\u{1F600} \"");
  }

  #[test]
  fn test_set_append_and_macros() {
    let mut text: InlineText<16> = InlineText::new();
    assert_eq!(text.set("abc"), 3);
    assert_eq!(text.append(true), 7);
    assert_eq!(text, "abctrue");
    assert_eq!(text.set(-3i64), 2);
    assert_eq!(append_all!(text, "/", 4u8, "/", b"xy"), 7);
    assert_eq!(text, "-3/4/xy");
  }

  #[test]
  fn test_fmt_integration() {
    let mut text = Text::new();
    write!(text, "{}-{:03}", "id", 7).expect("write");
    assert_eq!(text.to_string(), "id-007");
    assert_eq!(text.as_str(), Some("id-007"));

    let copy = text.clone();
    let other: InlineText<4> = InlineText::from("id-007");
    assert_eq!(copy, other);
    assert!(Text::from("ab") < Text::from("abc"));
    assert_eq!(text[0], b'i');
  }

  proptest! {
    #[test]
    fn signed_matches_std(value in any::<i64>()) {
      let mut text = Text::new();
      text.append(value);
      let expected = value.to_string();
      prop_assert_eq!(text.as_str(), Some(expected.as_str()));
    }

    #[test]
    fn replace_all_matches_str_replace(
      haystack in "[ab ]{0,24}",
      what in "[ab]{1,2}",
      with in "[xy]{1,3}",
    ) {
      let mut text = Text::from(haystack.as_str());
      let count = text.replace_all(what.as_bytes(), with.as_bytes());
      prop_assert_eq!(count, haystack.matches(what.as_str()).count());
      let expected = haystack.replace(what.as_str(), with.as_str());
      prop_assert_eq!(text.as_str(), Some(expected.as_str()));
    }
  }
}
