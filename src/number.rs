//! Base-N digit encoding for the text builder.
//!
//! Values are widened to `u128` so one code path serves every integer width.

#[inline]
const fn check_base<const BASE: u32>() {
  const { assert!(2 <= BASE && BASE <= 36, "base must be in 2..=36") }
}

/// ASCII digit for `0..36`, upper-case letters past 9.
#[inline]
pub const fn digit_char(digit: u8) -> u8 {
  if digit < 10 { b'0' + digit } else { b'A' + (digit - 10) }
}

/// Number of base-`BASE` digits needed for `value`; 0 needs one digit.
///
/// Power-of-two bases count bits instead of dividing.
///
/// ```rust
/// use rmemkit::number::digit_count;
///
/// assert_eq!(digit_count::<10>(0), 1);
/// assert_eq!(digit_count::<10>(12345), 5);
/// assert_eq!(digit_count::<16>(0xFFFFF), 5);
/// assert_eq!(digit_count::<2>(5), 3);
/// ```
pub fn digit_count<const BASE: u32>(value: u128) -> usize {
  check_base::<BASE>();
  if value == 0 {
    return 1;
  }

  if BASE.is_power_of_two() {
    let bits_per_digit = BASE.trailing_zeros();
    let width = u128::BITS - value.leading_zeros();
    return width.div_ceil(bits_per_digit) as usize;
  }

  let base = BASE as u128;
  let mut rest = value;
  let mut digits = 0;
  while rest != 0 {
    digits += 1;
    rest /= base;
  }
  digits
}

/// Writes `value` into `out` back to front, exactly `out.len()` digits.
///
/// With `out.len() == digit_count::<BASE>(value)` the result has no leading
/// zeros; a longer slice is zero-padded on the left.
pub fn write_digits<C: From<u8>, const BASE: u32>(
  value: u128,
  out: &mut [C],
) {
  check_base::<BASE>();
  let mut rest = value;

  if BASE.is_power_of_two() {
    let shift = BASE.trailing_zeros();
    let mask = (BASE - 1) as u128;
    for slot in out.iter_mut().rev() {
      *slot = C::from(digit_char((rest & mask) as u8));
      rest >>= shift;
    }
  } else {
    let base = BASE as u128;
    for slot in out.iter_mut().rev() {
      let quotient = rest / base;
      *slot = C::from(digit_char((rest - quotient * base) as u8));
      rest = quotient;
    }
  }
}
