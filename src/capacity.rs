//! Capacity arithmetic shared by the growable containers.
//!
//! Both functions are generic over the unsigned index type so the saturation
//! behaviour can be reasoned about (and tested) on `u8` just like on `usize`.

use num_traits::{PrimInt, Unsigned};

/// Width of `T` in bits.
#[inline]
fn bits<T: PrimInt>() -> u32 {
  T::zero().count_zeros()
}

/// Highest power of two representable in `T`.
#[inline]
pub fn max_pow2<T: PrimInt + Unsigned>() -> T {
  T::one() << (bits::<T>() - 1) as usize
}

/// Smallest power of two `>= v`.
///
/// `v <= 1` gives 1. When the exact result does not fit in `T` the highest
/// power of two of `T` is returned instead of wrapping to zero.
///
/// ```rust
/// use rmemkit::capacity::next_pow2;
///
/// assert_eq!(next_pow2(0u32), 1);
/// assert_eq!(next_pow2(17u32), 32);
/// assert_eq!(next_pow2(200u8), 128);
/// ```
pub fn next_pow2<T: PrimInt + Unsigned>(v: T) -> T {
  if v <= T::one() {
    return T::one();
  }
  let shift = bits::<T>() - (v - T::one()).leading_zeros();
  if shift >= bits::<T>() {
    max_pow2::<T>()
  } else {
    T::one() << shift as usize
  }
}

/// [`next_pow2`] of `max(v, floor)`.
#[inline]
pub fn next_pow2_at_least<T: PrimInt + Unsigned>(
  v: T,
  floor: T,
) -> T {
  next_pow2(v.max(floor))
}

/// Grows `old` by a power-of-two factor until it reaches `requested` (and at
/// least `min`), never going past `max`.
///
/// If `requested <= old` the old value comes back untouched, even when it
/// lies outside `[min, max]`. With `old == 0` there is nothing to double and
/// the target is clamped into `[.., max]` directly.
///
/// ```rust
/// use rmemkit::capacity::grow_target;
///
/// assert_eq!(grow_target(16u32, 17, 1, 1024), 32);
/// assert_eq!(grow_target(16u32, 100, 1, 1024), 128);
/// assert_eq!(grow_target(16u32, 5000, 1, 1024), 1024);
/// assert_eq!(grow_target(16u32, 8, 32, 64), 16);
/// ```
pub fn grow_target<T: PrimInt + Unsigned>(
  old: T,
  requested: T,
  min: T,
  max: T,
) -> T {
  if requested <= old {
    return old;
  }

  let target = requested.max(min);
  if old.is_zero() {
    return target.min(max);
  }

  // ceil(target / old) without overflow; target >= 1 here.
  let ratio = T::one() + (target - T::one()) / old;
  let grow = next_pow2(ratio);

  if grow > max / old {
    max
  } else {
    (old * grow).min(max)
  }
}
