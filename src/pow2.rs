//! Power-of-two helpers used to validate every transform dimension.

/// Round `v` up to the nearest power of two.
///
/// A value with exactly one bit set is returned unchanged. Otherwise the
/// result is the power of two one bit wider than `v`. `0` maps to `0`, as does
/// any value above `2^31` that is not itself a power of two (there is no `u32`
/// answer); callers treat `0` as an invalid dimension.
///
/// ```
/// use tilefft::pow2::round_up_power_of_two;
/// assert_eq!(round_up_power_of_two(5), 8);
/// assert_eq!(round_up_power_of_two(8), 8);
/// ```
pub fn round_up_power_of_two(v: u32) -> u32 {
    if v == 0 {
        return 0;
    }
    if v.count_ones() == 1 {
        return v;
    }
    let bits = u32::BITS - v.leading_zeros();
    1u32.checked_shl(bits).unwrap_or(0)
}

/// `true` when `v` is a non-zero power of two.
#[inline]
pub fn is_power_of_two(v: usize) -> bool {
    v != 0 && v & (v - 1) == 0
}

/// Base-2 logarithm of a power of two, `None` for any other value.
#[inline]
pub fn log2_exact(v: usize) -> Option<u32> {
    if is_power_of_two(v) {
        Some(v.trailing_zeros())
    } else {
        None
    }
}

/// Check a transform dimension the way [`round_up_power_of_two`] sees it:
/// it must fit in `u32`, be non-zero and survive rounding unchanged.
pub(crate) fn is_valid_dimension(v: usize) -> bool {
    match u32::try_from(v) {
        Ok(d) => d != 0 && round_up_power_of_two(d) == d,
        Err(_) => false,
    }
}
