//! Alignment arithmetic used by the pool and providers

/// Aligns a value up to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use disjoint_pool::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline(always)]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Aligns a value down to the nearest multiple of alignment
///
/// # Examples
/// ```
/// use disjoint_pool::utils::align_down;
///
/// assert_eq!(align_down(7, 8), 0);
/// assert_eq!(align_down(9, 8), 8);
/// ```
#[inline(always)]
pub const fn align_down(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    value & !(alignment - 1)
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use disjoint_pool::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(!is_aligned(17, 8));
/// ```
#[inline(always)]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

/// Rounds up to the next power of two
///
/// # Examples
/// ```
/// use disjoint_pool::utils::next_power_of_two;
///
/// assert_eq!(next_power_of_two(7), 8);
/// assert_eq!(next_power_of_two(8), 8);
/// assert_eq!(next_power_of_two(9), 16);
/// ```
#[inline(always)]
pub const fn next_power_of_two(mut value: usize) -> usize {
    if value == 0 {
        return 1;
    }
    value -= 1;
    value |= value >> 1;
    value |= value >> 2;
    value |= value >> 4;
    value |= value >> 8;
    value |= value >> 16;
    #[cfg(target_pointer_width = "64")]
    {
        value |= value >> 32;
    }
    value + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_round_trip() {
        for align in [1usize, 2, 4, 8, 64, 4096] {
            for v in [0usize, 1, 7, 63, 64, 65, 4095, 4096] {
                let up = align_up(v, align);
                assert!(is_aligned(up, align));
                assert!(up >= v && up < v + align);
                assert!(align_down(up, align) == up);
            }
        }
    }
}
