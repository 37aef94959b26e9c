//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f32 into a usize, returning 0 for negative or non-finite values.
#[must_use]
pub fn floor_f32_to_usize(value: f32) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    cast::<f32, usize>(value.floor()).unwrap_or(usize::MAX)
}

/// Convert a slice count or index to f32 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f32(value: usize) -> f32 {
    cast::<usize, f32>(value).unwrap_or(f32::MAX)
}

/// Convert a turn count to f32 while allowing precision loss in a single location.
#[must_use]
pub fn u32_to_f32(value: u32) -> f32 {
    cast::<u32, f32>(value).unwrap_or(f32::MAX)
}

/// Convert a collection length into a u32 range bound, saturating at `u32::MAX`.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
