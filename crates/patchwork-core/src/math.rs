//! Small numeric helpers shared by the primitives.

/// Flushes values below 1e-20 in magnitude to zero.
///
/// Recursive filter state decays toward zero indefinitely when the input goes
/// silent; once it reaches the subnormal range every operation on it becomes
/// dramatically slower on most CPUs.
///
/// Reference: IEEE 754-2008, Section 3.4 (Subnormal numbers)
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}
