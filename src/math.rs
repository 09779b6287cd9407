//! Small numeric helpers shared by the parser and the note map.

/// Returns the floored division and the non-negative remainder of `numer` and `denom`.
///
/// The remainder is always in `0..denom` and `result.0 * denom + result.1 == numer`.
///
/// # Panics
///
/// Panics if `denom == 0`.
///
/// # Examples
///
/// ```
/// # use scala_notemap::math;
/// // numer is positive
/// assert_eq!(math::floor_div_mod(1, 5), (0, 1));
/// assert_eq!(math::floor_div_mod(4, 5), (0, 4));
/// assert_eq!(math::floor_div_mod(5, 5), (1, 0));
/// assert_eq!(math::floor_div_mod(6, 5), (1, 1));
///
/// // numer is negative
/// assert_eq!(math::floor_div_mod(-6, 5), (-2, 4));
/// assert_eq!(math::floor_div_mod(-5, 5), (-1, 0));
/// assert_eq!(math::floor_div_mod(-4, 5), (-1, 1));
/// assert_eq!(math::floor_div_mod(-1, 5), (-1, 4));
///
/// // numer is zero
/// assert_eq!(math::floor_div_mod(0, 5), (0, 0));
/// ```
pub fn floor_div_mod(numer: i32, denom: u16) -> (i32, u16) {
    let denom = i32::from(denom);
    // rem_euclid is in 0..denom, so it always fits into the u16 range
    (numer.div_euclid(denom), numer.rem_euclid(denom) as u16)
}

/// Converts a logarithmic cents value into a linear frequency ratio.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::math;
/// assert_approx_eq!(math::cents_to_ratio(0.0), 1.0);
/// assert_approx_eq!(math::cents_to_ratio(1200.0), 2.0);
/// assert_approx_eq!(math::cents_to_ratio(700.0), 1.498307);
/// assert_approx_eq!(math::cents_to_ratio(-1200.0), 0.5);
/// ```
pub fn cents_to_ratio(cents: f64) -> f64 {
    (cents / 1200.0).exp2()
}

/// Converts a linear frequency ratio into cents.
///
/// # Examples
///
/// ```
/// # use assert_approx_eq::assert_approx_eq;
/// # use scala_notemap::math;
/// assert_approx_eq!(math::ratio_to_cents(2.0), 1200.0);
/// assert_approx_eq!(math::ratio_to_cents(1.5), 701.955);
/// ```
pub fn ratio_to_cents(ratio: f64) -> f64 {
    ratio.log2() * 1200.0
}

/// Linear interpolation between `from` and `to`.
pub fn lerp(from: f64, to: f64, interpolation: f64) -> f64 {
    from + (to - from) * interpolation
}
