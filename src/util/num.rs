/// Converts a script index to a collection index.
///
/// Returns `None` for negative values or values that do not fit in `usize`.
///
/// ## Example
/// ```
/// use ember::util::num::i64_to_index;
///
/// assert_eq!(i64_to_index(3), Some(3));
/// assert_eq!(i64_to_index(-1), None);
/// ```
#[must_use]
pub fn i64_to_index(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Converts a collection length to a script integer, saturating at `i64::MAX`.
#[must_use]
pub fn len_to_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Promotes an integer to a float for mixed arithmetic.
///
/// Integers beyond 2^53 round to the nearest representable float, which is
/// the documented promotion rule.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn promote(value: i64) -> f64 {
    value as f64
}

/// Converts a float to an integer if it is finite, integral, and in range.
///
/// ## Example
/// ```
/// use ember::util::num::f64_to_i64_exact;
///
/// assert_eq!(f64_to_i64_exact(4.0), Some(4));
/// assert_eq!(f64_to_i64_exact(4.5), None);
/// assert_eq!(f64_to_i64_exact(f64::NAN), None);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#[must_use]
pub fn f64_to_i64_exact(value: f64) -> Option<i64> {
    if !value.is_finite() || value.fract() != 0.0 {
        return None;
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// Truncates a float toward zero, saturating at the `i64` bounds.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn f64_to_i64_saturating(value: f64) -> i64 {
    value as i64
}

/// Formats a float so that it always reads as a float (`2.0`, not `2`).
#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
