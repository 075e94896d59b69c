/// Numeric conversion helpers.
///
/// Safe conversions between the integer and floating-point types the
/// interpreter juggles: script integers are `i64`, collection indices are
/// `usize`, and floats are `f64`. Conversions that can lose information return
/// an `Option` instead of truncating silently.
pub mod num;
/// Hashing helpers.
///
/// The FNV-1a hash used to build hash keys for strings and floats.
pub mod hash;
/// Stack growth for deep recursion.
///
/// The evaluator recurses once per nested expression; this module keeps the
/// host stack from overflowing on deeply nested programs.
pub mod stack;
