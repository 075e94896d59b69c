const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Number of decimal places a float is rendered with before hashing.
///
/// Two floats that agree to this many places produce the same hash key.
pub const FLOAT_KEY_PRECISION: usize = 10;

/// 64-bit FNV-1a over `bytes`.
///
/// ## Example
/// ```
/// use ember::util::hash::fnv1a;
///
/// assert_eq!(fnv1a(b""), 0xcbf2_9ce4_8422_2325);
/// assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
/// ```
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
                    (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
                })
}

/// Hash of a float's canonical text form.
#[must_use]
pub fn float_hash(value: f64) -> u64 {
    fnv1a(format!("{value:.FLOAT_KEY_PRECISION$}").as_bytes())
}
