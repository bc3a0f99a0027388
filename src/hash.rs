//! StringHasher: multiplicative string hash reduced to a bucket index.

/// Multiplier applied to the accumulator before each byte is added.
pub const HASH_MULTIPLIER: usize = 65599;

/// Hash `key` into `[0, bucket_count)`.
///
/// The accumulator starts at zero and, for every byte `b` of the key,
/// becomes `acc * HASH_MULTIPLIER + b` in wrapping `usize` arithmetic.
/// Overflow is part of the function, so results depend on the target's
/// pointer width. The final accumulator is reduced modulo `bucket_count`.
///
/// # Panics
///
/// Panics if `bucket_count` is zero.
#[inline]
pub fn hash_key(key: &str, bucket_count: usize) -> usize {
    assert!(bucket_count > 0, "bucket count must be non-zero");
    key.bytes()
        .fold(0usize, |acc, b| {
            acc.wrapping_mul(HASH_MULTIPLIER).wrapping_add(b as usize)
        })
        % bucket_count
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: The empty key hashes to bucket zero for any bucket count.
    #[test]
    fn empty_key_is_bucket_zero() {
        assert_eq!(hash_key("", 509), 0);
        assert_eq!(hash_key("", 1), 0);
    }

    /// Invariant: Short keys that do not overflow match the closed-form polynomial.
    #[test]
    fn matches_polynomial_without_overflow() {
        assert_eq!(hash_key("a", 509), 97 % 509);
        let ab = 97 * HASH_MULTIPLIER + 98;
        assert_eq!(hash_key("ab", 509), ab % 509);
        let abc = (97 * HASH_MULTIPLIER + 98) * HASH_MULTIPLIER + 99;
        assert_eq!(hash_key("abc", 1021), abc % 1021);
    }

    /// Invariant: Long keys wrap instead of panicking, and the result equals an
    /// explicit wrapping computation.
    #[test]
    fn long_keys_wrap_around() {
        let key = "the quick brown fox jumps over the lazy dog".repeat(4);
        let mut acc = 0usize;
        for b in key.bytes() {
            acc = acc.wrapping_mul(HASH_MULTIPLIER).wrapping_add(b as usize);
        }
        assert_eq!(hash_key(&key, 65521), acc % 65521);
    }

    /// Invariant: Bytes above 0x7f contribute their unsigned value.
    #[test]
    fn non_ascii_bytes_are_unsigned() {
        // "é" is 0xC3 0xA9 in UTF-8.
        let expected = (0xC3 * HASH_MULTIPLIER + 0xA9) % 509;
        assert_eq!(hash_key("é", 509), expected);
    }

    /// Invariant: Interior NUL bytes are hashed like any other byte.
    #[test]
    fn interior_nul_is_hashed() {
        assert_ne!(hash_key("a\0b", 65521), hash_key("a", 65521));
    }

    #[test]
    #[should_panic(expected = "bucket count must be non-zero")]
    fn zero_bucket_count_panics() {
        let _ = hash_key("x", 0);
    }
}
