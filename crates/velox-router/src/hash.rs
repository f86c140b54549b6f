//! Route identity hashing.
//!
//! Routes are keyed by a 64-bit FNV-1a hash of the method name followed by
//! the path. The same value is used as the static-table key and as the base
//! hash for the membership filter, so a lookup hashes the request once.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Folds `bytes` into a running FNV-1a state.
#[inline]
pub(crate) fn fnv1a_extend(mut hash: u64, bytes: &[u8]) -> u64 {
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a over a single byte string.
#[inline]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    fnv1a_extend(FNV_OFFSET_BASIS, bytes)
}

/// Identity hash of a `(method, path)` pair.
///
/// Equivalent to `fnv1a(method + path)` without building the concatenated
/// string.
#[inline]
pub fn route_hash(method: &str, path: &str) -> u64 {
    let hash = fnv1a_extend(FNV_OFFSET_BASIS, method.as_bytes());
    fnv1a_extend(hash, path.as_bytes())
}
