//! Adler-32 checksum used as the default key hash for byte-sequence keys.
use crate::hash::KeyHasher;

/// Largest prime below 2^16.
pub const MOD_ADLER: u32 = 65521;

/// Computes the Adler-32 checksum of `bytes`.
///
/// This is a checksum and not a cryptographic hash: it is fast and deterministic but offers no
/// resistance against adversarial inputs. Collisions only cost probe steps, never correctness.
#[inline]
pub fn adler32(bytes: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in bytes {
        a = (a + byte as u32) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }
    (b << 16) | a
}

/// Key hasher that runs [`adler32`] over the raw bytes of a key.
///
/// Unlike hashing via [`std::hash::Hash`], no length prefix is mixed in, so owned and borrowed
/// forms of a key (`Vec<u8>` and `[u8]`, `String` and `str`) always produce the same digest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Adler32;

impl KeyHasher<[u8]> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &[u8]) -> u64 {
        adler32(key) as u64
    }
}

impl<const N: usize> KeyHasher<[u8; N]> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &[u8; N]) -> u64 {
        adler32(key) as u64
    }
}

impl KeyHasher<Vec<u8>> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &Vec<u8>) -> u64 {
        adler32(key) as u64
    }
}

impl KeyHasher<Box<[u8]>> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &Box<[u8]>) -> u64 {
        adler32(key) as u64
    }
}

impl KeyHasher<str> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        adler32(key.as_bytes()) as u64
    }
}

impl KeyHasher<String> for Adler32 {
    #[inline]
    fn hash_key(&self, key: &String) -> u64 {
        adler32(key.as_bytes()) as u64
    }
}
