//! # Hasher Module
//!
//! Computes cryptographic digests of plaintext column values.
//!
//! ## Supported Algorithms
//! - **RIPEMD-160** - 160-bit legacy digest
//! - **SHA-224 / SHA-256 / SHA-384 / SHA-512** - the SHA-2 family
//!
//! ## How It Works
//! Input text is encoded as UTF-8 and digested with a fresh context per
//! value, so identical plaintext always yields the identical hex string
//! regardless of how many values were hashed before it. No salt, no key.
//!
//! ## Example
//! ```rust,ignore
//! use excel_hash_mapper::core::hasher::{HashAlgorithm, HashEngine};
//!
//! let engine = HashEngine::new(HashAlgorithm::Sha256);
//! let hex = engine.digest_hex("Alice");
//! ```

use crate::error::ConfigError;
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use std::str::FromStr;

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// RIPEMD-160 - 160-bit digest
    Ripemd160,
    /// SHA-224 - truncated SHA-256 variant
    Sha224,
    /// SHA-256 - the common default
    Sha256,
    /// SHA-384 - truncated SHA-512 variant
    Sha384,
    /// SHA-512 - 512-bit digest
    Sha512,
}

impl HashAlgorithm {
    /// Lowercase token used in output file names, e.g. `sha256`
    pub fn token(&self) -> &'static str {
        match self {
            HashAlgorithm::Ripemd160 => "ripemd160",
            HashAlgorithm::Sha224 => "sha224",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest length in hex characters
    pub fn hex_len(&self) -> usize {
        match self {
            HashAlgorithm::Ripemd160 => 40,
            HashAlgorithm::Sha224 => 56,
            HashAlgorithm::Sha256 => 64,
            HashAlgorithm::Sha384 => 96,
            HashAlgorithm::Sha512 => 128,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ripemd160" => Ok(HashAlgorithm::Ripemd160),
            "sha224" => Ok(HashAlgorithm::Sha224),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            other => Err(ConfigError::UnsupportedAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Digests plaintext values under a fixed algorithm.
///
/// The engine is immutable once created; the algorithm is selected at run
/// start and never changes mid-run.
#[derive(Debug, Clone, Copy)]
pub struct HashEngine {
    algorithm: HashAlgorithm,
}

impl HashEngine {
    /// Create an engine for the given algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The algorithm this engine digests with
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Digest a plaintext value to its lowercase hex string.
    ///
    /// Each call uses a fresh digest context, so calls are independent and
    /// safe to repeat over millions of values.
    pub fn digest_hex(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        match self.algorithm {
            HashAlgorithm::Ripemd160 => to_hex(&Ripemd160::digest(bytes)),
            HashAlgorithm::Sha224 => to_hex(&Sha224::digest(bytes)),
            HashAlgorithm::Sha256 => to_hex(&Sha256::digest(bytes)),
            HashAlgorithm::Sha384 => to_hex(&Sha384::digest(bytes)),
            HashAlgorithm::Sha512 => to_hex(&Sha512::digest(bytes)),
        }
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_matches_known_vector() {
        let engine = HashEngine::new(HashAlgorithm::Sha256);
        assert_eq!(
            engine.digest_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ripemd160_matches_known_vector() {
        let engine = HashEngine::new(HashAlgorithm::Ripemd160);
        assert_eq!(
            engine.digest_hex("abc"),
            "8eb208f7e05d987a9b044a8e98c6b087f15a0bfc"
        );
    }

    #[test]
    fn sha224_matches_known_vector() {
        let engine = HashEngine::new(HashAlgorithm::Sha224);
        assert_eq!(
            engine.digest_hex("abc"),
            "23097d223405d8228642a477bda255b32aadbce4bda0b3f7e36c9da7"
        );
    }

    #[test]
    fn sha384_matches_known_vector() {
        let engine = HashEngine::new(HashAlgorithm::Sha384);
        assert_eq!(
            engine.digest_hex("abc"),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7"
        );
    }

    #[test]
    fn sha512_matches_known_vector() {
        let engine = HashEngine::new(HashAlgorithm::Sha512);
        assert_eq!(
            engine.digest_hex("abc"),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn digests_are_deterministic() {
        let engine = HashEngine::new(HashAlgorithm::Sha512);
        let first = engine.digest_hex("Purchase History");
        for _ in 0..100 {
            assert_eq!(engine.digest_hex("Purchase History"), first);
        }
    }

    #[test]
    fn utf8_encoding_is_stable() {
        // Multi-byte input must digest its UTF-8 bytes, not some other encoding
        let engine = HashEngine::new(HashAlgorithm::Sha256);
        assert_eq!(
            engine.digest_hex("café"),
            "850f7dc43910ff890f8879c0ed26fe697c93a067ad93a7d50f466a7028a9bf4e"
        );
    }

    #[test]
    fn empty_string_digests() {
        let engine = HashEngine::new(HashAlgorithm::Sha256);
        assert_eq!(
            engine.digest_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hex_length_matches_algorithm() {
        for algorithm in [
            HashAlgorithm::Ripemd160,
            HashAlgorithm::Sha224,
            HashAlgorithm::Sha256,
            HashAlgorithm::Sha384,
            HashAlgorithm::Sha512,
        ] {
            let engine = HashEngine::new(algorithm);
            assert_eq!(engine.digest_hex("x").len(), algorithm.hex_len());
        }
    }

    #[test]
    fn parses_lowercase_tokens() {
        assert_eq!(
            "sha256".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Sha256
        );
        assert_eq!(
            "RIPEMD160".parse::<HashAlgorithm>().unwrap(),
            HashAlgorithm::Ripemd160
        );
    }

    #[test]
    fn unknown_algorithm_is_a_config_error() {
        let err = "md5".parse::<HashAlgorithm>().unwrap_err();
        assert!(err.to_string().contains("md5"));
    }
}
