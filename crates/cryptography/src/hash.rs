//! Hash functions used by the oracle protocol.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Computes the SHA-256 hash of the input.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Computes the double SHA-256 hash of the input.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Computes RIPEMD160(SHA256(data)), the script-hash function.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash256_is_double_sha256() {
        let data = b"oracle";
        assert_eq!(hash256(data), sha256(&sha256(data)));
    }

    #[test]
    fn test_hash160_length() {
        assert_eq!(hash160(b"script").len(), 20);
    }
}
