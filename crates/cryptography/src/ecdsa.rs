//! ECDSA over secp256r1.
//!
//! Signatures are the 64-byte r||s format the chain expects. Message
//! digests are SHA-256, computed inside the `p256` signer (RFC 6979
//! deterministic nonces).

use crate::{CryptoError, ECPoint, Result};
use p256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use p256::{PublicKey, SecretKey};

/// Size of a signature in bytes (r || s).
pub const SIGNATURE_SIZE: usize = 64;

/// ECDSA signing and verification for the oracle curve.
pub struct ECDsa;

impl ECDsa {
    /// Signs data with the given private key, returning the r||s signature.
    pub fn sign(data: &[u8], private_key: &[u8; 32]) -> Result<[u8; SIGNATURE_SIZE]> {
        let secret_key = SecretKey::from_bytes(private_key.into())
            .map_err(|e| CryptoError::InvalidKey(format!("invalid private key: {e}")))?;
        let signing_key = SigningKey::from(secret_key);

        let signature: Signature = signing_key.sign(data);

        let mut result = [0u8; SIGNATURE_SIZE];
        result.copy_from_slice(&signature.to_bytes());
        Ok(result)
    }

    /// Verifies an r||s signature over data under the given public key.
    ///
    /// Malformed signatures verify as false rather than erroring; callers
    /// treat both the same way.
    pub fn verify(data: &[u8], signature: &[u8], public_key: &ECPoint) -> bool {
        if signature.len() != SIGNATURE_SIZE {
            return false;
        }
        let Ok(sig) = Signature::from_slice(signature) else {
            return false;
        };
        let Ok(pub_key) = PublicKey::from_sec1_bytes(public_key.as_bytes()) else {
            return false;
        };
        let verifying_key = VerifyingKey::from(pub_key);
        verifying_key.verify(data, &sig).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyPair;

    #[test]
    fn test_sign_and_verify() {
        let keypair = KeyPair::generate();
        let data = b"response transaction sign data";

        let signature = ECDsa::sign(data, &keypair.private_key()).expect("signing succeeds");
        assert_eq!(signature.len(), SIGNATURE_SIZE);
        assert!(ECDsa::verify(data, &signature, &keypair.public_key()));

        assert!(!ECDsa::verify(b"other data", &signature, &keypair.public_key()));
        let other = KeyPair::generate();
        assert!(!ECDsa::verify(data, &signature, &other.public_key()));
    }

    #[test]
    fn test_verify_rejects_malformed_signature() {
        let keypair = KeyPair::generate();
        assert!(!ECDsa::verify(b"data", &[0u8; 10], &keypair.public_key()));
        assert!(!ECDsa::verify(b"data", &[0u8; SIGNATURE_SIZE], &keypair.public_key()));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let keypair = KeyPair::generate();
        let data = b"deterministic";
        let a = ECDsa::sign(data, &keypair.private_key()).unwrap();
        let b = ECDsa::sign(data, &keypair.private_key()).unwrap();
        assert_eq!(a, b);
    }
}
