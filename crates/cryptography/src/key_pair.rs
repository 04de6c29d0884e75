//! Key pairs for oracle accounts.

use crate::{CryptoError, ECDsa, ECPoint, Result};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::SecretKey;
use rand::RngCore;

/// A secp256r1 key pair held by the local wallet.
///
/// Wallet file formats and key encryption live with the embedder; the
/// service only ever sees decrypted pairs.
#[derive(Clone)]
pub struct KeyPair {
    private_key: [u8; 32],
    public_key: ECPoint,
}

impl KeyPair {
    /// Creates a new random key pair.
    pub fn generate() -> Self {
        loop {
            let mut private_key = [0u8; 32];
            rand::thread_rng().fill_bytes(&mut private_key);
            if let Ok(pair) = Self::from_private_key(&private_key) {
                return pair;
            }
        }
    }

    /// Creates a key pair from a 32-byte private key.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self> {
        let key_bytes: [u8; 32] = private_key
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("private key must be 32 bytes".to_string()))?;

        let secret_key = SecretKey::from_bytes((&key_bytes).into())
            .map_err(|e| CryptoError::InvalidKey(format!("invalid private key: {e}")))?;
        let encoded = secret_key.public_key().to_encoded_point(true);
        let public_key = ECPoint::decode(encoded.as_bytes())?;

        Ok(Self {
            private_key: key_bytes,
            public_key,
        })
    }

    /// Gets the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        self.private_key
    }

    /// Gets the public key point.
    pub fn public_key(&self) -> ECPoint {
        self.public_key
    }

    /// Signs data with this key pair.
    pub fn sign(&self, data: &[u8]) -> Result<[u8; 64]> {
        ECDsa::sign(data, &self.private_key)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never prints the private half.
        write!(f, "KeyPair({})", self.public_key)
    }
}
