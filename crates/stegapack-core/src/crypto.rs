//! AES-256-GCM payload encryption.
//!
//! The wire layout is `nonce(12) || ciphertext || tag(16)`. The key is the
//! SHA-256 digest of the password bytes; existing stego files depend on that
//! derivation, so it stays even though a salted KDF would resist brute force
//! better.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::StegaError;
use crate::result::Result;

pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// 256-bit key material, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    pub fn derive(password: &str) -> Self {
        let digest = Sha256::digest(password.as_bytes());
        SecretKey(digest.into())
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

pub fn encrypt(key: &SecretKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| StegaError::EncryptionFailed)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| StegaError::EncryptionFailed)?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn decrypt(key: &SecretKey, blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(StegaError::DecryptionFailed);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new_from_slice(&key.0).map_err(|_| StegaError::EncryptionFailed)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| StegaError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips() {
        let key = SecretKey::derive("correct horse battery staple");
        let plaintext = b"some compressed payload bytes";

        let blob = encrypt(&key, plaintext).unwrap();
        assert_eq!(blob.len(), NONCE_LEN + plaintext.len() + TAG_LEN);
        assert_eq!(decrypt(&key, &blob).unwrap(), plaintext);
    }

    #[test]
    fn fresh_nonce_per_call() {
        let key = SecretKey::derive("pw");
        let a = encrypt(&key, b"same input").unwrap();
        let b = encrypt(&key, b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_wrong_password() {
        let blob = encrypt(&SecretKey::derive("right"), b"secret").unwrap();
        assert!(matches!(
            decrypt(&SecretKey::derive("wrong"), &blob),
            Err(StegaError::DecryptionFailed)
        ));
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let key = SecretKey::derive("pw");
        let mut blob = encrypt(&key, b"tamper target").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert!(matches!(
            decrypt(&key, &blob),
            Err(StegaError::DecryptionFailed)
        ));
    }

    #[test]
    fn rejects_short_blob() {
        let key = SecretKey::derive("pw");
        assert!(matches!(
            decrypt(&key, &[0u8; 8]),
            Err(StegaError::DecryptionFailed)
        ));
    }

    #[test]
    fn key_debug_is_redacted() {
        let key = SecretKey::derive("pw");
        assert_eq!(format!("{key:?}"), "SecretKey([REDACTED])");
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = SecretKey::derive("pw");
        let b = SecretKey::derive("pw");
        let blob = encrypt(&a, b"x").unwrap();
        assert!(decrypt(&b, &blob).is_ok());
    }
}
