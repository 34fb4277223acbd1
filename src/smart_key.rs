//! Smart keys bind an external account to a dashboard view without a session.
//!
//! A token is `base64url(nonce || ciphertext)` sealed with ChaCha20-Poly1305
//! under a key derived as `SHA-256("{secret}-{salt}")`, where the salt is the
//! owner's profile id. Verification decrypts both tokens and compares the
//! plaintexts, so two tokens sealed with different nonces still match.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::error::SmartKeyError;

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
pub const NONCE_LEN: usize = 12;

/// ChaCha20-Poly1305 auth tag length (16 bytes)
pub const AUTH_TAG_LEN: usize = 16;

#[derive(Clone)]
pub struct SmartKeyVerifier {
    secret: Zeroizing<String>,
}

impl std::fmt::Debug for SmartKeyVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartKeyVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl SmartKeyVerifier {
    /// `secret` is the server-side namespace shared by every user's key.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    fn derive_key(&self, salt: &str) -> Zeroizing<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b"-");
        hasher.update(salt.as_bytes());
        Zeroizing::new(hasher.finalize().into())
    }

    fn cipher(&self, salt: &str) -> ChaCha20Poly1305 {
        let key = self.derive_key(salt);
        ChaCha20Poly1305::new(Key::from_slice(&key[..]))
    }

    /// Seal `plaintext` into a new token for the user identified by `salt`.
    pub fn issue(&self, plaintext: &[u8], salt: &str) -> Result<String, SmartKeyError> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher(salt)
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| SmartKeyError::Encryption)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a token. Fails for malformed tokens and for tokens sealed under
    /// another secret or salt.
    pub fn decrypt(&self, token: &str, salt: &str) -> Result<Zeroizing<Vec<u8>>, SmartKeyError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|e| SmartKeyError::Malformed(e.to_string()))?;
        if sealed.len() < NONCE_LEN + AUTH_TAG_LEN {
            return Err(SmartKeyError::Malformed(format!(
                "expected at least {} bytes, got {}",
                NONCE_LEN + AUTH_TAG_LEN,
                sealed.len()
            )));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        self.cipher(salt)
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| SmartKeyError::Decryption)
    }

    /// Compare two tokens by their plaintexts, surfacing decryption failures.
    pub fn check(&self, candidate: &str, stored: &str, salt: &str) -> Result<bool, SmartKeyError> {
        let candidate = self.decrypt(candidate, salt)?;
        let stored = self.decrypt(stored, salt)?;
        Ok(constant_time_eq(&candidate, &stored))
    }

    /// Like [`check`](Self::check), with any failure counted as a mismatch.
    pub fn verify(&self, candidate: &str, stored: &str, salt: &str) -> bool {
        match self.check(candidate, stored, salt) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("smart key rejected: {e}");
                false
            }
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "client-secret";
    const PROFILE: &str = "1789234";

    #[test]
    fn test_issue_then_verify() {
        let verifier = SmartKeyVerifier::new(SECRET);
        let key = verifier.issue(b"goat-4f2a", PROFILE).unwrap();

        assert!(verifier.verify(&key, &key, PROFILE));
        assert_eq!(&verifier.decrypt(&key, PROFILE).unwrap()[..], b"goat-4f2a");
    }

    #[test]
    fn test_fresh_nonce_still_matches() {
        let verifier = SmartKeyVerifier::new(SECRET);
        let first = verifier.issue(b"goat-4f2a", PROFILE).unwrap();
        let second = verifier.issue(b"goat-4f2a", PROFILE).unwrap();

        assert_ne!(first, second);
        assert!(verifier.verify(&first, &second, PROFILE));
    }

    #[test]
    fn test_different_plaintext_does_not_match() {
        let verifier = SmartKeyVerifier::new(SECRET);
        let stored = verifier.issue(b"goat-4f2a", PROFILE).unwrap();
        let candidate = verifier.issue(b"goat-0000", PROFILE).unwrap();

        assert_eq!(verifier.check(&candidate, &stored, PROFILE), Ok(false));
        assert!(!verifier.verify(&candidate, &stored, PROFILE));
    }

    #[test]
    fn test_other_salt_fails_without_panicking() {
        let verifier = SmartKeyVerifier::new(SECRET);
        let stored = verifier.issue(b"goat-4f2a", PROFILE).unwrap();
        let foreign = verifier.issue(b"goat-4f2a", "999").unwrap();

        assert!(!verifier.verify(&foreign, &stored, PROFILE));
        assert_eq!(
            verifier.check(&foreign, &stored, PROFILE),
            Err(SmartKeyError::Decryption)
        );
    }

    #[test]
    fn test_other_secret_fails() {
        let stored = SmartKeyVerifier::new(SECRET)
            .issue(b"goat-4f2a", PROFILE)
            .unwrap();
        let other = SmartKeyVerifier::new("rotated-secret");

        assert!(!other.verify(&stored, &stored, PROFILE));
    }

    #[test]
    fn test_malformed_tokens() {
        let verifier = SmartKeyVerifier::new(SECRET);
        let stored = verifier.issue(b"goat-4f2a", PROFILE).unwrap();

        for bad in ["", "!!not base64!!", "c2hvcnQ"] {
            assert!(!verifier.verify(bad, &stored, PROFILE));
            assert!(matches!(
                verifier.decrypt(bad, PROFILE),
                Err(SmartKeyError::Malformed(_))
            ));
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let verifier = SmartKeyVerifier::new(SECRET);
        assert!(!format!("{verifier:?}").contains(SECRET));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }
}
