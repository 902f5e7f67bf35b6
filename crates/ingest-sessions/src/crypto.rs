use ring::aead::{self, BoundKey, Nonce, NonceSequence, UnboundKey, AES_256_GCM};
use ring::error::Unspecified;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{Result, SessionError};

const NONCE_LEN: usize = 12;

/// Symmetric key loaded once from the configured base64 env value.
///
/// Decryption failure falls back to returning the stored bytes as-is, so a
/// legacy plaintext entry (written before a key was configured) is still
/// readable (§4.1).
pub struct CryptoKey {
    raw: [u8; 32],
}

impl CryptoKey {
    /// Parses a base64-encoded 32-byte key. `None` means "no key configured".
    pub fn from_base64(value: &str) -> Result<Self> {
        let decoded = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, value.trim())
            .map_err(|e| SessionError::BadKey(e.to_string()))?;
        if decoded.len() != 32 {
            return Err(SessionError::BadKey(format!(
                "expected 32 bytes, got {}",
                decoded.len()
            )));
        }
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&decoded);
        Ok(Self { raw })
    }

    /// Encrypts `plaintext`, returning `(ciphertext_with_tag, nonce)`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN])> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.raw)
            .map_err(|_| SessionError::BadKey("invalid AES-256-GCM key material".into()))?;
        let mut nonce_bytes = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce_bytes)
            .map_err(|_| SessionError::BadKey("RNG failure".into()))?;
        let mut key = aead::SealingKey::new(unbound, FixedNonce(Some(nonce_bytes)));
        let mut in_out = plaintext.to_vec();
        key.seal_in_place_append_tag(aead::Aad::empty(), &mut in_out)
            .map_err(|_| SessionError::BadKey("seal failed".into()))?;
        Ok((in_out, nonce_bytes))
    }

    /// Decrypts an (ciphertext, nonce) pair produced by `encrypt`. Returns
    /// `None` on any failure so the caller can fall back to raw bytes.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: [u8; NONCE_LEN]) -> Option<Vec<u8>> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.raw).ok()?;
        let mut key = aead::OpeningKey::new(unbound, FixedNonce(Some(nonce)));
        let mut in_out = ciphertext.to_vec();
        let plaintext = key.open_in_place(aead::Aad::empty(), &mut in_out).ok()?;
        Some(plaintext.to_vec())
    }
}

struct FixedNonce(Option<[u8; NONCE_LEN]>);

impl NonceSequence for FixedNonce {
    fn advance(&mut self) -> std::result::Result<Nonce, Unspecified> {
        let bytes = self.0.take().ok_or(Unspecified)?;
        Nonce::try_assume_unique_for_key(&bytes)
    }
}
