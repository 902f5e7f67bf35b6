use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension};
use tracing::{instrument, warn};

use crate::crypto::CryptoKey;
use crate::error::Result;
use crate::types::Credential;

/// Key-value session store (C1): encrypted credential blobs keyed by
/// identity-id. `get`/`put` are the whole surface — no rotation, no TTL.
pub struct SessionStore {
    db: Mutex<Connection>,
    key: Option<CryptoKey>,
}

impl SessionStore {
    /// Wrap an already-`init_db`-initialised connection. `crypto_key` is a
    /// base64-encoded 32-byte AES-256-GCM key; `None` stores plaintext.
    pub fn new(conn: Connection, crypto_key: Option<&str>) -> Result<Self> {
        let key = crypto_key.map(CryptoKey::from_base64).transpose()?;
        Ok(Self {
            db: Mutex::new(conn),
            key,
        })
    }

    /// Stores `credential` for `identity_id`, encrypting it if a key is
    /// configured.
    #[instrument(skip(self, credential), fields(identity_id))]
    pub fn put(&self, identity_id: &str, credential: &Credential) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let (blob, nonce) = match &self.key {
            Some(key) => {
                let (ciphertext, nonce) = key.encrypt(credential.as_bytes())?;
                (ciphertext, Some(nonce.to_vec()))
            }
            None => (credential.as_bytes().to_vec(), None),
        };

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO identity_credentials (identity_id, blob, nonce, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(identity_id) DO UPDATE SET
                blob = excluded.blob, nonce = excluded.nonce, updated_at = excluded.updated_at",
            rusqlite::params![identity_id, blob, nonce, now],
        )?;
        Ok(())
    }

    /// Returns the stored credential for `identity_id`, or `None` if absent.
    ///
    /// Decryption failure falls back to the stored bytes as-is, supporting
    /// plaintext legacy entries written before a key was configured (§4.1).
    #[instrument(skip(self), fields(identity_id))]
    pub fn get(&self, identity_id: &str) -> Result<Option<Credential>> {
        let db = self.db.lock().unwrap();
        let row: Option<(Vec<u8>, Option<Vec<u8>>)> = db
            .query_row(
                "SELECT blob, nonce FROM identity_credentials WHERE identity_id = ?1",
                [identity_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        let Some((blob, nonce)) = row else {
            return Ok(None);
        };

        let plaintext = match (&self.key, nonce) {
            (Some(key), Some(nonce_bytes)) if nonce_bytes.len() == 12 => {
                let mut n = [0u8; 12];
                n.copy_from_slice(&nonce_bytes);
                key.decrypt(&blob, n).unwrap_or_else(|| {
                    warn!(identity_id, "decryption failed, returning stored bytes as-is");
                    blob.clone()
                })
            }
            _ => blob,
        };

        Ok(Some(Credential::from_bytes(plaintext)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(key: Option<&str>) -> SessionStore {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_db(&conn).unwrap();
        SessionStore::new(conn, key).unwrap()
    }

    #[test]
    fn roundtrip_without_key_is_plaintext() {
        let s = store(None);
        s.put("acct-1", &Credential::from_bytes(b"session-bytes".to_vec())).unwrap();
        let got = s.get("acct-1").unwrap().unwrap();
        assert_eq!(got.as_bytes(), b"session-bytes");
    }

    #[test]
    fn roundtrip_with_key_is_encrypted_at_rest() {
        let key = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, [7u8; 32]);
        let s = store(Some(&key));
        s.put("acct-2", &Credential::from_bytes(b"top-secret".to_vec())).unwrap();
        let got = s.get("acct-2").unwrap().unwrap();
        assert_eq!(got.as_bytes(), b"top-secret");
    }

    #[test]
    fn missing_identity_returns_none() {
        let s = store(None);
        assert!(s.get("nobody").unwrap().is_none());
    }
}
