//! # Document number encryption at rest
//!
//! Document numbers are the only sensitive column in the store. They are
//! sealed with **AES-256-GCM** under the key from `ENCRYPTION_KEY` (64 hex
//! chars) and a fresh random 12-byte nonce per write.
//!
//! Stored form: `hex(nonce) ":" hex(ciphertext)`. An empty number is stored as
//! an empty string.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.2.0

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use anyhow::{anyhow, Result};

const NONCE_LEN: usize = 12;

#[derive(Clone)]
pub struct DocumentCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for DocumentCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DocumentCipher(..)")
    }
}

impl DocumentCipher {
    /// Build from a 64 hex-char key
    pub fn from_hex_key(hex_key: &str) -> Result<Self> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| anyhow!("Invalid ENCRYPTION_KEY hex: {}", e))?;
        if bytes.len() != 32 {
            return Err(anyhow!(
                "ENCRYPTION_KEY must be 64 hex chars (32 bytes), got {} bytes",
                bytes.len()
            ));
        }
        let cipher = Aes256Gcm::new_from_slice(&bytes)
            .map_err(|e| anyhow!("Failed to create cipher: {}", e))?;
        Ok(Self { cipher })
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("Encryption failed: {}", e))?;

        Ok(format!("{}:{}", hex::encode(nonce_bytes), hex::encode(ciphertext)))
    }

    pub fn decrypt(&self, stored: &str) -> Result<String> {
        if stored.is_empty() {
            return Ok(String::new());
        }

        let (nonce_hex, body_hex) = stored
            .split_once(':')
            .ok_or_else(|| anyhow!("Malformed encrypted value"))?;
        let nonce_bytes = hex::decode(nonce_hex).map_err(|e| anyhow!("Invalid nonce hex: {}", e))?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(anyhow!("Invalid nonce length: {}", nonce_bytes.len()));
        }
        let body = hex::decode(body_hex).map_err(|e| anyhow!("Invalid ciphertext hex: {}", e))?;

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce_bytes), body.as_ref())
            .map_err(|e| anyhow!("Decryption failed: {}", e))?;

        String::from_utf8(plaintext).map_err(|e| anyhow!("Decrypted value is not UTF-8: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
    const OTHER_KEY: &str = "ff0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    #[test]
    fn test_encrypt_then_decrypt() {
        let cipher = DocumentCipher::from_hex_key(KEY).unwrap();
        let stored = cipher.encrypt("AB1234567").unwrap();
        assert!(!stored.contains("AB1234567"));
        assert_eq!(cipher.decrypt(&stored).unwrap(), "AB1234567");
    }

    #[test]
    fn test_fresh_nonce_per_write() {
        let cipher = DocumentCipher::from_hex_key(KEY).unwrap();
        let a = cipher.encrypt("123456789").unwrap();
        let b = cipher.encrypt("123456789").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_stays_empty() {
        let cipher = DocumentCipher::from_hex_key(KEY).unwrap();
        assert_eq!(cipher.encrypt("").unwrap(), "");
        assert_eq!(cipher.decrypt("").unwrap(), "");
    }

    #[test]
    fn test_wrong_key_fails() {
        let stored = DocumentCipher::from_hex_key(KEY).unwrap().encrypt("D1234567").unwrap();
        let other = DocumentCipher::from_hex_key(OTHER_KEY).unwrap();
        assert!(other.decrypt(&stored).is_err());
    }

    #[test]
    fn test_bad_keys_rejected() {
        assert!(DocumentCipher::from_hex_key("not-hex").is_err());
        assert!(DocumentCipher::from_hex_key("abcd").is_err());
    }

    #[test]
    fn test_malformed_stored_value() {
        let cipher = DocumentCipher::from_hex_key(KEY).unwrap();
        assert!(cipher.decrypt("plaintext").is_err());
        assert!(cipher.decrypt("00:zz").is_err());
    }
}
