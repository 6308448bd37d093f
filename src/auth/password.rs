// src/auth/password.rs

//! Password hashing
//!
//! Hashes are PBKDF2-HMAC-SHA256 stored in the passlib modular format:
//!
//! ```text
//! $pbkdf2-sha256$<rounds>$<salt>$<checksum>
//! ```
//!
//! where salt and checksum use passlib's "adapted base64" (standard
//! alphabet, `.` in place of `+`, no padding). Hashes produced by earlier
//! installations of the shop software verify unchanged.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Identifier in the modular crypt format
const SCHEME: &str = "pbkdf2-sha256";

/// Default iteration count (matches passlib's pbkdf2_sha256 default)
pub const DEFAULT_ROUNDS: u32 = 29_000;

/// Salt length in bytes
const SALT_LEN: usize = 16;

/// Derived key length (one SHA-256 block)
const KEY_LEN: usize = 32;

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    hash_with_salt(password, &salt, DEFAULT_ROUNDS)
}

/// Hash a password with a caller-provided salt and round count
pub fn hash_with_salt(password: &str, salt: &[u8], rounds: u32) -> Result<String> {
    if rounds == 0 {
        return Err(Error::HashFormat("rounds must be positive".to_string()));
    }
    let key = pbkdf2_sha256(password.as_bytes(), salt, rounds);
    Ok(format!(
        "${SCHEME}${rounds}${}${}",
        ab64_encode(salt),
        ab64_encode(&key)
    ))
}

/// Check a password against a stored hash
///
/// Returns `Ok(false)` on mismatch and an error only when the stored hash
/// cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let parsed = ParsedHash::parse(stored)?;
    let key = pbkdf2_sha256(password.as_bytes(), &parsed.salt, parsed.rounds);
    if key.len() != parsed.checksum.len() {
        return Ok(false);
    }
    Ok(key[..].ct_eq(&parsed.checksum[..]).into())
}

struct ParsedHash {
    rounds: u32,
    salt: Vec<u8>,
    checksum: Vec<u8>,
}

impl ParsedHash {
    fn parse(stored: &str) -> Result<Self> {
        let mut parts = stored.split('$');

        // Leading '$' yields an empty first segment
        if parts.next() != Some("") {
            return Err(Error::HashFormat("missing leading '$'".to_string()));
        }
        match parts.next() {
            Some(SCHEME) => {}
            Some(other) => {
                return Err(Error::HashFormat(format!("unsupported scheme '{other}'")));
            }
            None => return Err(Error::HashFormat("missing scheme".to_string())),
        }

        let rounds = parts
            .next()
            .and_then(|r| r.parse::<u32>().ok())
            .filter(|r| *r > 0)
            .ok_or_else(|| Error::HashFormat("invalid rounds".to_string()))?;
        let salt = parts
            .next()
            .ok_or_else(|| Error::HashFormat("missing salt".to_string()))
            .and_then(ab64_decode)?;
        let checksum = parts
            .next()
            .ok_or_else(|| Error::HashFormat("missing checksum".to_string()))
            .and_then(ab64_decode)?;

        if parts.next().is_some() {
            return Err(Error::HashFormat("trailing fields".to_string()));
        }

        Ok(Self {
            rounds,
            salt,
            checksum,
        })
    }
}

/// PBKDF2 with HMAC-SHA256, single output block
fn pbkdf2_sha256(password: &[u8], salt: &[u8], rounds: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key);
    key
}

fn ab64_encode(data: &[u8]) -> String {
    STANDARD_NO_PAD.encode(data).replace('+', ".")
}

fn ab64_decode(data: &str) -> Result<Vec<u8>> {
    let standard = data.trim_end_matches('=').replace('.', "+");
    STANDARD_NO_PAD
        .decode(standard)
        .map_err(|e| Error::HashFormat(format!("bad base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pbkdf2_known_vector() {
        // RFC 7914 section 11: P="passwd", S="salt", c=1 (first 32 bytes)
        let key = pbkdf2_sha256(b"passwd", b"salt", 1);
        assert_eq!(
            hex::encode(key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn test_verifies_passlib_hash() {
        // Produced by passlib pbkdf2_sha256 with its default settings
        let stored = "$pbkdf2-sha256$29000$MDEyMzQ1Njc4OWFiY2RlZg$NHBlffTsUBBEsyzbUshC.4tfZ7ylPsyNjIqBqOJHiH4";
        assert!(verify_password("admin123", stored).unwrap());
        assert!(!verify_password("admin124", stored).unwrap());

        let rehashed = hash_with_salt("admin123", b"0123456789abcdef", DEFAULT_ROUNDS).unwrap();
        assert_eq!(rehashed, stored);
    }

    #[test]
    fn test_hash_format() {
        let hash = hash_with_salt("admin123", b"0123456789abcdef", 1000).unwrap();
        let fields: Vec<&str> = hash.split('$').collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], "pbkdf2-sha256");
        assert_eq!(fields[2], "1000");
        assert!(!fields[3].contains('+'));
        assert!(!fields[4].contains('='));
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_with_salt("owner123", b"saltsaltsaltsalt", 500).unwrap();
        assert!(verify_password("owner123", &hash).unwrap());
        assert!(!verify_password("owner124", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_random_salts_differ() {
        let a = hash_password("secret").unwrap();
        let b = hash_password("secret").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret", &a).unwrap());
        assert!(verify_password("secret", &b).unwrap());
    }

    #[test]
    fn test_malformed_hashes_are_errors() {
        assert!(verify_password("x", "").is_err());
        assert!(verify_password("x", "plaintext").is_err());
        assert!(verify_password("x", "$bcrypt$10$abc$def").is_err());
        assert!(verify_password("x", "$pbkdf2-sha256$zero$abc$def").is_err());
        assert!(verify_password("x", "$pbkdf2-sha256$0$abc$def").is_err());
        assert!(verify_password("x", "$pbkdf2-sha256$10$abc").is_err());
        assert!(verify_password("x", "$pbkdf2-sha256$10$a!c$def").is_err());
    }

    #[test]
    fn test_adapted_base64_round_trips_plus() {
        // These bytes encode with '+' and '/' in the standard alphabet
        let encoded = ab64_encode(&[0xfb, 0xef, 0xff]);
        assert!(encoded.contains('.'));
        assert_eq!(ab64_decode(&encoded).unwrap(), vec![0xfb, 0xef, 0xff]);
    }
}
