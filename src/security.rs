//! Hashing and token-generation utilities.
//!
//! API keys and UPI PINs are both stored as SHA-256 hex digests; reference
//! ids and gift card codes get their random suffixes from here.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Alphabet for reference ids and gift card codes. Uppercase plus digits
/// keeps codes readable over the phone.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// SHA-256 digest of `input` as 64 lowercase hex characters.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a UPI PIN for storage.
pub fn hash_pin(pin: &str) -> String {
    sha256_hex(pin)
}

/// Check a candidate PIN against a stored hash.
pub fn verify_pin(pin: &str, pin_hash: &str) -> bool {
    sha256_hex(pin) == pin_hash
}

/// Random uppercase-alphanumeric string of length `len`.
pub fn random_alphanum(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        // SHA-256("abc"), straight from FIPS 180-2.
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn pin_round_trips_through_hash_and_verify() {
        let hash = hash_pin("4321");
        assert!(verify_pin("4321", &hash));
        assert!(!verify_pin("1234", &hash));
    }

    #[test]
    fn random_alphanum_has_requested_length_and_charset() {
        let code = random_alphanum(8);
        assert_eq!(code.len(), 8);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }
}
