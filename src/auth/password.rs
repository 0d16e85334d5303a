use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::Sha256;

const PBKDF2_ITERATIONS: u32 = 100_000;
const KEY_LEN: usize = 32;

/// Salted PBKDF2-HMAC-SHA256 password hashing. Stored form is
/// `base64(salt || key)`; the salt length comes from config, the derived key
/// is always 32 bytes.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    salt_size: usize,
}

impl PasswordHasher {
    pub fn new(salt_size: usize) -> Self {
        PasswordHasher { salt_size }
    }

    pub fn hash(&self, raw: &str) -> String {
        let mut salt = vec![0u8; self.salt_size];
        OsRng
            .try_fill_bytes(&mut salt)
            .expect("Failed to generate random salt");

        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(raw.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key);

        let mut blob = salt;
        blob.extend_from_slice(&key);
        BASE64.encode(blob)
    }

    /// A blob that fails to decode is simply "does not match".
    pub fn verify(&self, raw: &str, stored: &str) -> bool {
        let Ok(decoded) = BASE64.decode(stored) else {
            return false;
        };
        if decoded.len() <= KEY_LEN {
            return false;
        }

        let (salt, key) = decoded.split_at(decoded.len() - KEY_LEN);
        let mut candidate = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(raw.as_bytes(), salt, PBKDF2_ITERATIONS, &mut candidate);

        candidate[..] == key[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_succeeds() {
        let hasher = PasswordHasher::new(16);
        let blob = hasher.hash("correct horse battery staple");
        assert!(hasher.verify("correct horse battery staple", &blob));
    }

    #[test]
    fn wrong_password_fails() {
        let hasher = PasswordHasher::new(16);
        let blob = hasher.hash("password-one");
        assert!(!hasher.verify("password-two", &blob));
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = PasswordHasher::new(16);
        assert_ne!(hasher.hash("same input"), hasher.hash("same input"));
    }

    #[test]
    fn malformed_blob_does_not_match() {
        let hasher = PasswordHasher::new(16);
        assert!(!hasher.verify("anything", "not base64!!!"));
        assert!(!hasher.verify("anything", &BASE64.encode(b"too short")));
    }
}
