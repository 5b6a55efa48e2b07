//! Password hashing and verification using Argon2id.
//!
//! Passwords are cut to at most [`MAX_PASSWORD_BYTES`] UTF-8 bytes, on a
//! character boundary, before they reach the hash function. The same cut
//! is applied on the hash and the verify path so a long password always
//! verifies against its own verifier.

use std::sync::OnceLock;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use tracing::warn;

use crate::error::AuthError;

/// Longest password prefix, in bytes, that takes part in hashing.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Longest prefix of `password` that fits in [`MAX_PASSWORD_BYTES`]
/// without splitting a multi-byte character.
pub fn truncate_password(password: &str) -> &str {
    if password.len() <= MAX_PASSWORD_BYTES {
        return password;
    }

    let mut end = 0;
    for (idx, ch) in password.char_indices() {
        let next = idx + ch.len_utf8();
        if next > MAX_PASSWORD_BYTES {
            break;
        }
        end = next;
    }
    &password[..end]
}

/// Hash a password with Argon2id using OWASP-recommended parameters.
///
/// The salt is randomly generated for each call, so hashing the same
/// password twice yields different verifiers.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AuthError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2
        .hash_password(truncate_password(password).as_bytes(), &salt)
        .map_err(|e| AuthError::Crypto(format!("password hash error: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// A malformed verifier is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(truncate_password(password).as_bytes(), &parsed_hash)
        .is_ok()
}

/// Verifier compared against when there is no account, built on first use.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| hash_password("orderdesk-no-such-account").ok())
        .as_deref()
}

/// Spend the same Argon2 work as [`verify_password`] for a login whose
/// email matched no account. Always `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(hash) = dummy_hash() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2-hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2-hunter2", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2-hunter2").unwrap();
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn salts_differ_between_calls() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1));
        assert!(verify_password("same-password", &h2));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("pw", "not-a-hash"));
        assert!(!verify_password("pw", ""));
    }

    #[test]
    fn dummy_verifier_is_a_real_argon2id_hash() {
        let hash = dummy_hash().unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_eq!(dummy_hash(), Some(hash));
    }

    #[test]
    fn dummy_verification_never_matches() {
        assert!(!verify_against_dummy("hunter2-hunter2"));
        assert!(!verify_against_dummy("orderdesk-no-such-account"));
        assert!(!verify_against_dummy(""));
    }

    #[test]
    fn short_passwords_are_untouched() {
        assert_eq!(truncate_password("longpassword1"), "longpassword1");
        let exactly = "a".repeat(MAX_PASSWORD_BYTES);
        assert_eq!(truncate_password(&exactly), exactly);
    }

    #[test]
    fn ascii_is_cut_at_the_limit() {
        let long = "b".repeat(100);
        assert_eq!(truncate_password(&long).len(), MAX_PASSWORD_BYTES);
    }

    #[test]
    fn multibyte_characters_are_never_split() {
        // 71 ASCII bytes followed by a 2-byte character: the character
        // would straddle the limit, so it is dropped entirely.
        let password = format!("{}é", "a".repeat(71));
        assert_eq!(password.len(), 73);
        let cut = truncate_password(&password);
        assert_eq!(cut, "a".repeat(71));

        // 4-byte characters: 18 of them fill exactly 72 bytes.
        let emoji = "🦀".repeat(20);
        let cut = truncate_password(&emoji);
        assert_eq!(cut.len(), 72);
        assert_eq!(cut.chars().count(), 18);
    }

    #[test]
    fn long_password_verifies_against_either_form() {
        let long = format!("{}tail", "x".repeat(80));
        let full_hash = hash_password(&long).unwrap();
        let cut_hash = hash_password(truncate_password(&long)).unwrap();

        assert!(verify_password(&long, &full_hash));
        assert!(verify_password(&long, &cut_hash));
    }

    #[test]
    fn bytes_past_the_limit_do_not_matter() {
        let base = "p".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(&format!("{base}-one")).unwrap();
        assert!(verify_password(&format!("{base}-two"), &hash));
    }
}
