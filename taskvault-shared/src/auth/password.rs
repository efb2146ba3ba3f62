/// Password hashing and password policy
///
/// Hashing uses Argon2id, a deliberately slow, salted, memory-hard
/// algorithm. The stored value is a PHC string that embeds the algorithm
/// parameters and salt, so verification needs no side channel.
///
/// The raw-password policy is enforced before hashing: at least 7
/// characters, and the password must not contain the substring
/// "password" in any casing.
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("horse-battery")?;
/// assert!(verify_password("horse-battery", &hash)?);
/// assert!(!verify_password("wrong-guess", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum raw-password length accepted at registration or password change
pub const MIN_PASSWORD_LENGTH: usize = 7;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash could not be parsed
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a raw password with Argon2id
///
/// Parameters: 64 MB memory, 3 iterations, 4 lanes, 16-byte random salt
/// from the OS RNG. Returns the PHC string form.
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a raw password against a stored hash
///
/// Comparison is constant-effort: the full hash is always recomputed with
/// the parameters embedded in the stored PHC string.
///
/// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch; errors are
/// reserved for unparseable hashes and internal failures.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

/// Validates the raw-password policy
///
/// Rules:
/// - at least [`MIN_PASSWORD_LENGTH`] characters
/// - must not contain "password" (case-insensitive)
///
/// Returns `Ok(())` if the password is acceptable, `Err` with a
/// human-readable reason otherwise.
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::password::validate_password_policy;
///
/// assert!(validate_password_policy("abcdefg").is_ok());
/// assert!(validate_password_policy("short").is_err());
/// assert!(validate_password_policy("MyPassword123").is_err());
/// ```
pub fn validate_password_policy(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.to_lowercase().contains("password") {
        return Err("Password must not contain \"password\"".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_is_phc_argon2id() {
        let hash = hash_password("abcdefg").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_is_never_the_plaintext() {
        let password = "abcdefg";
        let hash = hash_password(password).expect("Hash should succeed");
        assert_ne!(hash, password);
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same-input").expect("Hash 1 should succeed");
        let hash2 = hash_password("same-input").expect("Hash 2 should succeed");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let hash = hash_password("correct-horse").expect("Hash should succeed");

        assert!(verify_password("correct-horse", &hash).expect("Verify should succeed"));
        assert!(!verify_password("wrong-horse", &hash).expect("Verify should succeed"));
        assert!(!verify_password("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
        assert!(verify_password("anything", "$argon2id$broken").is_err());
    }

    #[test]
    fn test_policy_minimum_length() {
        assert!(validate_password_policy("abcdef").is_err());
        assert!(validate_password_policy("abcdefg").is_ok());
    }

    #[test]
    fn test_policy_rejects_password_substring() {
        let result = validate_password_policy("mypassword1");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("password"));

        // Case-insensitive
        assert!(validate_password_policy("PaSsWoRd123").is_err());
        assert!(validate_password_policy("xxPASSWORDxx").is_err());
    }

    #[test]
    fn test_policy_accepts_ordinary_passphrases() {
        for candidate in ["abcdefg", "with spaces ok", "unicode-密码-ok", "p4ssw0rd-is-fine"] {
            assert!(
                validate_password_policy(candidate).is_ok(),
                "'{}' should pass the policy",
                candidate
            );
        }
    }
}
