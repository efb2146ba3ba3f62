/// Session token generation and validation
///
/// A session token is a signed JWT (HS256) that binds the user id and an
/// expiry timestamp. Signature and expiry are verifiable without touching
/// the store; whether the token is still *live* is a separate question
/// answered by [`crate::auth::session`], because logout removes tokens
/// from the store and a stateless check cannot see that.
///
/// # Example
///
/// ```
/// use taskvault_shared::auth::token::{sign, verify, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, Duration::days(7));
/// let token = sign(&claims, "secret-key-at-least-32-bytes-long!!")?;
///
/// let verified = verify(&token, "secret-key-at-least-32-bytes-long!!")?;
/// assert_eq!(verified.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped into every session token
pub const ISSUER: &str = "taskvault";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("Failed to sign token: {0}")]
    Sign(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, or format check failed
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by a session token
///
/// - `sub`: user id the session belongs to
/// - `iss`: always [`ISSUER`]
/// - `iat` / `exp`: issuance and expiry as Unix timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID
    pub sub: Uuid,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for one login session
    ///
    /// `ttl` is the session validity window measured from now; callers
    /// take it from configuration (7 days unless overridden).
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Checks whether the expiry timestamp has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a session token string
///
/// # Errors
///
/// Returns `TokenError::Sign` if encoding fails
pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| TokenError::Sign(format!("Token encoding failed: {}", e)))
}

/// Validates a session token string and extracts its claims
///
/// Verifies the signature, the expiry, and the issuer. A token that fails
/// any of these checks never reaches the token-set membership check.
///
/// # Errors
///
/// - `TokenError::Expired` if the expiry timestamp has passed
/// - `TokenError::Invalid` for a bad signature, issuer, or format
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::days(7));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::days(7));

        let token = sign(&claims, SECRET).expect("Should sign token");
        let verified = verify(&token, SECRET).expect("Should verify token");

        assert_eq!(verified.sub, user_id);
        assert_eq!(verified.iss, ISSUER);
        assert_eq!(verified.exp, claims.exp);
    }

    #[test]
    fn test_two_issuances_are_independent_tokens() {
        let user_id = Uuid::new_v4();

        let t1 = sign(&Claims::new(user_id, Duration::days(7)), SECRET).unwrap();
        let t2 = sign(&Claims::new(user_id, Duration::days(6)), SECRET).unwrap();

        assert_ne!(t1, t2);
        assert!(verify(&t1, SECRET).is_ok());
        assert!(verify(&t2, SECRET).is_ok());
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let claims = Claims::new(Uuid::new_v4(), Duration::days(7));
        let token = sign(&claims, SECRET).expect("Should sign token");

        assert!(verify(&token, "a-completely-different-signing-secret").is_err());
    }

    #[test]
    fn test_verify_tampered_token() {
        let claims = Claims::new(Uuid::new_v4(), Duration::days(7));
        let token = sign(&claims, SECRET).expect("Should sign token");

        let mut tampered = token.clone();
        tampered.pop();
        assert!(verify(&tampered, SECRET).is_err());

        assert!(verify("not.a.token", SECRET).is_err());
    }

    #[test]
    fn test_verify_expired_token() {
        let claims = Claims::new(Uuid::new_v4(), Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = sign(&claims, SECRET).expect("Should sign token");
        let result = verify(&token, SECRET);

        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), TokenError::Expired));
    }
}
