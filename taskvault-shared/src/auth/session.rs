/// Session verification against the live token set
///
/// [`verify`] is the single entry point every protected operation goes
/// through. It is a pure read: decode the bearer token, resolve the user
/// it claims to be, and confirm the exact token string is still present
/// in that user's live token set. Only then does the caller get an
/// [`AuthSession`] to scope its work with.
///
/// Failure detail is collapsed for callers: a forged signature, an
/// unknown user id, and a revoked token all surface as the same generic
/// authentication failure at the HTTP boundary. The distinction survives
/// internally for logging.

use sqlx::PgPool;
use tracing::debug;

use super::token;
use crate::models::{session_token::SessionToken, user::User};

/// An authenticated identity: the user plus the exact token presented
///
/// The token is kept because logout must remove *that* session, not all
/// of the user's sessions.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The resolved user record
    pub user: User,

    /// The raw token string this session authenticated with
    pub token: String,
}

/// Error type for session verification
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Signature/expiry failure or a token referencing no known user
    #[error("Invalid session token")]
    Invalid,

    /// Structurally valid token that is no longer in the live token set
    #[error("Session token has been revoked")]
    Revoked,

    /// Store failure while resolving the session
    #[error("Credential store failure: {0}")]
    Store(String),
}

/// Verifies a bearer token and resolves the identity behind it
///
/// Steps, in order:
/// 1. Signature and expiry check (no store access)
/// 2. Resolve the embedded user id against the credential store
/// 3. Confirm the exact token value is in that user's live token set
///
/// # Errors
///
/// - `AuthError::Invalid` for signature/expiry failures and unknown users
/// - `AuthError::Revoked` when the token was valid but logged out
/// - `AuthError::Store` when the store itself fails
pub async fn verify(pool: &PgPool, raw_token: &str, secret: &str) -> Result<AuthSession, AuthError> {
    let claims = token::verify(raw_token, secret).map_err(|e| {
        debug!(reason = %e, "session token failed signature or expiry check");
        AuthError::Invalid
    })?;

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
        .ok_or_else(|| {
            debug!(user_id = %claims.sub, "session token references a missing user");
            AuthError::Invalid
        })?;

    let live = SessionToken::exists(pool, user.id, raw_token)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    if !live {
        debug!(user_id = %user.id, "session token is not in the live token set");
        return Err(AuthError::Revoked);
    }

    Ok(AuthSession {
        user,
        token: raw_token.to_string(),
    })
}
