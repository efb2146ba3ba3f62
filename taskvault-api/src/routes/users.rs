/// User endpoints: registration, sessions, profile
///
/// # Endpoints
///
/// - `POST /users` - Register (public); responds 201 with (user, token)
/// - `POST /users/login` - Authenticate (public); responds with (user, token)
/// - `POST /users/logout` - Revoke the presented token only
/// - `POST /users/logoutAll` - Revoke every token for the user
/// - `GET /users/me` - Profile read
/// - `PATCH /users/me` - Allow-listed profile update
/// - `DELETE /users/me` - Cascading account deletion
///
/// Login failures never say whether the email or the password was wrong;
/// the distinction exists only in debug logs.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{ensure_allowed_fields, expect_string, validation_error},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskvault_shared::{
    auth::{password, session::AuthSession, token},
    models::{
        session_token::SessionToken,
        user::{CreateUser, UpdateUser, User, UserView, DEFAULT_AGE},
    },
};
use tracing::debug;
use validator::{Validate, ValidateEmail};

/// Fields a profile PATCH may touch; anything else fails the whole update
const PROFILE_UPDATE_FIELDS: [&str; 4] = ["name", "email", "password", "age"];

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Age in years (defaults to 18)
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,

    /// Raw password (policy-checked, then hashed, never stored)
    #[validate(length(min = 7, message = "Password must be at least 7 characters long"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    /// Raw password
    pub password: String,
}

/// Response carrying a user and the session token just issued
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The user's external view
    pub user: UserView,

    /// The freshly issued session token
    pub token: String,
}

/// Response carrying just a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserEnvelope {
    /// The user's external view
    pub user: UserView,
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

/// Registration handler
///
/// Validates, hashes the password, creates the user, fires the welcome
/// email off the request path, and issues the first session token.
///
/// # Errors
///
/// - `422`: validation failed (bad email, short password, negative age,
///   password policy, email already taken)
/// - `500`: store or hashing failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    req.validate()?;
    password::validate_password_policy(&req.password)
        .map_err(|message| validation_error("password", message))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            name: req.name.trim().to_string(),
            age: req.age.unwrap_or(DEFAULT_AGE),
            password_hash,
        },
    )
    .await?;

    // Best effort; a failed email must not fail the registration
    state
        .mailer
        .send_welcome_detached(user.email.clone(), user.name.clone());

    let token = issue_session_token(&state, &user).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Login handler
///
/// # Errors
///
/// - `401`: unknown email or wrong password, indistinguishably
/// - `422`: malformed request
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| {
            debug!("login failed: no user for the given email");
            credential_failure()
        })?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        debug!(user_id = %user.id, "login failed: password mismatch");
        return Err(credential_failure());
    }

    let token = issue_session_token(&state, &user).await?;

    Ok(Json(SessionResponse {
        user: user.into(),
        token,
    }))
}

/// Logout handler: removes exactly the session that made the call
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<MessageResponse>> {
    SessionToken::revoke_one(&state.db, auth.user.id, &auth.token).await?;

    Ok(Json(MessageResponse {
        message: "Successfully logged out.".to_string(),
    }))
}

/// Logout-all handler: clears the user's entire token set
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<MessageResponse>> {
    SessionToken::revoke_all(&state.db, auth.user.id).await?;

    Ok(Json(MessageResponse {
        message: "Successfully logged out from all devices.".to_string(),
    }))
}

/// Profile read handler
pub async fn me(Extension(auth): Extension<AuthSession>) -> Json<UserEnvelope> {
    Json(UserEnvelope {
        user: auth.user.into(),
    })
}

/// Profile update handler
///
/// The raw JSON object is checked against the allow-list first; a single
/// unknown key fails the whole request before any field is validated or
/// written. A password change re-hashes before persistence.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<UserEnvelope>> {
    ensure_allowed_fields(&body, &PROFILE_UPDATE_FIELDS)?;

    let mut update = UpdateUser::default();

    if let Some(value) = body.get("name") {
        let name = expect_string(value, "name")?;
        if name.trim().is_empty() {
            return Err(validation_error("name", "Name is required"));
        }
        update.name = Some(name.trim().to_string());
    }

    if let Some(value) = body.get("email") {
        let email = expect_string(value, "email")?;
        if !email.validate_email() {
            return Err(validation_error("email", "Email is invalid"));
        }
        update.email = Some(email.to_string());
    }

    if let Some(value) = body.get("age") {
        let age = value
            .as_i64()
            .ok_or_else(|| validation_error("age", "Age must be a number"))?;
        if age < 0 {
            return Err(validation_error("age", "Age must be a positive number"));
        }
        let age = i32::try_from(age).map_err(|_| validation_error("age", "Age is out of range"))?;
        update.age = Some(age);
    }

    if let Some(value) = body.get("password") {
        let raw = expect_string(value, "password")?;
        password::validate_password_policy(raw)
            .map_err(|message| validation_error("password", message))?;
        update.password_hash = Some(password::hash_password(raw)?);
    }

    let user = User::update(&state.db, auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserEnvelope { user: user.into() }))
}

/// Account deletion handler
///
/// Removes the user's tasks, sessions, and record in one transaction,
/// then fires the goodbye email off the request path.
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> ApiResult<Json<UserEnvelope>> {
    let user = auth.user;

    let deleted = User::delete_cascade(&state.db, user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    state
        .mailer
        .send_cancellation_detached(user.email.clone(), user.name.clone());

    Ok(Json(UserEnvelope { user: user.into() }))
}

/// The one message every credential failure gets
fn credential_failure() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

/// Signs a fresh session token and appends it to the user's token set
async fn issue_session_token(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = token::Claims::new(user.id, state.session_ttl());
    let signed = token::sign(&claims, state.jwt_secret())?;

    SessionToken::insert(&state.db, user.id, &signed).await?;

    Ok(signed)
}
