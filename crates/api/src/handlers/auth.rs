//! Handlers for admin sign-in (`/login`) and token verification (`/verify`).

use axum::extract::State;
use axum::Json;
use bizdir_core::error::CoreError;
use bizdir_core::roles::{ROLE_ADMIN, ROLE_EDITOR};
use bizdir_core::types::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::resources::{Resource, Users, PASSWORD_HASH_FIELD, USERNAME_FIELD};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful sign-in.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: Identity,
}

/// The identity a token was issued to.
#[derive(Debug, Serialize)]
pub struct Identity {
    pub username: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/admin/login
///
/// Authenticate with username + password and return a bearer token. The
/// configured admin account is checked first, then active users with a
/// stored password hash.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and password are required".into(),
        )));
    }

    let role = match authenticate(&state, &input).await? {
        Some(role) => role,
        None => {
            tracing::warn!(username = %input.username, "Failed login attempt");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            )));
        }
    };

    let token = generate_token(&input.username, &role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(username = %input.username, %role, "User logged in");

    let response = LoginResponse {
        token,
        expires_in: state.config.jwt.expires_in_secs(),
        user: Identity {
            username: input.username,
            role,
        },
    };
    Ok(Json(ApiResponse::ok(response).with_message("Login successful")))
}

/// GET /api/admin/verify
///
/// Confirm the bearer token is valid and return who it belongs to.
pub async fn verify(user: AuthUser) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::ok(Identity {
        username: user.username,
        role: user.role,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve the caller's role if the credentials are valid.
async fn authenticate(state: &AppState, input: &LoginRequest) -> AppResult<Option<String>> {
    let admin = &state.config.admin;
    let is_admin: bool = input
        .username
        .as_bytes()
        .ct_eq(admin.username.as_bytes())
        .into();

    if is_admin {
        let valid = verify_password(&input.password, &admin.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        return Ok(valid.then(|| ROLE_ADMIN.to_string()));
    }

    let users = state
        .store
        .read_all(&Users::COLLECTION, state.seed(&Users::COLLECTION))
        .await?;
    let Some(user) = users
        .iter()
        .find(|u| field_str(u, USERNAME_FIELD) == Some(input.username.as_str()))
    else {
        return Ok(None);
    };

    if user.get("active") == Some(&Value::Bool(false)) {
        return Ok(None);
    }
    let Some(hash) = field_str(user, PASSWORD_HASH_FIELD) else {
        return Ok(None);
    };

    let valid = verify_password(&input.password, hash).unwrap_or_else(|e| {
        tracing::error!(username = %input.username, error = %e, "Stored password hash is unusable");
        false
    });
    let role = field_str(user, "role").unwrap_or(ROLE_EDITOR).to_string();
    Ok(valid.then_some(role))
}

fn field_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}
