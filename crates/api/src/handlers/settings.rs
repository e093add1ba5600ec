//! Handlers for the site settings document.

use axum::extract::State;
use axum::Json;
use bizdir_core::collections::SETTINGS;
use bizdir_core::error::CoreError;
use bizdir_core::seed::default_settings;
use bizdir_core::types::{now_rfc3339, UPDATED_AT_FIELD};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /api/admin/settings
///
/// Returns the saved settings, or the defaults if none were ever saved.
pub async fn get_settings(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let settings = state
        .store
        .read_singleton(SETTINGS, default_settings())
        .await?;
    Ok(Json(ApiResponse::ok(settings)))
}

/// POST /api/admin/settings
///
/// Replace the whole settings document. The body must be a JSON object.
pub async fn save_settings(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<Value>,
) -> AppResult<Json<ApiResponse<Value>>> {
    let Value::Object(mut settings) = body else {
        return Err(AppError::Core(CoreError::Validation(
            "Settings must be a JSON object".to_string(),
        )));
    };
    settings.insert(UPDATED_AT_FIELD.to_string(), Value::String(now_rfc3339()));

    let saved = state
        .store
        .write_singleton(SETTINGS, Value::Object(settings))
        .await?;

    tracing::info!(username = %user.username, "Settings saved");
    Ok(Json(ApiResponse::ok(saved).with_message("Settings saved")))
}
