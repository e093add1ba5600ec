//! Generic CRUD and trash handlers, instantiated once per [`Resource`].
//!
//! Reads are public; every write and every trash operation requires a
//! valid bearer token.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use bizdir_core::error::CoreError;
use bizdir_core::search::paginate;
use bizdir_core::types::{key_string, now_rfc3339, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::ListParams;
use crate::resources::{build_new, build_patch, Resource};
use crate::response::ApiResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /{resource}/trash`.
///
/// The key may be sent as `key`, `slug` or `id`.
#[derive(Debug, Deserialize)]
pub struct TrashActionRequest {
    pub action: String,
    #[serde(alias = "slug", alias = "id")]
    pub key: Value,
}

/// Result of a permanent delete.
#[derive(Debug, Serialize)]
pub struct HardDeleteResult {
    pub key: String,
    /// `false` when the key was not in the trash.
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/admin/{resource}
///
/// List active records, filtered by `search`/`category` and paginated by
/// `limit`/`offset`. `total` counts matches before pagination.
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Record>>>> {
    let records = state
        .store
        .read_all(&R::COLLECTION, state.seed(&R::COLLECTION))
        .await?;

    let matching = params.filter().apply(records);
    let total = matching.len();
    let page = paginate(matching, params.limit, params.offset)
        .into_iter()
        .map(R::present)
        .collect();

    Ok(Json(ApiResponse::ok(page).with_total(total)))
}

/// GET /api/admin/{resource}/{key}
pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Json<ApiResponse<Record>>> {
    let record = state
        .store
        .find(&R::COLLECTION, &key, state.seed(&R::COLLECTION))
        .await
        .map_err(|e| not_found_as::<R>(e, &key))?;
    Ok(Json(ApiResponse::ok(R::present(record))))
}

/// POST /api/admin/{resource}
///
/// Create a record. The key is derived from the resource's key source when
/// absent and resource defaults are applied. Returns 201.
pub async fn create<R: Resource>(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(body): AppJson<Record>,
) -> AppResult<impl IntoResponse> {
    let record = build_new::<R>(body, &now_rfc3339())?;
    R::check_reserved(&record, &state.config)?;
    let record = state
        .store
        .add_record(&R::COLLECTION, record, state.seed(&R::COLLECTION))
        .await?;

    tracing::info!(
        collection = R::COLLECTION.name,
        key = ?R::COLLECTION.key_of(&record),
        username = %user.username,
        "Record created",
    );

    let response =
        ApiResponse::ok(R::present(record)).with_message(format!("{} created", R::ENTITY));
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/admin/{resource}/{key}
///
/// Partial update: fields in the body replace stored ones, others are kept.
pub async fn update<R: Resource>(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
    AppJson(body): AppJson<Record>,
) -> AppResult<Json<ApiResponse<Record>>> {
    let patch = build_patch::<R>(body, &now_rfc3339())?;
    R::check_reserved(&patch, &state.config)?;
    let record = state
        .store
        .update_record(&R::COLLECTION, &key, patch, state.seed(&R::COLLECTION))
        .await
        .map_err(|e| not_found_as::<R>(e, &key))?;

    tracing::info!(
        collection = R::COLLECTION.name,
        %key,
        username = %user.username,
        "Record updated",
    );

    Ok(Json(
        ApiResponse::ok(R::present(record)).with_message(format!("{} updated", R::ENTITY)),
    ))
}

/// DELETE /api/admin/{resource}/{key}
///
/// Soft-delete: move the record to the trash.
pub async fn soft_delete<R: Resource>(
    user: AuthUser,
    State(state): State<AppState>,
    AppPath(key): AppPath<String>,
) -> AppResult<Json<ApiResponse<Record>>> {
    let entry = state
        .store
        .soft_delete(&R::COLLECTION, &key, state.seed(&R::COLLECTION))
        .await
        .map_err(|e| not_found_as::<R>(e, &key))?;

    tracing::info!(
        collection = R::COLLECTION.name,
        %key,
        username = %user.username,
        "Record moved to trash",
    );

    Ok(Json(
        ApiResponse::ok(R::present(entry)).with_message(format!("{} moved to trash", R::ENTITY)),
    ))
}

/// GET /api/admin/{resource}/trash
pub async fn list_trash<R: Resource>(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Record>>>> {
    let trash: Vec<Record> = state
        .store
        .read_trash(&R::COLLECTION)
        .await?
        .into_iter()
        .map(R::present)
        .collect();
    let total = trash.len();
    Ok(Json(ApiResponse::ok(trash).with_total(total)))
}

/// POST /api/admin/{resource}/trash
///
/// `{"action": "restore", "key": ...}` moves a record back to the active
/// set; `{"action": "delete", "key": ...}` removes it permanently.
pub async fn trash_action<R: Resource>(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<TrashActionRequest>,
) -> AppResult<axum::response::Response> {
    let key = key_string(&input.key)
        .ok_or_else(|| CoreError::Validation("`key` must be a non-empty string or number".into()))?;

    match input.action.as_str() {
        "restore" => {
            let record = state
                .store
                .restore(&R::COLLECTION, &key, state.seed(&R::COLLECTION))
                .await
                .map_err(|e| not_found_as::<R>(e, &key))?;
            tracing::info!(
                collection = R::COLLECTION.name,
                %key,
                username = %user.username,
                "Record restored",
            );
            let response = ApiResponse::ok(R::present(record))
                .with_message(format!("{} restored", R::ENTITY));
            Ok(Json(response).into_response())
        }
        "delete" => {
            let deleted = state.store.delete_hard(&R::COLLECTION, &key).await?;
            tracing::info!(
                collection = R::COLLECTION.name,
                %key,
                deleted,
                username = %user.username,
                "Trash entry permanently deleted",
            );
            let response = ApiResponse::ok(HardDeleteResult { key, deleted })
                .with_message(format!("{} permanently deleted", R::ENTITY));
            Ok(Json(response).into_response())
        }
        other => Err(AppError::Core(CoreError::InvalidAction(format!(
            "Unknown trash action '{other}'. Expected 'restore' or 'delete'"
        )))),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reword a store `NotFound` with the resource's entity name.
fn not_found_as<R: Resource>(err: bizdir_db::StoreError, key: &str) -> AppError {
    match err {
        bizdir_db::StoreError::NotFound { .. } => AppError::Core(CoreError::NotFound {
            entity: R::ENTITY,
            key: key.to_string(),
        }),
        other => other.into(),
    }
}
