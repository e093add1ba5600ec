//! Route definitions for the settings document.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// ```text
/// GET  /settings  -> get_settings  (requires auth)
/// POST /settings  -> save_settings (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/settings",
        get(settings::get_settings).post(settings::save_settings),
    )
}
