//! Generic route set mounted once per resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::resource;
use crate::resources::Resource;
use crate::state::AppState;

/// Routes mounted at `/{resource}`.
///
/// ```text
/// GET    /          -> list          (?search=&category=&limit=&offset=)
/// POST   /          -> create
/// GET    /trash     -> list_trash
/// POST   /trash     -> trash_action  ({action: restore|delete, key})
/// GET    /{key}     -> get_one
/// PUT    /{key}     -> update
/// DELETE /{key}     -> soft_delete
/// ```
pub fn router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::list::<R>).post(resource::create::<R>))
        .route(
            "/trash",
            get(resource::list_trash::<R>).post(resource::trash_action::<R>),
        )
        .route(
            "/{key}",
            get(resource::get_one::<R>)
                .put(resource::update::<R>)
                .delete(resource::soft_delete::<R>),
        )
}
