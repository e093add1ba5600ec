pub mod auth;
pub mod health;
pub mod resource;
pub mod settings;

use axum::Router;

use crate::resources::{Blog, Cafes, Categories, Jewellers, ShopCategories, Users};
use crate::state::AppState;

/// Build the `/api/admin` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /login                                  sign in (public)
/// /verify                                 check token (auth)
/// /settings                               get, replace (auth)
///
/// /{resource}                             list (public), create (auth)
/// /{resource}/trash                       list trash, restore/delete (auth)
/// /{resource}/{key}                       get (public), update, soft-delete (auth)
/// ```
///
/// where `{resource}` is one of `blog`, `cafes`, `jewellers`, `categories`,
/// `shop-categories`, `users`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(settings::router())
        .nest("/blog", resource::router::<Blog>())
        .nest("/cafes", resource::router::<Cafes>())
        .nest("/jewellers", resource::router::<Jewellers>())
        .nest("/categories", resource::router::<Categories>())
        .nest("/shop-categories", resource::router::<ShopCategories>())
        .nest("/users", resource::router::<Users>())
}
