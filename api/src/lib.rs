use crate::routes::{admin, cleanup, import, vehicle};
use crate::state::AppState;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router, middleware};
use std::sync::Arc;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub mod auth;
pub mod domain;
pub mod error;
pub mod routes;
pub mod state;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::import::mobilox_import,
        crate::routes::cleanup::cleanup_sold,
        crate::routes::vehicle::all,
        crate::routes::vehicle::by_inventory_number,
        crate::routes::admin::upsert,
        crate::routes::admin::set_status,
        crate::routes::admin::delete
    ),
    modifiers(&BasicAuth)
)]
pub struct Docs;

struct BasicAuth;

impl Modify for BasicAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route(
            "/vehicles/{inventory_number}",
            put(admin::upsert).delete(admin::delete),
        )
        .route(
            "/vehicles/{inventory_number}/status",
            patch(admin::set_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/api/openapi.json",
            get(|| async { Json(Docs::openapi()) }),
        )
        .route(
            "/api/mobilox-import",
            post(import::mobilox_import).fallback(import::method_not_allowed),
        )
        .route(
            "/api/cleanup-sold",
            get(cleanup::cleanup_sold).post(cleanup::cleanup_sold),
        )
        .route("/api/vehicles", get(vehicle::all))
        .route(
            "/api/vehicles/{inventory_number}",
            get(vehicle::by_inventory_number),
        )
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
