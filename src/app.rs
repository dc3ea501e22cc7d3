use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::handlers::{self, auth, companies, health, jobs, users};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Build the full router over `state`.
pub fn app(state: AppState) -> Router {
    let api = &state.config.api;
    let mut router = routes(&state)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(api.max_request_size_bytes)),
        );

    if api.enable_cors {
        router = router.layer(build_cors_layer(api));
    }

    router.with_state(state)
}

/// Gates wrap individual method handlers, so a method a path does not
/// serve is answered 405 without checking credentials.
fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::get))
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .route(
            "/companies",
            get(companies::list).merge(admin_only(state, post(companies::post))),
        )
        .route(
            "/companies/:handle",
            get(companies::get).merge(admin_only(state, patch(companies::patch).delete(companies::delete))),
        )
        .route("/jobs", get(jobs::list).merge(admin_only(state, post(jobs::post))))
        .route(
            "/jobs/:id",
            get(jobs::get).merge(admin_only(state, patch(jobs::patch).delete(jobs::delete))),
        )
        .route("/users", admin_only(state, post(users::post).get(users::list)))
        .route(
            "/users/:username",
            logged_in(state, get(users::get).patch(users::patch).delete(users::delete)),
        )
        .route("/users/:username/jobs/:id", logged_in(state, post(users::apply)))
}

/// Login required; handlers check same-user-or-admin themselves.
fn logged_in(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), require_auth))
}

/// Admin only. `require_admin` runs inside `require_auth`, so a missing or
/// bad token is a 401 before the admin flag is ever looked at.
fn admin_only(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!("CORS: allowing origins {:?}", config.cors_origins);
        cors.allow_origin(origins)
    }
}
