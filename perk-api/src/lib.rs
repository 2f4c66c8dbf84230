use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod error;
pub mod middleware;
pub mod rewards;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let admin_routes = Router::new()
        .route("/v1/admin/coupons", post(admin::populate_coupons))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/v1/rewards/allocate", post(rewards::allocate))
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
