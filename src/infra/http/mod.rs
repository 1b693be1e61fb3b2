pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use axum::{Json, Router, middleware as axum_middleware, routing::get};

use crate::cache::{CacheState, response_cache_layer};

use self::api::models::HealthResponse;
use self::middleware::{log_responses, set_request_context};

/// Assemble the public router.
///
/// API routes sit behind the read-through cache when `cache` is set; the
/// health probe never does.
pub fn build_router(api: ApiState, cache: Option<CacheState>) -> Router {
    let api_routes = build_api_router(api);
    let api_routes = if let Some(cache_state) = cache {
        api_routes.layer(axum_middleware::from_fn_with_state(
            cache_state,
            response_cache_layer,
        ))
    } else {
        api_routes
    };

    let health_routes = Router::new().route("/healthz", get(healthz));

    api_routes
        .merge(health_routes)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
