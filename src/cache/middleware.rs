//! Read-through response cache middleware.
//!
//! Caches GET responses under `cache:<path>[?query]` and serves them until
//! they expire or a write purges them.

use std::sync::Arc;

use axum::{
    body::{Body, HttpBody},
    extract::State,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;
use tracing::{debug, instrument, warn};

use super::{CacheConfig, keys::CacheKey, store::CacheStore};

const METRIC_CACHE_HIT_TOTAL: &str = "quillpost_cache_hit_total";
const METRIC_CACHE_MISS_TOTAL: &str = "quillpost_cache_miss_total";
const METRIC_CACHE_STORE_ERROR_TOTAL: &str = "quillpost_cache_store_error_total";

/// Response header reporting whether the body came from the cache.
pub const X_CACHE: &str = "x-cache";

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<dyn CacheStore>,
}

/// Middleware for read-through response caching.
///
/// Only GET requests are looked up, and only `200 OK` responses are stored.
/// Store failures degrade to uncached behaviour.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !cache.config.enabled || request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = CacheKey::from_request(request.uri().path(), request.uri().query());

    match cache.store.get(&key).await {
        Ok(Some(entry)) => {
            counter!(METRIC_CACHE_HIT_TOTAL).increment(1);
            debug!(cache = "response", outcome = "hit", key = %key, "serving cached response");
            return build_response(entry.payload, "HIT");
        }
        Ok(None) => {}
        Err(err) => {
            counter!(METRIC_CACHE_STORE_ERROR_TOTAL, "op" => "get").increment(1);
            warn!(key = %key, error = %err, "cache lookup failed; treating as miss");
        }
    }

    counter!(METRIC_CACHE_MISS_TOTAL).increment(1);
    debug!(cache = "response", outcome = "miss", key = %key, "cache miss, executing handler");

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(HeaderName::from_static(X_CACHE), HeaderValue::from_static("MISS"));

    // Only bodies with a known size under the limit are buffered.
    let limit = cache.config.response_body_limit_bytes;
    let size_hint = body.size_hint();
    if size_hint.upper().is_none_or(|upper| upper > limit as u64) {
        debug!(
            key = %key,
            size = size_hint.lower(),
            "response too large or unsized; not caching"
        );
        return Response::from_parts(parts, body);
    }

    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    if let Err(err) = cache
        .store
        .set(&key, bytes.clone(), cache.config.default_ttl())
        .await
    {
        counter!(METRIC_CACHE_STORE_ERROR_TOTAL, "op" => "set").increment(1);
        warn!(key = %key, error = %err, "failed to store response in cache");
    }

    Response::from_parts(parts, Body::from(bytes))
}

/// Build a response from a cached JSON body.
fn build_response(body: bytes::Bytes, outcome: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(X_CACHE, outcome)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
