//! Shared harness for router-level tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use quillpost::{
    application::{
        categories::CategoryService,
        comments::CommentService,
        posts::PostService,
        repos::{CategoriesRepo, CommentsRepo, PostsRepo},
    },
    cache::{
        CacheConfig, CacheEntry, CacheKey, CacheState, CacheStore, CacheTrigger,
        InvalidationPolicy, KeyPattern, StoreError,
    },
    infra::{
        db::MemoryRepositories,
        http::{ApiState, build_router},
    },
};
use serde_json::Value;
use tower::ServiceExt;

/// Build the full router over fresh repositories and the given store.
pub fn build_app(store: Arc<dyn CacheStore>, config: CacheConfig) -> Router {
    let repositories = Arc::new(MemoryRepositories::new());
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let comments_repo: Arc<dyn CommentsRepo> = repositories.clone();
    let categories_repo: Arc<dyn CategoriesRepo> = repositories.clone();

    let (trigger, cache_state) = if config.enabled {
        let trigger = Arc::new(CacheTrigger::new(
            config.clone(),
            InvalidationPolicy::new(store.clone()),
        ));
        let state = CacheState {
            config,
            store,
        };
        (Some(trigger), Some(state))
    } else {
        (None, None)
    };

    let api = ApiState {
        posts: Arc::new(
            PostService::new(
                posts_repo.clone(),
                comments_repo.clone(),
                categories_repo.clone(),
            )
            .with_cache_trigger_opt(trigger.clone()),
        ),
        comments: Arc::new(
            CommentService::new(comments_repo, posts_repo.clone())
                .with_cache_trigger_opt(trigger.clone()),
        ),
        categories: Arc::new(
            CategoryService::new(categories_repo, posts_repo).with_cache_trigger_opt(trigger),
        ),
    };

    build_router(api, cache_state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub json: Value,
}

impl TestResponse {
    pub fn x_cache(&self) -> Option<&str> {
        self.headers
            .get("x-cache")
            .and_then(|value| value.to_str().ok())
    }

    pub fn id(&self) -> String {
        self.json["id"]
            .as_str()
            .expect("response carries an id")
            .to_string()
    }
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let request = builder.body(body).expect("request should build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        json,
    }
}

pub async fn get(router: &Router, uri: &str) -> TestResponse {
    send(router, Method::GET, uri, None).await
}

/// A backend whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<CacheEntry>, StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn set(
        &self,
        _key: &CacheKey,
        _payload: Bytes,
        _ttl: Duration,
    ) -> Result<(), StoreError> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn del(&self, _pattern: &KeyPattern) -> Result<u64, StoreError> {
        Err(StoreError::operation("del", "connection reset"))
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}
