pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn build_api_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route("/api/posts/{id}/like", post(handlers::like_post))
        .route("/api/posts/{id}/dislike", post(handlers::dislike_post))
        .route(
            "/api/comments/post/{post_id}",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route("/api/comments/{id}", delete(handlers::delete_comment))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .with_state(state)
}
