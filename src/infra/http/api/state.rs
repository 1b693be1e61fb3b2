use std::sync::Arc;

use crate::application::categories::CategoryService;
use crate::application::comments::CommentService;
use crate::application::posts::PostService;

#[derive(Clone)]
pub struct ApiState {
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub categories: Arc<CategoryService>,
}
