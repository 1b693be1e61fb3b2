//! Application services layer.

pub mod categories;
pub mod comments;
pub mod error;
pub mod pagination;
pub mod posts;
pub mod repos;
